//! Bitrise API interaction module
//!
//! # Module Structure
//!
//! - [`client`] - client factory and the REST-mapped call helpers
//! - [`context`] - per-operation deadline and cancellation
//! - [`error`] - error taxonomy shared by every adapter
//! - [`http`] - raw HTTP wrapper with the authorization header
//! - [`observe`] - request lifecycle hook and its `tracing` implementation
//! - [`rest`] - endpoint descriptors and API paths
//!
//! # Example
//!
//! ```ignore
//! use terraform_provider_bitrise::api::{rest, ClientFactory, OpContext, RestCall};
//! use terraform_provider_bitrise::config::ProviderConfig;
//!
//! async fn example() -> terraform_provider_bitrise::api::Result<()> {
//!     let factory = ClientFactory::new(ProviderConfig::new("https://api.bitrise.io", "token"));
//!     let client = factory.client()?;
//!     let call = RestCall::get("read app", rest::app_path("my-app"));
//!     let app: Option<serde_json::Value> = client.fetch(&OpContext::new(), &call).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod context;
pub mod error;
pub mod http;
pub mod observe;
pub mod rest;

pub use client::{BitriseClient, ClientFactory};
pub use context::OpContext;
pub use error::{ProviderError, Result};
pub use http::ApiResponse;
pub use observe::{RequestObserver, TracingObserver};
pub use rest::RestCall;
