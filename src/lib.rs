//! Terraform provider for Bitrise
//!
//! Manages Bitrise apps, SSH keys, setup completion, role groups, secrets and
//! bitrise.yml through the Bitrise REST API (`/v0.1`).
//!
//! # Module Structure
//!
//! - [`api`] - HTTP client, error taxonomy, request observability
//! - [`config`] - endpoint and token resolution
//! - [`framework`] - schemas, diagnostics, plan step and adapter traits
//! - [`resources`] - managed resources
//! - [`data_sources`] - read-only data sources
//! - [`provider`] - provider definition and adapter registry

pub mod api;
pub mod config;
pub mod data_sources;
pub mod framework;
pub mod provider;
pub mod resources;

pub use provider::BitriseProvider;
