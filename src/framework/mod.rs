//! Plugin framework boundary
//!
//! What the host sees of a resource or data source: its schema, the
//! diagnostics it reports, the plan step and the lifecycle operations.
//!
//! - [`diagnostics`] - errors and warnings returned to the host
//! - [`schema`] - attribute schemas and configuration validation
//! - [`plan`] - defaults, use-state-for-unknown, requires-replace
//! - [`import`] - import identifier parsing
//! - [`resource`] - typed adapter traits and their JSON-facing handles

pub mod diagnostics;
pub mod import;
pub mod plan;
pub mod resource;
pub mod schema;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use import::parse_import_id;
pub use plan::PlannedChange;
pub use resource::{
    DataSource, DataSourceHandle, DynDataSource, DynResource, Resource, ResourceHandle, StateModel,
};
pub use schema::{Attribute, AttributeType, Presence, Schema};
