//! Read-only data sources
//!
//! A data source never writes. A missing remote entity is an error here,
//! since there is no state to drop.

pub mod app;
pub mod app_roles;
pub mod available_stacks;
pub mod org_groups;

pub use app::AppDataSource;
pub use app_roles::AppRolesDataSource;
pub use available_stacks::AvailableStacksDataSource;
pub use org_groups::OrgGroupsDataSource;
