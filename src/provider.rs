//! Provider definition
//!
//! [`BitriseProvider`] is what the plugin host configures once per run. It
//! resolves the provider block into a [`ClientFactory`] without touching the
//! network, then hands that factory to every resource and data source.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::api::{ClientFactory, OpContext};
use crate::config::{ProviderConfig, ProviderModel};
use crate::data_sources::{AppDataSource, AppRolesDataSource, AvailableStacksDataSource, OrgGroupsDataSource};
use crate::framework::{
    Attribute, DataSourceHandle, DynDataSource, DynResource, ResourceHandle, Schema,
};
use crate::resources::{
    AppBitriseYmlResource, AppFinishResource, AppResource, AppRolesResource, AppSecretResource, AppSshResource,
};

/// Prefix of every resource and data-source type name
pub const TYPE_NAME: &str = "bitrise";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// All schemas the provider exposes
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSchemas {
    pub provider: Schema,
    pub resource_schemas: BTreeMap<String, Schema>,
    pub data_source_schemas: BTreeMap<String, Schema>,
}

pub struct BitriseProvider {
    factory: ClientFactory,
    resources: BTreeMap<String, Box<dyn DynResource>>,
    data_sources: BTreeMap<String, Box<dyn DynDataSource>>,
}

impl BitriseProvider {
    /// Resolve the provider block and build every adapter
    ///
    /// Missing credentials are not an error here; the first request fails
    /// instead.
    pub fn configure(model: &ProviderModel) -> Self {
        Self::with_factory(ClientFactory::new(ProviderConfig::resolve(model)))
    }

    pub fn with_factory(factory: ClientFactory) -> Self {
        let resources: Vec<Box<dyn DynResource>> = vec![
            Box::new(ResourceHandle::new(TYPE_NAME, AppResource::new(factory.clone()))),
            Box::new(ResourceHandle::new(TYPE_NAME, AppSshResource::new(factory.clone()))),
            Box::new(ResourceHandle::new(TYPE_NAME, AppFinishResource::new(factory.clone()))),
            Box::new(ResourceHandle::new(TYPE_NAME, AppRolesResource::new(factory.clone()))),
            Box::new(ResourceHandle::new(TYPE_NAME, AppSecretResource::new(factory.clone()))),
            Box::new(ResourceHandle::new(TYPE_NAME, AppBitriseYmlResource::new(factory.clone()))),
        ];

        let data_sources: Vec<Box<dyn DynDataSource>> = vec![
            Box::new(DataSourceHandle::new(TYPE_NAME, AppDataSource::new(factory.clone()))),
            Box::new(DataSourceHandle::new(TYPE_NAME, AppRolesDataSource::new(factory.clone()))),
            Box::new(DataSourceHandle::new(TYPE_NAME, AvailableStacksDataSource::new(factory.clone()))),
            Box::new(DataSourceHandle::new(TYPE_NAME, OrgGroupsDataSource::new(factory.clone()))),
        ];

        tracing::debug!(
            resources = resources.len(),
            data_sources = data_sources.len(),
            "provider configured"
        );

        Self {
            factory,
            resources: resources
                .into_iter()
                .map(|r| (r.type_name().to_string(), r))
                .collect(),
            data_sources: data_sources
                .into_iter()
                .map(|d| (d.type_name().to_string(), d))
                .collect(),
        }
    }

    /// Schema of the provider block itself
    pub fn provider_schema() -> Schema {
        Schema::new("Interact with the Bitrise API.")
            .attribute(
                Attribute::string("endpoint")
                    .optional()
                    .description("Bitrise API endpoint. May also be set with BITRISE_ENDPOINT."),
            )
            .attribute(
                Attribute::string("token")
                    .optional()
                    .sensitive()
                    .description("Bitrise personal access token. May also be set with BITRISE_TOKEN."),
            )
    }

    pub fn factory(&self) -> &ClientFactory {
        &self.factory
    }

    /// Operation context honouring the configured timeout as a deadline
    pub fn op_context(timeout: Option<Duration>) -> OpContext {
        match timeout {
            Some(timeout) => OpContext::with_timeout(timeout),
            None => OpContext::new(),
        }
    }

    pub fn resource(&self, type_name: &str) -> Option<&dyn DynResource> {
        self.resources.get(type_name).map(|r| r.as_ref())
    }

    pub fn data_source(&self, type_name: &str) -> Option<&dyn DynDataSource> {
        self.data_sources.get(type_name).map(|d| d.as_ref())
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }

    pub fn schemas(&self) -> ProviderSchemas {
        ProviderSchemas {
            provider: Self::provider_schema(),
            resource_schemas: self
                .resources
                .iter()
                .map(|(name, r)| (name.clone(), r.schema()))
                .collect(),
            data_source_schemas: self
                .data_sources
                .iter()
                .map(|(name, d)| (name.clone(), d.schema()))
                .collect(),
        }
    }
}
