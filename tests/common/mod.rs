//! Shared helpers for integration tests

#![allow(dead_code)]

use std::time::Duration;

use terraform_provider_bitrise::api::{ClientFactory, OpContext};
use terraform_provider_bitrise::config::ProviderConfig;
use terraform_provider_bitrise::BitriseProvider;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

/// Provider whose endpoint points at the mock server
pub fn provider_for(server: &MockServer) -> BitriseProvider {
    BitriseProvider::with_factory(factory_for(server))
}

pub fn factory_for(server: &MockServer) -> ClientFactory {
    ClientFactory::new(ProviderConfig::new(&server.uri(), TOKEN)).with_timeout(Some(Duration::from_secs(5)))
}

pub fn ctx() -> OpContext {
    OpContext::with_timeout(Duration::from_secs(5))
}
