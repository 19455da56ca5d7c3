//! Stacks the caller may run builds on

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{rest, ClientFactory, OpContext, RestCall, Result};
use crate::framework::{Attribute, DataSource, Schema};

const STACKS_ID: &str = "available-stacks";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailableStacksModel {
    pub id: Option<String>,
    /// Sorted stack identifiers
    pub stack_keys: Option<Vec<String>>,
}

/// `bitrise_available_stacks`
#[derive(Debug, Clone)]
pub struct AvailableStacksDataSource {
    factory: ClientFactory,
}

impl AvailableStacksDataSource {
    pub fn new(factory: ClientFactory) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl DataSource for AvailableStacksDataSource {
    type Model = AvailableStacksModel;

    fn type_suffix(&self) -> &'static str {
        "available_stacks"
    }

    fn schema(&self) -> Schema {
        Schema::new("Lists the stack identifiers available to the authenticated user.")
            .attribute(Attribute::string("id").computed())
            .attribute(
                Attribute::string_set("stack_keys")
                    .computed()
                    .description("Identifiers of the available stacks"),
            )
    }

    async fn read(&self, ctx: &OpContext, _config: AvailableStacksModel) -> Result<AvailableStacksModel> {
        let client = self.factory.client()?;
        let call = RestCall::get("read available stacks", rest::available_stacks_path());
        let stacks = client
            .get::<Option<BTreeMap<String, Value>>>(ctx, &call)
            .await?
            .unwrap_or_default();

        let stack_keys: Vec<String> = stacks.into_keys().collect();
        tracing::debug!(count = stack_keys.len(), "read available stacks");

        Ok(AvailableStacksModel {
            id: Some(STACKS_ID.to_string()),
            stack_keys: Some(stack_keys),
        })
    }
}
