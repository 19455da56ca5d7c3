//! Groups of an organization

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::{rest, ClientFactory, OpContext, RestCall, Result};
use crate::framework::{Attribute, DataSource, Schema};
use crate::resources::{null_as_default, text};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgGroupsModel {
    pub id: Option<String>,
    pub org_slug: Option<String>,
    pub groups: Option<Vec<Group>>,
}

/// `bitrise_org_groups`
#[derive(Debug, Clone)]
pub struct OrgGroupsDataSource {
    factory: ClientFactory,
}

impl OrgGroupsDataSource {
    pub fn new(factory: ClientFactory) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl DataSource for OrgGroupsDataSource {
    type Model = OrgGroupsModel;

    fn type_suffix(&self) -> &'static str {
        "org_groups"
    }

    fn schema(&self) -> Schema {
        Schema::new("Lists the groups of a Bitrise organization.")
            .attribute(
                Attribute::string("org_slug")
                    .required()
                    .description("The slug of the organization"),
            )
            .attribute(Attribute::string("id").computed())
            .attribute(
                Attribute::object_list("groups", &["slug", "name"])
                    .computed()
                    .description("List of groups in the organization"),
            )
    }

    async fn read(&self, ctx: &OpContext, config: OrgGroupsModel) -> Result<OrgGroupsModel> {
        let org_slug = text(&config.org_slug).to_string();
        let client = self.factory.client()?;
        let call = RestCall::get("read organization groups", rest::org_groups_path(&org_slug));
        let groups = client.get::<Option<Vec<Group>>>(ctx, &call).await?.unwrap_or_default();
        tracing::debug!(org_slug = %org_slug, count = groups.len(), "read organization groups");

        Ok(OrgGroupsModel {
            id: Some(org_slug.clone()),
            org_slug: Some(org_slug),
            groups: Some(groups),
        })
    }
}
