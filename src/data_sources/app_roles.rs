//! Groups currently bound to an app role

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::{rest, ClientFactory, OpContext, RestCall, Result};
use crate::framework::{Attribute, DataSource, Schema};
use crate::resources::app_roles::RoleGroups;
use crate::resources::text;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppRolesModel {
    pub id: Option<String>,
    pub app_slug: Option<String>,
    pub role_name: Option<String>,
    pub groups: Option<Vec<String>>,
}

/// `bitrise_app_roles`
#[derive(Debug, Clone)]
pub struct AppRolesDataSource {
    factory: ClientFactory,
}

impl AppRolesDataSource {
    pub fn new(factory: ClientFactory) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl DataSource for AppRolesDataSource {
    type Model = AppRolesModel;

    fn type_suffix(&self) -> &'static str {
        "app_roles"
    }

    fn schema(&self) -> Schema {
        Schema::new("Reads the groups assigned to a role of a Bitrise application.")
            .attribute(
                Attribute::string("app_slug")
                    .required()
                    .description("The slug of the Bitrise application"),
            )
            .attribute(
                Attribute::string("role_name")
                    .required()
                    .description("The role type to query"),
            )
            .attribute(Attribute::string("id").computed())
            .attribute(
                Attribute::string_list("groups")
                    .computed()
                    .description("Group slugs assigned to the role"),
            )
    }

    async fn read(&self, ctx: &OpContext, config: AppRolesModel) -> Result<AppRolesModel> {
        let client = self.factory.client()?;
        let app_slug = text(&config.app_slug).to_string();
        let role_name = text(&config.role_name).to_string();

        let call = RestCall::get("read role groups", rest::role_path(&app_slug, &role_name));
        let response: RoleGroups = client.get(ctx, &call).await?;

        Ok(AppRolesModel {
            id: Some(format!("{}/{}", app_slug, role_name)),
            app_slug: Some(app_slug),
            role_name: Some(role_name),
            groups: Some(response.groups),
        })
    }
}
