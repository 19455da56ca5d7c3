//! Look up a registered app

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::{rest, ClientFactory, OpContext, RestCall, Result};
use crate::framework::{Attribute, DataSource, Schema};
use crate::resources::app::AppEnvelope;
use crate::resources::{non_empty, text};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppModel {
    pub id: Option<String>,
    pub app_slug: Option<String>,
    pub repo_url: Option<String>,
    pub is_public: Option<bool>,
    pub repo: Option<String>,
    pub git_owner: Option<String>,
    pub git_repo_slug: Option<String>,
    pub organization_slug: Option<String>,
}

/// `bitrise_app`
#[derive(Debug, Clone)]
pub struct AppDataSource {
    factory: ClientFactory,
}

impl AppDataSource {
    pub fn new(factory: ClientFactory) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl DataSource for AppDataSource {
    type Model = AppModel;

    fn type_suffix(&self) -> &'static str {
        "app"
    }

    fn schema(&self) -> Schema {
        Schema::new("Reads a Bitrise app by slug.")
            .attribute(Attribute::string("app_slug").required().description("App slug"))
            .attribute(Attribute::string("id").computed().description("App identifier"))
            .attribute(Attribute::string("repo_url").computed())
            .attribute(Attribute::bool("is_public").computed())
            .attribute(Attribute::string("repo").computed().description("Repository provider"))
            .attribute(Attribute::string("git_owner").computed())
            .attribute(Attribute::string("git_repo_slug").computed())
            .attribute(Attribute::string("organization_slug").computed())
    }

    async fn read(&self, ctx: &OpContext, config: AppModel) -> Result<AppModel> {
        let client = self.factory.client()?;
        let app_slug = text(&config.app_slug).to_string();
        let call = RestCall::get("read app", rest::app_path(&app_slug));
        let data = client.get::<AppEnvelope>(ctx, &call).await?.data;

        Ok(AppModel {
            id: Some(app_slug.clone()),
            app_slug: Some(app_slug),
            repo_url: non_empty(data.repo_url),
            is_public: data.is_public,
            repo: non_empty(data.provider),
            git_owner: non_empty(data.repo_owner),
            git_repo_slug: non_empty(data.repo_slug),
            organization_slug: data.owner.and_then(|o| non_empty(o.slug)),
        })
    }
}
