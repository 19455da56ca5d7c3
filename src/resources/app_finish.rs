//! Completes an app's initial setup (stack, project type, config)

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{app_exists, text};
use crate::api::{rest, ClientFactory, OpContext, RestCall, Result};
use crate::framework::{parse_import_id, Attribute, Resource, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppFinishState {
    pub id: Option<String>,
    pub app_slug: Option<String>,
    pub project_type: Option<String>,
    pub stack_id: Option<String>,
    pub config: Option<String>,
    pub mode: Option<String>,
    pub envs: Option<BTreeMap<String, String>>,
    pub organization_slug: Option<String>,
}

#[derive(Debug, Serialize)]
struct FinishRequest<'a> {
    project_type: &'a str,
    stack_id: &'a str,
    config: &'a str,
    mode: &'a str,
    envs: &'a BTreeMap<String, String>,
    organization_slug: &'a str,
}

impl<'a> FinishRequest<'a> {
    fn from_state(state: &'a AppFinishState, no_envs: &'a BTreeMap<String, String>) -> Self {
        Self {
            project_type: text(&state.project_type),
            stack_id: text(&state.stack_id),
            config: text(&state.config),
            mode: text(&state.mode),
            envs: state.envs.as_ref().unwrap_or(no_envs),
            organization_slug: text(&state.organization_slug),
        }
    }
}

/// `bitrise_app_finish`
#[derive(Debug, Clone)]
pub struct AppFinishResource {
    factory: ClientFactory,
}

impl AppFinishResource {
    pub fn new(factory: ClientFactory) -> Self {
        Self { factory }
    }

    async fn post_finish(&self, ctx: &OpContext, state: &AppFinishState, operation: &str) -> Result<()> {
        let client = self.factory.client()?;
        let no_envs = BTreeMap::new();
        let payload = FinishRequest::from_state(state, &no_envs);
        let call = RestCall::post(operation, rest::finish_path(text(&state.app_slug))).expect(rest::OK_OR_CREATED);
        client.execute(ctx, &call, &payload).await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for AppFinishResource {
    type State = AppFinishState;

    fn type_suffix(&self) -> &'static str {
        "app_finish"
    }

    fn schema(&self) -> Schema {
        Schema::new("Finishes the setup of a registered Bitrise app.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(
                Attribute::string("app_slug")
                    .required()
                    .requires_replace()
                    .description("App Slug"),
            )
            .attribute(
                Attribute::string("project_type")
                    .required()
                    .description("The type of the project"),
            )
            .attribute(
                Attribute::string("stack_id")
                    .required()
                    .description("The ID of the stack on which the build will run"),
            )
            .attribute(
                Attribute::string("config")
                    .required()
                    .description("The configuration for the app"),
            )
            .attribute(
                Attribute::string("mode")
                    .required()
                    .description("The mode of the app (e.g., manual)"),
            )
            .attribute(Attribute::string_map("envs").optional().description("Envs"))
            .attribute(
                Attribute::string("organization_slug")
                    .required()
                    .description("The slug of the organization that owns the app"),
            )
    }

    async fn create(&self, ctx: &OpContext, plan: AppFinishState) -> Result<AppFinishState> {
        self.post_finish(ctx, &plan, "finish app setup").await?;
        tracing::info!(app_slug = text(&plan.app_slug), "finished app setup");

        let mut state = plan;
        state.id = state.app_slug.clone();
        Ok(state)
    }

    async fn read(&self, ctx: &OpContext, state: AppFinishState) -> Result<Option<AppFinishState>> {
        let client = self.factory.client()?;
        if app_exists(&client, ctx, text(&state.app_slug)).await? {
            Ok(Some(state))
        } else {
            Ok(None)
        }
    }

    async fn update(&self, ctx: &OpContext, prior: AppFinishState, plan: AppFinishState) -> Result<AppFinishState> {
        self.post_finish(ctx, &plan, "update app setup").await?;
        tracing::info!(app_slug = text(&plan.app_slug), "re-applied app setup");

        let mut state = plan;
        let id = state.id.take().or(prior.id).or_else(|| state.app_slug.clone());
        state.id = id;
        Ok(state)
    }

    async fn delete(&self, _ctx: &OpContext, state: AppFinishState) -> Result<()> {
        tracing::debug!(app_slug = text(&state.app_slug), "app setup removed from state only");
        Ok(())
    }

    fn import_state(&self, id: &str) -> Result<AppFinishState> {
        let [slug] = parse_import_id::<1>(id, "app_slug")?;
        Ok(AppFinishState {
            id: Some(slug.clone()),
            app_slug: Some(slug),
            ..AppFinishState::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_sends_empty_envs_when_unset() {
        let state = AppFinishState {
            app_slug: Some("app-1".to_string()),
            project_type: Some("android".to_string()),
            stack_id: Some("linux-docker-android-22.04".to_string()),
            config: Some("default-android-config".to_string()),
            mode: Some("manual".to_string()),
            organization_slug: Some("org-1".to_string()),
            ..AppFinishState::default()
        };
        let no_envs = BTreeMap::new();
        let value = serde_json::to_value(FinishRequest::from_state(&state, &no_envs)).unwrap();

        assert_eq!(value["project_type"], "android");
        assert_eq!(value["envs"], serde_json::json!({}));
        assert!(value.get("app_slug").is_none());
    }

    #[test]
    fn test_import_rejects_composite_id() {
        let resource = AppFinishResource::new(ClientFactory::new(crate::config::ProviderConfig::new("", "")));
        assert!(resource.import_state("app-1/extra").is_err());
    }
}
