//! The app's bitrise.yml workflow configuration
//!
//! With `update_on_create_only` set the content is written once and later
//! edits are ignored: the plan hook keeps the prior content and update makes
//! no request at all.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::text;
use crate::api::{rest, ApiResponse, ClientFactory, OpContext, RestCall, Result};
use crate::framework::{parse_import_id, Attribute, Diagnostic, Diagnostics, Resource, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppBitriseYmlState {
    pub id: Option<String>,
    pub app_slug: Option<String>,
    pub yml_content: Option<String>,
    pub update_on_create_only: Option<bool>,
}

impl AppBitriseYmlState {
    fn frozen(&self) -> bool {
        self.update_on_create_only.unwrap_or(false)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BitriseYmlDocument {
    app_config_datastore_yaml: String,
}

/// Extract the YAML text from a read response
///
/// The endpoint answers either with `{"app_config_datastore_yaml": ...}` or
/// with the raw YAML. A body that looks like JSON but fails to decode is
/// taken as raw YAML.
fn yml_from_response(response: &ApiResponse) -> String {
    if response.is_json() || response.body.starts_with('{') {
        match serde_json::from_str::<BitriseYmlDocument>(&response.body) {
            Ok(document) => return document.app_config_datastore_yaml,
            Err(e) => tracing::debug!(error = %e, "bitrise.yml body is not JSON, using it as plain text"),
        }
    }
    response.body.clone()
}

/// `bitrise_app_bitrise_yml`
#[derive(Debug, Clone)]
pub struct AppBitriseYmlResource {
    factory: ClientFactory,
}

impl AppBitriseYmlResource {
    pub fn new(factory: ClientFactory) -> Self {
        Self { factory }
    }

    async fn upload(&self, ctx: &OpContext, state: &AppBitriseYmlState, operation: &str) -> Result<()> {
        let client = self.factory.client()?;
        let payload = BitriseYmlDocument {
            app_config_datastore_yaml: text(&state.yml_content).to_string(),
        };
        let call = RestCall::post(operation, rest::bitrise_yml_path(text(&state.app_slug)))
            .expect(rest::OK_OR_CREATED);
        client.execute(ctx, &call, &payload).await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for AppBitriseYmlResource {
    type State = AppBitriseYmlState;

    fn type_suffix(&self) -> &'static str {
        "app_bitrise_yml"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Manages the bitrise.yml configuration file for a Bitrise application. \
             This resource allows you to create and update the workflow configuration.",
        )
        .attribute(
            Attribute::string("app_slug")
                .required()
                .requires_replace()
                .description("The slug of the Bitrise app"),
        )
        .attribute(
            Attribute::string("yml_content")
                .required()
                .description("The content of the bitrise.yml file"),
        )
        .attribute(
            Attribute::bool("update_on_create_only")
                .optional()
                .description("If true, the bitrise.yml is only uploaded on create and later changes are ignored"),
        )
        .attribute(Attribute::string("id").computed().use_state_for_unknown())
    }

    fn validate(&self, config: &AppBitriseYmlState) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if let Some(content) = config.yml_content.as_deref() {
            if let Err(e) = serde_yaml::from_str::<serde_yaml::Value>(content) {
                diags.push(
                    Diagnostic::error("Invalid YAML", format!("yml_content is not valid YAML: {}", e))
                        .with_attribute("yml_content"),
                );
            }
        }
        diags
    }

    fn modify_plan(&self, prior: Option<&AppBitriseYmlState>, planned: AppBitriseYmlState) -> AppBitriseYmlState {
        let Some(prior) = prior else {
            return planned;
        };
        if !planned.frozen() {
            return planned;
        }

        AppBitriseYmlState {
            yml_content: prior.yml_content.clone(),
            ..planned
        }
    }

    async fn create(&self, ctx: &OpContext, plan: AppBitriseYmlState) -> Result<AppBitriseYmlState> {
        self.upload(ctx, &plan, "upload bitrise.yml").await?;
        tracing::info!(app_slug = text(&plan.app_slug), "uploaded bitrise.yml");

        let mut state = plan;
        state.id = state.app_slug.clone();
        Ok(state)
    }

    async fn read(&self, ctx: &OpContext, state: AppBitriseYmlState) -> Result<Option<AppBitriseYmlState>> {
        let client = self.factory.client()?;
        let call = RestCall::get("read bitrise.yml", rest::bitrise_yml_path(text(&state.app_slug)));
        let Some(response) = client.fetch_response(ctx, &call).await? else {
            return Ok(None);
        };

        let mut state = state;
        state.yml_content = Some(yml_from_response(&response));
        state.id = state.app_slug.clone();
        Ok(Some(state))
    }

    async fn update(
        &self,
        ctx: &OpContext,
        prior: AppBitriseYmlState,
        plan: AppBitriseYmlState,
    ) -> Result<AppBitriseYmlState> {
        // Frozen: the plan is the new state, as is
        if plan.frozen() {
            tracing::info!(
                app_slug = text(&plan.app_slug),
                "skipping bitrise.yml update (update_on_create_only is true)"
            );
            return Ok(plan);
        }

        let mut state = plan;
        let id = state.id.take().or(prior.id).or_else(|| state.app_slug.clone());
        state.id = id;

        self.upload(ctx, &state, "update bitrise.yml").await?;
        tracing::info!(app_slug = text(&state.app_slug), "updated bitrise.yml");
        Ok(state)
    }

    async fn delete(&self, _ctx: &OpContext, state: AppBitriseYmlState) -> Result<()> {
        tracing::debug!(app_slug = text(&state.app_slug), "bitrise.yml removed from state only");
        Ok(())
    }

    fn import_state(&self, id: &str) -> Result<AppBitriseYmlState> {
        let [slug] = parse_import_id::<1>(id, "app_slug")?;
        Ok(AppBitriseYmlState {
            id: Some(slug.clone()),
            app_slug: Some(slug),
            ..AppBitriseYmlState::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use reqwest::StatusCode;

    fn resource() -> AppBitriseYmlResource {
        AppBitriseYmlResource::new(ClientFactory::new(ProviderConfig::new("", "")))
    }

    fn response(content_type: Option<&str>, body: &str) -> ApiResponse {
        ApiResponse {
            status: StatusCode::OK,
            content_type: content_type.map(str::to_string),
            body: body.to_string(),
        }
    }

    fn state(content: &str, frozen: Option<bool>) -> AppBitriseYmlState {
        AppBitriseYmlState {
            id: Some("app-1".to_string()),
            app_slug: Some("app-1".to_string()),
            yml_content: Some(content.to_string()),
            update_on_create_only: frozen,
        }
    }

    #[test]
    fn test_json_body_is_unwrapped() {
        let body = r#"{"app_config_datastore_yaml":"format_version: 11\n"}"#;
        assert_eq!(
            yml_from_response(&response(Some("application/json"), body)),
            "format_version: 11\n"
        );
    }

    #[test]
    fn test_plain_text_body_is_kept() {
        let body = "format_version: 11\nworkflows: {}\n";
        assert_eq!(yml_from_response(&response(Some("text/plain"), body)), body);
    }

    #[test]
    fn test_broken_json_falls_back_to_text() {
        let body = "{not json";
        assert_eq!(yml_from_response(&response(None, body)), body);
    }

    #[test]
    fn test_validate_rejects_bad_yaml() {
        let diags = resource().validate(&state("key: [unclosed", None));
        assert!(diags.has_error());
        assert_eq!(
            diags.iter().next().and_then(|d| d.attribute.as_deref()),
            Some("yml_content")
        );
    }

    #[test]
    fn test_validate_accepts_good_yaml() {
        assert!(resource().validate(&state("format_version: 11\n", None)).is_empty());
    }

    #[test]
    fn test_frozen_plan_keeps_prior_content() {
        let prior = state("old: 1\n", Some(true));
        let planned = resource().modify_plan(Some(&prior), state("new: 2\n", Some(true)));
        assert_eq!(planned.yml_content.as_deref(), Some("old: 1\n"));
    }

    #[test]
    fn test_unfrozen_plan_takes_new_content() {
        let prior = state("old: 1\n", Some(false));
        let planned = resource().modify_plan(Some(&prior), state("new: 2\n", None));
        assert_eq!(planned.yml_content.as_deref(), Some("new: 2\n"));
    }

    #[test]
    fn test_create_plan_is_untouched() {
        let planned = resource().modify_plan(None, state("new: 2\n", Some(true)));
        assert_eq!(planned.yml_content.as_deref(), Some("new: 2\n"));
    }
}
