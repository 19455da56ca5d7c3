//! SSH key registration for an app
//!
//! Bitrise has no endpoint to read a registered key back, so refresh only
//! checks that the owning app still exists, and every attribute forces
//! replacement. Deleting removes the resource from state only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{app_exists, text};
use crate::api::{rest, ClientFactory, OpContext, RestCall, Result};
use crate::framework::{parse_import_id, Attribute, Resource, Schema};

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSshState {
    pub id: Option<String>,
    pub app_slug: Option<String>,
    pub auth_ssh_private_key: Option<String>,
    pub auth_ssh_public_key: Option<String>,
    pub is_register_key_into_provider_service: Option<bool>,
}

impl std::fmt::Debug for AppSshState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSshState")
            .field("id", &self.id)
            .field("app_slug", &self.app_slug)
            .field("auth_ssh_private_key", &self.auth_ssh_private_key.as_ref().map(|_| "<redacted>"))
            .field("auth_ssh_public_key", &self.auth_ssh_public_key)
            .field(
                "is_register_key_into_provider_service",
                &self.is_register_key_into_provider_service,
            )
            .finish()
    }
}

#[derive(Serialize)]
struct RegisterSshKeyRequest<'a> {
    auth_ssh_private_key: &'a str,
    auth_ssh_public_key: &'a str,
    is_register_key_into_provider_service: bool,
}

/// `bitrise_app_ssh`
#[derive(Debug, Clone)]
pub struct AppSshResource {
    factory: ClientFactory,
}

impl AppSshResource {
    pub fn new(factory: ClientFactory) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl Resource for AppSshResource {
    type State = AppSshState;

    fn type_suffix(&self) -> &'static str {
        "app_ssh"
    }

    fn schema(&self) -> Schema {
        Schema::new("Registers an SSH key pair on a Bitrise app.")
            .attribute(Attribute::string("id").computed().use_state_for_unknown())
            .attribute(
                Attribute::string("app_slug")
                    .required()
                    .requires_replace()
                    .description("App Slug"),
            )
            .attribute(
                Attribute::string("auth_ssh_private_key")
                    .required()
                    .sensitive()
                    .requires_replace()
                    .description("Private SSH key for authentication"),
            )
            .attribute(
                Attribute::string("auth_ssh_public_key")
                    .required()
                    .requires_replace()
                    .description("Public SSH key for authentication"),
            )
            .attribute(
                Attribute::bool("is_register_key_into_provider_service")
                    .default_value(json!(false))
                    .requires_replace()
                    .description("Whether to register the public key into the provider service"),
            )
    }

    async fn create(&self, ctx: &OpContext, plan: AppSshState) -> Result<AppSshState> {
        let client = self.factory.client()?;
        let register = plan.is_register_key_into_provider_service.unwrap_or(false);
        let payload = RegisterSshKeyRequest {
            auth_ssh_private_key: text(&plan.auth_ssh_private_key),
            auth_ssh_public_key: text(&plan.auth_ssh_public_key),
            is_register_key_into_provider_service: register,
        };

        let call = RestCall::post("register SSH key", rest::register_ssh_key_path(text(&plan.app_slug)))
            .expect(rest::OK_OR_CREATED)
            .sensitive();
        client.execute(ctx, &call, &payload).await?;
        tracing::info!(app_slug = text(&plan.app_slug), "registered SSH key");

        let mut state = plan;
        state.id = state.app_slug.clone();
        state.is_register_key_into_provider_service = Some(register);
        Ok(state)
    }

    async fn read(&self, ctx: &OpContext, state: AppSshState) -> Result<Option<AppSshState>> {
        let client = self.factory.client()?;
        if app_exists(&client, ctx, text(&state.app_slug)).await? {
            Ok(Some(state))
        } else {
            Ok(None)
        }
    }

    async fn update(&self, _ctx: &OpContext, prior: AppSshState, plan: AppSshState) -> Result<AppSshState> {
        let mut state = plan;
        state.id = state.id.or(prior.id);
        Ok(state)
    }

    async fn delete(&self, _ctx: &OpContext, state: AppSshState) -> Result<()> {
        tracing::debug!(app_slug = text(&state.app_slug), "SSH key removed from state only");
        Ok(())
    }

    fn import_state(&self, id: &str) -> Result<AppSshState> {
        let [slug] = parse_import_id::<1>(id, "app_slug")?;
        Ok(AppSshState {
            id: Some(slug.clone()),
            app_slug: Some(slug),
            ..AppSshState::default()
        })
    }
}
