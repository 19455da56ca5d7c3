//! App secrets
//!
//! Secrets are environment variables stored encrypted by Bitrise and exposed
//! to builds. Protected secrets never return their value, so refresh keeps
//! the locally known value in that case.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{non_empty, text};
use crate::api::{rest, ClientFactory, OpContext, RestCall, Result};
use crate::framework::{parse_import_id, Attribute, Resource, Schema};

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSecretState {
    pub id: Option<String>,
    pub app_slug: Option<String>,
    pub name: Option<String>,
    pub value: Option<String>,
    pub is_protected: Option<bool>,
    pub is_exposed_for_pull_requests: Option<bool>,
    pub expand_in_step_inputs: Option<bool>,
}

impl std::fmt::Debug for AppSecretState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSecretState")
            .field("id", &self.id)
            .field("app_slug", &self.app_slug)
            .field("name", &self.name)
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .field("is_protected", &self.is_protected)
            .field("is_exposed_for_pull_requests", &self.is_exposed_for_pull_requests)
            .field("expand_in_step_inputs", &self.expand_in_step_inputs)
            .finish()
    }
}

impl AppSecretState {
    fn composite_id(&self) -> String {
        format!("{}/{}", text(&self.app_slug), text(&self.name))
    }

    fn flags(&self) -> SecretFlags {
        SecretFlags {
            is_protected: self.is_protected.unwrap_or(false),
            is_exposed_for_pull_requests: self.is_exposed_for_pull_requests.unwrap_or(false),
            expand_in_step_inputs: self.expand_in_step_inputs.unwrap_or(true),
        }
    }

    fn apply_flags(&mut self, flags: SecretFlags) {
        self.is_protected = Some(flags.is_protected);
        self.is_exposed_for_pull_requests = Some(flags.is_exposed_for_pull_requests);
        self.expand_in_step_inputs = Some(flags.expand_in_step_inputs);
    }
}

/// Secret options; always sent explicitly so `false` reaches the API
#[derive(Debug, Clone, Copy, Serialize)]
struct SecretFlags {
    is_protected: bool,
    is_exposed_for_pull_requests: bool,
    expand_in_step_inputs: bool,
}

#[derive(Serialize)]
struct CreateSecretRequest<'a> {
    name: &'a str,
    value: &'a str,
    #[serde(flatten)]
    flags: SecretFlags,
}

#[derive(Serialize)]
struct UpdateSecretRequest<'a> {
    value: &'a str,
    #[serde(flatten)]
    flags: SecretFlags,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SecretResponse {
    value: Option<String>,
    is_protected: Option<bool>,
    is_exposed_for_pull_requests: Option<bool>,
    expand_in_step_inputs: Option<bool>,
}

impl SecretResponse {
    fn merge_into(self, state: &mut AppSecretState) {
        let protected = self.is_protected.unwrap_or(false);
        if let Some(is_protected) = self.is_protected {
            state.is_protected = Some(is_protected);
        }
        if let Some(exposed) = self.is_exposed_for_pull_requests {
            state.is_exposed_for_pull_requests = Some(exposed);
        }
        if let Some(expand) = self.expand_in_step_inputs {
            state.expand_in_step_inputs = Some(expand);
        }
        if !protected {
            if let Some(value) = non_empty(self.value) {
                state.value = Some(value);
            }
        }
    }
}

/// `bitrise_app_secret`
#[derive(Debug, Clone)]
pub struct AppSecretResource {
    factory: ClientFactory,
}

impl AppSecretResource {
    pub fn new(factory: ClientFactory) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl Resource for AppSecretResource {
    type State = AppSecretState;

    fn type_suffix(&self) -> &'static str {
        "app_secret"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Manages secrets for a Bitrise application. Secrets are environment variables \
             that are securely stored and can be used in your build workflows.",
        )
        .attribute(
            Attribute::string("app_slug")
                .required()
                .requires_replace()
                .description("The slug of the Bitrise app"),
        )
        .attribute(
            Attribute::string("name")
                .required()
                .requires_replace()
                .description("The name (key) of the secret"),
        )
        .attribute(
            Attribute::string("value")
                .required()
                .sensitive()
                .description("The value of the secret"),
        )
        .attribute(
            Attribute::bool("is_protected")
                .default_value(json!(false))
                .description("If true, the secret value cannot be retrieved via the API. Default: false"),
        )
        .attribute(
            Attribute::bool("is_exposed_for_pull_requests")
                .default_value(json!(false))
                .description("If true, the secret will be available for pull request builds. Default: false"),
        )
        .attribute(
            Attribute::bool("expand_in_step_inputs")
                .default_value(json!(true))
                .description(
                    "If true, variable expansion will be enabled for this secret in step inputs. Default: true",
                ),
        )
        .attribute(
            Attribute::string("id")
                .computed()
                .use_state_for_unknown()
                .description("The unique identifier of the secret"),
        )
    }

    async fn create(&self, ctx: &OpContext, plan: AppSecretState) -> Result<AppSecretState> {
        let client = self.factory.client()?;
        let flags = plan.flags();
        let payload = CreateSecretRequest {
            name: text(&plan.name),
            value: text(&plan.value),
            flags,
        };

        let call = RestCall::post("create secret", rest::secrets_path(text(&plan.app_slug)))
            .expect(rest::CREATED_OR_OK)
            .sensitive();
        client.execute(ctx, &call, &payload).await?;
        tracing::info!(app_slug = text(&plan.app_slug), name = text(&plan.name), "created secret");

        let mut state = plan;
        state.apply_flags(flags);
        state.id = Some(state.composite_id());
        Ok(state)
    }

    async fn read(&self, ctx: &OpContext, state: AppSecretState) -> Result<Option<AppSecretState>> {
        let client = self.factory.client()?;
        let call = RestCall::get(
            "read secret",
            rest::secret_path(text(&state.app_slug), text(&state.name)),
        )
        .sensitive();
        let Some(response) = client.fetch::<SecretResponse>(ctx, &call).await? else {
            return Ok(None);
        };

        let mut state = state;
        response.merge_into(&mut state);
        state.id = Some(state.composite_id());
        Ok(Some(state))
    }

    async fn update(&self, ctx: &OpContext, _prior: AppSecretState, plan: AppSecretState) -> Result<AppSecretState> {
        let client = self.factory.client()?;
        let flags = plan.flags();
        let payload = UpdateSecretRequest {
            value: text(&plan.value),
            flags,
        };

        let call = RestCall::patch(
            "update secret",
            rest::secret_path(text(&plan.app_slug), text(&plan.name)),
        )
        .sensitive();
        client.execute(ctx, &call, &payload).await?;
        tracing::info!(app_slug = text(&plan.app_slug), name = text(&plan.name), "updated secret");

        let mut state = plan;
        state.apply_flags(flags);
        state.id = Some(state.composite_id());
        Ok(state)
    }

    async fn delete(&self, ctx: &OpContext, state: AppSecretState) -> Result<()> {
        let client = self.factory.client()?;
        let call = RestCall::delete(
            "delete secret",
            rest::secret_path(text(&state.app_slug), text(&state.name)),
        )
        .expect(rest::NO_CONTENT_OR_OK);

        match client.send(ctx, &call, None).await {
            Ok(_) => {
                tracing::info!(id = %state.composite_id(), "deleted secret");
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                tracing::info!(id = %state.composite_id(), "secret already deleted");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn import_state(&self, id: &str) -> Result<AppSecretState> {
        let [app_slug, name] = parse_import_id::<2>(id, "app_slug/secret_name")?;
        Ok(AppSecretState {
            id: Some(id.to_string()),
            app_slug: Some(app_slug),
            name: Some(name),
            ..AppSecretState::default()
        })
    }
}
