//! Bitrise app registration

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{non_empty, null_as_default, text};
use crate::api::{rest, ClientFactory, OpContext, RestCall, Result};
use crate::framework::{parse_import_id, Attribute, Resource, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub id: Option<String>,
    pub app_slug: Option<String>,
    /// Repository provider, e.g. `github`
    pub repo: Option<String>,
    pub is_public: Option<bool>,
    pub organization_slug: Option<String>,
    pub repo_url: Option<String>,
    #[serde(rename = "type")]
    pub repo_type: Option<String>,
    pub git_repo_slug: Option<String>,
    pub git_owner: Option<String>,
}

impl AppState {
    /// Slug used to address the app; falls back to `id` after import
    fn slug(&self) -> &str {
        match self.app_slug.as_deref() {
            Some(slug) if !slug.is_empty() => slug,
            _ => text(&self.id),
        }
    }
}

#[derive(Debug, Serialize)]
struct RegisterAppRequest<'a> {
    provider: &'a str,
    is_public: bool,
    organization_slug: &'a str,
    repo_url: &'a str,
    #[serde(rename = "type")]
    repo_type: &'a str,
    git_repo_slug: &'a str,
    git_owner: &'a str,
}

#[derive(Debug, Deserialize)]
struct RegisterAppResponse {
    #[serde(default)]
    status: String,
    slug: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AppOwner {
    pub slug: Option<String>,
}

/// App as returned by `GET /v0.1/apps/{slug}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AppData {
    pub slug: Option<String>,
    pub repo_url: Option<String>,
    pub is_public: Option<bool>,
    pub repo_slug: Option<String>,
    pub provider: Option<String>,
    pub repo_owner: Option<String>,
    pub owner: Option<AppOwner>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AppEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: AppData,
}

impl AppData {
    /// Overwrite state fields with the non-empty values the API returned
    ///
    /// `owner` never feeds `organization_slug`; that stays as configured.
    fn merge_into(self, state: &mut AppState) {
        if let Some(slug) = non_empty(self.slug) {
            state.app_slug = Some(slug.clone());
            state.id = Some(slug);
        }
        if let Some(url) = non_empty(self.repo_url) {
            state.repo_url = Some(url);
        }
        if let Some(is_public) = self.is_public {
            state.is_public = Some(is_public);
        }
        if let Some(owner) = non_empty(self.repo_owner) {
            state.git_owner = Some(owner);
        }
        if let Some(repo_slug) = non_empty(self.repo_slug) {
            state.git_repo_slug = Some(repo_slug);
        }
        if let Some(provider) = non_empty(self.provider) {
            state.repo = Some(provider);
        }
    }
}

/// `bitrise_app`
#[derive(Debug, Clone)]
pub struct AppResource {
    factory: ClientFactory,
}

impl AppResource {
    pub fn new(factory: ClientFactory) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl Resource for AppResource {
    type State = AppState;

    fn type_suffix(&self) -> &'static str {
        "app"
    }

    fn schema(&self) -> Schema {
        Schema::new("Registers a repository as a Bitrise app.")
            .attribute(
                Attribute::string("id")
                    .computed()
                    .use_state_for_unknown()
                    .description("App slug"),
            )
            .attribute(
                Attribute::string("app_slug")
                    .computed()
                    .use_state_for_unknown()
                    .description("Slug assigned by Bitrise"),
            )
            .attribute(
                Attribute::string("repo")
                    .required()
                    .requires_replace()
                    .description("Repository provider, e.g. github"),
            )
            .attribute(
                Attribute::bool("is_public")
                    .default_value(json!(false))
                    .description("Whether the app's builds are public"),
            )
            .attribute(
                Attribute::string("organization_slug")
                    .required()
                    .requires_replace()
                    .description("Owning organization"),
            )
            .attribute(Attribute::string("repo_url").required().description("Repository URL"))
            .attribute(
                Attribute::string("type")
                    .required()
                    .requires_replace()
                    .description("Repository type, e.g. git"),
            )
            .attribute(Attribute::string("git_repo_slug").required().requires_replace())
            .attribute(Attribute::string("git_owner").required().requires_replace())
    }

    async fn create(&self, ctx: &OpContext, plan: AppState) -> Result<AppState> {
        let client = self.factory.client()?;
        let is_public = plan.is_public.unwrap_or(false);
        let payload = RegisterAppRequest {
            provider: text(&plan.repo),
            is_public,
            organization_slug: text(&plan.organization_slug),
            repo_url: text(&plan.repo_url),
            repo_type: text(&plan.repo_type),
            git_repo_slug: text(&plan.git_repo_slug),
            git_owner: text(&plan.git_owner),
        };

        let call = RestCall::post("register app", rest::register_app_path()).expect(rest::OK_OR_CREATED);
        let response: RegisterAppResponse = client.call(ctx, &call, &payload).await?;
        tracing::info!(app_slug = %response.slug, status = %response.status, "registered app");

        let mut state = plan;
        state.id = Some(response.slug.clone());
        state.app_slug = Some(response.slug);
        state.is_public = Some(is_public);
        Ok(state)
    }

    async fn read(&self, ctx: &OpContext, state: AppState) -> Result<Option<AppState>> {
        let client = self.factory.client()?;
        let call = RestCall::get("read app", rest::app_path(state.slug()));
        let Some(envelope) = client.fetch::<AppEnvelope>(ctx, &call).await? else {
            return Ok(None);
        };

        let mut state = state;
        envelope.data.merge_into(&mut state);
        Ok(Some(state))
    }

    async fn update(&self, ctx: &OpContext, prior: AppState, plan: AppState) -> Result<AppState> {
        let client = self.factory.client()?;

        let mut state = plan;
        state.id = state.id.or(prior.id);
        state.app_slug = state.app_slug.or(prior.app_slug);

        let is_public = state.is_public.unwrap_or(false);
        let mut payload = json!({ "is_public": is_public });
        if let Some(url) = state.repo_url.as_deref().filter(|u| !u.is_empty()) {
            payload["repository_url"] = json!(url);
        }

        let call = RestCall::patch("update app", rest::app_path(state.slug()));
        client.execute(ctx, &call, &payload).await?;
        tracing::info!(app_slug = state.slug(), "updated app");

        state.is_public = Some(is_public);
        Ok(state)
    }

    async fn delete(&self, ctx: &OpContext, state: AppState) -> Result<()> {
        let client = self.factory.client()?;
        let call = RestCall::delete("delete app", rest::app_path(state.slug())).expect(rest::OK_OR_NO_CONTENT);
        match client.send(ctx, &call, None).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() => {
                tracing::warn!(app_slug = state.slug(), "app already gone");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn import_state(&self, id: &str) -> Result<AppState> {
        let [slug] = parse_import_id::<1>(id, "app_slug")?;
        Ok(AppState {
            id: Some(slug.clone()),
            app_slug: Some(slug),
            ..AppState::default()
        })
    }
}
