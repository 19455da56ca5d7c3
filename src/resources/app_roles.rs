//! Role to group assignments on an app
//!
//! The groups list is authoritative: every write replaces all groups bound
//! to the role, and deleting the resource writes an empty list.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{null_as_default, text};
use crate::api::{rest, ClientFactory, OpContext, RestCall, Result};
use crate::framework::{parse_import_id, Attribute, Diagnostic, Diagnostics, Resource, Schema};

/// Roles Bitrise knows about; others are passed through with a warning
pub const KNOWN_ROLES: &[&str] = &["admin", "manager", "member", "platform_engineer"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppRolesState {
    pub id: Option<String>,
    pub app_slug: Option<String>,
    pub role_name: Option<String>,
    pub groups: Option<Vec<String>>,
}

impl AppRolesState {
    fn composite_id(&self) -> String {
        format!("{}/{}", text(&self.app_slug), text(&self.role_name))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RoleGroups {
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<String>,
}

/// `bitrise_app_roles`
#[derive(Debug, Clone)]
pub struct AppRolesResource {
    factory: ClientFactory,
}

impl AppRolesResource {
    pub fn new(factory: ClientFactory) -> Self {
        Self { factory }
    }

    async fn put_groups(&self, ctx: &OpContext, app_slug: &str, role_name: &str, groups: &[String]) -> Result<()> {
        let client = self.factory.client()?;
        let call = RestCall::put("update role groups", rest::role_path(app_slug, role_name))
            .expect(rest::OK_OR_NO_CONTENT);
        let payload = RoleGroups {
            groups: groups.to_vec(),
        };
        client.execute(ctx, &call, &payload).await?;
        tracing::info!(app_slug, role_name, group_count = groups.len(), "replaced role groups");
        Ok(())
    }
}

#[async_trait]
impl Resource for AppRolesResource {
    type State = AppRolesState;

    fn type_suffix(&self) -> &'static str {
        "app_roles"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Manages the groups assigned to a specific role type for a Bitrise application. \
             This resource replaces all groups for the specified role with the provided list.",
        )
        .attribute(
            Attribute::string("app_slug")
                .required()
                .requires_replace()
                .description("The slug of the Bitrise application"),
        )
        .attribute(
            Attribute::string("role_name")
                .required()
                .requires_replace()
                .description(
                    "The role type to manage. Supported values: admin, manager (developer), \
                     member (tester/qa), platform_engineer",
                ),
        )
        .attribute(
            Attribute::string("id")
                .computed()
                .use_state_for_unknown()
                .description("Resource identifier (app_slug/role_name)"),
        )
        .attribute(
            Attribute::string_list("groups")
                .required()
                .description("List of group slugs to assign to this role. This replaces all existing groups."),
        )
    }

    fn validate(&self, config: &AppRolesState) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if let Some(role) = config.role_name.as_deref() {
            if !KNOWN_ROLES.contains(&role) {
                diags.push(
                    Diagnostic::warning(
                        "Unknown role",
                        format!(
                            "role '{}' is not one of {}; the API may reject it",
                            role,
                            KNOWN_ROLES.join(", ")
                        ),
                    )
                    .with_attribute("role_name"),
                );
            }
        }
        diags
    }

    async fn create(&self, ctx: &OpContext, plan: AppRolesState) -> Result<AppRolesState> {
        let groups = plan.groups.clone().unwrap_or_default();
        self.put_groups(ctx, text(&plan.app_slug), text(&plan.role_name), &groups)
            .await?;

        let mut state = plan;
        state.id = Some(state.composite_id());
        state.groups = Some(groups);
        Ok(state)
    }

    async fn read(&self, ctx: &OpContext, state: AppRolesState) -> Result<Option<AppRolesState>> {
        let client = self.factory.client()?;
        let call = RestCall::get(
            "read role groups",
            rest::role_path(text(&state.app_slug), text(&state.role_name)),
        );
        let Some(response) = client.fetch::<RoleGroups>(ctx, &call).await? else {
            return Ok(None);
        };

        let mut state = state;
        state.groups = Some(response.groups);
        state.id = Some(state.composite_id());
        Ok(Some(state))
    }

    async fn update(&self, ctx: &OpContext, _prior: AppRolesState, plan: AppRolesState) -> Result<AppRolesState> {
        let groups = plan.groups.clone().unwrap_or_default();
        self.put_groups(ctx, text(&plan.app_slug), text(&plan.role_name), &groups)
            .await?;

        let mut state = plan;
        state.id = Some(state.composite_id());
        state.groups = Some(groups);
        Ok(state)
    }

    async fn delete(&self, ctx: &OpContext, state: AppRolesState) -> Result<()> {
        match self
            .put_groups(ctx, text(&state.app_slug), text(&state.role_name), &[])
            .await
        {
            Err(err) if err.is_not_found() => {
                tracing::warn!(id = %state.composite_id(), "role already gone");
                Ok(())
            }
            other => other,
        }
    }

    fn import_state(&self, id: &str) -> Result<AppRolesState> {
        let [app_slug, role_name] = parse_import_id::<2>(id, "app_slug/role_name")?;
        Ok(AppRolesState {
            id: Some(id.to_string()),
            app_slug: Some(app_slug),
            role_name: Some(role_name),
            groups: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    fn resource() -> AppRolesResource {
        AppRolesResource::new(ClientFactory::new(ProviderConfig::new("", "")))
    }

    fn config(role: &str) -> AppRolesState {
        AppRolesState {
            app_slug: Some("app-1".to_string()),
            role_name: Some(role.to_string()),
            groups: Some(vec!["g1".to_string()]),
            id: None,
        }
    }

    #[test]
    fn test_known_role_has_no_warning() {
        assert!(resource().validate(&config("platform_engineer")).is_empty());
    }

    #[test]
    fn test_unknown_role_warns_only() {
        let diags = resource().validate(&config("owner"));
        assert_eq!(diags.len(), 1);
        assert!(!diags.has_error());
    }

    #[test]
    fn test_import_splits_composite_id() {
        let state = resource().import_state("app123/admin").unwrap();
        assert_eq!(state.app_slug.as_deref(), Some("app123"));
        assert_eq!(state.role_name.as_deref(), Some("admin"));
        assert_eq!(state.id.as_deref(), Some("app123/admin"));
    }

    #[test]
    fn test_import_rejects_bad_format() {
        let err = resource().import_state("bad-format").unwrap_err();
        assert!(err.to_string().contains("app_slug/role_name"));
    }
}
