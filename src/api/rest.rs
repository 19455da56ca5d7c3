//! REST call descriptors and Bitrise API paths
//!
//! A [`RestCall`] names one endpoint: what the operation is called in
//! diagnostics, the verb, the path and the set of status codes that count as
//! success. Calls whose bodies carry secret material are marked
//! [`sensitive`](RestCall::sensitive) and never have a body logged. Resources build these and hand them to
//! [`BitriseClient`](super::client::BitriseClient).

use reqwest::{Method, StatusCode};

pub const OK: &[StatusCode] = &[StatusCode::OK];
pub const OK_OR_CREATED: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];
pub const CREATED_OR_OK: &[StatusCode] = &[StatusCode::CREATED, StatusCode::OK];
pub const OK_OR_NO_CONTENT: &[StatusCode] = &[StatusCode::OK, StatusCode::NO_CONTENT];
pub const NO_CONTENT_OR_OK: &[StatusCode] = &[StatusCode::NO_CONTENT, StatusCode::OK];

/// One endpoint invocation
#[derive(Debug, Clone)]
pub struct RestCall {
    operation: String,
    method: Method,
    path: String,
    success: &'static [StatusCode],
    sensitive: bool,
}

impl RestCall {
    pub fn new(operation: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            method,
            path: path.into(),
            success: OK,
            sensitive: false,
        }
    }

    pub fn get(operation: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(operation, Method::GET, path)
    }

    pub fn post(operation: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(operation, Method::POST, path)
    }

    pub fn put(operation: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(operation, Method::PUT, path)
    }

    pub fn patch(operation: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(operation, Method::PATCH, path)
    }

    pub fn delete(operation: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(operation, Method::DELETE, path)
    }

    /// Replace the accepted status codes (default: 200 only)
    pub fn expect(mut self, success: &'static [StatusCode]) -> Self {
        self.success = success;
        self
    }

    /// Request or response bodies hold secret values
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn accepts(&self, status: StatusCode) -> bool {
        self.success.contains(&status)
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

// =========================================================================
// Bitrise API v0.1 paths
// =========================================================================

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

pub fn register_app_path() -> String {
    "/v0.1/apps/register".to_string()
}

pub fn app_path(app_slug: &str) -> String {
    format!("/v0.1/apps/{}", segment(app_slug))
}

pub fn register_ssh_key_path(app_slug: &str) -> String {
    format!("{}/register-ssh-key", app_path(app_slug))
}

pub fn finish_path(app_slug: &str) -> String {
    format!("{}/finish", app_path(app_slug))
}

pub fn bitrise_yml_path(app_slug: &str) -> String {
    format!("{}/bitrise.yml", app_path(app_slug))
}

pub fn role_path(app_slug: &str, role_name: &str) -> String {
    format!("{}/roles/{}", app_path(app_slug), segment(role_name))
}

pub fn secrets_path(app_slug: &str) -> String {
    format!("{}/secrets", app_path(app_slug))
}

pub fn secret_path(app_slug: &str, name: &str) -> String {
    format!("{}/{}", secrets_path(app_slug), segment(name))
}

pub fn available_stacks_path() -> String {
    "/v0.1/available-stacks".to_string()
}

pub fn org_groups_path(org_slug: &str) -> String {
    format!("/v0.1/organizations/{}/groups", segment(org_slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_success_is_ok_only() {
        let call = RestCall::get("read app", app_path("abc"));
        assert!(call.accepts(StatusCode::OK));
        assert!(!call.accepts(StatusCode::CREATED));
        assert!(!call.accepts(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_expect_replaces_success_set() {
        let call = RestCall::delete("delete secret", secret_path("abc", "KEY")).expect(NO_CONTENT_OR_OK);
        assert!(call.accepts(StatusCode::NO_CONTENT));
        assert!(call.accepts(StatusCode::OK));
        assert_eq!(call.method(), &Method::DELETE);
    }

    #[test]
    fn test_calls_are_not_sensitive_by_default() {
        assert!(!RestCall::get("read app", app_path("abc")).is_sensitive());
        assert!(RestCall::get("read secret", secret_path("abc", "KEY"))
            .sensitive()
            .is_sensitive());
    }

    #[test]
    fn test_paths() {
        assert_eq!(register_app_path(), "/v0.1/apps/register");
        assert_eq!(register_ssh_key_path("a1"), "/v0.1/apps/a1/register-ssh-key");
        assert_eq!(finish_path("a1"), "/v0.1/apps/a1/finish");
        assert_eq!(bitrise_yml_path("a1"), "/v0.1/apps/a1/bitrise.yml");
        assert_eq!(role_path("a1", "admin"), "/v0.1/apps/a1/roles/admin");
        assert_eq!(secret_path("a1", "API_KEY"), "/v0.1/apps/a1/secrets/API_KEY");
        assert_eq!(available_stacks_path(), "/v0.1/available-stacks");
        assert_eq!(org_groups_path("org-1"), "/v0.1/organizations/org-1/groups");
    }

    #[test]
    fn test_path_segments_are_encoded() {
        assert_eq!(secret_path("a1", "A B/C"), "/v0.1/apps/a1/secrets/A%20B%2FC");
    }
}
