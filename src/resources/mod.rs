//! Managed resources
//!
//! One module per Bitrise entity. Every resource holds a clone of the
//! provider's [`ClientFactory`](crate::api::ClientFactory) and issues at most
//! one request per operation.
//!
//! - [`app`] - app registration (`bitrise_app`)
//! - [`app_ssh`] - SSH key registration (`bitrise_app_ssh`)
//! - [`app_finish`] - app setup completion (`bitrise_app_finish`)
//! - [`app_roles`] - role to group assignments (`bitrise_app_roles`)
//! - [`app_secret`] - app secrets (`bitrise_app_secret`)
//! - [`app_bitrise_yml`] - the app's bitrise.yml (`bitrise_app_bitrise_yml`)

pub mod app;
pub mod app_bitrise_yml;
pub mod app_finish;
pub mod app_roles;
pub mod app_secret;
pub mod app_ssh;

pub use app::AppResource;
pub use app_bitrise_yml::AppBitriseYmlResource;
pub use app_finish::AppFinishResource;
pub use app_roles::AppRolesResource;
pub use app_secret::AppSecretResource;
pub use app_ssh::AppSshResource;

use serde::{Deserialize, Deserializer};

use crate::api::{rest, BitriseClient, OpContext, RestCall, Result};

/// Borrow an optional string attribute, treating null as empty
pub(crate) fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

/// `Some` only for non-empty strings
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Deserialize an explicit JSON `null` the same as a missing key
///
/// Pair with `#[serde(default)]`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Check that an app still exists
///
/// Used by resources that have no read endpoint of their own.
pub(crate) async fn app_exists(client: &BitriseClient, ctx: &OpContext, app_slug: &str) -> Result<bool> {
    let call = RestCall::get("read app", rest::app_path(app_slug));
    Ok(client.fetch_response(ctx, &call).await?.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_defaults_to_empty() {
        assert_eq!(text(&None), "");
        assert_eq!(text(&Some("abc".to_string())), "abc");
    }

    #[derive(Debug, Deserialize)]
    struct Listing {
        #[serde(default, deserialize_with = "null_as_default")]
        items: Vec<String>,
    }

    #[test]
    fn test_null_as_default_accepts_null_and_missing() {
        let from_null: Listing = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert!(from_null.items.is_empty());

        let from_missing: Listing = serde_json::from_str("{}").unwrap();
        assert!(from_missing.items.is_empty());

        let present: Listing = serde_json::from_str(r#"{"items": ["a"]}"#).unwrap();
        assert_eq!(present.items, vec!["a".to_string()]);
    }

    #[test]
    fn test_non_empty_filters_blank() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
