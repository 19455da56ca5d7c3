//! Import identifier parsing

use crate::api::{ProviderError, Result};

/// Split an import ID into exactly `N` non-empty `/`-separated parts
///
/// `expected` names the format in the error, e.g. `"app_slug/role_name"`.
pub fn parse_import_id<const N: usize>(id: &str, expected: &'static str) -> Result<[String; N]> {
    let invalid = || ProviderError::InvalidImportId {
        id: id.to_string(),
        expected,
    };

    let parts: Vec<String> = id.split('/').map(str::to_string).collect();
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(invalid());
    }

    parts.try_into().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_id() {
        let [app, role] = parse_import_id::<2>("app123/admin", "app_slug/role_name").unwrap();
        assert_eq!(app, "app123");
        assert_eq!(role, "admin");
    }

    #[test]
    fn test_missing_separator_is_rejected() {
        let err = parse_import_id::<2>("bad-format", "app_slug/role_name").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidImportId { .. }));
    }

    #[test]
    fn test_too_many_parts_is_rejected() {
        assert!(parse_import_id::<2>("a/b/c", "app_slug/secret_name").is_err());
    }

    #[test]
    fn test_empty_component_is_rejected() {
        assert!(parse_import_id::<2>("app123/", "app_slug/role_name").is_err());
        assert!(parse_import_id::<1>("", "app_slug").is_err());
    }

    #[test]
    fn test_single_id() {
        let [slug] = parse_import_id::<1>("app123", "app_slug").unwrap();
        assert_eq!(slug, "app123");
    }
}
