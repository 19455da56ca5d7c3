//! Integration tests for the data sources using wiremock

mod common;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{ctx, provider_for, TOKEN};

/// Stack keys come back as a sorted set with a fixed id
#[tokio::test]
async fn test_available_stacks_keys() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v0.1/available-stacks"))
        .and(header("Authorization", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "osx-xcode-16.0.x": {"title": "Xcode 16.0"},
            "linux-docker-android-22.04": {"title": "Ubuntu 22.04"}
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let model = provider
        .data_source("bitrise_available_stacks")
        .unwrap()
        .read(&ctx(), json!({}))
        .await
        .unwrap();

    assert_eq!(model["id"], "available-stacks");
    assert_eq!(
        model["stack_keys"],
        json!(["linux-docker-android-22.04", "osx-xcode-16.0.x"])
    );
}

/// Groups are projected into slug/name objects
#[tokio::test]
async fn test_org_groups() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v0.1/organizations/org-1/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"slug": "g1", "name": "Developers", "members": 4},
            {"slug": "g2", "name": "QA"}
        ])))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let model = provider
        .data_source("bitrise_org_groups")
        .unwrap()
        .read(&ctx(), json!({"org_slug": "org-1"}))
        .await
        .unwrap();

    assert_eq!(model["id"], "org-1");
    assert_eq!(
        model["groups"],
        json!([{"slug": "g1", "name": "Developers"}, {"slug": "g2", "name": "QA"}])
    );
}

/// Null fields and null lists decode as empty values
#[tokio::test]
async fn test_null_values_read_as_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v0.1/organizations/org-1/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"slug": "g1", "name": null}]"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0.1/organizations/org-2/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0.1/apps/app-42/roles/member"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"groups": null}"#))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let groups = provider.data_source("bitrise_org_groups").unwrap();

    let model = groups.read(&ctx(), json!({"org_slug": "org-1"})).await.unwrap();
    assert_eq!(model["groups"], json!([{"slug": "g1", "name": ""}]));

    let model = groups.read(&ctx(), json!({"org_slug": "org-2"})).await.unwrap();
    assert_eq!(model["groups"], json!([]));

    let model = provider
        .data_source("bitrise_app_roles")
        .unwrap()
        .read(&ctx(), json!({"app_slug": "app-42", "role_name": "member"}))
        .await
        .unwrap();
    assert_eq!(model["groups"], json!([]));
}

/// Role groups list with composite id
#[tokio::test]
async fn test_app_roles() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v0.1/apps/app-42/roles/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"groups": ["g1"]})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let model = provider
        .data_source("bitrise_app_roles")
        .unwrap()
        .read(&ctx(), json!({"app_slug": "app-42", "role_name": "admin"}))
        .await
        .unwrap();

    assert_eq!(model["id"], "app-42/admin");
    assert_eq!(model["groups"], json!(["g1"]));
}

/// App lookup exposes the repository details
#[tokio::test]
async fn test_app() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v0.1/apps/app-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "slug": "app-42",
                "repo_url": "git@github.com:acme/mobile.git",
                "is_public": false,
                "repo_slug": "mobile",
                "provider": "github",
                "repo_owner": "acme",
                "owner": {"slug": "org-1"}
            }
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let model = provider
        .data_source("bitrise_app")
        .unwrap()
        .read(&ctx(), json!({"app_slug": "app-42"}))
        .await
        .unwrap();

    assert_eq!(model["id"], "app-42");
    assert_eq!(model["repo"], "github");
    assert_eq!(model["git_owner"], "acme");
    assert_eq!(model["organization_slug"], "org-1");
    assert_eq!(model["is_public"], false);
}

/// A data source has no state to drop, so 404 is an error
#[tokio::test]
async fn test_not_found_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v0.1/organizations/missing/groups"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such organization"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let diags = provider
        .data_source("bitrise_org_groups")
        .unwrap()
        .read(&ctx(), json!({"org_slug": "missing"}))
        .await
        .unwrap_err();

    let diag = diags.iter().next().unwrap();
    assert_eq!(diag.summary, "Not Found");
    assert!(diag.detail.contains("no such organization"));
}

/// Computed attributes cannot be set in configuration
#[tokio::test]
async fn test_validate_rejects_computed_input() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    let diags = provider
        .data_source("bitrise_org_groups")
        .unwrap()
        .validate(&json!({"org_slug": "org-1", "id": "x"}));

    assert!(diags.has_error());
}
