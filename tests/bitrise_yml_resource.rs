//! Integration tests for the bitrise.yml resource using wiremock

mod common;

use serde_json::json;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{ctx, provider_for};

const YML: &str = "bitrise_app_bitrise_yml";
const OLD_YML: &str = "format_version: \"11\"\nworkflows:\n  primary: {}\n";
const NEW_YML: &str = "format_version: \"13\"\nworkflows:\n  deploy: {}\n";

fn state(content: &str, frozen: Option<bool>) -> serde_json::Value {
    json!({
        "app_slug": "app-42",
        "yml_content": content,
        "update_on_create_only": frozen,
        "id": "app-42"
    })
}

/// Frozen content: update returns the plan and makes no request at all
#[tokio::test]
async fn test_frozen_update_makes_no_calls() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let plan = state(NEW_YML, Some(true));
    let result = provider
        .resource(YML)
        .unwrap()
        .update(&ctx(), state(OLD_YML, Some(true)), plan.clone())
        .await
        .unwrap();

    assert_eq!(result, plan);
}

/// Unfrozen content is re-uploaded
#[tokio::test]
async fn test_update_uploads_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v0.1/apps/app-42/bitrise.yml"))
        .and(body_json(json!({"app_config_datastore_yaml": NEW_YML})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let result = provider
        .resource(YML)
        .unwrap()
        .update(&ctx(), state(OLD_YML, None), state(NEW_YML, None))
        .await
        .unwrap();

    assert_eq!(result["yml_content"], NEW_YML);
}

/// Frozen update hands back the plan as is, unknown id included
#[tokio::test]
async fn test_frozen_update_returns_plan_verbatim() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    let mut plan = state(NEW_YML, Some(true));
    plan["id"] = serde_json::Value::Null;
    let result = provider
        .resource(YML)
        .unwrap()
        .update(&ctx(), state(OLD_YML, Some(true)), plan.clone())
        .await
        .unwrap();

    assert_eq!(result, plan);
}

/// A rejected upload reports status and body
#[tokio::test]
async fn test_update_failure_reports_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v0.1/apps/app-42/bitrise.yml"))
        .respond_with(ResponseTemplate::new(400).set_body_string("workflow 'deploy' has no steps"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let diags = provider
        .resource(YML)
        .unwrap()
        .update(&ctx(), state(OLD_YML, None), state(NEW_YML, None))
        .await
        .unwrap_err();

    let diag = diags.iter().next().unwrap();
    assert_eq!(diag.summary, "API Error");
    assert!(diag.detail.contains("400"));
    assert!(diag.detail.contains("has no steps"));
}

/// A missing app or bitrise.yml drops out of state
#[tokio::test]
async fn test_read_not_found_removes_resource() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v0.1/apps/app-42/bitrise.yml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let result = provider
        .resource(YML)
        .unwrap()
        .read(&ctx(), state(OLD_YML, None))
        .await
        .unwrap();

    assert!(result.is_none());
}

/// Plan keeps the stored content while frozen
#[tokio::test]
async fn test_frozen_plan_keeps_prior_content() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    let change = provider
        .resource(YML)
        .unwrap()
        .plan(
            Some(&state(OLD_YML, Some(true))),
            json!({"app_slug": "app-42", "yml_content": NEW_YML, "update_on_create_only": true}),
        )
        .unwrap();

    assert_eq!(change.planned_state["yml_content"], OLD_YML);
    assert_eq!(change.planned_state["id"], "app-42");
    assert!(change.requires_replace.is_empty());
}

/// Read accepts the JSON envelope
#[tokio::test]
async fn test_read_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v0.1/apps/app-42/bitrise.yml"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"app_config_datastore_yaml": NEW_YML})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let result = provider
        .resource(YML)
        .unwrap()
        .read(&ctx(), state(OLD_YML, None))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result["yml_content"], NEW_YML);
}

/// Read accepts raw YAML
#[tokio::test]
async fn test_read_plain_text_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v0.1/apps/app-42/bitrise.yml"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string(NEW_YML),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let result = provider
        .resource(YML)
        .unwrap()
        .read(&ctx(), state(OLD_YML, None))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result["yml_content"], NEW_YML);
}

/// Invalid YAML is rejected before any request
#[tokio::test]
async fn test_validate_rejects_invalid_yaml() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    let diags = provider
        .resource(YML)
        .unwrap()
        .validate(&json!({"app_slug": "app-42", "yml_content": "workflows: [unclosed"}));

    assert!(diags.has_error());
    assert_eq!(diags.iter().next().unwrap().summary, "Invalid YAML");
}
