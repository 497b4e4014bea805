//! Signed requests against an in-process server.
//!
//! Each test checks the request the server saw: method, path, body and the
//! signature, verified the way the authorization service does it.

mod helpers;

use chrono::Utc;
use helpers::{Captured, MockServer, PUBLIC_TOKEN, ROLE_UUID, Reply, test_tokens};
use kumoru_sdk::application::{AppLocation, Application};
use kumoru_sdk::request::Request;
use kumoru_sdk::signer::{self, ForwardedRequest};
use kumoru_sdk::{Client, Config, Error};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

fn assert_valid_signature(captured: &Captured) {
    signer::verify(
        &captured.headers,
        &captured.method,
        &captured.path,
        &captured.body,
        &test_tokens(),
        Utc::now(),
    )
    .expect("signature verifies");
}

fn app_json() -> String {
    json!({
        "uuid": "app-1",
        "name": "web",
        "image_url": "docker.io/web:latest",
        "status": "deployed",
        "deployment_token": "deploy-tok",
        "location": {"provider": "aws", "region": "us-east-1"}
    })
    .to_string()
}

#[tokio::test]
async fn list_applications_is_signed_with_role_context() {
    let server = MockServer::reply(200, format!("[{}]", app_json())).await;

    let apps = Application::list(&server.client()).await.expect("list");
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].name, "web");

    let captured = server.only_request().await;
    assert_eq!(captured.method, Method::GET);
    assert_eq!(captured.path, "/v1/applications/");
    assert_eq!(captured.header("x-kumoru-context"), Some(ROLE_UUID));
    assert!(captured.header("content-md5").is_none());
    assert_valid_signature(&captured);
}

#[tokio::test]
async fn create_application_signs_json_body() {
    let server = MockServer::reply(201, app_json()).await;

    let app = Application {
        name: "web".into(),
        image_url: "docker.io/web:latest".into(),
        location: AppLocation {
            provider: "aws".into(),
            region: "us-east-1".into(),
        },
        ..Application::default()
    };
    let created = app.create(&server.client()).await.expect("create");
    assert_eq!(created.uuid, "app-1");

    let captured = server.only_request().await;
    assert_eq!(captured.method, Method::POST);
    assert_eq!(captured.header("content-type"), Some("application/json"));
    assert_eq!(
        captured.header("content-md5"),
        Some(signer::content_md5(&captured.body).as_str())
    );
    let body: Value = serde_json::from_slice(&captured.body).expect("json body");
    assert_eq!(body["name"], "web");
    assert_valid_signature(&captured);
}

#[tokio::test]
async fn create_application_requires_created() {
    let server = MockServer::reply(200, app_json()).await;

    let err = Application::default()
        .create(&server.client())
        .await
        .expect_err("200 is not 201");
    assert_eq!(err.status(), Some(StatusCode::OK));
}

#[tokio::test]
async fn deploy_sends_token_in_query_and_signs_path_only() {
    let server = MockServer::reply(202, "").await;

    let app: Application = serde_json::from_str(&app_json()).expect("app");
    app.deploy(&server.client()).await.expect("deploy");

    let captured = server.only_request().await;
    assert_eq!(captured.method, Method::POST);
    assert_eq!(captured.path, "/v1/applications/app-1/deployments/");
    assert_eq!(captured.query.as_deref(), Some("deployment_token=deploy-tok"));
    assert_valid_signature(&captured);
}

#[tokio::test]
async fn archive_expects_accepted() {
    let server = MockServer::reply(202, "").await;
    Application::with_uuid("app-1")
        .delete(&server.client())
        .await
        .expect("archive");

    let captured = server.only_request().await;
    assert_eq!(captured.method, Method::DELETE);
    assert_eq!(captured.path, "/v1/applications/app-1");
    assert!(captured.body.is_empty());
    assert_valid_signature(&captured);
}

#[tokio::test]
async fn patch_sends_json_patch_diff() {
    let server = MockServer::reply(200, app_json()).await;

    let original: Application = serde_json::from_str(&app_json()).expect("app");
    let mut patched = original.clone();
    patched.image_url = "docker.io/web:v2".into();

    original.patch(&server.client(), &patched).await.expect("patch");

    let captured = server.only_request().await;
    assert_eq!(captured.method, Method::PATCH);
    assert_eq!(captured.header("content-type"), Some("application/json-patch+json"));
    let ops: Value = serde_json::from_slice(&captured.body).expect("patch body");
    assert_eq!(
        ops,
        json!([{"op": "replace", "path": "/image_url", "value": "docker.io/web:v2"}])
    );
    assert_valid_signature(&captured);
}

#[tokio::test]
async fn account_lookup_has_no_context() {
    let server = MockServer::reply(
        200,
        r#"{"email":"ada@example.com","role_uuid":"role-from-server"}"#,
    )
    .await;

    let account = kumoru_sdk::account::Account::show(&server.client(), "ada@example.com")
        .await
        .expect("show");
    assert_eq!(account.role_uuid, "role-from-server");

    let captured = server.only_request().await;
    assert_eq!(captured.path, "/v1/accounts/ada@example.com");
    assert!(captured.header("x-kumoru-context").is_none());
    assert_valid_signature(&captured);
}

#[tokio::test]
async fn error_status_carries_body() {
    let server = MockServer::reply(500, "database unavailable").await;

    let err = Application::list(&server.client()).await.expect_err("500");
    match err {
        Error::Api { status, body } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "database unavailable");
        }
        other => unreachable!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unsigned_request_has_no_signature_headers() {
    let server = MockServer::reply(200, "{}").await;
    let client = server.client();

    let url = format!("{}/v1/ping", server.url());
    let response = client.execute(Request::get(url)).await.expect("execute");
    assert_eq!(response.status, StatusCode::OK);

    let captured = server.only_request().await;
    assert!(captured.header("authorization").is_none());
    assert!(captured.header("x-kumoru-date").is_none());
}

#[tokio::test]
async fn query_params_are_merged_into_url() {
    let server = MockServer::reply(200, "[]").await;
    let url = format!("{}/v1/things/?existing=1", server.url());

    server
        .client()
        .execute(Request::get(url).param("b", "two words").sign(true))
        .await
        .expect("execute");

    let captured = server.only_request().await;
    assert_eq!(captured.query.as_deref(), Some("existing=1&b=two+words"));
    assert_valid_signature(&captured);
}

#[tokio::test]
async fn forwarded_request_embeds_caller_signature() {
    let server = MockServer::reply(200, "[]").await;

    let mut received = HeaderMap::new();
    received.insert("authorization", HeaderValue::from_static("Y2xpZW50LXB1YjphYmMxMjM="));
    received.insert("x-kumoru-date", HeaderValue::from_static("11 Jul 16 19:40 +0000"));
    received.insert("x-kumoru-context", HeaderValue::from_static("caller-role"));
    let forwarded = ForwardedRequest::new(Method::GET, "/v1/applications/", received);
    let expected_proxy = forwarded.proxy_authorization().expect("proxy");

    kumoru_sdk::resource::find_resources(
        &server.client(),
        "application",
        "read",
        Some("app-1"),
        Some(forwarded),
    )
    .await
    .expect("find");

    let captured = server.only_request().await;
    assert_eq!(captured.path, "/v1/resources/");
    assert_eq!(
        captured.query.as_deref(),
        Some("select_by=type%3Dapplication%2Caction%3Dread%2Cuuid%3Dapp-1%2C")
    );
    assert_eq!(captured.header("x-kumoru-context"), Some("caller-role"));
    assert_eq!(captured.header("proxy-authorization"), Some(expected_proxy.as_str()));
    assert_valid_signature(&captured);
}

#[tokio::test]
async fn signature_from_other_tokens_is_rejected() {
    let server = MockServer::reply(200, "[]").await;
    let client = Client::new(
        Config::default()
            .with_endpoints(server.endpoints())
            .with_tokens(kumoru_sdk::Tokens::new(PUBLIC_TOKEN, "wrong-private"))
            .with_role(ROLE_UUID),
    );

    Application::list(&client).await.expect("list");

    let captured = server.only_request().await;
    let err = signer::verify(
        &captured.headers,
        &captured.method,
        &captured.path,
        &captured.body,
        &test_tokens(),
        Utc::now(),
    )
    .expect_err("wrong key");
    assert!(matches!(err, Error::SignatureRejected { .. }));
}

#[tokio::test]
async fn replies_are_served_in_order() {
    let server = MockServer::start(vec![Reply::new(200, app_json()), Reply::new(202, "")]).await;
    let client = server.client();

    let app = Application::show(&client, "app-1").await.expect("show");
    app.deploy(&client).await.expect("deploy");

    let requests = server.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[1].method, Method::POST);
}
