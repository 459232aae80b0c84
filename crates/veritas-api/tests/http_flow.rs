//! HTTP 흐름 통합 테스트.
//!
//! 가입 → 로그인 → 게이트 통과 → 사용자/역할/클레임 관리를 인메모리 저장소로 검증합니다.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;
use veritas_api::{create_api_router, AppState, TokenService};

const SECRET: &str = "integration-test-signing-key-0123456789";

fn test_app() -> (Router, Arc<AppState>) {
    let secret = SecretString::from(SECRET.to_string());
    let state = Arc::new(AppState::in_memory(TokenService::new(
        &secret,
        Duration::hours(24),
    )));
    let app = create_api_router(&state, None).with_state(state.clone());
    (app, state)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn sign_up_and_login(app: &Router) -> (String, String) {
    let (status, body) = call(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "name": "alice", "email": "alice@x.com", "password": "pw123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "alice@x.com", "password": "pw123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (id, body["token"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_signup_login_and_me() {
    let (app, _) = test_app();
    let (id, token) = sign_up_and_login(&app).await;

    let (status, me) = call(&app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me, json!({ "id": id, "name": "alice", "email": "alice@x.com" }));
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let (app, _) = test_app();
    let (id, token) = sign_up_and_login(&app).await;

    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/users/{}", id),
        Some(&token),
        Some(json!({ "email": "new@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["email"], "new@x.com");
    assert_eq!(updated["name"], "alice");

    // 비밀번호는 그대로이므로 새 이메일로 로그인 가능
    let (status, _) = call(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "new@x.com", "password": "pw123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_deleted_user_cannot_login() {
    let (app, _) = test_app();
    let (id, token) = sign_up_and_login(&app).await;

    let (status, body) = call(&app, "DELETE", &format!("/users/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = call(&app, "GET", &format!("/users/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = call(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "alice@x.com", "password": "pw123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let (app, state) = test_app();
    let expired = state
        .tokens
        .issue_at("alice@x.com", Utc::now() - Duration::hours(25))
        .unwrap();

    let (status, body) = call(&app, "GET", "/users", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_token_from_other_key_is_rejected() {
    let (app, _) = test_app();
    let other = TokenService::new(
        &SecretString::from("a-completely-different-signing-key-42".to_string()),
        Duration::hours(24),
    );
    let forged = other.issue("alice@x.com").unwrap();

    let (status, body) = call(&app, "GET", "/roles", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_roles_and_claims_are_independent() {
    let (app, _) = test_app();
    let (_, token) = sign_up_and_login(&app).await;

    let (status, role) = call(
        &app,
        "POST",
        "/roles",
        Some(&token),
        Some(json!({ "name": "admin", "description": "full access" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // 같은 이름의 클레임은 역할과 충돌하지 않음
    let (status, _) = call(
        &app,
        "POST",
        "/claims",
        Some(&token),
        Some(json!({ "name": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let role_id = role["id"].as_str().unwrap();
    let (status, body) = call(
        &app,
        "PUT",
        &format!("/roles/{}", role_id),
        Some(&token),
        Some(json!({ "description": "everything" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": role_id }));

    let (_, fetched) = call(&app, "GET", &format!("/roles/{}", role_id), Some(&token), None).await;
    assert_eq!(fetched["name"], "admin");
    assert_eq!(fetched["description"], "everything");
    let at = |field: &str| {
        chrono::DateTime::parse_from_rfc3339(fetched[field].as_str().unwrap()).unwrap()
    };
    assert!(at("updated_at") > at("created_at"));

    let (_, claims) = call(&app, "GET", "/claims", Some(&token), None).await;
    assert_eq!(claims.as_array().unwrap().len(), 1);
}
