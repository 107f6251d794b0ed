use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use rusty_library_api::api::auth::issue_token;
use rusty_library_api::api::{AppState, create_router};
use rusty_library_api::application::account;
use rusty_library_api::config::AuthConfig;
use rusty_library_api::domain::user::User;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use common::{TestContext, memory_context, seed_user};

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "e2e-secret".to_string(),
        jwt_expiration_hours: 1,
    }
}

/// インメモリアダプターと実際のAPIルーターでアプリケーションを組み立てる
fn setup_app() -> (TestContext, Router) {
    let ctx = memory_context();
    let state = Arc::new(AppState {
        service_deps: ctx.deps.clone(),
        auth: auth_config(),
    });
    (ctx, create_router(state))
}

fn token_for(user: &User) -> String {
    issue_token(user, &auth_config(), Utc::now()).unwrap().token
}

async fn seed_admin(ctx: &TestContext) -> User {
    let admin = seed_user(&ctx.deps, "Admin").await;
    account::promote_to_admin(&ctx.deps, admin.id).await.unwrap()
}

/// リクエストを送り、ステータスとJSONボディを返す
async fn send(
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

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

async fn create_book(app: &Router, admin_token: &str, quantity: i32) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/admin/books",
        Some(admin_token),
        Some(json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "quantity": quantity,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

fn loan_request(book_id: i64) -> Value {
    json!({
        "book_id": book_id,
        "return_date": Utc::now() + Duration::days(7),
    })
}

// ============================================================================
// E2Eテスト: 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_e2e_health_check() {
    let (_ctx, app) = setup_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_e2e_full_loan_flow() {
    let (ctx, app) = setup_app();
    let admin = seed_admin(&ctx).await;
    let alice = seed_user(&ctx.deps, "Alice").await;
    let bob = seed_user(&ctx.deps, "Bob").await;
    let (alice_token, bob_token) = (token_for(&alice), token_for(&bob));

    let book_id = create_book(&app, &token_for(&admin), 1).await;

    // Step 1: 貸出作成（POST /loans）
    let (status, loan) = send(
        &app,
        "POST",
        "/api/loans",
        Some(&alice_token),
        Some(loan_request(book_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["book_id"], book_id);
    assert_eq!(loan["book_title"], "Dune");
    assert_eq!(loan["user_name"], "Alice");
    assert_eq!(loan["is_returned"], false);
    assert!(loan["returned_at"].is_null());
    let loan_id = loan["id"].as_i64().unwrap();

    // Step 2: 在庫切れ
    let (status, body) = send(
        &app,
        "POST",
        "/api/loans",
        Some(&bob_token),
        Some(loan_request(book_id)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BOOK_UNAVAILABLE");

    let (_, book) = send(&app, "GET", &format!("/api/books/{}", book_id), None, None).await;
    assert_eq!(book["available"], 0);

    // Step 3: 貸出詳細取得（本人のみ）
    let uri = format!("/api/loans/{}", loan_id);
    let (status, fetched) = send(&app, "GET", &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], loan_id);

    let (status, body) = send(&app, "GET", &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ACCESS_DENIED");

    // Step 4: 返却（PUT /loans/:id/return）
    let return_uri = format!("/api/loans/{}/return", loan_id);
    let (status, returned) = send(&app, "PUT", &return_uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["is_returned"], true);
    assert!(!returned["returned_at"].is_null());

    let (status, body) = send(&app, "PUT", &return_uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ALREADY_RETURNED");

    let (_, book) = send(&app, "GET", &format!("/api/books/{}", book_id), None, None).await;
    assert_eq!(book["available"], 1);

    // Step 5: 一覧（返却済みを含む）
    let (status, loans) = send(&app, "GET", "/api/loans", Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loans.as_array().unwrap().len(), 1);

    let (_, loans) = send(&app, "GET", "/api/loans", Some(&bob_token), None).await;
    assert_eq!(loans, json!([]));
}

#[tokio::test]
async fn test_e2e_register_login_and_cookie_session() {
    let (_ctx, app) = setup_app();

    let (status, user) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Alice",
            "email": "alice@example.com",
            "password": "secret1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["is_admin"], false);
    assert!(user.get("password_hash").is_none());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"email": "alice@example.com", "password": "secret1"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("jwt="));
    assert!(cookie.contains("HttpOnly"));

    // クッキーだけで認証できる
    let session = cookie.split(';').next().unwrap().to_string();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header(header::COOKIE, session)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_e2e_refresh_reflects_promotion() {
    let (ctx, app) = setup_app();
    let alice = seed_user(&ctx.deps, "Alice").await;
    let token = token_for(&alice);

    account::promote_to_admin(&ctx.deps, alice.id).await.unwrap();

    // 古いトークンでは管理者操作はできない
    let (status, _) = send(&app, "GET", "/api/admin/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/api/auth/refresh", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let refreshed = body["token"].as_str().unwrap().to_string();

    let (status, users) = send(&app, "GET", "/api/admin/users", Some(&refreshed), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 1);
}

// ============================================================================
// E2Eテスト: 異常系
// ============================================================================

#[tokio::test]
async fn test_e2e_requires_authentication() {
    let (_ctx, app) = setup_app();

    let (status, body) = send(&app, "GET", "/api/loans", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = send(&app, "GET", "/api/users/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_e2e_admin_routes_reject_regular_users() {
    let (ctx, app) = setup_app();
    let alice = seed_user(&ctx.deps, "Alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/books",
        Some(&token_for(&alice)),
        Some(json!({"title": "Dune", "author": "Frank Herbert", "quantity": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_e2e_rejects_past_return_date() {
    let (ctx, app) = setup_app();
    let admin = seed_admin(&ctx).await;
    let alice = seed_user(&ctx.deps, "Alice").await;
    let book_id = create_book(&app, &token_for(&admin), 1).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/loans",
        Some(&token_for(&alice)),
        Some(json!({
            "book_id": book_id,
            "return_date": Utc::now() - Duration::days(1),
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_RETURN_DATE");
}

#[tokio::test]
async fn test_e2e_validation_and_not_found() {
    let (ctx, app) = setup_app();
    let admin = seed_admin(&ctx).await;
    let admin_token = token_for(&admin);

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/books",
        Some(&admin_token),
        Some(json!({"title": "", "author": "Frank Herbert", "quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, body) = send(&app, "GET", "/api/books/404", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "BOOK_NOT_FOUND");

    let (status, body) = send(&app, "GET", "/api/loans/404", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "LOAN_NOT_FOUND");

    let (status, body) = send(
        &app,
        "DELETE",
        "/api/admin/users/404",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn test_e2e_malformed_requests_use_error_body() {
    let (ctx, app) = setup_app();
    let alice = seed_user(&ctx.deps, "Alice").await;
    let token = token_for(&alice);

    // return_dateが欠けている
    let (status, body) = send(
        &app,
        "POST",
        "/api/loans",
        Some(&token),
        Some(json!({"book_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    // 型違い
    let (status, body) = send(
        &app,
        "POST",
        "/api/loans",
        Some(&token),
        Some(json!({"book_id": "x", "return_date": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, body) = send(&app, "GET", "/api/loans/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["message"].is_string());

    assert!(ctx.db.snapshot().await.loans.is_empty());
}
