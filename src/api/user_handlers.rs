use crate::application::account;
use crate::domain::UserId;
use axum::{
    Json,
    extract::State,
    http::{HeaderName, StatusCode, header::SET_COOKIE},
    response::AppendHeaders,
};
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use super::{
    auth::{AdminUser, AuthUser, issue_token, session_cookie},
    error::ApiError,
    extract::{ApiJson, ApiPath},
    handlers::AppState,
    types::{
        LoginRequest, MessageResponse, RegisterRequest, TokenResponse, UpdateUserRequest,
        UserResponse,
    },
};

/// ログイン応答に付けるクッキーヘッダー
type SessionCookie = AppendHeaders<[(HeaderName, String); 1]>;

// ============================================================================
// Auth
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    req.validate()?;

    let user = account::register(&state.service_deps, req.into_input()).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /auth/login
///
/// トークンをボディで返し、同じトークンをHttpOnlyクッキーにも設定する。
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<(SessionCookie, Json<TokenResponse>), ApiError> {
    req.validate()?;

    let user = account::authenticate(&state.service_deps, &req.email, &req.password).await?;

    let now = Utc::now();
    let issued = issue_token(&user, &state.auth, now)?;
    let cookie = session_cookie(&issued, now);

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(TokenResponse {
            token: issued.token,
            expire: issued.expire,
        }),
    ))
}

/// GET /auth/refresh
///
/// 有効なトークンと引き換えに新しいトークンを発行する。
/// 管理者への昇格などを反映するため、利用者は読み直す。
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = account::get_user(&state.service_deps, claims.user_id()).await?;
    let issued = issue_token(&user, &state.auth, Utc::now())?;

    Ok(Json(TokenResponse {
        token: issued.token,
        expire: issued.expire,
    }))
}

// ============================================================================
// Current user
// ============================================================================

/// GET /users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = account::get_user(&state.service_deps, claims.user_id()).await?;
    Ok(Json(UserResponse::from(user)))
}

/// PUT /users/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    req.validate()?;

    let user =
        account::update_user(&state.service_deps, claims.user_id(), req.into_input()).await?;

    Ok(Json(UserResponse::from(user)))
}

// ============================================================================
// Admin
// ============================================================================

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = account::list_users(&state.service_deps).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /admin/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = account::get_user(&state.service_deps, UserId::from_i64(user_id)).await?;
    Ok(Json(UserResponse::from(user)))
}

/// PUT /admin/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    req.validate()?;

    let user = account::update_user(
        &state.service_deps,
        UserId::from_i64(user_id),
        req.into_input(),
    )
    .await?;

    Ok(Json(UserResponse::from(user)))
}

/// DELETE /admin/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    account::delete_user(&state.service_deps, UserId::from_i64(user_id)).await?;
    Ok(Json(MessageResponse::new("User deleted")))
}

/// PUT /admin/users/:id/promote
pub async fn promote_user(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = account::promote_to_admin(&state.service_deps, UserId::from_i64(user_id)).await?;
    Ok(Json(UserResponse::from(user)))
}
