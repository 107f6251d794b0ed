use crate::config::AuthConfig;
use crate::domain::{UserId, user::User};
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{error::ApiError, handlers::AppState};

/// トークンを探すクッキー名（先に見つかった方を使う）
const TOKEN_COOKIES: [&str; 2] = ["jwt", "token"];

/// 認証エラー
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication token is missing")]
    MissingToken,

    #[error("Authentication token is invalid or expired")]
    InvalidToken,

    #[error("Administrator privileges are required")]
    Forbidden,

    #[error("Failed to issue token: {0}")]
    TokenCreation(String),
}

/// JWTのクレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// 利用者ID（文字列）
    pub sub: String,
    pub user_id: i64,
    pub email: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        UserId::from_i64(self.user_id)
    }
}

/// 発行したトークンと有効期限
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expire: DateTime<Utc>,
}

/// 利用者にトークンを発行する（HS256）
pub fn issue_token(
    user: &User,
    config: &AuthConfig,
    now: DateTime<Utc>,
) -> Result<IssuedToken, AuthError> {
    let expire = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id.to_string(),
        user_id: user.id.value(),
        email: user.email.clone(),
        is_admin: user.is_admin,
        iat: now.timestamp(),
        exp: expire.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

    Ok(IssuedToken { token, expire })
}

/// トークンを検証してクレームを取り出す（署名と有効期限）
pub fn verify_token(token: &str, config: &AuthConfig) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        AuthError::InvalidToken
    })
}

/// `Set-Cookie`ヘッダーの値
pub fn session_cookie(issued: &IssuedToken, now: DateTime<Utc>) -> String {
    let max_age = (issued.expire - now).num_seconds().max(0);
    format!(
        "jwt={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        issued.token, max_age
    )
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// リクエストからトークンを探す
///
/// 順序：クッキー`jwt` → クッキー`token` → `Authorization: Bearer` → クエリ`token`
pub fn extract_token(parts: &Parts) -> Option<String> {
    TOKEN_COOKIES
        .iter()
        .find_map(|name| cookie_value(&parts.headers, name))
        .or_else(|| bearer_token(&parts.headers))
        .or_else(|| {
            Query::<TokenQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(query)| query.token)
                .filter(|token| !token.is_empty())
        })
}

/// 認証済み利用者のエクストラクター
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts).ok_or(AuthError::MissingToken)?;
        let claims = verify_token(&token, &state.auth)?;
        Ok(AuthUser(claims))
    }
}

/// 管理者のエクストラクター
///
/// 未認証は401、一般利用者は403。
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        if !claims.is_admin {
            tracing::warn!(user_id = claims.user_id, "Non-admin access to admin route");
            return Err(AuthError::Forbidden.into());
        }

        Ok(AdminUser(claims))
    }
}
