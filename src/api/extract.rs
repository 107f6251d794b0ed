use axum::extract::{FromRequest, FromRequestParts};

use super::error::ApiError;

/// JSONボディの抽出器
///
/// 形式不正・必須項目の欠落・型違いは`ApiError`として400を返す。
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// パスパラメーターの抽出器
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
