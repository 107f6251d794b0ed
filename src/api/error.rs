use crate::application::{
    account::AccountError, catalog::CatalogError, loan::LoanApplicationError,
};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use validator::ValidationErrors;

use super::{auth::AuthError, types::ErrorResponse};

/// API層のエラー型
///
/// アプリケーション層・認証・入力検証のエラーをまとめ、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Loan(LoanApplicationError),
    Catalog(CatalogError),
    Account(AccountError),
    Auth(AuthError),
    Validation(ValidationErrors),
    /// ボディやパスパラメーターを読み取れなかった
    MalformedRequest(String),
}

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError::Loan(err)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        ApiError::Account(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Validation(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

/// 500系の共通レスポンス
///
/// 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
fn internal(context: &str, err: &dyn std::error::Error) -> (StatusCode, &'static str, String) {
    match err.source() {
        Some(source) => tracing::error!("{}: {}: {}", context, err, source),
        None => tracing::error!("{}: {}", context, err),
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An unexpected error occurred".to_string(),
    )
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Loan(err) => match err {
                // 404 Not Found
                LoanApplicationError::BookNotFound => {
                    (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", err.to_string())
                }
                LoanApplicationError::LoanNotFound => {
                    (StatusCode::NOT_FOUND, "LOAN_NOT_FOUND", err.to_string())
                }

                // 400 Bad Request - ビジネスルール違反
                LoanApplicationError::BookUnavailable => {
                    (StatusCode::BAD_REQUEST, "BOOK_UNAVAILABLE", err.to_string())
                }
                LoanApplicationError::InvalidReturnDate => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_RETURN_DATE",
                    err.to_string(),
                ),
                LoanApplicationError::AccessDenied => {
                    (StatusCode::BAD_REQUEST, "ACCESS_DENIED", err.to_string())
                }
                LoanApplicationError::AlreadyReturned => {
                    (StatusCode::BAD_REQUEST, "ALREADY_RETURNED", err.to_string())
                }

                LoanApplicationError::StoreFailure(_) => internal("Loan store failure", err),
            },

            ApiError::Catalog(err) => match err {
                CatalogError::BookNotFound => {
                    (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", err.to_string())
                }
                CatalogError::InvalidQuantity => {
                    (StatusCode::BAD_REQUEST, "INVALID_QUANTITY", err.to_string())
                }
                CatalogError::BookInUse => {
                    (StatusCode::BAD_REQUEST, "BOOK_IN_USE", err.to_string())
                }
                CatalogError::StoreFailure(_) => internal("Catalog store failure", err),
            },

            ApiError::Account(err) => match err {
                AccountError::UserNotFound => {
                    (StatusCode::NOT_FOUND, "USER_NOT_FOUND", err.to_string())
                }
                AccountError::EmailAlreadyInUse => (
                    StatusCode::BAD_REQUEST,
                    "EMAIL_ALREADY_IN_USE",
                    err.to_string(),
                ),
                AccountError::UserHasLoans => {
                    (StatusCode::BAD_REQUEST, "USER_HAS_LOANS", err.to_string())
                }
                AccountError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    err.to_string(),
                ),
                AccountError::PasswordHash(_) | AccountError::StoreFailure(_) => {
                    internal("Account failure", err)
                }
            },

            ApiError::Auth(err) => match err {
                AuthError::MissingToken | AuthError::InvalidToken => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string())
                }
                AuthError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string()),
                AuthError::TokenCreation(_) => internal("Token creation failure", err),
            },

            ApiError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                err.to_string(),
            ),
            ApiError::MalformedRequest(message) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.clone())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = self.parts();
        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
