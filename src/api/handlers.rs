use crate::application::{
    ServiceDependencies,
    loan::{
        create_loan as execute_create_loan, get_loan as execute_get_loan, list_loans_for_user,
        return_loan as execute_return_loan,
    },
};
use crate::config::AuthConfig;
use crate::domain::{
    BookId, LoanId,
    commands::{CreateLoan, ReturnLoan},
};
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use std::sync::Arc;

use super::{
    auth::AuthUser,
    error::ApiError,
    extract::{ApiJson, ApiPath},
    types::{CreateLoanRequest, LoanResponse},
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
    pub auth: AuthConfig,
}

// ============================================================================
// Loan handlers
// ============================================================================

/// POST /loans - 書籍を借りる
///
/// 強制されるビジネスルール:
/// - 返却予定日が未来であること
/// - 書籍が存在し、貸出可能な冊数が残っていること
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let cmd = CreateLoan {
        user_id: claims.user_id(),
        book_id: BookId::from_i64(req.book_id),
        return_date: req.return_date,
        requested_at: Utc::now(),
    };

    let view = execute_create_loan(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::from(view))))
}

/// GET /loans - 自分の貸出一覧（貸出中・返却済みの両方）
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let loans = list_loans_for_user(&state.service_deps, claims.user_id()).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /loans/:id - 自分の貸出を1件取得
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ApiPath(loan_id): ApiPath<i64>,
) -> Result<Json<LoanResponse>, ApiError> {
    let view = execute_get_loan(
        &state.service_deps,
        LoanId::from_i64(loan_id),
        claims.user_id(),
    )
    .await?;

    Ok(Json(LoanResponse::from(view)))
}

/// PUT /loans/:id/return - 書籍を返却
///
/// 強制されるビジネスルール:
/// - 貸出が自分のものであること
/// - 既に返却済みでないこと
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ApiPath(loan_id): ApiPath<i64>,
) -> Result<Json<LoanResponse>, ApiError> {
    let cmd = ReturnLoan {
        loan_id: LoanId::from_i64(loan_id),
        user_id: claims.user_id(),
        returned_at: Utc::now(),
    };

    let view = execute_return_loan(&state.service_deps, cmd).await?;

    Ok(Json(LoanResponse::from(view)))
}
