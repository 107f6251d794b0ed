use crate::application::catalog;
use crate::domain::BookId;
use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use validator::Validate;

use super::{
    auth::AdminUser,
    error::ApiError,
    extract::{ApiJson, ApiPath},
    handlers::AppState,
    types::{BookResponse, CreateBookRequest, MessageResponse, UpdateBookRequest},
};

/// GET /books
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = catalog::list_books(&state.service_deps).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:id
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    ApiPath(book_id): ApiPath<i64>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = catalog::get_book(&state.service_deps, BookId::from_i64(book_id)).await?;
    Ok(Json(BookResponse::from(book)))
}

/// POST /admin/books
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    ApiJson(req): ApiJson<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    req.validate()?;

    let book = catalog::create_book(&state.service_deps, req.into_input()).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// PUT /admin/books/:id
///
/// 所蔵冊数を変更すると貸出可能冊数も差分だけ増減する。
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    ApiPath(book_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    req.validate()?;

    let book = catalog::update_book(
        &state.service_deps,
        BookId::from_i64(book_id),
        req.into_input(),
    )
    .await?;

    Ok(Json(BookResponse::from(book)))
}

/// DELETE /admin/books/:id
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    ApiPath(book_id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    catalog::delete_book(&state.service_deps, BookId::from_i64(book_id)).await?;
    Ok(Json(MessageResponse::new("Book deleted")))
}
