use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::{
    account::{RegisterUser, UpdateUser},
    catalog::{CreateBook, UpdateBook},
};
use crate::domain::{book::Book, user::User};
use crate::ports::loan_store::LoanView;

// ============================================================================
// Auth
// ============================================================================

/// POST /auth/register
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

impl RegisterRequest {
    pub fn into_input(self) -> RegisterUser {
        RegisterUser {
            name: self.name,
            email: self.email,
            password: self.password,
        }
    }
}

/// POST /auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// ログイン・トークン更新のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub expire: DateTime<Utc>,
}

// ============================================================================
// Books
// ============================================================================

/// POST /admin/books
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

impl CreateBookRequest {
    pub fn into_input(self) -> CreateBook {
        CreateBook {
            title: self.title,
            author: self.author,
            description: self.description,
            quantity: self.quantity,
        }
    }
}

/// PUT /admin/books/:id（省略したフィールドは変更しない）
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub author: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
}

impl UpdateBookRequest {
    pub fn into_input(self) -> UpdateBook {
        UpdateBook {
            title: self.title,
            author: self.author,
            description: self.description,
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub quantity: i32,
    pub available: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.value(),
            title: book.title,
            author: book.author,
            description: book.description,
            quantity: book.quantity,
            available: book.available,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

// ============================================================================
// Loans
// ============================================================================

/// POST /loans
///
/// 返却予定日が未来かどうかはサービス側で検証する。
#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    pub book_id: i64,
    pub return_date: DateTime<Utc>,
}

/// 貸出レスポンス（書籍タイトルと利用者名を含む）
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub user_id: i64,
    pub user_name: String,
    pub loan_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub is_returned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LoanView> for LoanResponse {
    fn from(view: LoanView) -> Self {
        Self {
            id: view.id.value(),
            book_id: view.book_id.value(),
            book_title: view.book_title,
            user_id: view.user_id.value(),
            user_name: view.user_name,
            loan_date: view.loan_date,
            return_date: view.return_date,
            returned_at: view.returned_at,
            is_returned: view.is_returned,
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }
}

// ============================================================================
// Users
// ============================================================================

/// PUT /users/me と PUT /admin/users/:id
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 6))]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn into_input(self) -> UpdateUser {
        UpdateUser {
            name: self.name,
            password: self.password,
        }
    }
}

/// 利用者レスポンス（パスワードハッシュは含めない）
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.value(),
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ============================================================================
// Common
// ============================================================================

/// 削除などの結果メッセージ
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
