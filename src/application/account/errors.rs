use thiserror::Error;

/// 利用者管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("User not found")]
    UserNotFound,

    #[error("Email is already in use")]
    EmailAlreadyInUse,

    /// メールアドレス不一致とパスワード不一致は区別しない
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// 貸出記録から参照されている利用者は削除できない
    #[error("User has loan records and cannot be deleted")]
    UserHasLoans,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Store failure")]
    StoreFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, AccountError>;
