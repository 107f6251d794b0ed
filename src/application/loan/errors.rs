use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 書籍が存在しない
    #[error("Book not found")]
    BookNotFound,

    /// 貸出可能な冊数がない
    #[error("Book is not available for loan")]
    BookUnavailable,

    /// 返却予定日が未来でない
    #[error("Return date must be in the future")]
    InvalidReturnDate,

    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 他の利用者の貸出
    #[error("Access denied to this loan")]
    AccessDenied,

    /// 既に返却済み
    #[error("Loan has already been returned")]
    AlreadyReturned,

    /// ストアがトランザクションを完了できなかった（変更はすべてロールバック済み）
    #[error("Store failure")]
    StoreFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::domain::ReturnLoanError> for LoanApplicationError {
    fn from(err: crate::domain::ReturnLoanError) -> Self {
        match err {
            crate::domain::ReturnLoanError::NotOwner => LoanApplicationError::AccessDenied,
            crate::domain::ReturnLoanError::AlreadyReturned => {
                LoanApplicationError::AlreadyReturned
            }
        }
    }
}

impl From<crate::domain::LoanAccessError> for LoanApplicationError {
    fn from(err: crate::domain::LoanAccessError) -> Self {
        match err {
            crate::domain::LoanAccessError::NotOwner => LoanApplicationError::AccessDenied,
        }
    }
}

impl From<crate::domain::OpenLoanError> for LoanApplicationError {
    fn from(err: crate::domain::OpenLoanError) -> Self {
        match err {
            crate::domain::OpenLoanError::ReturnDateNotInFuture => {
                LoanApplicationError::InvalidReturnDate
            }
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;
