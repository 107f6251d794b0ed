use thiserror::Error;

/// 蔵書管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Book not found")]
    BookNotFound,

    /// 所蔵冊数が1未満
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    /// 貸出記録から参照されている書籍は削除できない
    #[error("Book has loan records and cannot be deleted")]
    BookInUse,

    #[error("Store failure")]
    StoreFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::domain::QuantityError> for CatalogError {
    fn from(_: crate::domain::QuantityError) -> Self {
        CatalogError::InvalidQuantity
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
