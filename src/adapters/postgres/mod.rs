pub mod book_store;
pub mod loan_store;
pub mod unit_of_work;
pub mod user_store;

use crate::application::ServiceDependencies;
use sqlx::PgPool;
use std::sync::Arc;

// パブリックに型を再エクスポート
pub use book_store::BookStore as PostgresBookStore;
pub use loan_store::LoanStore as PostgresLoanStore;
pub use unit_of_work::UnitOfWork as PostgresUnitOfWork;
pub use user_store::UserStore as PostgresUserStore;

/// 外部キー制約違反（23503）かどうか
///
/// 削除と同時に貸出が登録された場合に起きる。
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_foreign_key_violation(),
        _ => false,
    }
}

/// PostgreSQLアダプター一式で依存関係を組み立てる
pub fn service_dependencies(pool: &PgPool) -> ServiceDependencies {
    ServiceDependencies {
        unit_of_work: Arc::new(PostgresUnitOfWork::new(pool.clone())),
        book_store: Arc::new(PostgresBookStore::new(pool.clone())),
        loan_store: Arc::new(PostgresLoanStore::new(pool.clone())),
        user_store: Arc::new(PostgresUserStore::new(pool.clone())),
    }
}
