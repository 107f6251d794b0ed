pub mod book_store;
pub mod database;
pub mod loan_store;
pub mod unit_of_work;
pub mod user_store;

pub use book_store::BookStore;
pub use database::MemoryDatabase;
pub use loan_store::LoanStore;
pub use unit_of_work::UnitOfWork;
pub use user_store::UserStore;

use crate::application::ServiceDependencies;
use std::sync::Arc;

/// インメモリアダプター一式で依存関係を組み立てる
pub fn service_dependencies(db: &MemoryDatabase) -> ServiceDependencies {
    ServiceDependencies {
        unit_of_work: Arc::new(UnitOfWork::new(db.clone())),
        book_store: Arc::new(BookStore::new(db.clone())),
        loan_store: Arc::new(LoanStore::new(db.clone())),
        user_store: Arc::new(UserStore::new(db.clone())),
    }
}
