use crate::domain::{BookId, LoanId, UserId};
use crate::ports::loan_store::{LoanRecordStore as LoanRecordStoreTrait, LoanView, Result};
use async_trait::async_trait;

use super::database::MemoryDatabase;

/// LoanRecordStoreのインメモリ実装
pub struct LoanStore {
    db: MemoryDatabase,
}

impl LoanStore {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LoanRecordStoreTrait for LoanStore {
    async fn find_by_id(&self, loan_id: LoanId) -> Result<Option<LoanView>> {
        let tables = self.db.tables().lock().await;
        Ok(tables
            .loans
            .get(&loan_id)
            .and_then(|loan| tables.loan_view(loan)))
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<LoanView>> {
        let tables = self.db.tables().lock().await;
        Ok(tables
            .loans
            .values()
            .filter(|loan| loan.user_id == user_id)
            .filter_map(|loan| tables.loan_view(loan))
            .collect())
    }

    async fn exists_for_book(&self, book_id: BookId) -> Result<bool> {
        let tables = self.db.tables().lock().await;
        Ok(tables.loans.values().any(|loan| loan.book_id == book_id))
    }

    async fn exists_for_user(&self, user_id: UserId) -> Result<bool> {
        let tables = self.db.tables().lock().await;
        Ok(tables.loans.values().any(|loan| loan.user_id == user_id))
    }
}
