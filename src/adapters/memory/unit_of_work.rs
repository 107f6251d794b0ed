use crate::domain::{
    BookId, LoanId,
    book::{self, Book},
    loan::{Loan, NewLoan},
};
use crate::ports::unit_of_work::{
    LoanTransaction as LoanTransactionTrait, Result, UnitOfWork as UnitOfWorkTrait,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OwnedMutexGuard;

use super::database::{MemoryDatabase, MemoryStoreError, Tables};

/// UnitOfWorkのインメモリ実装
pub struct UnitOfWork {
    db: MemoryDatabase,
}

impl UnitOfWork {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UnitOfWorkTrait for UnitOfWork {
    async fn begin(&self) -> Result<Box<dyn LoanTransactionTrait>> {
        let guard = self.db.tables().clone().lock_owned().await;
        let working = Tables::clone(&guard);
        Ok(Box::new(LoanTransaction { guard, working }))
    }
}

/// インメモリのトランザクション
///
/// 開始時にテーブル全体のロックを取り、作業用コピーに変更を積む。
/// コミットで作業用コピーを書き戻し、ロールバック（またはドロップ）で破棄する。
pub struct LoanTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl LoanTransactionTrait for LoanTransaction {
    async fn find_book(&mut self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.working.books.get(&book_id).cloned())
    }

    async fn decrement_available(&mut self, book_id: BookId) -> Result<bool> {
        match self.working.books.get_mut(&book_id) {
            Some(book) if book.available > 0 => {
                book.available -= 1;
                book.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_available(&mut self, book_id: BookId) -> Result<()> {
        if let Some(book) = self.working.books.get_mut(&book_id) {
            book.available = book::restored_available(book.available, book.quantity);
            book.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn insert_loan(&mut self, new_loan: NewLoan) -> Result<Loan> {
        if !self.working.books.contains_key(&new_loan.book_id) {
            return Err(MemoryStoreError::ForeignKeyViolation(format!(
                "loans.book_id = {}",
                new_loan.book_id
            ))
            .into());
        }
        if !self.working.users.contains_key(&new_loan.user_id) {
            return Err(MemoryStoreError::ForeignKeyViolation(format!(
                "loans.user_id = {}",
                new_loan.user_id
            ))
            .into());
        }

        let loan = new_loan.into_loan(self.working.next_loan_id());
        self.working.loans.insert(loan.id, loan.clone());

        Ok(loan)
    }

    async fn find_loan_for_update(&mut self, loan_id: LoanId) -> Result<Option<Loan>> {
        // ロックはbegin時点で取得済み
        Ok(self.working.loans.get(&loan_id).cloned())
    }

    async fn mark_returned(
        &mut self,
        loan_id: LoanId,
        returned_at: DateTime<Utc>,
    ) -> Result<bool> {
        let Some(loan) = self.working.loans.get_mut(&loan_id) else {
            return Ok(false);
        };

        match loan.mark_returned(returned_at) {
            Ok(returned) => {
                *loan = returned;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let LoanTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{BookStore, UserStore};
    use crate::domain::{Quantity, UserId, book::NewBook, user::NewUser};
    use crate::ports::{BookAvailabilityStore, UnitOfWork as _, UserStore as _};
    use chrono::Duration;

    async fn seed(db: &MemoryDatabase, quantity: i32) -> (BookId, UserId) {
        let book = BookStore::new(db.clone())
            .create(NewBook {
                title: "Zero To Production".to_string(),
                author: "Luca Palmieri".to_string(),
                description: String::new(),
                quantity: Quantity::try_from(quantity).unwrap(),
            })
            .await
            .unwrap();
        let user = UserStore::new(db.clone())
            .create(NewUser {
                name: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        (book.id, user.id)
    }

    fn new_loan(book_id: BookId, user_id: UserId) -> NewLoan {
        let now = Utc::now();
        NewLoan {
            user_id,
            book_id,
            loan_date: now,
            return_date: now + Duration::days(7),
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let db = MemoryDatabase::new();
        let (book_id, user_id) = seed(&db, 1).await;
        let uow = UnitOfWork::new(db.clone());

        let mut tx = uow.begin().await.unwrap();
        assert!(tx.decrement_available(book_id).await.unwrap());
        tx.insert_loan(new_loan(book_id, user_id)).await.unwrap();
        tx.commit().await.unwrap();

        let tables = db.snapshot().await;
        assert_eq!(tables.books[&book_id].available, 0);
        assert_eq!(tables.loans.len(), 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_changes() {
        let db = MemoryDatabase::new();
        let (book_id, user_id) = seed(&db, 1).await;
        let uow = UnitOfWork::new(db.clone());

        let mut tx = uow.begin().await.unwrap();
        assert!(tx.decrement_available(book_id).await.unwrap());
        tx.insert_loan(new_loan(book_id, user_id)).await.unwrap();
        tx.rollback().await.unwrap();

        let tables = db.snapshot().await;
        assert_eq!(tables.books[&book_id].available, 1);
        assert!(tables.loans.is_empty());
    }

    #[tokio::test]
    async fn test_drop_without_commit_discards_changes() {
        let db = MemoryDatabase::new();
        let (book_id, _) = seed(&db, 1).await;
        let uow = UnitOfWork::new(db.clone());

        {
            let mut tx = uow.begin().await.unwrap();
            assert!(tx.decrement_available(book_id).await.unwrap());
        }

        assert_eq!(db.snapshot().await.books[&book_id].available, 1);
    }

    #[tokio::test]
    async fn test_decrement_refuses_when_no_copy_left() {
        let db = MemoryDatabase::new();
        let (book_id, _) = seed(&db, 1).await;
        let uow = UnitOfWork::new(db.clone());

        let mut tx = uow.begin().await.unwrap();
        assert!(tx.decrement_available(book_id).await.unwrap());
        assert!(!tx.decrement_available(book_id).await.unwrap());
        assert!(!tx.decrement_available(BookId::from_i64(42)).await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_returned_only_once() {
        let db = MemoryDatabase::new();
        let (book_id, user_id) = seed(&db, 1).await;
        let uow = UnitOfWork::new(db.clone());

        let mut tx = uow.begin().await.unwrap();
        let loan = tx.insert_loan(new_loan(book_id, user_id)).await.unwrap();
        assert!(tx.mark_returned(loan.id, Utc::now()).await.unwrap());
        assert!(!tx.mark_returned(loan.id, Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_loan_rejects_unknown_user() {
        let db = MemoryDatabase::new();
        let (book_id, _) = seed(&db, 1).await;
        let uow = UnitOfWork::new(db.clone());

        let mut tx = uow.begin().await.unwrap();
        let result = tx
            .insert_loan(new_loan(book_id, UserId::from_i64(999)))
            .await;
        assert!(result.is_err());
    }
}
