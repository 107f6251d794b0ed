use crate::domain::{
    BookId,
    book::{self, Book, BookChanges, NewBook},
};
use crate::ports::DeleteOutcome;
use crate::ports::book_store::{BookAvailabilityStore as BookAvailabilityStoreTrait, Result};
use async_trait::async_trait;
use chrono::Utc;

use super::database::MemoryDatabase;

/// BookAvailabilityStoreのインメモリ実装
pub struct BookStore {
    db: MemoryDatabase,
}

impl BookStore {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookAvailabilityStoreTrait for BookStore {
    async fn create(&self, new_book: NewBook) -> Result<Book> {
        let mut tables = self.db.tables().lock().await;
        let now = Utc::now();

        let book = Book {
            id: tables.next_book_id(),
            title: new_book.title,
            author: new_book.author,
            description: new_book.description,
            quantity: new_book.quantity.value(),
            available: new_book.quantity.value(),
            created_at: now,
            updated_at: now,
        };
        tables.books.insert(book.id, book.clone());

        Ok(book)
    }

    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let tables = self.db.tables().lock().await;
        Ok(tables.books.get(&book_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Book>> {
        let tables = self.db.tables().lock().await;
        Ok(tables.books.values().cloned().collect())
    }

    async fn update(&self, book_id: BookId, changes: BookChanges) -> Result<Option<Book>> {
        let mut tables = self.db.tables().lock().await;

        let Some(current) = tables.books.get(&book_id) else {
            return Ok(None);
        };

        let updated = book::apply_changes(current, &changes, Utc::now());
        tables.books.insert(book_id, updated.clone());

        Ok(Some(updated))
    }

    async fn delete(&self, book_id: BookId) -> Result<DeleteOutcome> {
        let mut tables = self.db.tables().lock().await;

        if !tables.books.contains_key(&book_id) {
            return Ok(DeleteOutcome::NotFound);
        }
        if tables.loans.values().any(|loan| loan.book_id == book_id) {
            return Ok(DeleteOutcome::Referenced);
        }

        tables.books.remove(&book_id);
        Ok(DeleteOutcome::Deleted)
    }
}
