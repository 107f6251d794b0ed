use crate::domain::{
    BookId,
    book::{Book, BookChanges, NewBook},
};
use crate::ports::DeleteOutcome;
use crate::ports::book_store::{BookAvailabilityStore as BookAvailabilityStoreTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

pub(super) const BOOK_COLUMNS: &str =
    "id, title, author, description, quantity, available, created_at, updated_at";

/// PostgreSQLの行データをBookに変換する
pub(super) fn map_row_to_book(row: &PgRow) -> Book {
    Book {
        id: BookId::from_i64(row.get("id")),
        title: row.get("title"),
        author: row.get("author"),
        description: row.get("description"),
        quantity: row.get("quantity"),
        available: row.get("available"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// BookAvailabilityStoreのPostgreSQL実装
///
/// `available`の変更はすべて保存済みの値に対する相対更新として1文で行う。
pub struct BookStore {
    pool: PgPool,
}

impl BookStore {
    /// PostgreSQLコネクションプールから新しいBookStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookAvailabilityStoreTrait for BookStore {
    async fn create(&self, book: NewBook) -> Result<Book> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO books (title, author, description, quantity, available)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.quantity.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(map_row_to_book(&row))
    }

    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"))
            .bind(book_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn list(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(map_row_to_book).collect())
    }

    /// 書籍を部分更新する
    ///
    /// 所蔵冊数の差分を`available`に加算し、`[0, quantity]`に収める。
    /// SET句の右辺は更新前の値を参照する。
    async fn update(&self, book_id: BookId, changes: BookChanges) -> Result<Option<Book>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE books
            SET
                title = COALESCE($2::TEXT, title),
                author = COALESCE($3::TEXT, author),
                description = COALESCE($4::TEXT, description),
                available = CASE
                    WHEN $5::INTEGER IS NULL THEN available
                    ELSE LEAST(GREATEST(available + ($5::INTEGER - quantity), 0), $5::INTEGER)
                END,
                quantity = COALESCE($5::INTEGER, quantity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(book_id.value())
        .bind(changes.title)
        .bind(changes.author)
        .bind(changes.description)
        .bind(changes.quantity.map(|q| q.value()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn delete(&self, book_id: BookId) -> Result<DeleteOutcome> {
        let result = sqlx::query(
            r#"
            DELETE FROM books
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM loans WHERE book_id = $1)
            "#,
        )
        .bind(book_id.value())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => return Ok(DeleteOutcome::Deleted),
            Ok(_) => {}
            Err(err) if super::is_foreign_key_violation(&err) => {
                return Ok(DeleteOutcome::Referenced);
            }
            Err(err) => return Err(err.into()),
        }

        // 行が残っていれば貸出から参照されている
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM books WHERE id = $1)")
                .bind(book_id.value())
                .fetch_one(&self.pool)
                .await?;

        Ok(if exists {
            DeleteOutcome::Referenced
        } else {
            DeleteOutcome::NotFound
        })
    }
}
