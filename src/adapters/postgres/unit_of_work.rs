use crate::domain::{
    BookId, LoanId, UserId,
    book::Book,
    loan::{Loan, NewLoan},
};
use crate::ports::unit_of_work::{
    LoanTransaction as LoanTransactionTrait, Result, UnitOfWork as UnitOfWorkTrait,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use super::book_store::{BOOK_COLUMNS, map_row_to_book};

const LOAN_COLUMNS: &str =
    "id, user_id, book_id, loan_date, return_date, returned_at, is_returned, created_at, updated_at";

/// PostgreSQLの行データをLoanに変換する
fn map_row_to_loan(row: &PgRow) -> Loan {
    Loan {
        id: LoanId::from_i64(row.get("id")),
        user_id: UserId::from_i64(row.get("user_id")),
        book_id: BookId::from_i64(row.get("book_id")),
        loan_date: row.get("loan_date"),
        return_date: row.get("return_date"),
        returned_at: row.get("returned_at"),
        is_returned: row.get("is_returned"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// UnitOfWorkのPostgreSQL実装
///
/// 既定のREAD COMMITTEDで動作する。同じ書籍への同時更新は
/// UPDATE文の行ロックで直列化され、後続側はコミット後の値でWHERE句を再評価する。
pub struct UnitOfWork {
    pool: PgPool,
}

impl UnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkTrait for UnitOfWork {
    async fn begin(&self) -> Result<Box<dyn LoanTransactionTrait>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(LoanTransaction { tx }))
    }
}

/// sqlxトランザクションをラップした貸出トランザクション
///
/// コミットせずにドロップした場合、sqlxがロールバックする。
pub struct LoanTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LoanTransactionTrait for LoanTransaction {
    async fn find_book(&mut self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"))
            .bind(book_id.value())
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    /// 条件付きの相対更新
    ///
    /// 読み取った値を書き戻すのではなく、保存済みの値から1引く。
    /// 並行する貸出が先にコミットして0になった場合、更新行数は0になる。
    async fn decrement_available(&mut self, book_id: BookId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET available = available - 1, updated_at = NOW()
            WHERE id = $1 AND available > 0
            "#,
        )
        .bind(book_id.value())
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn increment_available(&mut self, book_id: BookId) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE books
            SET available = LEAST(available + 1, quantity), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(book_id.value())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn insert_loan(&mut self, loan: NewLoan) -> Result<Loan> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO loans (
                user_id,
                book_id,
                loan_date,
                return_date,
                is_returned,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, FALSE, $3, $3)
            RETURNING {LOAN_COLUMNS}
            "#
        ))
        .bind(loan.user_id.value())
        .bind(loan.book_id.value())
        .bind(loan.loan_date)
        .bind(loan.return_date)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(map_row_to_loan(&row))
    }

    async fn find_loan_for_update(&mut self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(&format!(
            "SELECT {LOAN_COLUMNS} FROM loans WHERE id = $1 FOR UPDATE"
        ))
        .bind(loan_id.value())
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.as_ref().map(map_row_to_loan))
    }

    /// 未返却の場合のみ返却済みにする
    async fn mark_returned(
        &mut self,
        loan_id: LoanId,
        returned_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET is_returned = TRUE, returned_at = $2, updated_at = $2
            WHERE id = $1 AND is_returned = FALSE
            "#,
        )
        .bind(loan_id.value())
        .bind(returned_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let LoanTransaction { tx } = *self;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let LoanTransaction { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}
