use crate::domain::{BookId, LoanId, UserId};
use crate::ports::loan_store::{LoanRecordStore as LoanRecordStoreTrait, LoanView, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

/// 書籍・利用者を結合した貸出ビューのSELECT句
const LOAN_VIEW_SELECT: &str = r#"
    SELECT
        l.id,
        l.book_id,
        b.title AS book_title,
        l.user_id,
        u.name AS user_name,
        l.loan_date,
        l.return_date,
        l.returned_at,
        l.is_returned,
        l.created_at,
        l.updated_at
    FROM loans l
    JOIN books b ON b.id = l.book_id
    JOIN users u ON u.id = l.user_id
"#;

/// PostgreSQLの行データをLoanViewに変換する
fn map_row_to_loan_view(row: &PgRow) -> LoanView {
    LoanView {
        id: LoanId::from_i64(row.get("id")),
        book_id: BookId::from_i64(row.get("book_id")),
        book_title: row.get("book_title"),
        user_id: UserId::from_i64(row.get("user_id")),
        user_name: row.get("user_name"),
        loan_date: row.get("loan_date"),
        return_date: row.get("return_date"),
        returned_at: row.get("returned_at"),
        is_returned: row.get("is_returned"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// LoanRecordStoreのPostgreSQL実装
///
/// 貸出ビューは書籍・利用者と結合して1クエリで取得する。
pub struct LoanStore {
    pool: PgPool,
}

impl LoanStore {
    /// PostgreSQLコネクションプールから新しいLoanStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanRecordStoreTrait for LoanStore {
    async fn find_by_id(&self, loan_id: LoanId) -> Result<Option<LoanView>> {
        let row = sqlx::query(&format!("{LOAN_VIEW_SELECT} WHERE l.id = $1"))
            .bind(loan_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_loan_view))
    }

    /// 利用者の全貸出（登録順）
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<LoanView>> {
        let rows = sqlx::query(&format!(
            "{LOAN_VIEW_SELECT} WHERE l.user_id = $1 ORDER BY l.id ASC"
        ))
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_loan_view).collect())
    }

    async fn exists_for_book(&self, book_id: BookId) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM loans WHERE book_id = $1)")
                .bind(book_id.value())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_for_user(&self, user_id: UserId) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM loans WHERE user_id = $1)")
                .bind(user_id.value())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
