use crate::domain::{BookId, LoanId, UserId, book::Book, loan::Loan, user::User};
use crate::ports::loan_store::LoanView;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// インメモリのテーブル群
///
/// BTreeMapのキー順がID順（＝登録順）になる。
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub books: BTreeMap<BookId, Book>,
    pub loans: BTreeMap<LoanId, Loan>,
    pub users: BTreeMap<UserId, User>,
    next_book_id: i64,
    next_loan_id: i64,
    next_user_id: i64,
}

impl Tables {
    pub fn next_book_id(&mut self) -> BookId {
        self.next_book_id += 1;
        BookId::from_i64(self.next_book_id)
    }

    pub fn next_loan_id(&mut self) -> LoanId {
        self.next_loan_id += 1;
        LoanId::from_i64(self.next_loan_id)
    }

    pub fn next_user_id(&mut self) -> UserId {
        self.next_user_id += 1;
        UserId::from_i64(self.next_user_id)
    }

    /// 書籍・利用者を結合した貸出ビュー
    ///
    /// どちらかが欠けている場合はNone（内部結合と同じ扱い）。
    pub fn loan_view(&self, loan: &Loan) -> Option<LoanView> {
        let book = self.books.get(&loan.book_id)?;
        let user = self.users.get(&loan.user_id)?;

        Some(LoanView {
            id: loan.id,
            book_id: loan.book_id,
            book_title: book.title.clone(),
            user_id: loan.user_id,
            user_name: user.name.clone(),
            loan_date: loan.loan_date,
            return_date: loan.return_date,
            returned_at: loan.returned_at,
            is_returned: loan.is_returned,
            created_at: loan.created_at,
            updated_at: loan.updated_at,
        })
    }
}

/// インメモリのデータベース
///
/// 全アダプターが同じテーブル群を共有する。
/// トランザクションはコミットまでロックを保持するため、直列化可能な分離レベルになる。
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn tables(&self) -> &Arc<Mutex<Tables>> {
        &self.tables
    }

    /// 現在の状態のコピー（テストでの検証用）
    pub async fn snapshot(&self) -> Tables {
        self.tables.lock().await.clone()
    }
}

/// インメモリアダプターのエラー
///
/// PostgreSQLの制約違反に相当する失敗を表す。
#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Unique violation: {0}")]
    UniqueViolation(String),
}
