use crate::domain::{
    BookId, LoanId,
    book::Book,
    loan::{Loan, NewLoan},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// ユニットオブワークポート
///
/// 書籍在庫と貸出記録の両方にまたがる変更を1つのトランザクションにまとめる。
/// 貸出サービスはトランザクションを開始し、両方の変更を行ってから
/// 一括でコミットまたはロールバックする。
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// トランザクションを開始する
    async fn begin(&self) -> Result<Box<dyn LoanTransaction>>;
}

/// 貸出トランザクション
///
/// コミットせずにドロップした場合はロールバックされる。
#[async_trait]
pub trait LoanTransaction: Send {
    // ------------------------------------------------------------------
    // 書籍在庫
    // ------------------------------------------------------------------

    /// トランザクション内で書籍を取得する
    async fn find_book(&mut self, book_id: BookId) -> Result<Option<Book>>;

    /// 貸出可能冊数を1減らす
    ///
    /// 保存済みの値に対する相対更新で、`available > 0`の場合のみ適用する。
    /// 1冊確保できた場合はtrue。
    async fn decrement_available(&mut self, book_id: BookId) -> Result<bool>;

    /// 貸出可能冊数を1増やす（所蔵冊数を上限とする）
    async fn increment_available(&mut self, book_id: BookId) -> Result<()>;

    // ------------------------------------------------------------------
    // 貸出記録
    // ------------------------------------------------------------------

    /// 貸出を登録する
    async fn insert_loan(&mut self, loan: NewLoan) -> Result<Loan>;

    /// 貸出を取得し、コミットまで他のトランザクションからの更新を止める
    async fn find_loan_for_update(&mut self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 貸出を返却済みにする
    ///
    /// 未返却の場合のみ`is_returned`と`returned_at`を同時に設定する。
    /// 更新した場合はtrue。
    async fn mark_returned(
        &mut self,
        loan_id: LoanId,
        returned_at: DateTime<Utc>,
    ) -> Result<bool>;

    // ------------------------------------------------------------------
    // 境界
    // ------------------------------------------------------------------

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}
