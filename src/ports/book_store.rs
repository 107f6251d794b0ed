use crate::domain::{
    BookId, Quantity,
    book::{Book, BookChanges, NewBook},
};
use async_trait::async_trait;

use super::DeleteOutcome;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍在庫ストアポート
///
/// 書籍ごとの所蔵冊数（quantity）と貸出可能冊数（available）を保持する。
/// 貸出・返却に伴う`available`の増減はこのポートではなく
/// `LoanTransaction`経由で行い、貸出記録の変更と同じトランザクションに載せる。
#[async_trait]
pub trait BookAvailabilityStore: Send + Sync {
    /// 書籍を登録する（`available = quantity`）
    async fn create(&self, book: NewBook) -> Result<Book>;

    /// IDで書籍を取得する
    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>>;

    /// 全書籍をID順に取得する
    async fn list(&self) -> Result<Vec<Book>>;

    /// 書籍を部分更新する
    ///
    /// 所蔵冊数の変更は差分を`available`に反映し、0未満にはしない。
    /// 読み取りと書き込みは1文で行い、同時に走る貸出・返却と競合しない。
    async fn update(&self, book_id: BookId, changes: BookChanges) -> Result<Option<Book>>;

    /// 所蔵冊数を変更する（管理者操作）
    async fn adjust_quantity(&self, book_id: BookId, quantity: Quantity) -> Result<Option<Book>> {
        self.update(book_id, BookChanges::quantity(quantity)).await
    }

    /// 書籍を削除する
    ///
    /// 貸出記録から参照されている書籍は削除せず`Referenced`を返す。
    /// 参照の確認と削除は不可分に行う。
    async fn delete(&self, book_id: BookId) -> Result<DeleteOutcome>;
}
