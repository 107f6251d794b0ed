use crate::domain::{BookId, LoanId, UserId, loan::LoanStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出ビュー
///
/// 書籍タイトルと利用者名を非正規化して持つ、呼び出し側向けの読み取り専用射影。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanView {
    pub id: LoanId,
    pub book_id: BookId,
    pub book_title: String,
    pub user_id: UserId,
    pub user_name: String,
    pub loan_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub is_returned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoanView {
    pub fn status(&self) -> LoanStatus {
        if self.is_returned {
            LoanStatus::Returned
        } else {
            LoanStatus::Open
        }
    }
}

/// 貸出記録ストアポート（読み取り側）
///
/// 貸出の作成と返却済みへの更新は`LoanTransaction`で行う。
/// ここでは書籍・利用者を結合した`LoanView`を返す。
#[async_trait]
pub trait LoanRecordStore: Send + Sync {
    /// IDで貸出を取得する
    async fn find_by_id(&self, loan_id: LoanId) -> Result<Option<LoanView>>;

    /// 利用者の全貸出（貸出中・返却済み）を登録順に取得する
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<LoanView>>;

    /// 書籍を参照する貸出が1件でもあるか
    ///
    /// 貸出記録は削除しないため、書籍削除の可否判定に使う。
    async fn exists_for_book(&self, book_id: BookId) -> Result<bool>;

    /// 利用者を参照する貸出が1件でもあるか
    async fn exists_for_user(&self, user_id: UserId) -> Result<bool>;
}
