use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, Quantity};

/// Book集約 - カタログ上の1タイトルと、その所蔵・在庫冊数
///
/// 不変条件：`0 <= available <= quantity`
///
/// `available`を変更するのは貸出・返却のトランザクションと、
/// 所蔵冊数の変更（`adjusted_available`）のみ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub description: String,
    /// 所蔵冊数
    pub quantity: i32,
    /// 貸出可能な冊数
    pub available: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// 1冊以上貸出可能か
    pub fn has_available_copy(&self) -> bool {
        self.available > 0
    }

    /// 貸出中の冊数
    pub fn copies_on_loan(&self) -> i32 {
        (self.quantity - self.available).max(0)
    }
}

/// 新規登録する書籍
///
/// 登録時点では全冊が貸出可能（`available = quantity`）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub quantity: Quantity,
}

/// 書籍の部分更新
///
/// `None`のフィールドは変更しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<Quantity>,
}

impl BookChanges {
    /// 所蔵冊数のみを変更する
    pub fn quantity(quantity: Quantity) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.description.is_none()
            && self.quantity.is_none()
    }
}

/// 純粋関数：所蔵冊数の変更に合わせた貸出可能冊数
///
/// 増減分をそのまま`available`に反映し、0未満にはしない。
/// 貸出中の冊数が新しい所蔵冊数を上回る場合は0になる。
pub fn adjusted_available(available: i32, quantity: i32, new_quantity: Quantity) -> i32 {
    let delta = new_quantity.value() - quantity;
    (available + delta).clamp(0, new_quantity.value())
}

/// 純粋関数：返却1冊分を戻した貸出可能冊数
///
/// 所蔵冊数を超えない。貸出中に所蔵冊数が減らされていた場合、
/// 超過分の返却は在庫に加算されない。
pub fn restored_available(available: i32, quantity: i32) -> i32 {
    (available + 1).min(quantity)
}

/// 純粋関数：書籍に変更を適用する
pub fn apply_changes(book: &Book, changes: &BookChanges, updated_at: DateTime<Utc>) -> Book {
    let mut updated = book.clone();

    if let Some(title) = &changes.title {
        updated.title = title.clone();
    }
    if let Some(author) = &changes.author {
        updated.author = author.clone();
    }
    if let Some(description) = &changes.description {
        updated.description = description.clone();
    }
    if let Some(quantity) = changes.quantity {
        updated.available = adjusted_available(book.available, book.quantity, quantity);
        updated.quantity = quantity.value();
    }
    updated.updated_at = updated_at;

    updated
}
