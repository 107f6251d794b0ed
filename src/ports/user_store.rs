use crate::domain::{
    UserId,
    user::{NewUser, User, UserChanges},
};
use async_trait::async_trait;

use super::DeleteOutcome;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 利用者ストアポート
///
/// 貸出コンテキストの外側の協調者。登録・認証と管理者操作で使う。
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User>;

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>>;

    /// メールアドレスで検索する（ログイン・重複確認用）
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn list(&self) -> Result<Vec<User>>;

    async fn update(&self, user_id: UserId, changes: UserChanges) -> Result<Option<User>>;

    /// 管理者に昇格する
    async fn promote_to_admin(&self, user_id: UserId) -> Result<Option<User>>;

    /// 利用者を削除する（貸出記録から参照されていれば`Referenced`）
    async fn delete(&self, user_id: UserId) -> Result<DeleteOutcome>;
}
