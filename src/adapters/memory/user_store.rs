use crate::domain::{
    UserId,
    user::{NewUser, User, UserChanges},
};
use crate::ports::DeleteOutcome;
use crate::ports::user_store::{Result, UserStore as UserStoreTrait};
use async_trait::async_trait;
use chrono::Utc;

use super::database::{MemoryDatabase, MemoryStoreError};

/// UserStoreのインメモリ実装
pub struct UserStore {
    db: MemoryDatabase,
}

impl UserStore {
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStoreTrait for UserStore {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut tables = self.db.tables().lock().await;

        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(MemoryStoreError::UniqueViolation(format!(
                "users.email = {}",
                new_user.email
            ))
            .into());
        }

        let now = Utc::now();
        let user = User {
            id: tables.next_user_id(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        let tables = self.db.tables().lock().await;
        Ok(tables.users.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.db.tables().lock().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        let tables = self.db.tables().lock().await;
        Ok(tables.users.values().cloned().collect())
    }

    async fn update(&self, user_id: UserId, changes: UserChanges) -> Result<Option<User>> {
        let mut tables = self.db.tables().lock().await;

        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn promote_to_admin(&self, user_id: UserId) -> Result<Option<User>> {
        let mut tables = self.db.tables().lock().await;

        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(None);
        };
        user.is_admin = true;
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete(&self, user_id: UserId) -> Result<DeleteOutcome> {
        let mut tables = self.db.tables().lock().await;

        if !tables.users.contains_key(&user_id) {
            return Ok(DeleteOutcome::NotFound);
        }
        if tables.loans.values().any(|loan| loan.user_id == user_id) {
            return Ok(DeleteOutcome::Referenced);
        }

        tables.users.remove(&user_id);
        Ok(DeleteOutcome::Deleted)
    }
}
