use crate::domain::{
    UserId,
    user::{NewUser, User, UserChanges},
};
use crate::ports::DeleteOutcome;
use crate::ports::user_store::{Result, UserStore as UserStoreTrait};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

const USER_COLUMNS: &str = "id, name, email, password_hash, is_admin, created_at, updated_at";

fn map_row_to_user(row: &PgRow) -> User {
    User {
        id: UserId::from_i64(row.get("id")),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        is_admin: row.get("is_admin"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// UserStoreのPostgreSQL実装
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStoreTrait for UserStore {
    async fn create(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_row_to_user(&row))
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(map_row_to_user).collect())
    }

    async fn update(&self, user_id: UserId, changes: UserChanges) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET
                name = COALESCE($2::TEXT, name),
                password_hash = COALESCE($3::TEXT, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id.value())
        .bind(changes.name)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    async fn promote_to_admin(&self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET is_admin = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_user))
    }

    async fn delete(&self, user_id: UserId) -> Result<DeleteOutcome> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM loans WHERE user_id = $1)
            "#,
        )
        .bind(user_id.value())
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

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id.value())
                .fetch_one(&self.pool)
                .await?;

        Ok(if exists {
            DeleteOutcome::Referenced
        } else {
            DeleteOutcome::NotFound
        })
    }
}
