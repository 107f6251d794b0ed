use crate::application::ServiceDependencies;
use crate::domain::{
    UserId,
    user::{NewUser, User, UserChanges},
};
use crate::ports::DeleteOutcome;

use super::errors::{AccountError, Result};
use super::password::{hash_password, verify_password};

/// 利用者登録の入力
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// 利用者更新の入力（`None`は変更なし）
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// 利用者を登録する
///
/// メールアドレスは一意。登録直後は一般利用者（管理者ではない）。
pub async fn register(deps: &ServiceDependencies, input: RegisterUser) -> Result<User> {
    let existing = deps
        .user_store
        .find_by_email(&input.email)
        .await
        .map_err(AccountError::StoreFailure)?;

    if existing.is_some() {
        return Err(AccountError::EmailAlreadyInUse);
    }

    let password_hash = hash_password(&input.password)?;

    let user = deps
        .user_store
        .create(NewUser {
            name: input.name,
            email: input.email,
            password_hash,
        })
        .await
        .map_err(AccountError::StoreFailure)?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// メールアドレスとパスワードで認証する
pub async fn authenticate(
    deps: &ServiceDependencies,
    email: &str,
    password: &str,
) -> Result<User> {
    let user = deps
        .user_store
        .find_by_email(email)
        .await
        .map_err(AccountError::StoreFailure)?
        .ok_or(AccountError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
        tracing::warn!(user_id = %user.id, "Login rejected");
        return Err(AccountError::InvalidCredentials);
    }

    Ok(user)
}

pub async fn get_user(deps: &ServiceDependencies, user_id: UserId) -> Result<User> {
    deps.user_store
        .find_by_id(user_id)
        .await
        .map_err(AccountError::StoreFailure)?
        .ok_or(AccountError::UserNotFound)
}

pub async fn list_users(deps: &ServiceDependencies) -> Result<Vec<User>> {
    deps.user_store
        .list()
        .await
        .map_err(AccountError::StoreFailure)
}

/// 利用者の名前・パスワードを更新する
pub async fn update_user(
    deps: &ServiceDependencies,
    user_id: UserId,
    input: UpdateUser,
) -> Result<User> {
    let password_hash = input
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;

    let changes = UserChanges {
        name: input.name,
        password_hash,
    };

    deps.user_store
        .update(user_id, changes)
        .await
        .map_err(AccountError::StoreFailure)?
        .ok_or(AccountError::UserNotFound)
}

/// 利用者を削除する（管理者）
///
/// 貸出記録が残っている利用者は削除できない。
pub async fn delete_user(deps: &ServiceDependencies, user_id: UserId) -> Result<()> {
    let has_loans = deps
        .loan_store
        .exists_for_user(user_id)
        .await
        .map_err(AccountError::StoreFailure)?;

    if has_loans {
        return Err(AccountError::UserHasLoans);
    }

    // 確認後に貸出が登録された場合もストア側で拒否される
    let outcome = deps
        .user_store
        .delete(user_id)
        .await
        .map_err(AccountError::StoreFailure)?;

    match outcome {
        DeleteOutcome::Deleted => {}
        DeleteOutcome::NotFound => return Err(AccountError::UserNotFound),
        DeleteOutcome::Referenced => return Err(AccountError::UserHasLoans),
    }

    tracing::info!(user_id = %user_id, "User deleted");
    Ok(())
}

/// 利用者を管理者に昇格する（管理者）
pub async fn promote_to_admin(deps: &ServiceDependencies, user_id: UserId) -> Result<User> {
    let user = deps
        .user_store
        .promote_to_admin(user_id)
        .await
        .map_err(AccountError::StoreFailure)?
        .ok_or(AccountError::UserNotFound)?;

    tracing::info!(user_id = %user.id, "User promoted to admin");
    Ok(user)
}
