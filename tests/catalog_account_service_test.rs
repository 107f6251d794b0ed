use rusty_library_api::application::account::{self, AccountError, RegisterUser, UpdateUser};
use rusty_library_api::application::catalog::{self, CatalogError, CreateBook, UpdateBook};
use rusty_library_api::application::loan::create_loan;
use rusty_library_api::domain::commands::CreateLoan;
use rusty_library_api::domain::value_objects::*;

mod common;

use common::{days_from_now, memory_context, seed_book, seed_user};

fn registration(email: &str) -> RegisterUser {
    RegisterUser {
        name: "Alice".to_string(),
        email: email.to_string(),
        password: "correct horse".to_string(),
    }
}

// ============================================================================
// 蔵書管理
// ============================================================================

#[tokio::test]
async fn test_create_book_starts_fully_available() {
    let ctx = memory_context();

    let book = catalog::create_book(
        &ctx.deps,
        CreateBook {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            description: "Spice".to_string(),
            quantity: 4,
        },
    )
    .await
    .unwrap();

    assert_eq!(book.quantity, 4);
    assert_eq!(book.available, 4);
    assert_eq!(catalog::get_book(&ctx.deps, book.id).await.unwrap(), book);
}

#[tokio::test]
async fn test_create_book_rejects_zero_quantity() {
    let ctx = memory_context();

    let result = catalog::create_book(
        &ctx.deps,
        CreateBook {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            description: String::new(),
            quantity: 0,
        },
    )
    .await;

    assert!(matches!(result, Err(CatalogError::InvalidQuantity)));
    assert!(catalog::list_books(&ctx.deps).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_book_quantity_moves_available_by_delta() {
    let ctx = memory_context();
    let alice = seed_user(&ctx.deps, "Alice").await;
    let book = seed_book(&ctx.deps, "Dune", 3).await;

    create_loan(
        &ctx.deps,
        CreateLoan {
            user_id: alice.id,
            book_id: book.id,
            return_date: days_from_now(7),
            requested_at: chrono::Utc::now(),
        },
    )
    .await
    .unwrap();

    let grown = catalog::update_book(
        &ctx.deps,
        book.id,
        UpdateBook {
            quantity: Some(5),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!((grown.quantity, grown.available), (5, 4));

    let shrunk = catalog::update_book(
        &ctx.deps,
        book.id,
        UpdateBook {
            title: Some("Dune Messiah".to_string()),
            quantity: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(shrunk.title, "Dune Messiah");
    assert_eq!((shrunk.quantity, shrunk.available), (1, 0));
}

#[tokio::test]
async fn test_update_unknown_book_fails() {
    let ctx = memory_context();

    let result = catalog::update_book(
        &ctx.deps,
        BookId::from_i64(9),
        UpdateBook {
            title: Some("Nothing".to_string()),
            ..Default::default()
        },
    )
    .await;

    assert!(matches!(result, Err(CatalogError::BookNotFound)));
}

#[tokio::test]
async fn test_delete_book_with_loan_history_is_refused() {
    let ctx = memory_context();
    let alice = seed_user(&ctx.deps, "Alice").await;
    let loaned = seed_book(&ctx.deps, "Dune", 1).await;
    let unused = seed_book(&ctx.deps, "Emma", 1).await;

    create_loan(
        &ctx.deps,
        CreateLoan {
            user_id: alice.id,
            book_id: loaned.id,
            return_date: days_from_now(7),
            requested_at: chrono::Utc::now(),
        },
    )
    .await
    .unwrap();

    let result = catalog::delete_book(&ctx.deps, loaned.id).await;
    assert!(matches!(result, Err(CatalogError::BookInUse)));

    catalog::delete_book(&ctx.deps, unused.id).await.unwrap();
    let result = catalog::get_book(&ctx.deps, unused.id).await;
    assert!(matches!(result, Err(CatalogError::BookNotFound)));

    let result = catalog::delete_book(&ctx.deps, unused.id).await;
    assert!(matches!(result, Err(CatalogError::BookNotFound)));
}

// ============================================================================
// 利用者管理
// ============================================================================

#[tokio::test]
async fn test_register_then_authenticate() {
    let ctx = memory_context();

    let user = account::register(&ctx.deps, registration("alice@example.com"))
        .await
        .unwrap();

    assert!(!user.is_admin);
    assert_ne!(user.password_hash, "correct horse");

    let authenticated = account::authenticate(&ctx.deps, "alice@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(authenticated.id, user.id);

    let wrong_password =
        account::authenticate(&ctx.deps, "alice@example.com", "wrong horse").await;
    assert!(matches!(wrong_password, Err(AccountError::InvalidCredentials)));

    let unknown_email =
        account::authenticate(&ctx.deps, "bob@example.com", "correct horse").await;
    assert!(matches!(unknown_email, Err(AccountError::InvalidCredentials)));
}

#[tokio::test]
async fn test_register_duplicate_email_fails() {
    let ctx = memory_context();
    seed_user(&ctx.deps, "Alice").await;

    let result = account::register(&ctx.deps, registration("alice@example.com")).await;

    assert!(matches!(result, Err(AccountError::EmailAlreadyInUse)));
    assert_eq!(account::list_users(&ctx.deps).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_user_name_keeps_password() {
    let ctx = memory_context();
    let alice = seed_user(&ctx.deps, "Alice").await;

    let updated = account::update_user(
        &ctx.deps,
        alice.id,
        UpdateUser {
            name: Some("Alicia".to_string()),
            password: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "Alicia");
    assert_eq!(updated.password_hash, alice.password_hash);
}

#[tokio::test]
async fn test_promote_to_admin() {
    let ctx = memory_context();
    let alice = seed_user(&ctx.deps, "Alice").await;

    let promoted = account::promote_to_admin(&ctx.deps, alice.id).await.unwrap();
    assert!(promoted.is_admin);

    let result = account::promote_to_admin(&ctx.deps, UserId::from_i64(99)).await;
    assert!(matches!(result, Err(AccountError::UserNotFound)));
}

#[tokio::test]
async fn test_delete_user_with_loans_is_refused() {
    let ctx = memory_context();
    let alice = seed_user(&ctx.deps, "Alice").await;
    let bob = seed_user(&ctx.deps, "Bob").await;
    let book = seed_book(&ctx.deps, "Dune", 1).await;

    create_loan(
        &ctx.deps,
        CreateLoan {
            user_id: alice.id,
            book_id: book.id,
            return_date: days_from_now(7),
            requested_at: chrono::Utc::now(),
        },
    )
    .await
    .unwrap();

    let result = account::delete_user(&ctx.deps, alice.id).await;
    assert!(matches!(result, Err(AccountError::UserHasLoans)));

    account::delete_user(&ctx.deps, bob.id).await.unwrap();
    let result = account::get_user(&ctx.deps, bob.id).await;
    assert!(matches!(result, Err(AccountError::UserNotFound)));
}
