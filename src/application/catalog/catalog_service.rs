use crate::application::ServiceDependencies;
use crate::domain::{
    BookId, Quantity,
    book::{Book, BookChanges, NewBook},
};
use crate::ports::DeleteOutcome;

use super::errors::{CatalogError, Result};

/// 書籍登録の入力
#[derive(Debug, Clone)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub quantity: i32,
}

/// 書籍更新の入力（`None`は変更なし）
#[derive(Debug, Clone, Default)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
}

/// 書籍を登録する（管理者）
///
/// 登録直後は全冊が貸出可能。
pub async fn create_book(deps: &ServiceDependencies, input: CreateBook) -> Result<Book> {
    let quantity = Quantity::try_from(input.quantity)?;

    let book = deps
        .book_store
        .create(NewBook {
            title: input.title,
            author: input.author,
            description: input.description,
            quantity,
        })
        .await
        .map_err(CatalogError::StoreFailure)?;

    tracing::info!(book_id = %book.id, quantity = book.quantity, "Book created");

    Ok(book)
}

pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.book_store
        .find_by_id(book_id)
        .await
        .map_err(CatalogError::StoreFailure)?
        .ok_or(CatalogError::BookNotFound)
}

pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.book_store
        .list()
        .await
        .map_err(CatalogError::StoreFailure)
}

/// 書籍を更新する（管理者）
///
/// 所蔵冊数を変更した場合、貸出可能冊数は差分だけ増減する（0未満にはならない）。
pub async fn update_book(
    deps: &ServiceDependencies,
    book_id: BookId,
    input: UpdateBook,
) -> Result<Book> {
    let quantity = input.quantity.map(Quantity::try_from).transpose()?;

    let changes = BookChanges {
        title: input.title,
        author: input.author,
        description: input.description,
        quantity,
    };

    if changes.is_empty() {
        return get_book(deps, book_id).await;
    }

    let book = deps
        .book_store
        .update(book_id, changes)
        .await
        .map_err(CatalogError::StoreFailure)?
        .ok_or(CatalogError::BookNotFound)?;

    tracing::info!(
        book_id = %book.id,
        quantity = book.quantity,
        available = book.available,
        "Book updated"
    );

    Ok(book)
}

/// 書籍を削除する（管理者）
///
/// 貸出記録は削除しないため、一度でも貸し出された書籍は削除できない。
pub async fn delete_book(deps: &ServiceDependencies, book_id: BookId) -> Result<()> {
    let has_loans = deps
        .loan_store
        .exists_for_book(book_id)
        .await
        .map_err(CatalogError::StoreFailure)?;

    if has_loans {
        return Err(CatalogError::BookInUse);
    }

    // 確認後に貸出が登録された場合もストア側で拒否される
    let outcome = deps
        .book_store
        .delete(book_id)
        .await
        .map_err(CatalogError::StoreFailure)?;

    match outcome {
        DeleteOutcome::Deleted => {}
        DeleteOutcome::NotFound => return Err(CatalogError::BookNotFound),
        DeleteOutcome::Referenced => return Err(CatalogError::BookInUse),
    }

    tracing::info!(book_id = %book_id, "Book deleted");
    Ok(())
}
