mod catalog_service;
mod errors;

pub use catalog_service::{
    CreateBook, UpdateBook, create_book, delete_book, get_book, list_books, update_book,
};
pub use errors::{CatalogError, Result};
