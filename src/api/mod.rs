pub mod auth;
pub mod book_handlers;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod types;
pub mod user_handlers;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use types::*;
