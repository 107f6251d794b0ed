mod account_service;
mod errors;
mod password;

pub use account_service::{
    RegisterUser, UpdateUser, authenticate, delete_user, get_user, list_users, promote_to_admin,
    register, update_user,
};
pub use errors::{AccountError, Result};
