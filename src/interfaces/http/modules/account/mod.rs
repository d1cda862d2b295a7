//! Account module: login, logout, access denied, current user

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
