//! Promotions module: public code lookup and admin listing

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
