//! HTTP interface
//!
//! - `auth_cookie` / `session`: cookie-based sign-in state
//! - `middleware`: cookie authentication and role guards
//! - `modules`: request handlers per resource
//! - `router`: application router with Swagger documentation

pub mod auth_cookie;
pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod session;

pub use auth_cookie::AuthCookieConfig;
pub use router::{create_router, AppState};
