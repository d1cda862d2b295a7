//! User aggregate
//!
//! Contains the User entity, the authenticated identity derived from it,
//! and the repository interface.

pub mod identity;
pub mod model;
pub mod repository;

pub use identity::AuthenticatedIdentity;
pub use model::{normalize_email, User};
pub use repository::UserRepositoryInterface;
