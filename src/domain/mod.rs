//! Domain layer: entities, invariants and the trait contracts
//! (repositories, ports) the outer layers implement.

pub mod ports;
pub mod promotion;
pub mod role;
pub mod user;

pub use ports::{PasswordHashError, PasswordHasher};
pub use promotion::{NewPromotion, Promotion, PromotionRepositoryInterface};
pub use role::Role;
pub use user::{AuthenticatedIdentity, User, UserRepositoryInterface};

// Re-export DomainError from support for convenience
pub use crate::support::errors::{DomainError, DomainResult};
