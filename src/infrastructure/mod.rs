//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;

pub use crypto::{BcryptPasswordHasher, TicketConfig};
pub use database::repositories::{PromotionRepository, UserRepository};
pub use database::{ensure_schema, init_database, DbSettings};
