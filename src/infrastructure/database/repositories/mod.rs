//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories.

pub mod promotion_repository;
pub mod user_repository;

pub use promotion_repository::PromotionRepository;
pub use user_repository::UserRepository;
