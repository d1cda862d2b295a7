//! Promotion aggregate

pub mod model;
pub mod repository;

pub use model::{normalize_code, validate_discount_percentage, NewPromotion, Promotion};
pub use repository::PromotionRepositoryInterface;
