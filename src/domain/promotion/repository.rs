use async_trait::async_trait;

use super::Promotion;
use crate::domain::DomainResult;

#[async_trait]
pub trait PromotionRepositoryInterface: Send + Sync {
    /// Case-insensitive lookup by promotion code.
    async fn find_by_code(&self, code: &str) -> DomainResult<Option<Promotion>>;
    /// All promotions, newest validity window first.
    async fn list(&self) -> DomainResult<Vec<Promotion>>;
}
