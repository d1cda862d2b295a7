use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::user_repository::db_err;
use crate::domain::promotion::normalize_code;
use crate::domain::{DomainResult, Promotion, PromotionRepositoryInterface};
use crate::infrastructure::database::entities::promotion;

pub struct PromotionRepository {
    db: DatabaseConnection,
}

impl PromotionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn promotion_model_to_domain(model: promotion::Model) -> Promotion {
    Promotion {
        id: model.promotion_id,
        code: model.promotion_code,
        description: model.description,
        discount_percentage: model.discount_percentage,
        valid_from: model.valid_from,
        valid_to: model.valid_to,
        is_active: model.is_active,
        created_at: model.created_at,
    }
}

#[async_trait]
impl PromotionRepositoryInterface for PromotionRepository {
    async fn find_by_code(&self, code: &str) -> DomainResult<Option<Promotion>> {
        let model = promotion::Entity::find()
            .filter(promotion::Column::PromotionCode.eq(normalize_code(code)))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(promotion_model_to_domain))
    }

    async fn list(&self) -> DomainResult<Vec<Promotion>> {
        let models = promotion::Entity::find()
            .order_by_desc(promotion::Column::ValidTo)
            .order_by_asc(promotion::Column::PromotionCode)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(promotion_model_to_domain).collect())
    }
}
