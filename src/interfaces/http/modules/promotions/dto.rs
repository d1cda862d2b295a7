//! Promotion DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Promotion;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PromotionDto {
    pub code: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "10.00")]
    pub discount_percentage: Decimal,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub is_active: bool,
    /// Usable right now
    pub redeemable: bool,
    /// Discount on `amount`, when one was given
    #[schema(value_type = Option<String>, example = "150.00")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Decimal>,
}

impl PromotionDto {
    pub fn new(promotion: Promotion, now: DateTime<Utc>, amount: Option<Decimal>) -> Self {
        let redeemable = promotion.is_redeemable_at(now);
        let discount_amount = amount
            .filter(|_| redeemable)
            .map(|amount| promotion.discount_for(amount));

        Self {
            code: promotion.code,
            description: promotion.description,
            discount_percentage: promotion.discount_percentage,
            valid_from: promotion.valid_from,
            valid_to: promotion.valid_to,
            is_active: promotion.is_active,
            redeemable,
            discount_amount,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PromotionQuery {
    /// Order amount to price the discount against
    #[param(value_type = Option<String>)]
    pub amount: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn promotion(active: bool) -> Promotion {
        let now = Utc::now();
        Promotion {
            id: 1,
            code: "SUMMER25".into(),
            description: Some("Summer special - 25% off".into()),
            discount_percentage: Decimal::new(2500, 2),
            valid_from: now - Duration::days(1),
            valid_to: now + Duration::days(59),
            is_active: active,
            created_at: now,
        }
    }

    #[test]
    fn prices_discount_for_redeemable_promotion() {
        let dto = PromotionDto::new(promotion(true), Utc::now(), Some(Decimal::new(15000, 2)));
        assert!(dto.redeemable);
        assert_eq!(dto.discount_amount, Some(Decimal::new(3750, 2)));
    }

    #[test]
    fn inactive_promotion_grants_nothing() {
        let dto = PromotionDto::new(promotion(false), Utc::now(), Some(Decimal::new(15000, 2)));
        assert!(!dto.redeemable);
        assert_eq!(dto.discount_amount, None);
    }
}
