use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// A promotional discount code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: i32,
    pub code: String,
    pub description: Option<String>,
    pub discount_percentage: Decimal,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Active and `at` falls inside the validity window (both ends inclusive).
    pub fn is_redeemable_at(&self, at: DateTime<Utc>) -> bool {
        self.is_active && self.valid_from <= at && at <= self.valid_to
    }

    /// Discount granted on `amount`, rounded half-up to two decimal places.
    pub fn discount_for(&self, amount: Decimal) -> Decimal {
        (amount * self.discount_percentage / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// A promotion that has passed validation and is ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPromotion {
    pub code: String,
    pub description: Option<String>,
    pub discount_percentage: Decimal,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub is_active: bool,
}

impl NewPromotion {
    pub fn new(
        code: &str,
        description: Option<&str>,
        discount_percentage: Decimal,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let code = normalize_code(code);
        if code.is_empty() || code.len() > 50 {
            return Err(DomainError::Validation(
                "Promotion code must be 1-50 characters".into(),
            ));
        }
        validate_discount_percentage(discount_percentage)?;
        if valid_from > valid_to {
            return Err(DomainError::Validation(
                "Promotion validity window ends before it starts".into(),
            ));
        }

        Ok(Self {
            code,
            description: description.map(str::to_string),
            discount_percentage,
            valid_from,
            valid_to,
            is_active: true,
        })
    }
}

/// Discount percentage must lie in (0, 100].
pub fn validate_discount_percentage(percentage: Decimal) -> DomainResult<()> {
    if percentage <= Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        return Err(DomainError::Validation(format!(
            "Discount percentage must be greater than 0 and at most 100, got {}",
            percentage
        )));
    }
    Ok(())
}

/// Codes are stored upper-case without surrounding whitespace.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
