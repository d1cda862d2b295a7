//! Baseline rows inserted on first run

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::domain::{DomainResult, NewPromotion};

pub const ADMIN_EMAIL: &str = "admin@starevents.lk";
pub const ADMIN_PASSWORD: &str = "Admin@123";
pub const ADMIN_FIRST_NAME: &str = "System";
pub const ADMIN_LAST_NAME: &str = "Administrator";
pub const ADMIN_PHONE: &str = "0771234567";

/// (code, description, percentage, validity in days)
const PROMOTIONS: [(&str, &str, i64, i64); 4] = [
    ("WELCOME10", "Welcome discount - 10% off", 10, 30),
    ("SUMMER25", "Summer special - 25% off", 25, 60),
    ("EARLYBIRD15", "Early bird discount - 15% off", 15, 90),
    ("VIP20", "VIP discount - 20% off", 20, 365),
];

/// The four launch promotions, all valid from `now`.
pub fn launch_promotions(now: DateTime<Utc>) -> DomainResult<Vec<NewPromotion>> {
    PROMOTIONS
        .iter()
        .map(|&(code, description, percentage, days)| {
            NewPromotion::new(
                code,
                Some(description),
                Decimal::new(percentage * 100, 2),
                now,
                now + Duration::days(days),
            )
        })
        .collect()
}
