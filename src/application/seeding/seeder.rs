//! Database seeder
//!
//! Ensures the schema exists, then inserts the baseline administrator and
//! the launch promotions. Every step checks for existing rows first, so
//! repeated runs never duplicate anything.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::seed_data::{
    launch_promotions, ADMIN_EMAIL, ADMIN_FIRST_NAME, ADMIN_LAST_NAME, ADMIN_PASSWORD, ADMIN_PHONE,
};
use crate::domain::role::ADMIN_ROLE;
use crate::domain::user::normalize_email;
use crate::domain::{DomainError, PasswordHashError, PasswordHasher};
use crate::infrastructure::database::ensure_schema;
use crate::infrastructure::database::entities::{promotion, role, user};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error while seeding: {0}")]
    Database(#[from] DbErr),

    #[error(transparent)]
    Hash(#[from] PasswordHashError),

    #[error("Invalid seed data: {0}")]
    InvalidData(#[from] DomainError),
}

/// What a seeding run changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub promotions_inserted: usize,
}

pub struct DatabaseSeeder {
    db: DatabaseConnection,
    hasher: Arc<dyn PasswordHasher>,
}

impl DatabaseSeeder {
    pub fn new(db: DatabaseConnection, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { db, hasher }
    }

    pub async fn seed(&self) -> Result<SeedReport, SeedError> {
        ensure_schema(&self.db).await?;

        let admin_created = self.seed_admin().await?;
        let promotions_inserted = self.seed_promotions(Utc::now()).await?;

        Ok(SeedReport {
            admin_created,
            promotions_inserted,
        })
    }

    /// Create the admin account unless it exists. Requires the Admin role;
    /// without it nothing is created.
    async fn seed_admin(&self) -> Result<bool, SeedError> {
        let email = normalize_email(ADMIN_EMAIL);
        let txn = self.db.begin().await?;

        let existing = user::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(user::Column::Email))).eq(email.as_str()),
            )
            .count(&txn)
            .await?;
        if existing > 0 {
            debug!(email = ADMIN_EMAIL, "Admin user already present");
            txn.commit().await?;
            return Ok(false);
        }

        let admin_role = role::Entity::find()
            .filter(role::Column::RoleName.eq(ADMIN_ROLE))
            .one(&txn)
            .await?;
        let Some(admin_role) = admin_role else {
            warn!(role = ADMIN_ROLE, "Role missing, skipping admin user creation");
            txn.commit().await?;
            return Ok(false);
        };

        let now = Utc::now();
        user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            first_name: Set(ADMIN_FIRST_NAME.to_string()),
            last_name: Set(ADMIN_LAST_NAME.to_string()),
            email: Set(email),
            password_hash: Set(self.hasher.hash_password(ADMIN_PASSWORD)?),
            phone_number: Set(Some(ADMIN_PHONE.to_string())),
            role_id: Set(admin_role.role_id),
            is_active: Set(true),
            email_confirmed: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(email = ADMIN_EMAIL, "Default admin created");
        Ok(true)
    }

    /// Insert the launch promotions only when the table is empty.
    async fn seed_promotions(&self, now: DateTime<Utc>) -> Result<usize, SeedError> {
        let txn = self.db.begin().await?;

        let existing = promotion::Entity::find().count(&txn).await?;
        if existing > 0 {
            debug!(existing, "Promotions already present, skipping");
            txn.commit().await?;
            return Ok(0);
        }

        let promotions = launch_promotions(now)?;
        let count = promotions.len();
        let models = promotions.into_iter().map(|p| promotion::ActiveModel {
            promotion_code: Set(p.code),
            description: Set(p.description),
            discount_percentage: Set(p.discount_percentage),
            valid_from: Set(p.valid_from),
            valid_to: Set(p.valid_to),
            is_active: Set(p.is_active),
            created_at: Set(now),
            ..Default::default()
        });

        promotion::Entity::insert_many(models).exec(&txn).await?;
        txn.commit().await?;

        info!(count, "Seeded promotional codes");
        Ok(count)
    }
}

/// Startup error boundary: seeding failures are logged, never propagated.
pub async fn run_seeder(seeder: &DatabaseSeeder) -> Option<SeedReport> {
    match seeder.seed().await {
        Ok(report) => {
            info!(
                admin_created = report.admin_created,
                promotions_inserted = report.promotions_inserted,
                "Database seeding finished"
            );
            Some(report)
        }
        Err(e) => {
            error!(error = %e, "An error occurred while seeding the database");
            None
        }
    }
}
