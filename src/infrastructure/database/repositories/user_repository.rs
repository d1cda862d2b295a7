use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::user::normalize_email;
use crate::domain::{DomainError, DomainResult, Role, User, UserRepositoryInterface};
use crate::infrastructure::database::entities::{role, user};

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn role_model_to_domain(model: role::Model) -> Role {
    Role {
        id: model.role_id,
        name: model.role_name,
        description: model.description,
    }
}

fn user_model_to_domain(model: user::Model, role: Option<role::Model>) -> DomainResult<User> {
    let Some(role) = role else {
        return Err(DomainError::NotFound {
            entity: "Role",
            field: "role_id",
            value: model.role_id.to_string(),
        });
    };

    Ok(User {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone_number: model.phone_number,
        password_hash: model.password_hash,
        role: role_model_to_domain(role),
        is_active: model.is_active,
        email_confirmed: model.email_confirmed,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    /// Case-insensitive on every backend; rows written before emails were
    /// normalized still match through `LOWER(email)`.
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let found = user::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(user::Column::Email)))
                    .eq(normalize_email(email)),
            )
            .find_also_related(role::Entity)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        found
            .map(|(model, role)| user_model_to_domain(model, role))
            .transpose()
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let found = user::Entity::find_by_id(id)
            .find_also_related(role::Entity)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        found
            .map(|(model, role)| user_model_to_domain(model, role))
            .transpose()
    }
}
