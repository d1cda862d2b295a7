//! Credential authentication, application-layer orchestration
//!
//! HTTP handlers are thin wrappers that delegate to [`AuthService`].

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::domain::{AuthenticatedIdentity, PasswordHasher, UserRepositoryInterface};

/// Compared against when the email is unknown, so both failure paths
/// cost one bcrypt verification.
const TIMING_EQUALIZER: &str = "starevents-timing-equalizer";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, wrong password and disabled account all map here.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication is temporarily unavailable")]
    Unavailable,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check `email` + `password` against the stored user records.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedIdentity, AuthError>;
}

/// [`AuthService`] backed by the user repository and a password hasher.
///
/// Generic over `R: UserRepositoryInterface` so it stays decoupled from
/// the concrete persistence layer.
///
/// bcrypt runs on the blocking pool. The unknown-email path verifies against
/// a dummy hash made with the hasher's configured cost; stored hashes made
/// under a different `bcrypt_cost` take measurably longer or shorter until
/// they are re-hashed.
pub struct CredentialAuthService<R: UserRepositoryInterface> {
    repo: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    dummy_hash: Option<String>,
}

impl<R: UserRepositoryInterface> CredentialAuthService<R> {
    pub fn new(repo: Arc<R>, hasher: Arc<dyn PasswordHasher>) -> Self {
        let dummy_hash = hasher.hash_password(TIMING_EQUALIZER).ok();
        Self {
            repo,
            hasher,
            dummy_hash,
        }
    }

    async fn verify(&self, password: &str, hash: String) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| {
                error!(error = %e, "Password verification task failed");
                AuthError::Unavailable
            })
    }
}

#[async_trait]
impl<R: UserRepositoryInterface> AuthService for CredentialAuthService<R> {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let user = self.repo.find_by_email(email).await.map_err(|e| {
            error!(error = %e, "User lookup failed during login");
            AuthError::Unavailable
        })?;

        let Some(user) = user else {
            if let Some(dummy) = &self.dummy_hash {
                let _ = self.verify(password, dummy.clone()).await;
            }
            debug!("Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let valid = self.verify(password, user.password_hash.clone()).await?;
        if !valid || !user.is_active {
            debug!(user_id = %user.id, active = user.is_active, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, role = %user.role.name, "User authenticated");
        Ok(AuthenticatedIdentity::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::{ADMIN_ROLE, CUSTOMER_ROLE};
    use crate::domain::{DomainError, DomainResult, User};
    use crate::infrastructure::database::memory_database;
    use crate::infrastructure::database::repositories::user_repository::tests::insert_user;
    use crate::infrastructure::{BcryptPasswordHasher, UserRepository};

    fn hasher() -> Arc<dyn PasswordHasher> {
        Arc::new(BcryptPasswordHasher::new(4))
    }

    async fn service_with_user(
        email: &str,
        password: &str,
        role: &str,
        active: bool,
    ) -> CredentialAuthService<UserRepository> {
        let db = memory_database().await;
        let hasher = hasher();
        let hash = hasher.hash_password(password).unwrap();
        insert_user(&db, email, &hash, role, active).await;
        CredentialAuthService::new(Arc::new(UserRepository::new(db)), hasher)
    }

    #[tokio::test]
    async fn valid_credentials_return_identity() {
        let service = service_with_user("admin@starevents.lk", "Admin@123", ADMIN_ROLE, true).await;

        let identity = service
            .authenticate("admin@starevents.lk", "Admin@123")
            .await
            .unwrap();
        assert_eq!(identity.email, "admin@starevents.lk");
        assert_eq!(identity.display_name, "Nimal Perera");
        assert!(identity.is_admin());
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let service = service_with_user("user@example.lk", "secret-pass", CUSTOMER_ROLE, true).await;

        let wrong_password = service
            .authenticate("user@example.lk", "not-it")
            .await
            .unwrap_err();
        let unknown_email = service
            .authenticate("ghost@example.lk", "secret-pass")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn inactive_account_is_rejected_generically() {
        let service = service_with_user("off@example.lk", "secret-pass", CUSTOMER_ROLE, false).await;

        let err = service
            .authenticate("off@example.lk", "secret-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn mixed_case_email_signs_in_seeded_admin() {
        let db = memory_database().await;
        let hasher = hasher();
        crate::application::DatabaseSeeder::new(db.clone(), Arc::clone(&hasher))
            .seed()
            .await
            .unwrap();
        let service = CredentialAuthService::new(Arc::new(UserRepository::new(db)), hasher);

        let identity = service
            .authenticate("Admin@StarEvents.lk", "Admin@123")
            .await
            .unwrap();
        assert_eq!(identity.email, "admin@starevents.lk");
        assert!(identity.is_admin());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_logins_verify_off_the_runtime() {
        let service =
            Arc::new(service_with_user("busy@example.lk", "secret-pass", CUSTOMER_ROLE, true).await);

        let attempts = (0..8).map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let password = if i % 2 == 0 { "secret-pass" } else { "wrong" };
                service.authenticate("busy@example.lk", password).await.is_ok()
            })
        });
        let mut outcomes = Vec::new();
        for attempt in attempts {
            outcomes.push(attempt.await.unwrap());
        }

        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 4);
    }

    #[tokio::test]
    async fn dummy_hash_uses_configured_cost() {
        let service = service_with_user("cost@example.lk", "secret-pass", CUSTOMER_ROLE, true).await;
        let dummy = service.dummy_hash.as_deref().unwrap();
        assert!(dummy.starts_with("$2b$04$"));
    }

    struct FailingRepo;

    #[async_trait]
    impl UserRepositoryInterface for FailingRepo {
        async fn find_by_email(&self, _email: &str) -> DomainResult<Option<User>> {
            Err(DomainError::Storage("connection refused".into()))
        }

        async fn find_by_id(&self, _id: &str) -> DomainResult<Option<User>> {
            Err(DomainError::Storage("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn storage_failure_is_unavailable() {
        let service = CredentialAuthService::new(Arc::new(FailingRepo), hasher());
        let err = service.authenticate("a@b.lk", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Unavailable));
    }
}
