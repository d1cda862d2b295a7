//! Auth cookie ticket
//!
//! The identity established at login travels in the auth cookie as an
//! HS256-signed JWT. The lifetime slides: once more than half of it has
//! elapsed, the HTTP layer re-issues a fresh ticket.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::AuthenticatedIdentity;

/// Ticket signing configuration
#[derive(Clone)]
pub struct TicketConfig {
    /// Secret key for signing tickets
    pub secret: String,
    /// Ticket lifetime
    pub lifetime: Duration,
    /// Issuer claim
    pub issuer: String,
}

impl TicketConfig {
    pub fn new(secret: impl Into<String>, lifetime_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            lifetime: Duration::hours(lifetime_hours),
            issuer: "starevents".to_string(),
        }
    }
}

impl std::fmt::Debug for TicketConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketConfig")
            .field("lifetime", &self.lifetime)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

/// Claims carried by the auth cookie
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TicketClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// Display name
    pub name: String,
    /// Role name
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl TicketClaims {
    pub fn new(identity: &AuthenticatedIdentity, config: &TicketConfig, now: DateTime<Utc>) -> Self {
        Self {
            sub: identity.user_id.clone(),
            email: identity.email.clone(),
            name: identity.display_name.clone(),
            role: identity.role.clone(),
            exp: (now + config.lifetime).timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    /// Sliding expiration: renew once more than half the lifetime is spent.
    pub fn needs_renewal_at(&self, now: DateTime<Utc>) -> bool {
        let half_life = (self.exp - self.iat) / 2;
        now.timestamp() - self.iat > half_life
    }

    pub fn identity(&self) -> AuthenticatedIdentity {
        AuthenticatedIdentity {
            user_id: self.sub.clone(),
            email: self.email.clone(),
            display_name: self.name.clone(),
            role: self.role.clone(),
        }
    }
}

/// Issue a ticket for `identity`, valid from `now`
pub fn issue_ticket(
    identity: &AuthenticatedIdentity,
    config: &TicketConfig,
    now: DateTime<Utc>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = TicketClaims::new(identity, config, now);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature, issuer and expiry, returning the claims
pub fn verify_ticket(
    token: &str,
    config: &TicketConfig,
) -> Result<TicketClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);
    validation.leeway = 0;

    let token_data = decode::<TicketClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}
