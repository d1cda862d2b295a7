//! Auth cookie
//!
//! The signed-in identity lives in an HTTP-only cookie holding a signed
//! ticket (see [`crate::infrastructure::crypto::jwt`]). The cookie is
//! valid for the ticket lifetime and slides on activity.

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use tower_sessions::cookie::{time, Cookie, SameSite};

use crate::config::SecurityConfig;
use crate::domain::AuthenticatedIdentity;
use crate::infrastructure::crypto::{issue_ticket, verify_ticket, TicketClaims, TicketConfig};

pub const AUTH_COOKIE_NAME: &str = ".StarEvents.Auth";

pub const LOGIN_PATH: &str = "/Account/Login";
pub const LOGOUT_PATH: &str = "/Account/Logout";
pub const ACCESS_DENIED_PATH: &str = "/Account/AccessDenied";

#[derive(Clone, Debug)]
pub struct AuthCookieConfig {
    pub ticket: TicketConfig,
    /// Emit the `Secure` attribute
    pub secure: bool,
}

impl AuthCookieConfig {
    pub fn from_security(security: &SecurityConfig) -> Self {
        Self {
            ticket: TicketConfig::new(
                security.ticket_secret.clone(),
                security.ticket_lifetime_hours,
            ),
            secure: security.secure_cookies,
        }
    }

    /// Build a fresh auth cookie for `identity`.
    pub fn issue(
        &self,
        identity: &AuthenticatedIdentity,
    ) -> Result<Cookie<'static>, jsonwebtoken::errors::Error> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(
        &self,
        identity: &AuthenticatedIdentity,
        now: DateTime<Utc>,
    ) -> Result<Cookie<'static>, jsonwebtoken::errors::Error> {
        let token = issue_ticket(identity, &self.ticket, now)?;

        Ok(Cookie::build((AUTH_COOKIE_NAME, token))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.ticket.lifetime.num_seconds()))
            .build())
    }

    /// Cookie that clears the auth cookie in the browser.
    pub fn removal(&self) -> Cookie<'static> {
        Cookie::build((AUTH_COOKIE_NAME, ""))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::ZERO)
            .build()
    }

    /// Claims of a valid, unexpired ticket in the request cookies.
    pub fn read(&self, headers: &HeaderMap) -> Option<TicketClaims> {
        let token = find_cookie(headers, AUTH_COOKIE_NAME)?;
        verify_ticket(&token, &self.ticket).ok()
    }
}

fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// Whether `headers` already carry a `Set-Cookie` for the auth cookie.
pub fn sets_auth_cookie(headers: &HeaderMap) -> bool {
    let prefix = format!("{AUTH_COOKIE_NAME}=");
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}
