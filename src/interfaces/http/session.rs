//! Server-side session
//!
//! Sessions live in process memory and expire after a period of
//! inactivity. The session cookie is HTTP-only and required for the
//! application to work.

use tower_sessions::cookie::{time, SameSite};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::SecurityConfig;

pub const SESSION_COOKIE_NAME: &str = ".StarEvents.Session";

/// Keys stored in the session after login
pub mod session_keys {
    pub const USER_ID: &str = "user_id";
    pub const DISPLAY_NAME: &str = "display_name";
    pub const ROLE: &str = "role";
}

pub fn create_session_layer(security: &SecurityConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            security.session_idle_minutes,
        )))
        .with_secure(security.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
