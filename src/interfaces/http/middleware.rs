//! Cookie authentication and authorization guards for Axum
//!
//! `cookie_auth_middleware` runs on every request: a valid auth cookie
//! attaches a [`CurrentUser`] to the request extensions. Route groups then
//! opt into `require_authenticated` or `require_admin` via `route_layer`.

use axum::{
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{header, request::Parts, HeaderValue, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::{debug, warn};

use super::auth_cookie::{sets_auth_cookie, AuthCookieConfig, ACCESS_DENIED_PATH, LOGIN_PATH};
use crate::domain::AuthenticatedIdentity;

/// The signed-in user, as carried by the auth cookie
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthenticatedIdentity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());
        Err(redirect_to_login(&uri))
    }
}

/// Validate the auth cookie, attach the identity and slide the expiration.
pub async fn cookie_auth_middleware(
    State(cookies): State<AuthCookieConfig>,
    mut request: Request,
    next: Next,
) -> Response {
    let now = Utc::now();
    let mut renew = None;

    if let Some(claims) = cookies.read(request.headers()) {
        let identity = claims.identity();
        if claims.needs_renewal_at(now) {
            renew = Some(identity.clone());
        }
        request.extensions_mut().insert(CurrentUser(identity));
    }

    let mut response = next.run(request).await;

    // Login and logout write the cookie themselves
    if let Some(identity) = renew {
        if !sets_auth_cookie(response.headers()) {
            match cookies.issue_at(&identity, now) {
                Ok(cookie) => match HeaderValue::from_str(&cookie.to_string()) {
                    Ok(value) => {
                        debug!(user_id = %identity.user_id, "Auth cookie renewed");
                        response.headers_mut().append(header::SET_COOKIE, value);
                    }
                    Err(e) => warn!(error = %e, "Renewed auth cookie is not a valid header"),
                },
                Err(e) => warn!(error = %e, "Failed to renew auth cookie"),
            }
        }
    }

    response
}

/// Redirect anonymous requests to the login path.
pub async fn require_authenticated(request: Request, next: Next) -> Response {
    if request.extensions().get::<CurrentUser>().is_some() {
        return next.run(request).await;
    }
    redirect_to_login(&original_uri(&request))
}

/// Admin role required; others are sent to the access denied path.
pub async fn require_admin(request: Request, next: Next) -> Response {
    match request.extensions().get::<CurrentUser>() {
        Some(CurrentUser(identity)) if identity.is_admin() => next.run(request).await,
        Some(CurrentUser(identity)) => {
            debug!(user_id = %identity.user_id, role = %identity.role, "Access denied");
            Redirect::to(ACCESS_DENIED_PATH).into_response()
        }
        None => redirect_to_login(&original_uri(&request)),
    }
}

fn original_uri(request: &Request) -> Uri {
    request
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.clone())
        .unwrap_or_else(|| request.uri().clone())
}

fn redirect_to_login(uri: &Uri) -> Response {
    let return_url = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let location = format!("{LOGIN_PATH}?ReturnUrl={}", urlencoding::encode(return_url));
    Redirect::to(&location).into_response()
}

/// Only same-site paths are acceptable redirect targets after login.
pub fn is_local_url(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\")
}
