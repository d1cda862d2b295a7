//! Account handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use tower_sessions::Session;
use tracing::{error, info, warn};

use super::dto::{LoginRequest, LoginResponse, UserInfo, UserProfile};
use crate::application::{AuthError, AuthService};
use crate::domain::{AuthenticatedIdentity, UserRepositoryInterface};
use crate::interfaces::http::auth_cookie::AuthCookieConfig;
use crate::interfaces::http::common::{
    api_error, internal_error, ApiError, ApiResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::{is_local_url, CurrentUser};
use crate::interfaces::http::session::session_keys;

/// Account state
#[derive(Clone)]
pub struct AccountState {
    pub auth_service: Arc<dyn AuthService>,
    pub users: Arc<dyn UserRepositoryInterface>,
    pub cookies: AuthCookieConfig,
}

#[utoipa::path(
    post,
    path = "/Account/Login",
    tag = "Account",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; auth and session cookies set", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid email or password"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn login(
    State(state): State<AccountState>,
    session: Session,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let identity = state
        .auth_service
        .authenticate(&request.email, &request.password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => api_error(StatusCode::UNAUTHORIZED, e.to_string()),
            AuthError::Unavailable => internal_error(),
        })?;

    start_session(&session, &identity).await.map_err(|e| {
        error!(error = %e, "Failed to start session");
        internal_error()
    })?;

    let cookie = state.cookies.issue(&identity).map_err(|e| {
        error!(error = %e, "Failed to issue auth cookie");
        internal_error()
    })?;

    let redirect_to = request
        .return_url
        .filter(|url| is_local_url(url))
        .unwrap_or_else(|| "/".to_string());

    info!(user_id = %identity.user_id, "User signed in");

    let body = LoginResponse {
        user: UserInfo::from(identity),
        redirect_to,
    };
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie.to_string())]),
        Json(ApiResponse::success(body)),
    )
        .into_response())
}

/// Fresh session id on every sign-in, then record who signed in.
async fn start_session(
    session: &Session,
    identity: &AuthenticatedIdentity,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::USER_ID, &identity.user_id)
        .await?;
    session
        .insert(session_keys::DISPLAY_NAME, &identity.display_name)
        .await?;
    session.insert(session_keys::ROLE, &identity.role).await?;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/Account/Logout",
    tag = "Account",
    responses(
        (status = 200, description = "Signed out; auth cookie cleared", body = ApiResponse<String>)
    )
)]
pub async fn logout(State(state): State<AccountState>, session: Session) -> Response {
    if let Err(e) = session.flush().await {
        warn!(error = %e, "Failed to flush session on logout");
    }

    (
        AppendHeaders([(header::SET_COOKIE, state.cookies.removal().to_string())]),
        Json(ApiResponse::success("Signed out".to_string())),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/Account/AccessDenied",
    tag = "Account",
    responses(
        (status = 403, description = "The signed-in user lacks the required role")
    )
)]
pub async fn access_denied() -> ApiError {
    api_error(StatusCode::FORBIDDEN, "Access denied")
}

#[utoipa::path(
    get,
    path = "/Account/Me",
    tag = "Account",
    responses(
        (status = 200, description = "Current user profile", body = ApiResponse<UserProfile>),
        (status = 303, description = "Not signed in; redirect to login")
    )
)]
pub async fn me(
    State(state): State<AccountState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let user = state
        .users
        .find_by_id(&identity.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load current user");
            internal_error()
        })?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "User not found"))?;

    Ok(Json(ApiResponse::success(UserProfile::from(user))))
}
