//! HTTP router with Swagger UI

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::auth_cookie::{AuthCookieConfig, AUTH_COOKIE_NAME};
use super::common::ApiResponse;
use super::middleware::{cookie_auth_middleware, require_admin, require_authenticated};
use super::modules::{account, health, promotions};
use super::session::create_session_layer;
use crate::application::{AuthService, CredentialAuthService};
use crate::config::AppConfig;
use crate::domain::{PasswordHasher, PromotionRepositoryInterface, UserRepositoryInterface};
use crate::infrastructure::{PromotionRepository, UserRepository};

/// HSTS max-age: 30 days
const HSTS_VALUE: &str = "max-age=2592000";

/// Shared state; each handler extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub auth_service: Arc<dyn AuthService>,
    pub users: Arc<dyn UserRepositoryInterface>,
    pub promotions: Arc<dyn PromotionRepositoryInterface>,
    pub cookies: AuthCookieConfig,
    pub started_at: Arc<Instant>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        hasher: Arc<dyn PasswordHasher>,
        cookies: AuthCookieConfig,
    ) -> Self {
        let users = Arc::new(UserRepository::new(db.clone()));
        let auth_service = CredentialAuthService::new(Arc::clone(&users), hasher);

        Self {
            promotions: Arc::new(PromotionRepository::new(db.clone())),
            db,
            auth_service: Arc::new(auth_service),
            users,
            cookies,
            started_at: Arc::new(Instant::now()),
        }
    }
}

impl FromRef<AppState> for account::AccountState {
    fn from_ref(s: &AppState) -> Self {
        account::AccountState {
            auth_service: Arc::clone(&s.auth_service),
            users: Arc::clone(&s.users),
            cookies: s.cookies.clone(),
        }
    }
}

impl FromRef<AppState> for promotions::PromotionState {
    fn from_ref(s: &AppState) -> Self {
        promotions::PromotionState {
            promotions: Arc::clone(&s.promotions),
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        health::HealthState {
            db: s.db.clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "auth_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(AUTH_COOKIE_NAME))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        account::login,
        account::logout,
        account::access_denied,
        account::me,
        promotions::get_promotion,
        promotions::list_promotions,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            health::ComponentHealth,
            account::LoginRequest,
            account::LoginResponse,
            account::UserInfo,
            account::UserProfile,
            promotions::PromotionDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Account", description = "Cookie sign-in, sign-out and the current user"),
        (name = "Promotions", description = "Promotional discount codes"),
    ),
    info(
        title = "StarEvents API",
        version = "1.0.0",
        description = "Event ticketing backend: accounts and promotions"
    )
)]
pub struct ApiDoc;

/// Build the application router.
///
/// Outside development, responses carry HSTS and a panicking handler
/// yields a generic 500 body instead of dropping the connection.
pub fn create_router(state: AppState, config: &AppConfig) -> Router {
    let account_routes = Router::new()
        .route("/Account/Login", post(account::login))
        .route("/Account/Logout", post(account::logout))
        .route("/Account/AccessDenied", get(account::access_denied));

    let account_protected_routes = Router::new()
        .route("/Account/Me", get(account::me))
        .route_layer(middleware::from_fn(require_authenticated));

    let promotion_routes =
        Router::new().route("/api/v1/promotions/{code}", get(promotions::get_promotion));

    let promotion_admin_routes = Router::new()
        .route("/api/v1/promotions", get(promotions::list_promotions))
        .route_layer(middleware::from_fn(require_admin));

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let cookies = state.cookies.clone();

    let mut app = Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check))
        .merge(account_routes)
        .merge(account_protected_routes)
        .merge(promotion_routes)
        .merge(promotion_admin_routes)
        .with_state(state);

    if let Some(dir) = &config.server.static_dir {
        info!(dir = %dir.display(), "Serving static files");
        app = app.fallback_service(ServeDir::new(dir));
    }

    let app = app
        .layer(middleware::from_fn_with_state(cookies, cookie_auth_middleware))
        .layer(create_session_layer(&config.security))
        .layer(TraceLayer::new_for_http());

    if config.environment.is_development() {
        return app;
    }

    app.layer(SetResponseHeaderLayer::if_not_present(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static(HSTS_VALUE),
    ))
    .layer(CatchPanicLayer::custom(handle_panic))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("Internal server error")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{Duration, Utc};
    use tower::Service;

    use crate::application::{run_seeder, DatabaseSeeder};
    use crate::config::Environment;
    use crate::domain::AuthenticatedIdentity;
    use crate::infrastructure::database::memory_database;
    use crate::infrastructure::{BcryptPasswordHasher, TicketConfig};

    async fn test_app(environment: Environment) -> (Router, AppState) {
        let db = memory_database().await;
        let hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptPasswordHasher::new(4));
        run_seeder(&DatabaseSeeder::new(db.clone(), Arc::clone(&hasher)))
            .await
            .unwrap();

        let cookies = AuthCookieConfig {
            ticket: TicketConfig::new("router-test-secret", 24),
            secure: false,
        };
        let state = AppState::new(db, hasher, cookies);

        let mut config = AppConfig::default();
        config.environment = environment;
        (create_router(state.clone(), &config), state)
    }

    async fn send(app: &Router, req: Request<Body>) -> Response {
        let mut svc = app.clone().into_service();
        svc.call(req).await.unwrap()
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn login_request(email: &str, password: &str) -> Request<Body> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "return_url": "/events/7",
        });
        Request::builder()
            .method("POST")
            .uri("/Account/Login")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn set_cookies(resp: &Response) -> Vec<String> {
        resp.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    /// `name=value` of the auth cookie, ready for a `Cookie` header
    fn auth_pair(resp: &Response) -> String {
        set_cookies(resp)
            .into_iter()
            .find(|c| c.starts_with(AUTH_COOKIE_NAME))
            .and_then(|c| c.split(';').next().map(str::to_string))
            .unwrap()
    }

    fn ticket_for(state: &AppState, role: &str, issued_at: chrono::DateTime<Utc>) -> String {
        let identity = AuthenticatedIdentity {
            user_id: "ticket-user".into(),
            email: "someone@starevents.lk".into(),
            display_name: "Some One".into(),
            role: role.into(),
        };
        let cookie = state.cookies.issue_at(&identity, issued_at).unwrap();
        format!("{}={}", cookie.name(), cookie.value())
    }

    #[tokio::test]
    async fn admin_login_sets_auth_and_session_cookies() {
        let (app, _) = test_app(Environment::Development).await;

        let resp = send(&app, login_request("admin@starevents.lk", "Admin@123")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookies = set_cookies(&resp);
        let auth = cookies
            .iter()
            .find(|c| c.starts_with(".StarEvents.Auth="))
            .unwrap();
        assert!(auth.contains("HttpOnly"));
        assert!(cookies.iter().any(|c| c.starts_with(".StarEvents.Session=")));

        let json = json_body(resp).await;
        assert_eq!(json["data"]["user"]["role"], "Admin");
        assert_eq!(json["data"]["user"]["display_name"], "System Administrator");
        assert_eq!(json["data"]["redirect_to"], "/events/7");
    }

    #[tokio::test]
    async fn login_email_is_case_insensitive() {
        let (app, _) = test_app(Environment::Development).await;

        let resp = send(&app, login_request("Admin@StarEvents.lk", "Admin@123")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["data"]["user"]["email"], "admin@starevents.lk");
    }

    #[tokio::test]
    async fn ticket_signed_with_another_secret_is_ignored() {
        let (app, _) = test_app(Environment::Production).await;
        let identity = AuthenticatedIdentity {
            user_id: "forged".into(),
            email: "attacker@example.lk".into(),
            display_name: "Not Admin".into(),
            role: "Admin".into(),
        };
        let forged = AuthCookieConfig {
            ticket: TicketConfig::new(crate::config::DEV_TICKET_SECRET, 24),
            secure: false,
        }
        .issue(&identity)
        .unwrap();
        let cookie = format!("{}={}", forged.name(), forged.value());

        let resp = send(&app, get("/api/v1/promotions", Some(&cookie))).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert!(resp.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .starts_with("/Account/Login"));
    }

    #[tokio::test]
    async fn failed_logins_are_indistinguishable() {
        let (app, _) = test_app(Environment::Development).await;

        let wrong_password = send(&app, login_request("admin@starevents.lk", "nope")).await;
        let unknown_email = send(&app, login_request("ghost@starevents.lk", "Admin@123")).await;

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(&wrong_password).iter().all(|c| !c.starts_with(AUTH_COOKIE_NAME)));

        let a = json_body(wrong_password).await;
        let b = json_body(unknown_email).await;
        assert_eq!(a, b);
        assert_eq!(a["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn malformed_login_is_unprocessable() {
        let (app, _) = test_app(Environment::Development).await;
        let resp = send(&app, login_request("not-an-email", "Admin@123")).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn me_requires_sign_in() {
        let (app, _) = test_app(Environment::Development).await;

        let resp = send(&app, get("/Account/Me", None)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers()[header::LOCATION],
            "/Account/Login?ReturnUrl=%2FAccount%2FMe"
        );
    }

    #[tokio::test]
    async fn me_returns_profile_after_login() {
        let (app, _) = test_app(Environment::Development).await;

        let login = send(&app, login_request("admin@starevents.lk", "Admin@123")).await;
        let cookie = auth_pair(&login);

        let resp = send(&app, get("/Account/Me", Some(&cookie))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        // Fresh ticket, no renewal yet
        assert!(set_cookies(&resp).iter().all(|c| !c.starts_with(AUTH_COOKIE_NAME)));

        let json = json_body(resp).await;
        assert_eq!(json["data"]["email"], "admin@starevents.lk");
        assert_eq!(json["data"]["phone_number"], "0771234567");
        assert_eq!(json["data"]["email_confirmed"], true);
    }

    #[tokio::test]
    async fn aging_ticket_is_renewed() {
        let (app, state) = test_app(Environment::Development).await;
        let cookie = ticket_for(&state, "Customer", Utc::now() - Duration::hours(13));

        let resp = send(&app, get("/api/v1/promotions/VIP20", Some(&cookie))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(set_cookies(&resp).iter().any(|c| c.starts_with(AUTH_COOKIE_NAME)));
    }

    #[tokio::test]
    async fn expired_ticket_counts_as_anonymous() {
        let (app, state) = test_app(Environment::Development).await;
        let cookie = ticket_for(&state, "Admin", Utc::now() - Duration::hours(25));

        let resp = send(&app, get("/api/v1/promotions", Some(&cookie))).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers()[header::LOCATION],
            "/Account/Login?ReturnUrl=%2Fapi%2Fv1%2Fpromotions"
        );
    }

    #[tokio::test]
    async fn promotion_listing_is_admin_only() {
        let (app, state) = test_app(Environment::Development).await;

        let customer = ticket_for(&state, "Customer", Utc::now());
        let resp = send(&app, get("/api/v1/promotions", Some(&customer))).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/Account/AccessDenied");

        let admin = ticket_for(&state, "Admin", Utc::now());
        let resp = send(&app, get("/api/v1/promotions", Some(&admin))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = json_body(resp).await;
        assert_eq!(json["data"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn promotion_lookup_is_case_insensitive() {
        let (app, _) = test_app(Environment::Development).await;

        let resp = send(&app, get("/api/v1/promotions/welcome10?amount=200", None)).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json = json_body(resp).await;
        assert_eq!(json["data"]["code"], "WELCOME10");
        assert_eq!(json["data"]["redeemable"], true);
        let discount: rust_decimal::Decimal = json["data"]["discount_amount"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(discount, rust_decimal::Decimal::from(20));

        let resp = send(&app, get("/api/v1/promotions/NOPE", None)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn logout_clears_auth_cookie() {
        let (app, _) = test_app(Environment::Development).await;

        let req = Request::builder()
            .method("POST")
            .uri("/Account/Logout")
            .body(Body::empty())
            .unwrap();
        let resp = send(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cleared = set_cookies(&resp)
            .into_iter()
            .find(|c| c.starts_with(".StarEvents.Auth="))
            .unwrap();
        assert!(cleared.starts_with(".StarEvents.Auth=;"));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn access_denied_is_forbidden() {
        let (app, _) = test_app(Environment::Development).await;
        let resp = send(&app, get("/Account/AccessDenied", None)).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn production_adds_hsts() {
        let (app, _) = test_app(Environment::Production).await;

        let resp = send(&app, get("/health", None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::STRICT_TRANSPORT_SECURITY], HSTS_VALUE);
    }

    #[tokio::test]
    async fn development_skips_hsts() {
        let (app, _) = test_app(Environment::Development).await;

        let resp = send(&app, get("/health", None)).await;
        assert!(resp.headers().get(header::STRICT_TRANSPORT_SECURITY).is_none());
        let json = json_body(resp).await;
        assert_eq!(json["database"]["status"], "ok");
    }
}
