//! Server runtime
//!
//! [`ServerHandle`] owns the full lifecycle: configuration checks, database
//! connection, first-run seeding, the HTTP router and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use sea_orm::{DatabaseConnection, DbErr};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::{run_seeder, DatabaseSeeder};
use crate::config::{AppConfig, ConfigError};
use crate::domain::PasswordHasher;
use crate::infrastructure::{ensure_schema, init_database, BcryptPasswordHasher, DbSettings};
use crate::interfaces::http::{create_router, AppState, AuthCookieConfig};
use crate::support::{ShutdownCoordinator, ShutdownSignal};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database unavailable: {0}")]
    Database(#[from] DbErr),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the server.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Seed the admin account and launch promotions (default: true).
    pub run_seeder: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            run_seeder: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running server.
///
/// ```rust,no_run
/// use starevents::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the listener is bound to.
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the server.
    ///
    /// 1. Resolve the connection string (fatal when missing) and reject a
    ///    public cookie secret outside development
    /// 2. Connect to the database
    /// 3. Seed baseline data; seeding failures are logged, not fatal
    /// 4. Build the router and start serving
    pub async fn start(opts: ServerOptions) -> Result<Self, StartupError> {
        let config = opts.config;

        info!(environment = ?config.environment, "Starting StarEvents");

        let settings = DbSettings {
            url: config.connection_string()?.to_string(),
            max_connections: config.database.max_connections,
        };
        config.validate_security()?;
        let db = init_database(&settings).await?;

        let hasher: Arc<dyn PasswordHasher> =
            Arc::new(BcryptPasswordHasher::new(config.security.bcrypt_cost));

        if opts.run_seeder {
            run_seeder(&DatabaseSeeder::new(db.clone(), Arc::clone(&hasher))).await;
        } else {
            info!("Seeding disabled, applying migrations only");
            ensure_schema(&db).await?;
        }

        let cookies = AuthCookieConfig::from_security(&config.security);
        info!(
            lifetime_hours = config.security.ticket_lifetime_hours,
            session_idle_minutes = config.security.session_idle_minutes,
            "Cookie authentication configured"
        );

        let state = AppState::new(db.clone(), hasher, cookies);
        let router = create_router(state, &config);

        let address = config.server.address();
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|source| StartupError::Bind {
                address: address.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| StartupError::Bind { address, source })?;
        info!("HTTP server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let api_shutdown = shutdown.signal();
        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("HTTP server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!(error = %e, "HTTP server error");
            }
        });

        Ok(Self {
            config,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop, bounded by the shutdown timeout once
    /// shutdown has been triggered.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            mut api_task,
            ..
        } = self;

        let signal = shutdown.signal();
        tokio::select! {
            result = &mut api_task => report_task(result),
            _ = signal.wait() => {
                info!("Waiting for in-flight requests to complete...");
                let timeout = std::time::Duration::from_secs(shutdown.timeout_secs());
                match tokio::time::timeout(timeout, &mut api_task).await {
                    Ok(result) => report_task(result),
                    Err(_) => {
                        warn!(timeout_secs = shutdown.timeout_secs(), "Shutdown timed out, aborting");
                        api_task.abort();
                    }
                }
            }
        }

        if let Err(e) = db.close().await {
            warn!(error = %e, "Error closing database connection");
        } else {
            info!("Database connection closed");
        }

        info!("StarEvents shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down StarEvents...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

fn report_task(result: Result<(), tokio::task::JoinError>) {
    match result {
        Ok(()) => info!("HTTP server stopped"),
        Err(e) => error!(error = %e, "HTTP server task panicked"),
    }
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
/// `RUST_LOG`, when set, takes precedence over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = 0;
        config.server.shutdown_timeout = 5;
        config.database.url = Some("sqlite::memory:".into());
        config.database.max_connections = 1;
        config.security.bcrypt_cost = 4;
        config.security.ticket_secret = "server-test-secret".into();
        config
    }

    #[tokio::test]
    async fn missing_connection_string_is_fatal() {
        let result = ServerHandle::start(ServerOptions::default()).await;
        assert!(matches!(
            result,
            Err(StartupError::Config(ConfigError::MissingConnectionString))
        ));
    }

    #[tokio::test]
    async fn production_refuses_builtin_ticket_secret() {
        let mut config = memory_config();
        config.security.ticket_secret = crate::config::DEV_TICKET_SECRET.into();

        let result = ServerHandle::start(ServerOptions {
            config,
            run_seeder: false,
        })
        .await;
        assert!(matches!(
            result,
            Err(StartupError::Config(ConfigError::InsecureTicketSecret))
        ));
    }

    #[tokio::test]
    async fn development_accepts_builtin_ticket_secret() {
        let mut config = memory_config();
        config.environment = crate::config::Environment::Development;
        config.security.ticket_secret = crate::config::DEV_TICKET_SECRET.into();

        let handle = ServerHandle::start(ServerOptions {
            config,
            run_seeder: false,
        })
        .await
        .unwrap();
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn starts_and_shuts_down() {
        let handle = ServerHandle::start(ServerOptions {
            config: memory_config(),
            run_seeder: true,
        })
        .await
        .unwrap();

        assert_ne!(handle.local_addr.port(), 0);
        assert!(handle.is_running());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn starts_without_seeding() {
        let handle = ServerHandle::start(ServerOptions {
            config: memory_config(),
            run_seeder: false,
        })
        .await
        .unwrap();

        handle.shutdown().await;
    }
}
