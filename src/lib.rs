//! # StarEvents
//!
//! Backend for the StarEvents ticketing platform: cookie-based sign-in,
//! role-protected routes and first-run database seeding.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: entities, invariants, repository and port traits
//! - **application**: authentication and seeding use cases
//! - **infrastructure**: SeaORM persistence, bcrypt and ticket signing
//! - **interfaces**: HTTP API with Swagger documentation
//! - **server**: bootstrap and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod support;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DbSettings};

pub use interfaces::http::{create_router, AppState};
