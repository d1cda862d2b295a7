//! Application layer: use-case orchestration over the domain contracts.
//!
//! - `identity`: credential authentication
//! - `seeding`: first-run baseline data

pub mod identity;
pub mod seeding;

pub use identity::{AuthError, AuthService, CredentialAuthService};
pub use seeding::{run_seeder, DatabaseSeeder, SeedError, SeedReport};
