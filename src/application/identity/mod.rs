//! Identity module: credential authentication
//!
//! Contains the `AuthService` contract and its repository-backed
//! implementation.

pub mod service;

pub use service::{AuthError, AuthService, CredentialAuthService};
