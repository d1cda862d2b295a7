//! Cryptographic adapters: password hashing and auth cookie tickets.

pub mod jwt;
pub mod password;

pub use jwt::{issue_ticket, verify_ticket, TicketClaims, TicketConfig};
pub use password::BcryptPasswordHasher;
