//! Health module: liveness plus database ping

pub mod handlers;

pub use handlers::*;
