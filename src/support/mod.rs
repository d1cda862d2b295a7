//! Cross-cutting support code: error taxonomy and shutdown coordination.

pub mod errors;
pub mod shutdown;

pub use errors::{DomainError, DomainResult};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
