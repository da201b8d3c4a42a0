// Application layer - use cases and orchestration.
// Clients (HTTP API, CLI) go through FinanceService; they never touch the
// repository directly.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
