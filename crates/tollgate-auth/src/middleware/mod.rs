//! Strategy middleware for the HTTP pipeline
//!
//! Each strategy is a `tollgate_http::Middleware`: it authenticates the
//! request, short-circuits with a structured 401/403 on failure, and
//! otherwise continues the chain (attaching a principal where the strategy
//! yields one).

pub mod apikey;
pub mod basic;
pub mod bearer;
pub mod delegated;

// Re-exports for convenient access
pub use apikey::ApiKeyAuth;
pub use basic::BasicAuth;
pub use bearer::BearerAuth;
pub use delegated::{HandshakeCallback, LoginRedirect, SessionCallback, TokenMint};
