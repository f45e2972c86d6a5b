//! # tollgate-http: middleware pipeline primitives
//!
//! This crate provides the request/response abstractions, the
//! `handle(request, next)` middleware contract, and the route-registration
//! surface that the tollgate authentication layer plugs into. It does not
//! run a server: embedders own the event loop and feed requests through
//! the [`Router`] (or their own [`RouteTarget`] implementation).

pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod routing;

// Error handling
pub use error::{HttpError, HttpResult};

// Core request/response types
pub use request::Request;
pub use response::{Response, ResponseBody};

// Middleware contract
pub use middleware::{handler_fn, Handler, HandlerFuture, Middleware, Next, NextFuture, Pipeline};

// Routing surface
pub use routing::{HandlerChain, HttpMethod, RouteTarget, Router};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
