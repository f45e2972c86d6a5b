//! Route registration surface and reference router
//!
//! [`RouteTarget`] is the per-method registration contract that binding
//! engines write handler chains into. [`Router`] is the reference
//! implementation: an in-memory route table with exact-path dispatch, used
//! by tests and by embedders that do not bring their own framework.

use std::sync::Arc;

use crate::middleware::{Handler, Middleware, Pipeline};
use crate::request::Request;
use crate::response::Response;

/// HTTP methods accepted by the registration surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    /// Matches any method at dispatch time
    All,
}

impl HttpMethod {
    /// Method name in canonical uppercase form
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::All => "ALL",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ordered middleware sequence plus an optional terminal handler
///
/// When no terminal handler is present and every middleware calls through,
/// dispatch falls back to 404, matching the unmatched-route behavior of the
/// frameworks this layer plugs into.
#[derive(Clone, Default)]
pub struct HandlerChain {
    middleware: Vec<Arc<dyn Middleware>>,
    handler: Option<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
            handler: None,
        }
    }

    /// Create a chain holding only a terminal handler
    pub fn with_handler(handler: Arc<dyn Handler>) -> Self {
        Self {
            middleware: Vec::new(),
            handler: Some(handler),
        }
    }

    /// Append a middleware step
    pub fn step(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Append multiple middleware steps in order
    pub fn steps<I>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.middleware.extend(middleware);
        self
    }

    /// Set the terminal handler
    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Number of middleware steps
    pub fn middleware_len(&self) -> usize {
        self.middleware.len()
    }

    /// Whether a terminal handler is set
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Execute the chain for a request
    pub async fn execute(&self, request: Request) -> Response {
        let pipeline = Pipeline::from(self.middleware.clone());
        let handler = self
            .handler
            .clone()
            .unwrap_or_else(|| crate::middleware::handler_fn(|_| async { Response::not_found() }));
        pipeline.execute(request, handler).await
    }
}

impl std::fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("middleware", &self.middleware.len())
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// Per-method route registration surface
///
/// Binding engines only need this trait; any framework adapter that can
/// register a [`HandlerChain`] under a method and path can be a target.
pub trait RouteTarget {
    /// Register a handler chain for the given method and path
    fn register(&mut self, method: HttpMethod, path: &str, chain: HandlerChain);

    fn get(&mut self, path: &str, chain: HandlerChain) {
        self.register(HttpMethod::Get, path, chain);
    }

    fn post(&mut self, path: &str, chain: HandlerChain) {
        self.register(HttpMethod::Post, path, chain);
    }

    fn put(&mut self, path: &str, chain: HandlerChain) {
        self.register(HttpMethod::Put, path, chain);
    }

    fn delete(&mut self, path: &str, chain: HandlerChain) {
        self.register(HttpMethod::Delete, path, chain);
    }

    fn patch(&mut self, path: &str, chain: HandlerChain) {
        self.register(HttpMethod::Patch, path, chain);
    }

    fn all(&mut self, path: &str, chain: HandlerChain) {
        self.register(HttpMethod::All, path, chain);
    }
}

/// One registered route
#[derive(Debug)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub chain: HandlerChain,
}

/// Reference in-memory router with exact-path dispatch
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Create a new empty router
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registered routes, in registration order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find the first route matching method and path
    pub fn find(&self, method: HttpMethod, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| r.path == path && (r.method == method || r.method == HttpMethod::All))
    }

    /// Dispatch a request through the matching route's chain; 404 if none
    pub async fn dispatch(&self, request: Request) -> Response {
        match self.find(request.method, request.path()) {
            Some(route) => route.chain.execute(request).await,
            None => Response::not_found(),
        }
    }
}

impl RouteTarget for Router {
    fn register(&mut self, method: HttpMethod, path: &str, chain: HandlerChain) {
        tracing::debug!(
            method = %method,
            path = %path,
            steps = chain.middleware_len(),
            "registering route"
        );
        self.routes.push(Route {
            method,
            path: path.to_string(),
            chain,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::handler_fn;
    use axum::http::StatusCode;

    fn ok_handler(text: &'static str) -> Arc<dyn Handler> {
        handler_fn(move |_| async move { Response::ok().text(text) })
    }

    #[tokio::test]
    async fn test_dispatch_matches_method_and_path() {
        let mut router = Router::new();
        router.get("/users", HandlerChain::with_handler(ok_handler("list")));
        router.post("/users", HandlerChain::with_handler(ok_handler("create")));

        let response = router.dispatch(Request::new(HttpMethod::Get, "/users")).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.body(), &crate::response::ResponseBody::Text("list".into()));

        let response = router.dispatch(Request::new(HttpMethod::Post, "/users")).await;
        assert_eq!(response.body(), &crate::response::ResponseBody::Text("create".into()));
    }

    #[tokio::test]
    async fn test_dispatch_unmatched_is_404() {
        let router = Router::new();
        let response = router.dispatch(Request::new(HttpMethod::Get, "/nope")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_all_matches_any_method() {
        let mut router = Router::new();
        router.all("/anything", HandlerChain::with_handler(ok_handler("any")));

        for method in [HttpMethod::Get, HttpMethod::Post, HttpMethod::Delete] {
            let response = router.dispatch(Request::new(method, "/anything")).await;
            assert_eq!(response.status_code(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_chain_without_handler_falls_through_to_404() {
        let mut router = Router::new();
        router.get("/dangling", HandlerChain::new());

        let response = router.dispatch(Request::new(HttpMethod::Get, "/dangling")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}
