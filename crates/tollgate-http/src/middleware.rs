//! Middleware contract with the handle(request, next) pattern
//!
//! Each middleware receives the request and the rest of the chain as a
//! [`Next`] continuation: it either calls `next.run(request).await` to
//! proceed or returns a [`Response`] directly to short-circuit. Boxed
//! futures keep the trait dyn-compatible.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;

/// Type alias for the boxed future produced by middleware and `Next`
pub type NextFuture<'a> = Pin<Box<dyn Future<Output = Response> + Send + 'a>>;

/// Type alias for the boxed future produced by terminal handlers
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Next represents the rest of the middleware chain
pub struct Next {
    inner: Box<dyn FnOnce(Request) -> NextFuture<'static> + Send>,
}

impl Next {
    /// Create a new Next with a continuation function
    pub fn new<F>(inner: F) -> Self
    where
        F: FnOnce(Request) -> NextFuture<'static> + Send + 'static,
    {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Run the rest of the chain with the given request
    pub async fn run(self, request: Request) -> Response {
        (self.inner)(request).await
    }
}

/// Middleware trait with the handle(request, next) pattern
pub trait Middleware: Send + Sync {
    /// Handle the request and call the next middleware in the chain
    fn handle(&self, request: Request, next: Next) -> NextFuture<'static>;

    /// Optional middleware name for debugging
    fn name(&self) -> &'static str {
        "Middleware"
    }
}

/// Terminal request handler at the end of a chain
pub trait Handler: Send + Sync {
    /// Produce the response for the request
    fn call(&self, request: Request) -> HandlerFuture;
}

struct FnHandler<F>(F);

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, request: Request) -> HandlerFuture {
        Box::pin((self.0)(request))
    }
}

/// Wrap an async function or closure as a [`Handler`]
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Ordered middleware pipeline executed around a terminal handler
#[derive(Clone, Default)]
pub struct Pipeline {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
        }
    }

    /// Add middleware to the pipeline
    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Add an already-boxed middleware to the pipeline
    pub fn add_boxed(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Number of middleware in the pipeline
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    /// Check if the pipeline is empty
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Middleware names, in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    /// Execute the pipeline with the given terminal handler
    pub async fn execute(&self, request: Request, handler: Arc<dyn Handler>) -> Response {
        let mut chain = Box::new(move |req: Request| handler.call(req))
            as Box<dyn FnOnce(Request) -> NextFuture<'static> + Send>;

        for middleware in self.middleware.iter().rev() {
            let middleware = middleware.clone();
            let next_handler = chain;
            chain = Box::new(move |req: Request| {
                let next = Next::new(next_handler);
                middleware.handle(req, next)
            });
        }

        chain(request).await
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("names", &self.names()).finish()
    }
}

impl From<Vec<Arc<dyn Middleware>>> for Pipeline {
    fn from(middleware: Vec<Arc<dyn Middleware>>) -> Self {
        Self { middleware }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::HttpMethod;
    use serde_json::json;

    struct MarkerMiddleware {
        label: &'static str,
    }

    impl Middleware for MarkerMiddleware {
        fn handle(&self, mut request: Request, next: Next) -> NextFuture<'static> {
            let label = self.label;
            Box::pin(async move {
                let mut trail = request.remove_extension::<Vec<&'static str>>().unwrap_or_default();
                trail.push(label);
                request.insert_extension(trail);
                next.run(request).await
            })
        }

        fn name(&self) -> &'static str {
            self.label
        }
    }

    struct RejectingMiddleware;

    impl Middleware for RejectingMiddleware {
        fn handle(&self, _request: Request, _next: Next) -> NextFuture<'static> {
            Box::pin(async move {
                Response::unauthorized().json_value(json!({"error": "No token provided"}))
            })
        }

        fn name(&self) -> &'static str {
            "RejectingMiddleware"
        }
    }

    #[tokio::test]
    async fn test_pipeline_runs_in_registration_order() {
        let pipeline = Pipeline::new()
            .add(MarkerMiddleware { label: "first" })
            .add(MarkerMiddleware { label: "second" });

        let handler = handler_fn(|request: Request| async move {
            let trail = request.extension::<Vec<&'static str>>().cloned().unwrap();
            Response::ok().json_value(json!({ "trail": trail }))
        });

        let response = pipeline
            .execute(Request::new(HttpMethod::Get, "/ordered"), handler)
            .await;

        assert_eq!(
            response.body_json(),
            Some(&json!({"trail": ["first", "second"]}))
        );
    }

    #[tokio::test]
    async fn test_short_circuit_skips_handler() {
        let pipeline = Pipeline::new().add(RejectingMiddleware);
        let handler = handler_fn(|_| async { Response::ok().text("handler ran") });

        let response = pipeline
            .execute(Request::new(HttpMethod::Get, "/private"), handler)
            .await;

        assert_eq!(response.status_code(), axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.body_json(),
            Some(&json!({"error": "No token provided"}))
        );
    }

    #[tokio::test]
    async fn test_empty_pipeline_calls_handler_directly() {
        let pipeline = Pipeline::new();
        let handler = handler_fn(|_| async { Response::ok().text("hello") });

        let response = pipeline
            .execute(Request::new(HttpMethod::Get, "/open"), handler)
            .await;
        assert_eq!(response.status_code(), axum::http::StatusCode::OK);
    }
}
