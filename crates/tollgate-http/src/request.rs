//! Request abstraction for the middleware pipeline
//!
//! Wraps the HTTP method, path, headers and query parameters of an incoming
//! request, plus a typed extensions map that middleware use to hand data
//! (such as an authenticated principal) to downstream handlers.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{HttpError, HttpResult};
use crate::routing::HttpMethod;

/// An in-flight HTTP request as seen by the middleware chain
pub struct Request {
    pub method: HttpMethod,
    pub path: String,
    pub headers: HeaderMap,
    pub query_params: HashMap<String, String>,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &self.headers)
            .field("query_params", &self.query_params)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

impl Request {
    /// Create a new request for the given method and path
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query_params: HashMap::new(),
            extensions: HashMap::new(),
        }
    }

    /// Request path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Add a header (builder style)
    pub fn with_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if let Err(err) = self.add_header(key, value) {
            tracing::error!("Dropping invalid header in with_header: {}", err);
        }
        self
    }

    /// Add a query parameter (builder style)
    pub fn with_query_param<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query_params.insert(key.into(), value.into());
        self
    }

    /// Add a header (borrowing - for middleware use)
    pub fn add_header<K, V>(&mut self, key: K, value: V) -> HttpResult<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let name: HeaderName = key
            .as_ref()
            .parse()
            .map_err(|e| HttpError::invalid_header(format!("{}", e)))?;
        let value: HeaderValue = value
            .as_ref()
            .parse()
            .map_err(|e| HttpError::invalid_header(format!("{}", e)))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Get a header value as a string, if present and valid UTF-8.
    /// Header name lookup is case-insensitive.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get a query parameter by name
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    /// Attach a typed extension value to the request
    pub fn insert_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a typed extension value previously attached by middleware
    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Remove a typed extension value, taking ownership
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }
}
