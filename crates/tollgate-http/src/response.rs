//! Response abstraction for building HTTP responses
//!
//! Fluent response building with status codes, headers, JSON bodies and
//! redirects. Middleware short-circuit the chain by returning one of these
//! instead of calling the continuation.

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;

use crate::error::{HttpError, HttpResult};

/// Response body types
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Text(String),
    Json(serde_json::Value),
}

/// An HTTP response under construction
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

impl Response {
    /// Create a new response with OK status
    pub fn new() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// Create a response with a specific status code
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: ResponseBody::Empty,
        }
    }

    /// 200 OK
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// 401 Unauthorized
    pub fn unauthorized() -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED)
    }

    /// 403 Forbidden
    pub fn forbidden() -> Self {
        Self::with_status(StatusCode::FORBIDDEN)
    }

    /// 404 Not Found
    pub fn not_found() -> Self {
        Self::with_status(StatusCode::NOT_FOUND)
    }

    /// 302 Found redirect to the given location
    pub fn redirect(location: impl AsRef<str>) -> Self {
        Self::with_status(StatusCode::FOUND).with_header("location", location)
    }

    /// Response status code
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value as a string, if present and valid UTF-8
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Add a header (consuming)
    pub fn header<K, V>(mut self, key: K, value: V) -> HttpResult<Self>
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
        Ok(self)
    }

    /// Add a header, never panics: invalid names/values are logged and dropped
    pub fn with_header<K, V>(self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        match self.header(key, value) {
            Ok(response) => response,
            Err(err) => {
                tracing::error!("Header creation failed in with_header: {}", err);
                Self::with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Set a JSON body (consuming)
    pub fn json<T: Serialize>(mut self, data: &T) -> HttpResult<Self> {
        let value = serde_json::to_value(data)
            .map_err(|e| HttpError::serialization(e.to_string()))?;
        self.body = ResponseBody::Json(value);
        Ok(self)
    }

    /// Set a JSON body from an already-built value (never fails)
    pub fn json_value(mut self, value: serde_json::Value) -> Self {
        self.body = ResponseBody::Json(value);
        self
    }

    /// Set a text body (never fails)
    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.body = ResponseBody::Text(content.into());
        self
    }

    /// Response body
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Response body as JSON, if it is one
    pub fn body_json(&self) -> Option<&serde_json::Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}
