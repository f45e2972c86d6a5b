//! API-key authentication middleware

use std::sync::Arc;

use tollgate_http::{Middleware, Next, NextFuture, Request};

use crate::apikey::KeyRegistry;
use crate::config::ApiKeyConfig;
use crate::error::AuthError;

/// Reads the key from a configurable header and validates it against the
/// registry. On success the chain continues without a principal: the
/// API-key strategy carries no identity by design.
pub struct ApiKeyAuth {
    registry: Arc<KeyRegistry>,
    header: String,
}

impl ApiKeyAuth {
    pub fn new(config: ApiKeyConfig) -> Self {
        let header = config.header_name().to_string();
        let mut registry = KeyRegistry::from_keys(config.keys);
        if let Some(lookup) = config.lookup {
            registry = registry.with_lookup(lookup);
        }
        Self {
            registry: Arc::new(registry),
            header,
        }
    }

    /// Build directly from a registry and header name
    pub fn with_registry(registry: KeyRegistry, header: impl Into<String>) -> Self {
        Self {
            registry: Arc::new(registry),
            header: header.into(),
        }
    }
}

impl Middleware for ApiKeyAuth {
    fn handle(&self, request: Request, next: Next) -> NextFuture<'static> {
        let key = request.header_str(&self.header).map(|k| k.to_string());
        let registry = self.registry.clone();
        let header = self.header.clone();

        Box::pin(async move {
            let valid = match &key {
                Some(key) => registry.is_valid(key).await,
                None => false,
            };

            if !valid {
                tracing::debug!(path = %request.path(), header = %header, "API key rejected");
                return AuthError::InvalidApiKey.to_response();
            }

            next.run(request).await
        })
    }

    fn name(&self) -> &'static str {
        "ApiKeyAuth"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apikey::ApiKeyLookup;
    use crate::principal::AuthenticatedPrincipal;
    use crate::AuthResult;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use serde_json::json;
    use tollgate_http::{HttpMethod, Response};

    struct AcceptK2;

    #[async_trait]
    impl ApiKeyLookup for AcceptK2 {
        async fn check(&self, key: &str) -> AuthResult<bool> {
            Ok(key == "k2")
        }
    }

    fn probe_next() -> Next {
        Next::new(|request| {
            Box::pin(async move {
                let has_principal = request.extension::<AuthenticatedPrincipal>().is_some();
                Response::ok().json_value(json!({"principal": has_principal}))
            })
        })
    }

    #[tokio::test]
    async fn test_static_key_passes() {
        let middleware = ApiKeyAuth::new(ApiKeyConfig::with_keys(["k1"]));
        let request =
            Request::new(HttpMethod::Get, "/data").with_header("x-api-key", "k1");
        let response = middleware.handle(request, probe_next()).await;

        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_key_is_401() {
        let middleware = ApiKeyAuth::new(ApiKeyConfig::with_keys(["k1"]));
        let request =
            Request::new(HttpMethod::Get, "/data").with_header("x-api-key", "k2");
        let response = middleware.handle(request, probe_next()).await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.body_json(),
            Some(&json!({"error": "Invalid API key"}))
        );
    }

    #[tokio::test]
    async fn test_missing_header_is_401() {
        let middleware = ApiKeyAuth::new(ApiKeyConfig::with_keys(["k1"]));
        let response = middleware
            .handle(Request::new(HttpMethod::Get, "/data"), probe_next())
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_dynamic_lookup_extends_static_set() {
        let config = ApiKeyConfig::with_keys(["k1"]).lookup(Arc::new(AcceptK2));
        let middleware = ApiKeyAuth::new(config);

        let request =
            Request::new(HttpMethod::Get, "/data").with_header("x-api-key", "k2");
        let response = middleware.handle(request, probe_next()).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_custom_header_is_case_insensitive() {
        let config = ApiKeyConfig::with_keys(["k1"]).header("X-Service-Key");
        let middleware = ApiKeyAuth::new(config);

        let request =
            Request::new(HttpMethod::Get, "/data").with_header("x-service-key", "k1");
        let response = middleware.handle(request, probe_next()).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_no_principal_attached_on_success() {
        let middleware = ApiKeyAuth::new(ApiKeyConfig::with_keys(["k1"]));
        let request =
            Request::new(HttpMethod::Get, "/data").with_header("x-api-key", "k1");
        let response = middleware.handle(request, probe_next()).await;

        assert_eq!(response.body_json(), Some(&json!({"principal": false})));
    }
}
