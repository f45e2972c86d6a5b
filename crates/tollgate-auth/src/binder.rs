//! Declarative route binding
//!
//! Resolves an ordered list of route descriptors into handler chains and
//! registers them on the framework's [`RouteTarget`]. Binding is
//! synchronous, happens once at startup, and performs no I/O beyond the
//! registrations; every misconfiguration it detects aborts startup.

use std::sync::Arc;

use tollgate_http::{Handler, HandlerChain, HttpMethod, RouteTarget};

use crate::config::{ApiKeyConfig, BasicConfig, BearerConfig};
use crate::error::AuthError;
use crate::middleware::{ApiKeyAuth, BasicAuth, BearerAuth};
use crate::oauth::DelegatedLoginOrchestrator;
use crate::AuthResult;

/// Which leg of the delegated-login flow a route serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegatedLeg {
    /// Login-initiation: redirect to the provider
    Login,
    /// Provider callback
    Callback,
}

/// The authentication strategy a route declares
///
/// A closed set: adding a strategy means extending this enum, and every
/// match over it is exhaustive, so the compiler finds all dispatch sites.
pub enum RouteStrategy {
    /// Bearer-token verification, optionally role-gated
    Bearer(BearerConfig),
    /// Basic credentials against a static user map
    Basic(BasicConfig),
    /// API key from a configurable header
    ApiKey(ApiKeyConfig),
    /// Delegated third-party login
    Delegated {
        provider: String,
        leg: DelegatedLeg,
    },
    /// No authentication gate
    None,
}

impl std::fmt::Debug for RouteStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteStrategy::Bearer(_) => write!(f, "Bearer"),
            RouteStrategy::Basic(_) => write!(f, "Basic"),
            RouteStrategy::ApiKey(_) => write!(f, "ApiKey"),
            RouteStrategy::Delegated { provider, leg } => {
                write!(f, "Delegated({}, {:?})", provider, leg)
            }
            RouteStrategy::None => write!(f, "None"),
        }
    }
}

/// One declarative route binding, consumed once by [`RouteBinder::bind`]
pub struct RouteDescriptor {
    pub method: HttpMethod,
    pub path: String,
    pub strategy: RouteStrategy,
    pub handler: Option<Arc<dyn Handler>>,
}

impl RouteDescriptor {
    /// Describe a route with the given strategy and no handler yet
    pub fn new(method: HttpMethod, path: impl Into<String>, strategy: RouteStrategy) -> Self {
        Self {
            method,
            path: path.into(),
            strategy,
            handler: None,
        }
    }

    /// Set the business handler (builder style)
    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }
}

impl std::fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("strategy", &self.strategy)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Resolves route descriptors to handler chains and registers them
#[derive(Debug, Default)]
pub struct RouteBinder {
    orchestrator: Option<DelegatedLoginOrchestrator>,
}

impl RouteBinder {
    /// Create a binder for routes that use no delegated login
    pub fn new() -> Self {
        Self { orchestrator: None }
    }

    /// Create a binder that can also resolve delegated-login routes
    pub fn with_orchestrator(orchestrator: DelegatedLoginOrchestrator) -> Self {
        Self {
            orchestrator: Some(orchestrator),
        }
    }

    /// The orchestrator, when one was provided
    pub fn orchestrator(&self) -> Option<&DelegatedLoginOrchestrator> {
        self.orchestrator.as_ref()
    }

    /// Register every descriptor on the target, in order. The
    /// authentication middleware always precedes the business handler;
    /// for the stateless callback pair, handshake verification always
    /// precedes token minting. Any error here is a setup-time failure
    /// that must abort startup.
    pub fn bind<T: RouteTarget>(
        &self,
        target: &mut T,
        descriptors: Vec<RouteDescriptor>,
    ) -> AuthResult<()> {
        for descriptor in descriptors {
            let RouteDescriptor {
                method,
                path,
                strategy,
                handler,
            } = descriptor;

            let chain = match strategy {
                RouteStrategy::Bearer(config) => HandlerChain::new()
                    .step(Arc::new(BearerAuth::new(config)?))
                    .handler(require_handler(handler, method, &path)?),
                RouteStrategy::Basic(config) => HandlerChain::new()
                    .step(Arc::new(BasicAuth::new(config)))
                    .handler(require_handler(handler, method, &path)?),
                RouteStrategy::ApiKey(config) => HandlerChain::new()
                    .step(Arc::new(ApiKeyAuth::new(config)))
                    .handler(require_handler(handler, method, &path)?),
                RouteStrategy::Delegated { provider, leg } => {
                    let orchestrator = self.orchestrator.as_ref().ok_or_else(|| {
                        AuthError::configuration(format!(
                            "route {} {} declares delegated login but the binder has no orchestrator",
                            method, path
                        ))
                    })?;
                    let steps = match leg {
                        DelegatedLeg::Login => vec![orchestrator.login(&provider)?],
                        DelegatedLeg::Callback => orchestrator.callback(&provider)?,
                    };
                    let mut chain = HandlerChain::new().steps(steps);
                    if let Some(handler) = handler {
                        chain = chain.handler(handler);
                    }
                    chain
                }
                RouteStrategy::None => {
                    HandlerChain::with_handler(require_handler(handler, method, &path)?)
                }
            };

            target.register(method, &path, chain);
        }
        Ok(())
    }
}

fn require_handler(
    handler: Option<Arc<dyn Handler>>,
    method: HttpMethod,
    path: &str,
) -> AuthResult<Arc<dyn Handler>> {
    handler.ok_or_else(|| {
        AuthError::configuration(format!("route {} {} has no handler", method, path))
    })
}
