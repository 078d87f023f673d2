//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy and admin handlers
//! - Wire up middleware (request ID, tracing, panic recovery, body limit)
//! - Own the registry and start the health probe
//! - Serve until shutdown, then wait for the probe to exit

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, Request, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::admin::{setup_admin_router, StatusReporter};
use crate::config::{AdminConfig, ProxyConfig};
use crate::error::ConfigError;
use crate::health;
use crate::http::dispatcher::Dispatcher;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::lifecycle::Shutdown;
use crate::load_balancer::registry::BackendRegistry;
use crate::load_balancer::Selector;
use crate::observability::metrics;
use crate::resilience::RetryPolicy;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub reporter: StatusReporter,
    pub retry_policy: RetryPolicy,
    pub admin: Arc<AdminConfig>,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    registry: Arc<BackendRegistry>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if any configured backend address is unusable.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        let registry = Arc::new(BackendRegistry::register(config.backends.iter())?);
        let selector = Selector::new(
            config.load_balancing.strategy.build(),
            config.load_balancing.health_aware,
        );
        Ok(Self::with_selector(config, registry, selector))
    }

    /// Create a server around an existing registry and selector.
    pub fn with_selector(
        config: ProxyConfig,
        registry: Arc<BackendRegistry>,
        selector: Selector,
    ) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(config.timeouts.connect()));
        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.timeouts.idle())
            .build(connector);

        let dispatcher = Dispatcher::new(
            registry.clone(),
            selector,
            client,
            config.timeouts.upstream(),
        );

        let state = AppState {
            dispatcher: Arc::new(dispatcher),
            reporter: StatusReporter::new(registry.clone()),
            retry_policy: RetryPolicy::from(&config.retries),
            admin: Arc::new(config.admin.clone()),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            registry,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let api = Router::new()
            .route("/api/", any(proxy_handler))
            .route("/api/{*path}", any(proxy_handler))
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .with_state(state.clone());

        Router::new()
            .merge(api)
            .merge(setup_admin_router(state))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            request_id = %request_id(request.headers()),
                            method = %request.method(),
                            uri = %request.uri(),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(CatchPanicLayer::new()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Starts the health probe, serves until `shutdown` fires, then waits for
    /// the probe to leave its loop.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.registry.len(),
            "HTTP server starting"
        );

        let probe = health::active::spawn(
            self.registry.clone(),
            self.config.health_check.clone(),
            shutdown.subscribe(),
        );

        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await;

        // The server may also stop on an I/O error; the probe must not outlive it.
        shutdown.trigger();
        if let Some(handle) = probe {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Health probe task failed");
            }
        }

        served?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Shared handle to the backend registry.
    pub fn registry(&self) -> Arc<BackendRegistry> {
        self.registry.clone()
    }
}

/// Forward `/api/*` to a backend chosen by the dispatcher.
async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start_time = Instant::now();
    let method_str = method.to_string();

    let mut request = Request::new(body);
    *request.method_mut() = method;
    *request.uri_mut() = uri;
    *request.headers_mut() = headers;
    let (parts, body) = request.into_parts();

    let response = match state.dispatcher.dispatch(parts, body, &state.retry_policy).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    metrics::record_request(&method_str, response.status().as_u16(), start_time);
    response
}
