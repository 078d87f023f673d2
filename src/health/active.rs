//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every registered backend
//! - Update the registry with each result
//! - Exit promptly when shutdown is signalled

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Uri};
use futures_util::future::join_all;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::sync::broadcast;
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::error::ProbeError;
use crate::health::state::HealthState;
use crate::load_balancer::backend::Backend;
use crate::load_balancer::registry::BackendRegistry;
use crate::observability::metrics;

const USER_AGENT: &str = concat!("healthgate-health-check/", env!("CARGO_PKG_VERSION"));

/// Outcome counts for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub healthy: usize,
    pub unhealthy: usize,
}

/// Background task keeping the registry's health flags current.
pub struct HealthProbe {
    registry: Arc<BackendRegistry>,
    config: HealthCheckConfig,
    client: Client<HttpConnector, Body>,
}

impl HealthProbe {
    pub fn new(registry: Arc<BackendRegistry>, config: HealthCheckConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(config.timeout()));
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(connector);

        Self {
            registry,
            config,
            client,
        }
    }

    /// Sweep, sleep, repeat until `shutdown` fires (or its sender is dropped).
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.config.interval_secs,
            timeout_secs = self.config.timeout_secs,
            path = %self.config.path,
            backends = self.registry.len(),
            "Health probe starting"
        );

        loop {
            tokio::select! {
                report = self.sweep() => {
                    tracing::debug!(
                        healthy = report.healthy,
                        unhealthy = report.unhealthy,
                        "Health sweep complete"
                    );
                }
                _ = shutdown.recv() => break,
            }

            tokio::select! {
                _ = time::sleep(self.config.interval()) => {}
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!("Health probe received shutdown signal, exiting loop");
    }

    /// Probe every registered backend once.
    pub async fn sweep(&self) -> SweepReport {
        let backends = self.registry.backends();
        let probes = backends.iter().map(|backend| async move {
            let result = self.probe(backend).await;
            self.record(backend, result)
        });

        let mut report = SweepReport::default();
        for healthy in join_all(probes).await {
            if healthy {
                report.healthy += 1;
            } else {
                report.unhealthy += 1;
            }
        }
        report
    }

    /// One liveness request; `Ok` only for a 2xx response.
    pub async fn probe(&self, backend: &Backend) -> Result<(), ProbeError> {
        let uri = Uri::builder()
            .scheme(backend.scheme())
            .authority(backend.authority().clone())
            .path_and_query(self.config.path.as_str())
            .build()?;
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())?;

        let timeout = self.config.timeout();
        let response = match time::timeout(timeout, self.client.request(request)).await {
            Ok(result) => result?,
            Err(_) => return Err(ProbeError::Timeout(timeout)),
        };

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProbeError::Status(response.status()))
        }
    }

    fn record(&self, backend: &Backend, result: Result<(), ProbeError>) -> bool {
        let healthy = result.is_ok();
        let previous = match result {
            Ok(()) => self.registry.mark_healthy(backend),
            Err(e) => {
                tracing::debug!(backend = %backend, error = %e, "Health check failed");
                self.registry.mark_unhealthy(backend)
            }
        };

        match (previous, healthy) {
            (Some(HealthState::Healthy), true) | (Some(HealthState::Unhealthy), false) | (None, _) => {}
            (Some(from), true) => {
                tracing::info!(backend = %backend, from = %from, "Backend is healthy");
            }
            (Some(from), false) => {
                tracing::warn!(backend = %backend, from = %from, "Backend is unhealthy");
            }
        }

        metrics::record_backend_health(backend.origin(), healthy);
        healthy
    }
}

/// Spawn the probe unless disabled.
pub fn spawn(
    registry: Arc<BackendRegistry>,
    config: HealthCheckConfig,
    shutdown: broadcast::Receiver<()>,
) -> Option<tokio::task::JoinHandle<()>> {
    if !config.enabled {
        tracing::info!("Active health checks disabled");
        return None;
    }
    let probe = HealthProbe::new(registry, config);
    Some(tokio::spawn(probe.run(shutdown)))
}
