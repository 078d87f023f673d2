//! Request dispatch.
//!
//! # Responsibilities
//! - Select a backend for each attempt from a fresh registry snapshot
//! - Forward the request under the upstream deadline
//! - Retry responses with status >= 300 within the policy's bound
//! - Relay the final response, streaming its body under an idle deadline
//!
//! # Flow
//! ```text
//! attempt = 1
//! loop:
//!     snapshot → Selector → backend
//!     forward (deadline) ──transport error──▶ DispatchError (no retry)
//!     status < 300 or attempts exhausted ──▶ relay response
//!     otherwise: remember backend, optional backoff, attempt += 1
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::response::Response;
use hyper_util::client::legacy::{connect::HttpConnector, Client};

use crate::error::DispatchError;
use crate::http::request::{request_id, upstream_request};
use crate::http::response::relay;
use crate::load_balancer::backend::Backend;
use crate::load_balancer::registry::BackendRegistry;
use crate::load_balancer::Selector;
use crate::observability::metrics;
use crate::resilience::{with_deadline, RetryPolicy};

/// Per-request selection, forwarding and retry.
///
/// Holds no per-request state; the attempt counter and tried set live in
/// each [`Dispatcher::dispatch`] call.
pub struct Dispatcher {
    registry: Arc<BackendRegistry>,
    selector: Selector,
    client: Client<HttpConnector, Body>,
    upstream_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<BackendRegistry>,
        selector: Selector,
        client: Client<HttpConnector, Body>,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            selector,
            client,
            upstream_timeout,
        }
    }

    /// Dispatch one client request under `policy`.
    ///
    /// Makes at most `policy.max_attempts()` upstream calls.
    pub async fn dispatch(
        &self,
        parts: Parts,
        body: Bytes,
        policy: &RetryPolicy,
    ) -> Result<Response, DispatchError> {
        let request_id = request_id(&parts.headers);
        let mut tried: Vec<Backend> = Vec::new();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let snapshot = self.registry.snapshot();
            let backend = self
                .selector
                .select(&snapshot, &tried)
                .ok_or(DispatchError::NoBackends)?;

            let request = upstream_request(&parts, &body, &backend)?;
            tracing::debug!(
                request_id = %request_id,
                attempt,
                backend = %backend,
                "Forwarding request"
            );

            let response = match with_deadline(
                &backend,
                self.upstream_timeout,
                self.client.request(request),
            )
            .await
            {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(
                        request_id = %request_id,
                        attempt,
                        error = %e,
                        "Upstream transport failure"
                    );
                    metrics::record_attempt(backend.origin(), "transport_error");
                    return Err(e.into());
                }
            };

            let status = response.status();
            if policy.should_retry(attempt, status) {
                metrics::record_attempt(backend.origin(), "retryable_status");
                metrics::record_retry(backend.origin());

                let delay = policy.delay_after(attempt);
                tracing::info!(
                    request_id = %request_id,
                    attempt,
                    backend = %backend,
                    status = %status,
                    delay = ?delay,
                    "Retrying request"
                );
                // Release the connection before the next attempt.
                drop(response);

                if policy.excludes_tried() && !tried.contains(&backend) {
                    tried.push(backend);
                }
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                continue;
            }

            metrics::record_attempt(backend.origin(), "relayed");
            tracing::debug!(
                request_id = %request_id,
                attempt,
                backend = %backend,
                status = %status,
                "Relaying upstream response"
            );
            return Ok(relay(response, backend, self.upstream_timeout));
        }
    }
}
