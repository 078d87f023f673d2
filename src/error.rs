//! Error taxonomy for the proxy.
//!
//! # Propagation
//! ```text
//! ConfigError    → fatal, aborts startup
//! DispatchError  → mapped to a sanitized client-facing status
//! ProbeError     → recorded as an unhealthy transition, never propagated
//! ```

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::load_balancer::backend::Backend;

/// Startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid backend address {address:?}: {reason}")]
    InvalidBackend { address: String, reason: String },

    #[error("Backend {0} is configured more than once")]
    DuplicateBackend(String),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one backend must be configured")]
    NoBackends,

    #[error("backend {address:?}: {reason}")]
    Backend { address: String, reason: String },

    #[error("bind address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("retries.max_delay_ms ({max}) is lower than retries.base_delay_ms ({base})")]
    BackoffRange { base: u64, max: u64 },

    #[error("health_check.path {0:?} must start with '/'")]
    HealthPath(String),
}

/// Transport-level failure talking to an upstream.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {backend} failed: {source}")]
    Connect {
        backend: Backend,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("request to {backend} exceeded its {after:?} deadline")]
    DeadlineExceeded { backend: Backend, after: Duration },
}

/// Errors surfaced by a single dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no backends registered")]
    NoBackends,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),
}

impl DispatchError {
    /// Status reported to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NoBackends => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::Transport(TransportError::Connect { .. }) => StatusCode::BAD_GATEWAY,
            DispatchError::Transport(TransportError::DeadlineExceeded { .. }) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            DispatchError::Request(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fixed body text; internal error details are only logged.
    pub fn client_message(&self) -> &'static str {
        match self {
            DispatchError::NoBackends => "no backends available",
            DispatchError::Transport(TransportError::Connect { .. }) => "upstream request failed",
            DispatchError::Transport(TransportError::DeadlineExceeded { .. }) => {
                "upstream request timed out"
            }
            DispatchError::Request(_) => "internal proxy error",
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (self.status(), self.client_message()).into_response()
    }
}

/// Liveness probe failure for one backend.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("non-success status {0}")]
    Status(StatusCode),

    #[error("invalid probe request: {0}")]
    Request(#[from] axum::http::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_are_sanitized() {
        let backend = Backend::parse("http://10.0.0.1:9000").unwrap();
        let err = DispatchError::from(TransportError::DeadlineExceeded {
            backend,
            after: Duration::from_secs(3),
        });

        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.client_message(), "upstream request timed out");
        assert!(!err.client_message().contains("10.0.0.1"));
        assert!(err.to_string().contains("10.0.0.1"));
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = ConfigError::Validation(vec![
            ValidationError::NoBackends,
            ValidationError::Zero { field: "retries.max_attempts" },
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: at least one backend must be configured, retries.max_attempts must be greater than zero"
        );
    }
}
