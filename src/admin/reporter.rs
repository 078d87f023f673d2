//! Read-only health reporting over the registry.

use std::sync::Arc;

use serde::Serialize;

use crate::health::state::HealthState;
use crate::load_balancer::registry::BackendRegistry;

pub const DOWN_SERVERS_HEADER: &str = "Down servers:";

/// One backend as shown to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub address: String,
    pub state: HealthState,
    /// Whether health-aware selection may route to it. True for `unknown`.
    pub eligible: bool,
}

/// Query surface for operators. Never mutates the registry.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    registry: Arc<BackendRegistry>,
}

impl StatusReporter {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self { registry }
    }

    /// The proxy itself is serving; independent of backend health.
    pub fn liveness_check(&self) -> &'static str {
        "OK"
    }

    /// Header line followed by each unhealthy address, in registration order.
    pub fn list_unhealthy(&self) -> String {
        let down: Vec<String> = self
            .registry
            .unhealthy_addresses()
            .iter()
            .map(ToString::to_string)
            .collect();
        format!("{}\n{}", DOWN_SERVERS_HEADER, down.join("\n"))
    }

    pub fn backends(&self) -> Vec<BackendStatus> {
        self.registry
            .snapshot()
            .iter()
            .map(|(backend, state)| BackendStatus {
                address: backend.to_string(),
                state,
                eligible: state.is_healthy(),
            })
            .collect()
    }
}
