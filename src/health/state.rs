//! Backend health state.
//!
//! # States
//! - Unknown: registered, not yet probed (eligible for selection)
//! - Healthy: last probe succeeded
//! - Unhealthy: last probe failed; excluded from selection while any
//!   healthy backend remains
//!
//! # State Transitions
//! ```text
//! Unknown/Unhealthy → Healthy: probe returned a 2xx status
//! Unknown/Healthy → Unhealthy: transport error, timeout or non-2xx status
//! ```
//!
//! Unknown is never re-entered once a backend has been probed.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

impl HealthState {
    /// True for every state except `Unhealthy`.
    pub fn is_healthy(self) -> bool {
        self != HealthState::Unhealthy
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Unknown => "unknown",
            HealthState::Healthy => "healthy",
            HealthState::Unhealthy => "unhealthy",
        }
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
