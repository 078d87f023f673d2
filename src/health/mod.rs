//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Sweep (every backend, concurrently)
//!     → GET {backend}{path} under a timeout
//!     → 2xx: mark healthy, anything else: mark unhealthy
//!     → Sleep for the interval, or exit on shutdown
//!
//! State (state.rs):
//!     Unknown → Healthy ↔ Unhealthy
//! ```
//!
//! # Design Decisions
//! - Constant cadence: no jitter, no backoff
//! - A failed probe never stops the sweep or the task
//! - Registry writes happen after each probe returns, never around I/O

pub mod active;
pub mod state;

pub use active::HealthProbe;
pub use state::HealthState;
