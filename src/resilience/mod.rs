//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (every upstream call runs under a deadline)
//!     → On status >= 300: retries.rs (policy decides whether to re-dispatch)
//!     → backoff.rs (optional delay between attempts)
//! ```
//!
//! Transport failures and expired deadlines are not retried; they end the
//! request immediately.

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::RetryPolicy;
pub use timeouts::{with_deadline, IdleTimeoutBody};
