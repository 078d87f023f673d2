//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → HTTP server stops accepting and drains
//!             → health probe leaves its sleep/probe loop
//! ```
//!
//! In-flight upstream calls are not cancelled; they finish or are dropped
//! with their connection.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
