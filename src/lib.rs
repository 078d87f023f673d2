//! Health-aware reverse proxy library.
//!
//! Load-balances `/api/*` across a fixed set of upstream backends, retries
//! responses with status >= 300 under a bounded policy, and keeps a
//! background view of backend health for operators.

pub mod admin;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod resilience;

pub use config::schema::ProxyConfig;
pub use error::{ConfigError, DispatchError, ProbeError, TransportError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::registry::BackendRegistry;
