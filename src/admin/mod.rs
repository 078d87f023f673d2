//! Operator-facing admin surface.
//!
//! # Routes
//! ```text
//! GET /admin/healthz                 → 200 "OK", always
//! GET /admin/list-unhealthy-servers  → "Down servers:" + one address per line
//! GET /admin/backends                → JSON view of every backend
//! ```
//!
//! The listing routes sit behind bearer auth when `admin.api_key` is set.

pub mod auth;
pub mod handlers;
pub mod reporter;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::*;
pub use self::reporter::StatusReporter;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/admin/list-unhealthy-servers", get(list_unhealthy_servers))
        .route("/admin/backends", get(get_backends))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .route("/admin/healthz", get(healthz))
        .merge(protected)
        .with_state(state)
}
