use axum::{extract::State, http::StatusCode, Json};

use crate::admin::reporter::BackendStatus;
use crate::http::server::AppState;

pub async fn healthz(State(state): State<AppState>) -> (StatusCode, &'static str) {
    (StatusCode::OK, state.reporter.liveness_check())
}

pub async fn list_unhealthy_servers(State(state): State<AppState>) -> String {
    state.reporter.list_unhealthy()
}

pub async fn get_backends(State(state): State<AppState>) -> Json<Vec<BackendStatus>> {
    Json(state.reporter.backends())
}
