//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the chosen upstream response to the client
//!
//! # Design Decisions
//! - Body is streamed through unbuffered, byte for byte
//! - A body that stalls longer than the upstream timeout is cut off
//! - Status and end-to-end headers are copied verbatim

use std::time::Duration;

use axum::body::Body;
use axum::response::Response;
use hyper::body::Incoming;

use crate::http::headers::end_to_end;
use crate::load_balancer::backend::Backend;
use crate::resilience::IdleTimeoutBody;

/// Convert an upstream response from `backend` into the client response.
///
/// The body fails once `idle` passes without a frame from upstream.
pub fn relay(upstream: Response<Incoming>, backend: Backend, idle: Duration) -> Response {
    let (mut parts, body) = upstream.into_parts();
    parts.headers = end_to_end(&parts.headers);
    Response::from_parts(parts, Body::new(IdleTimeoutBody::new(body, backend, idle)))
}
