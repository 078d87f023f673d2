//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Prepare the client request for forwarding to a chosen backend
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Path and query are forwarded unchanged; only scheme and authority move
//! - The buffered body is cloned per attempt so retries replay it

use axum::body::{Body, Bytes};
use axum::http::{header, request::Parts, HeaderMap, HeaderValue, Request, Uri, Version};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::headers::end_to_end;
use crate::load_balancer::backend::Backend;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` values for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

/// Request id carried in `headers`, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Build the upstream request for one attempt against `backend`.
pub fn upstream_request(
    parts: &Parts,
    body: &Bytes,
    backend: &Backend,
) -> Result<Request<Body>, axum::http::Error> {
    let mut uri = Uri::builder()
        .scheme(backend.scheme())
        .authority(backend.authority().clone());
    if let Some(path_and_query) = parts.uri.path_and_query() {
        uri = uri.path_and_query(path_and_query.clone());
    } else {
        uri = uri.path_and_query("/");
    }

    let mut request = Request::builder()
        .method(parts.method.clone())
        .version(Version::HTTP_11)
        .uri(uri.build()?)
        .body(Body::from(body.clone()))?;

    let headers = request.headers_mut();
    *headers = end_to_end(&parts.headers);
    headers.insert(
        header::HOST,
        HeaderValue::from_str(backend.authority().as_str())?,
    );
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    fn parts(uri: &str) -> Parts {
        let (parts, _) = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::HOST, "proxy.local:8000")
            .header(X_REQUEST_ID, "abc")
            .header(header::CONNECTION, "close")
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_rewrites_target_and_keeps_path_and_query() {
        let backend = Backend::parse("http://127.0.0.1:8081").unwrap();
        let body = Bytes::from_static(b"payload");

        let req = upstream_request(&parts("/api/items?page=2"), &body, &backend).unwrap();

        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.uri().to_string(), "http://127.0.0.1:8081/api/items?page=2");
        assert_eq!(req.headers()[header::HOST], "127.0.0.1:8081");
        assert_eq!(req.headers()[X_REQUEST_ID], "abc");
        assert!(req.headers().get(header::CONNECTION).is_none());
    }

    #[test]
    fn test_generated_request_id_is_uuid() {
        let req = Request::builder().body(()).unwrap();
        let id = MakeRequestUuid.make_request_id(&req).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}
