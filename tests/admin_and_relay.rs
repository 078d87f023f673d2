//! Admin surface and response relay tests.

use std::time::Duration;

use axum::http::StatusCode;
use healthgate::health::HealthState;
use healthgate::load_balancer::backend::Backend;
use serde_json::Value;

mod common;

#[tokio::test]
async fn test_success_response_relayed_verbatim() {
    let (backend_addr, mut requests) = common::start_chunked_backend(
        &[
            ("Content-Type", "application/octet-stream"),
            ("X-Custom", "first"),
            ("X-Custom", "second"),
            ("Cache-Control", "no-store"),
        ],
        &["hello ", "chunked ", "world\u{1F600}"],
    )
    .await;

    let proxy = common::start_proxy(common::proxy_config(&[backend_addr])).await;

    let res = common::client()
        .get(proxy.url("/api/data/7?fields=a,b&x=1"))
        .header("X-Client", "tests")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/octet-stream");
    assert_eq!(res.headers()["cache-control"], "no-store");
    let custom: Vec<_> = res
        .headers()
        .get_all("x-custom")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(custom, vec!["first", "second"]);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(
        res.bytes().await.unwrap().as_ref(),
        "hello chunked world\u{1F600}".as_bytes()
    );

    let head = requests.recv().await.unwrap();
    let request_line = head.lines().next().unwrap();
    assert_eq!(request_line, "GET /api/data/7?fields=a,b&x=1 HTTP/1.1");
    let lower = head.to_ascii_lowercase();
    assert!(lower.contains(&format!("host: {}", backend_addr)));
    assert!(lower.contains("x-client: tests"));
    assert!(lower.contains("x-request-id: "));

    proxy.stop().await;
}

#[tokio::test]
async fn test_client_request_id_is_propagated() {
    let (backend_addr, mut requests) =
        common::start_chunked_backend(&[], &["ok"]).await;
    let proxy = common::start_proxy(common::proxy_config(&[backend_addr])).await;

    let res = common::client()
        .get(proxy.url("/api/"))
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-request-id"], "req-42");
    let head = requests.recv().await.unwrap().to_ascii_lowercase();
    assert!(head.starts_with("get /api/ http/1.1"));
    assert!(head.contains("x-request-id: req-42"));

    proxy.stop().await;
}

#[tokio::test]
async fn test_admin_healthz_ok_when_every_backend_is_down() {
    let dead_a = common::unused_addr().await;
    let dead_b = common::unused_addr().await;

    let mut config = common::proxy_config(&[dead_a, dead_b]);
    config.health_check.enabled = true;
    config.health_check.interval_secs = 1;
    let proxy = common::start_proxy(config).await;

    let registry = proxy.registry.clone();
    assert!(
        common::wait_until(Duration::from_secs(5), || {
            registry.unhealthy_addresses().len() == 2
        })
        .await
    );

    let res = common::client().get(proxy.url("/admin/healthz")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "OK");

    let res = common::client()
        .get(proxy.url("/admin/list-unhealthy-servers"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.text().await.unwrap(),
        format!("Down servers:\nhttp://{}\nhttp://{}", dead_a, dead_b)
    );

    proxy.stop().await;
}

#[tokio::test]
async fn test_list_unhealthy_matches_registry() {
    let addrs = [
        common::unused_addr().await,
        common::unused_addr().await,
        common::unused_addr().await,
    ];
    let proxy = common::start_proxy(common::proxy_config(&addrs)).await;
    let client = common::client();

    let body = client
        .get(proxy.url("/admin/list-unhealthy-servers"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "Down servers:\n");

    proxy.registry.mark_unhealthy(&Backend::parse(&format!("http://{}", addrs[2])).unwrap());
    proxy.registry.mark_unhealthy(&Backend::parse(&format!("http://{}", addrs[0])).unwrap());

    let expected = format!("Down servers:\nhttp://{}\nhttp://{}", addrs[0], addrs[2]);
    for _ in 0..3 {
        let body = client
            .get(proxy.url("/admin/list-unhealthy-servers"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, expected);
    }

    let backends: Value = client
        .get(proxy.url("/admin/backends"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let states: Vec<&str> = backends
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["state"].as_str().unwrap())
        .collect();
    assert_eq!(states, vec!["unhealthy", "unknown", "unhealthy"]);
    let eligible: Vec<bool> = backends
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["eligible"].as_bool().unwrap())
        .collect();
    assert_eq!(eligible, vec![false, true, false]);
    assert!(backends[1].get("healthy").is_none());
    assert_eq!(
        proxy.registry.state(&Backend::parse(&format!("http://{}", addrs[1])).unwrap()),
        Some(HealthState::Unknown)
    );

    proxy.stop().await;
}

#[tokio::test]
async fn test_admin_api_key() {
    let addr = common::unused_addr().await;
    let mut config = common::proxy_config(&[addr]);
    config.admin.api_key = Some("s3cret".to_string());
    let proxy = common::start_proxy(config).await;
    let client = common::client();

    let res = client.get(proxy.url("/admin/healthz")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(proxy.url("/admin/list-unhealthy-servers")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(proxy.url("/admin/backends"))
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(proxy.url("/admin/list-unhealthy-servers"))
        .bearer_auth("s3cret")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    proxy.stop().await;
}

#[tokio::test]
async fn test_unrouted_paths_are_not_forwarded() {
    let (backend_addr, mut requests) = common::start_chunked_backend(&[], &["ok"]).await;
    let proxy = common::start_proxy(common::proxy_config(&[backend_addr])).await;

    let res = common::client().get(proxy.url("/other")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(requests.try_recv().is_err());

    proxy.stop().await;
}
