//! HTTP tests driving the router in-process

use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use electrospot_shim::api::{create_router, handlers::AppState};
use electrospot_shim::models::ServerConfig;
use electrospot_shim::{ShimConfig, Strategy, TargetReference, TelemetryCollector};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(config: ShimConfig) -> (Router, Arc<TelemetryCollector>) {
    let telemetry = Arc::new(TelemetryCollector::new());
    let state = Arc::new(AppState::new(config, telemetry.clone()));
    (create_router(state), telemetry)
}

fn app() -> Router {
    app_with(ShimConfig::default()).0
}

async fn get(app: Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

/// GET as seen from `peer`, the way `into_make_service_with_connect_info` tags requests
async fn get_from(app: Router, uri: &str, peer: &str) -> (StatusCode, HeaderMap, String) {
    let peer: SocketAddr = peer.parse().unwrap();
    let request = Request::builder()
        .uri(uri)
        .extension(ConnectInfo(peer))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn test_root_serves_framed_page() {
    let (status, headers, body) = get(app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert!(headers.contains_key("x-request-id"));
    assert!(body.contains(r#"<iframe src="https://electrospot.lovable.app""#));
    assert!(body.contains(r#"<a class="button primary" href="https://electrospot.lovable.app""#));
}

#[tokio::test]
async fn test_query_overrides() {
    let (status, _, body) = get(app(), "/?strategy=redirect").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"http-equiv="refresh""#));
    assert!(!body.contains("<iframe"));

    let (status, _, body) = get(app(), "/?height=700&width=1024").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"height="700" width="1024""#));
}

#[tokio::test]
async fn test_forced_strategy_routes() {
    let (_, _, body) = get(app(), "/redirect").await;
    assert!(body.contains("window.top.location.href"));

    // Strategy query is ignored on the forced routes
    let (_, _, body) = get(app(), "/embed?strategy=redirect&height=750").await;
    assert!(body.contains(r#"height="750""#));
    assert!(!body.contains("http-equiv"));
}

#[tokio::test]
async fn test_bad_overrides_are_rejected() {
    let (app, telemetry) = app_with(ShimConfig::default());

    for uri in ["/?strategy=popup", "/?height=0", "/embed?width=0", "/?height=tall"] {
        let (status, body) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }
    assert_eq!(telemetry.get_stats().rejected_requests, 4);
}

#[tokio::test]
async fn test_page_descriptor() {
    let (status, body) = get_json(app(), "/v1/page?strategy=auto_redirect").await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["strategy"], "AUTO_REDIRECT");
    assert_eq!(data["target"], "https://electrospot.lovable.app");
    assert_eq!(data["fallback_href"], data["refresh_target"]);
    assert_eq!(data["fallback_href"], data["script_target"]);
    assert_eq!(data["embed_height"], 0);
    assert!(data.get("embed_src").is_none());
    assert!(data.get("html").is_none());
    assert!(data["html_bytes"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_configured_target_and_strategy() {
    let config = ShimConfig {
        target: TargetReference::new("https://example.org/app"),
        strategy: Strategy::AutoRedirect,
        ..ShimConfig::default()
    };
    let (app, _) = app_with(config);

    let (_, _, body) = get(app.clone(), "/").await;
    assert!(body.contains(r#"content="0; url=https://example.org/app""#));

    let (_, health) = get_json(app, "/v1/health").await;
    assert_eq!(health["data"]["target_url"], "https://example.org/app");
    assert_eq!(health["data"]["target_navigable"], true);
}

#[tokio::test]
async fn test_health_and_stats() {
    let (app, _) = app_with(ShimConfig::default());

    let (status, health) = get_json(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["data"]["status"], "healthy");

    get(app.clone(), "/").await;
    get(app.clone(), "/redirect").await;

    let (status, stats) = get_json(app, "/v1/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["frame_pages"], 1);
    assert_eq!(stats["data"]["redirect_pages"], 1);
    assert_eq!(stats["data"]["total_pages"], 2);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = get_json(app(), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

fn limited_app(requests: u32) -> Router {
    let config = ShimConfig {
        server: ServerConfig {
            rate_limit_requests: requests,
            ..ServerConfig::default()
        },
        ..ShimConfig::default()
    };
    app_with(config).0
}

#[tokio::test]
async fn test_pages_are_never_rate_limited() {
    let app = limited_app(2);

    // Header-less clients with no peer address share one key; pages still render
    for _ in 0..101 {
        let (status, _, body) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"href="https://electrospot.lovable.app""#));
    }
    for uri in ["/embed", "/redirect"] {
        for _ in 0..5 {
            let (status, _, body) = get_from(app.clone(), uri, "198.51.100.4:40000").await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert!(body.contains("https://electrospot.lovable.app"));
        }
    }
}

#[tokio::test]
async fn test_json_routes_are_rate_limited_per_peer() {
    let app = limited_app(2);
    let peer = "198.51.100.4:40000";

    let (status, headers, _) = get_from(app.clone(), "/v1/stats", peer).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-ratelimit-remaining"], "1");
    assert!(headers.contains_key("x-ratelimit-reset"));

    let (status, headers, _) = get_from(app.clone(), "/v1/page", peer).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-ratelimit-remaining"], "0");

    let (status, headers, body) = get_from(app.clone(), "/v1/stats", peer).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = headers["retry-after"].to_str().unwrap().parse().unwrap();
    assert!(retry_after <= 60);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");

    // Health checks and pages stay reachable for the limited client
    for uri in ["/health", "/v1/health", "/"] {
        let (status, _, _) = get_from(app.clone(), uri, peer).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
    }

    // Another peer has its own budget
    let (status, headers, _) = get_from(app, "/v1/stats", "203.0.113.9:40000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-ratelimit-remaining"], "1");
}

#[tokio::test]
async fn test_forwarded_header_is_ignored_without_trusted_proxy() {
    let app = limited_app(1);
    let peer: SocketAddr = "198.51.100.4:40000".parse().unwrap();

    let (status, _, _) = get_from(app.clone(), "/v1/stats", "198.51.100.4:40000").await;
    assert_eq!(status, StatusCode::OK);

    for spoofed in ["1.1.1.1", "2.2.2.2"] {
        let request = Request::builder()
            .uri("/v1/stats")
            .header("x-forwarded-for", spoofed)
            .extension(ConnectInfo(peer))
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS, "{}", spoofed);
    }
}

#[tokio::test]
async fn test_forwarded_header_keys_clients_behind_trusted_proxy() {
    let config = ShimConfig {
        server: ServerConfig {
            rate_limit_requests: 1,
            trust_proxy: true,
            ..ServerConfig::default()
        },
        ..ShimConfig::default()
    };
    let (app, _) = app_with(config);
    let proxy: SocketAddr = "10.0.0.1:443".parse().unwrap();

    for client in ["203.0.113.7", "203.0.113.8"] {
        let request = Request::builder()
            .uri("/v1/stats")
            .header("x-forwarded-for", client)
            .extension(ConnectInfo(proxy))
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK, "{}", client);
    }
}
