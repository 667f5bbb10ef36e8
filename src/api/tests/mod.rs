use super::*;
use crate::engine::{FetchEngine, MetadataProvider};
use crate::service::test_helpers::{ScriptedEngine, ScriptedProvider, create_test_service};
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use std::time::Duration;
use tower::ServiceExt;


/// Helper to create a test service wrapped in Arc
fn create_test_app(
    engine: Arc<dyn FetchEngine>,
    provider: Arc<dyn MetadataProvider>,
) -> (Arc<TuneFetch>, Router, tempfile::TempDir) {
    let (service, temp_dir) = create_test_service(engine, provider);
    let service = Arc::new(service);
    let config = service.config().clone();
    let app = create_router(service.clone(), config);
    (service, app, temp_dir)
}

fn default_app() -> (Arc<TuneFetch>, Router, tempfile::TempDir) {
    create_test_app(
        Arc::new(ScriptedEngine::producing(1024)),
        Arc::new(ScriptedProvider::empty()),
    )
}

fn post_json(uri: &str, body: serde_json::Value) -> Request {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns_and_stops_on_shutdown() {
    let (service, _temp_dir) = create_test_service(
        Arc::new(ScriptedEngine::producing(1)),
        Arc::new(ScriptedProvider::empty()),
    );

    // Port 0 = OS assigns a free port
    let mut config = (**service.config()).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);
    let service = Arc::new(service);

    let api_handle = tokio::spawn({
        let service = service.clone();
        let config = config.clone();
        async move { start_api_server(service, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    service.shutdown().await;

    let result = tokio::time::timeout(Duration::from_secs(5), api_handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cors_enabled() {
    let (service, _app, _temp_dir) = default_app();

    let mut config = (**service.config()).clone();
    config.server.api.cors_enabled = true;
    config.server.api.cors_origins = vec!["*".to_string()];
    let app = create_router(service, Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS headers should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (service, _app, _temp_dir) = default_app();

    let mut config = (**service.config()).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(service, Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_static_dir_is_served_as_fallback() {
    let (service, _app, temp_dir) = default_app();
    let static_dir = temp_dir.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("index.html"), "<h1>tunefetch</h1>").unwrap();

    let mut config = (**service.config()).clone();
    config.server.api.static_dir = Some(static_dir);
    let app = create_router(service, Arc::new(config));

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"<h1>tunefetch</h1>");

    // API routes still win over the fallback
    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
