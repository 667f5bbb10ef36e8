//! End-to-end tests through the public HTTP router
//!
//! Each test builds a service with a local engine, submits work over the
//! REST routes and follows it through polling, the catalog and deletion.

mod common;

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use common::{create_service, suggestion, wait_for_terminal};
use serde_json::{Value, json};
use tower::ServiceExt;
use tunefetch::api::create_router;
use tunefetch::{JobId, JobStatus};

fn post_json(uri: &str, body: Value) -> Request {
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

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_fetch_then_list_stream_and_delete() {
    let (service, _temp_dir) = create_service(Vec::new()).await;
    let app = create_router(service.clone(), service.config().clone());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/download",
            json!({"url": "https://example.invalid/watch?v=1", "title": "Night Drive"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let task_id = json_body(response).await["task_id"]
        .as_str()
        .unwrap()
        .to_string();

    let record = wait_for_terminal(&service, &JobId::from(task_id.as_str())).await;
    assert_eq!(record.status, JobStatus::Done);

    let progress = json_body(
        app.clone()
            .oneshot(get(&format!("/api/progress/{}", task_id)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(progress["status"], "done");
    assert_eq!(progress["percent"], 100);
    assert_eq!(progress["result"]["filename"], "Night Drive.mp3");
    assert_eq!(progress["result"]["size"], 4096);
    assert_eq!(progress["result"]["size_human"], "4 KB");

    let library = json_body(app.clone().oneshot(get("/api/library")).await.unwrap()).await;
    let entries = library.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["filename"], "Night Drive.mp3");
    assert_eq!(entries[0]["title"], "Night Drive");
    assert_eq!(entries[0]["codec"], "mp3");

    let response = app
        .clone()
        .oneshot(get("/api/music/Night%20Drive.mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "audio/mpeg");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.len(), 4096);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/delete",
            json!({"filename": "Night Drive.mp3"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let library = json_body(app.oneshot(get("/api/library")).await.unwrap()).await;
    assert_eq!(library, json!([]));
}

#[tokio::test]
async fn test_engine_failure_is_reported_by_poll() {
    let (service, _temp_dir) = create_service(Vec::new()).await;
    let app = create_router(service.clone(), service.config().clone());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/download",
            json!({"url": "https://example.invalid/unavailable", "codec": "opus"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let task_id = json_body(response).await["task_id"]
        .as_str()
        .unwrap()
        .to_string();

    wait_for_terminal(&service, &JobId::from(task_id.as_str())).await;

    let progress = json_body(
        app.oneshot(get(&format!("/api/progress/{}", task_id)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(progress["status"], "error");
    assert_eq!(progress["error"], "Video unavailable");
    assert!(service.list_catalog().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_and_suggestions() {
    let (service, _temp_dir) = create_service(vec![
        suggestion("Night Drive", 240),
        suggestion("Night Drive (Official Trailer)", 120),
        suggestion("Night Drive 10 hour loop", 36_000),
    ])
    .await;
    let app = create_router(service.clone(), service.config().clone());

    let response = app
        .clone()
        .oneshot(post_json("/api/search", json!({"query": "night drive"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let track = json_body(response).await;
    assert_eq!(track["title"], "Night Drive");
    assert_eq!(track["duration"], 240);

    let response = app
        .clone()
        .oneshot(post_json("/api/search", json!({"query": "silence"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(post_json("/api/suggestions", json!({"query": "night"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let suggestions = json_body(response).await;
    let titles: Vec<&str> = suggestions
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Night Drive"]);
}

#[tokio::test]
async fn test_unknown_job_and_shutdown() {
    let (service, _temp_dir) = create_service(Vec::new()).await;

    let record = service.poll(&JobId::from("0")).await.unwrap();
    assert_eq!(record.status, JobStatus::Unknown);

    service.shutdown().await;
    assert!(service.is_shut_down());
    assert!(service.submit("anything", Default::default()).await.is_err());
}
