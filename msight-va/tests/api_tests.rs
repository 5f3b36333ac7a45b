//! HTTP surface tests using in-process requests

mod support;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use msight_common::events::EventBus;
use msight_va::config::VaConfig;
use msight_va::AppState;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use support::*;
use tower::util::ServiceExt;

fn test_app(mock: MockMediaService) -> Router {
    let config = VaConfig {
        media_api_key: "test-key".to_string(),
        media_base_url: None,
        media_model: None,
        sport: "taekwondo".to_string(),
        port: 0,
        poll_interval: Duration::from_millis(5),
        processing_timeout: Duration::from_millis(500),
    };
    let state = AppState::new(Arc::new(mock), &config, EventBus::new(64));
    msight_va::build_router(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Parse `(event name, data)` pairs out of a raw SSE body
fn sse_events(body: &str) -> Vec<(String, String)> {
    let mut events = Vec::new();
    for frame in body.split("\n\n") {
        let mut name = None;
        let mut data = None;
        for line in frame.lines() {
            if let Some(rest) = line.strip_prefix("event: ") {
                name = Some(rest.to_string());
            } else if let Some(rest) = line.strip_prefix("data: ") {
                data = Some(rest.to_string());
            }
        }
        if let (Some(name), Some(data)) = (name, data) {
            events.push((name, data));
        }
    }
    events
}

#[tokio::test]
async fn health_reports_module_and_status() {
    let app = test_app(fully_scripted_mock());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "msight-va");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn progress_for_unknown_job_is_404() {
    let app = test_app(fully_scripted_mock());

    let response = app
        .oneshot(get("/analysis/progress/no-such-job"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn result_for_unknown_analysis_is_404() {
    let app = test_app(fully_scripted_mock());

    let response = app.oneshot(get("/analysis/result/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn start_rejects_missing_video_file() {
    let app = test_app(fully_scripted_mock());

    let response = app
        .oneshot(post_json(
            "/analysis/start",
            serde_json::json!({"video_path": "/nonexistent/final.mp4"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn start_rejects_duplicate_job_id() {
    let app = test_app(fully_scripted_mock());
    let mut video = tempfile::NamedTempFile::new().unwrap();
    video.write_all(b"not really a video").unwrap();
    let body = serde_json::json!({
        "video_path": video.path().to_string_lossy(),
        "job_id": "fixed-job",
    });

    let first = app
        .clone()
        .oneshot(post_json("/analysis/start", body.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::ACCEPTED);

    let second = app
        .oneshot(post_json("/analysis/start", body))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn start_then_poll_to_completion_and_fetch_result() {
    let app = test_app(fully_scripted_mock());
    let mut video = tempfile::NamedTempFile::new().unwrap();
    video.write_all(b"not really a video").unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/analysis/start",
            serde_json::json!({"video_path": video.path().to_string_lossy()}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let started = body_json(response).await;
    let job_id = started["job_id"].as_str().unwrap().to_string();
    assert_eq!(started["stage"], "queued");

    // Poll until the terminal snapshot hands out the analysis id
    let mut analysis_id = None;
    for _ in 0..200 {
        let response = app
            .clone()
            .oneshot(get(&format!("/analysis/progress/{job_id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot = body_json(response).await;
        assert!(snapshot["error"].is_null(), "job failed: {snapshot}");
        if let Some(id) = snapshot["analysisId"].as_i64() {
            assert_eq!(snapshot["progress"], 100);
            assert_eq!(snapshot["stage"], "complete");
            analysis_id = Some(id);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let analysis_id = analysis_id.expect("job never reached the terminal state");

    let response = app
        .clone()
        .oneshot(get(&format!("/analysis/result/{analysis_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let analysis = body_json(response).await;
    assert_eq!(analysis["sport"], "taekwondo");
    assert_eq!(
        analysis["score_analysis"]["players"][0]["name"],
        "Seif Eissa (EGY)"
    );
    assert_eq!(analysis["errors"]["match"], serde_json::Value::Null);

    // The terminal snapshot was consumed by the successful poll
    let response = app
        .oneshot(get(&format!("/analysis/progress/{job_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sse_stream_emits_changes_once_and_ends_after_terminal() {
    let app = test_app(fully_scripted_mock());
    let mut video = tempfile::NamedTempFile::new().unwrap();
    video.write_all(b"not really a video").unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/analysis/start",
            serde_json::json!({
                "video_path": video.path().to_string_lossy(),
                "job_id": "sse-job",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // collect() returns only once the stream itself ends
    let response = app
        .clone()
        .oneshot(get("/analysis/events/sse-job"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();

    let events = sse_events(&body);
    assert!(!events.is_empty());
    assert!(events.iter().all(|(name, _)| name == "progress"), "{events:?}");

    // Each percentage is emitted once; the terminal snapshot closes the
    // stream and carries the analysis id
    let snapshots: Vec<serde_json::Value> = events
        .iter()
        .map(|(_, data)| serde_json::from_str(data).unwrap())
        .collect();
    let percentages: Vec<u64> = snapshots
        .iter()
        .map(|s| s["progress"].as_u64().unwrap())
        .collect();
    assert!(
        percentages.windows(2).all(|w| w[0] < w[1]),
        "duplicate or backwards percentages: {percentages:?}"
    );
    let terminal = snapshots.last().unwrap();
    assert_eq!(terminal["progress"], 100);
    assert_eq!(terminal["stage"], "complete");
    assert!(terminal["analysisId"].is_i64());

    // The terminal event consumed the registry entry; a late subscriber
    // gets a single error event and the stream ends
    let response = app
        .oneshot(get("/analysis/events/sse-job"))
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(
        sse_events(&body),
        vec![("error".to_string(), "unknown job".to_string())]
    );
}

#[tokio::test]
async fn failed_job_reports_error_through_progress() {
    let app = test_app(fully_scripted_mock().failing_upload());
    let mut video = tempfile::NamedTempFile::new().unwrap();
    video.write_all(b"not really a video").unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/analysis/start",
            serde_json::json!({"video_path": video.path().to_string_lossy()}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let job_id = body_json(response).await["job_id"]
        .as_str()
        .unwrap()
        .to_string();

    let mut failure = None;
    for _ in 0..200 {
        let response = app
            .clone()
            .oneshot(get(&format!("/analysis/progress/{job_id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot = body_json(response).await;
        if snapshot["error"].is_string() {
            assert_eq!(snapshot["stage"], "failed");
            failure = Some(snapshot["error"].as_str().unwrap().to_string());
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let failure = failure.expect("job never reported a failure");
    assert!(failure.contains("upload"), "got {failure:?}");
}
