// Integration tests for the HTTP presentation adapter
//
// Requests go straight through the router with tower's `oneshot`, backed by
// the simulated media devices.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use stream_studio::capture::SimulatedConfig;
use stream_studio::{
    create_router, AppState, Config, ErrorKind, SimulatedBackend, SimulatedOutcome, StreamStatus,
    Studio, StudioEvent,
};
use tower::ServiceExt;

fn app(backend: &SimulatedBackend) -> Router {
    let studio = Studio::new(&Config::default(), Arc::new(backend.clone()));
    create_router(AppState::new(studio))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_check() {
    let app = app(&SimulatedBackend::default());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_start_status_stop() {
    let backend = SimulatedBackend::default();
    let app = app(&backend);

    let (status, body) = send(&app, "GET", "/stream/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "offline");
    assert_eq!(body["duration"], "00:00:00");

    let (status, body) = send(
        &app,
        "POST",
        "/stream/start",
        Some(json!({"video": "camera", "audio": "microphone"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "live");
    assert_eq!(body["label"], "Live");
    assert_eq!(body["sources"]["video"], "camera");
    assert_eq!(backend.open_streams(), 1);

    let (status, body) = send(&app, "POST", "/stream/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "offline");
    assert_eq!(body["activity"], "Ready");
    assert_eq!(body["viewer_count"], 0);
    assert_eq!(backend.open_streams(), 0);
}

#[tokio::test]
async fn test_second_start_conflicts() {
    let backend = SimulatedBackend::default();
    let app = app(&backend);
    let sources = json!({"video": "screen", "audio": "both"});

    let (status, _) = send(&app, "POST", "/stream/start", Some(sources.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", "/stream/start", Some(sources)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "session is live");
    assert_eq!(body["message"], "A stream is already starting or live.");
    assert_eq!(backend.total_opened(), 1);
}

#[tokio::test]
async fn test_invalid_sources_are_bad_requests() {
    let backend = SimulatedBackend::default();
    let app = app(&backend);

    let (status, body) = send(
        &app,
        "POST",
        "/stream/start",
        Some(json!({"video": "hologram", "audio": "microphone"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("hologram"));
    assert_eq!(backend.total_opened(), 0);

    let (status, _) = send(
        &app,
        "POST",
        "/stream/restart",
        Some(json!({"video": "camera", "audio": "kazoo"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_restart_publishes_error_event() {
    let backend = SimulatedBackend::default();
    let studio = Studio::new(&Config::default(), Arc::new(backend.clone()));
    let mut rx = studio.subscribe();
    let app = create_router(AppState::new(studio.clone()));

    let (status, body) = send(
        &app,
        "POST",
        "/stream/restart",
        Some(json!({"video": "camera", "audio": "kazoo"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("kazoo"));

    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let StudioEvent::Error { kind, .. } = event {
            kinds.push(kind);
        }
    }
    assert_eq!(kinds, vec![ErrorKind::InvalidConfiguration]);
    assert_eq!(studio.controller().status(), StreamStatus::Offline);
    assert_eq!(backend.total_opened(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_start_cancelled_by_stop_conflicts_with_offline_message() {
    let backend = SimulatedBackend::new(SimulatedConfig {
        acquire_latency: Duration::from_millis(200),
        ..SimulatedConfig::default()
    });
    let studio = Studio::new(&Config::default(), Arc::new(backend.clone()));
    let app = create_router(AppState::new(studio.clone()));

    let start = {
        let app = app.clone();
        tokio::spawn(async move {
            let sources = json!({"video": "camera", "audio": "microphone"});
            send(&app, "POST", "/stream/start", Some(sources)).await
        })
    };
    for _ in 0..50 {
        if studio.controller().status() == StreamStatus::Connecting {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(studio.controller().status(), StreamStatus::Connecting);

    let (status, _) = send(&app, "POST", "/stream/stop", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = start.await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "session is offline");
    assert!(body["message"].as_str().unwrap().contains("cancelled"));
    assert_eq!(backend.open_streams(), 0);
}

#[tokio::test]
async fn test_denied_permission_is_forbidden() {
    let backend = SimulatedBackend::default();
    backend.set_outcome(SimulatedOutcome::Denied);
    let app = app(&backend);

    let (status, body) = send(
        &app,
        "POST",
        "/stream/start",
        Some(json!({"video": "camera", "audio": "microphone"})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().starts_with("Unable to access camera/microphone"));

    let (_, body) = send(&app, "GET", "/stream/status", None).await;
    assert_eq!(body["status"], "offline");
}

#[tokio::test]
async fn test_missing_device_is_unavailable() {
    let backend = SimulatedBackend::default();
    backend.set_outcome(SimulatedOutcome::Unavailable);
    let app = app(&backend);

    let (status, _) = send(
        &app,
        "POST",
        "/stream/start",
        Some(json!({"video": "tab", "audio": "system"})),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_restart_is_accepted() {
    let app = app(&SimulatedBackend::default());

    let (status, body) = send(
        &app,
        "POST",
        "/stream/restart",
        Some(json!({"video": "tab", "audio": "microphone"})),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "restarting");
}

#[tokio::test]
async fn test_platform_connect_placeholder() {
    let app = app(&SimulatedBackend::default());

    let (status, body) = send(&app, "GET", "/platforms", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);

    let (status, body) = send(&app, "POST", "/platforms/twitch/connect", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["platform"], "twitch");
    assert_eq!(body["state"], "connecting");

    let (status, _) = send(&app, "POST", "/platforms/twitch/connect", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "POST", "/platforms/twitch/disconnect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "disconnected");

    let (status, _) = send(&app, "POST", "/platforms/myspace/connect", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_stream_is_sse() {
    let app = app(&SimulatedBackend::default());

    let response = app
        .oneshot(Request::builder().uri("/events").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/event-stream"
    );
}
