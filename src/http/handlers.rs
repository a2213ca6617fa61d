use super::state::AppState;
use crate::error::CaptureError;
use crate::platform::{PlatformEntry, PlatformId};
use crate::session::StreamStatus;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StreamSourcesRequest {
    /// Video source option ("camera", "screen", "tab")
    pub video: String,

    /// Audio source option ("microphone", "system", "both")
    pub audio: String,
}

#[derive(Debug, Serialize)]
pub struct RestartResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

fn error_response(status: StatusCode, e: &CaptureError) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            message: e.user_message(),
        }),
    )
        .into_response()
}

fn capture_error_response(e: &CaptureError) -> Response {
    let status = match e {
        CaptureError::PermissionDenied => StatusCode::FORBIDDEN,
        CaptureError::DeviceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        CaptureError::InvalidConfiguration(_) => StatusCode::BAD_REQUEST,
        CaptureError::Unimplemented(_) => StatusCode::NOT_IMPLEMENTED,
    };
    error_response(status, e)
}

fn parse_platform(name: &str) -> Result<PlatformId, Response> {
    name.parse::<PlatformId>()
        .map_err(|e| error_response(StatusCode::NOT_FOUND, &e))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /stream/status
/// Current session readouts
pub async fn get_stream_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.studio.controller().snapshot()))
}

/// POST /stream/start
/// Acquire devices and go live
pub async fn start_stream(
    State(state): State<AppState>,
    Json(req): Json<StreamSourcesRequest>,
) -> Response {
    let controller = state.studio.controller();

    match controller.request_start_named(&req.video, &req.audio).await {
        Ok(true) => (StatusCode::OK, Json(controller.snapshot())).into_response(),
        Ok(false) => {
            let status = controller.status();
            info!("Start rejected, session is {:?}", status);
            let message = match status {
                StreamStatus::Offline => "The start was cancelled by a stop request.",
                StreamStatus::Connecting | StreamStatus::Live => {
                    "A stream is already starting or live."
                }
            };
            (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("session is {:?}", status).to_lowercase(),
                    message: message.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to start stream: {}", e);
            capture_error_response(&e)
        }
    }
}

/// POST /stream/stop
/// Stop the stream and reset readouts
pub async fn stop_stream(State(state): State<AppState>) -> impl IntoResponse {
    let controller = state.studio.controller();
    controller.request_stop();
    (StatusCode::OK, Json(controller.snapshot()))
}

/// POST /stream/restart
/// Switch sources: stop now, start again after the grace delay
pub async fn restart_stream(
    State(state): State<AppState>,
    Json(req): Json<StreamSourcesRequest>,
) -> Response {
    let sources = match state.studio.controller().parse_sources(&req.video, &req.audio) {
        Ok(sources) => sources,
        Err(e) => return capture_error_response(&e),
    };

    let controller = state.studio.controller().clone();
    tokio::spawn(async move {
        if let Err(e) = controller.request_restart(sources).await {
            error!("Restart failed, session stays offline: {}", e);
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(RestartResponse {
            status: "restarting".to_string(),
            message: format!(
                "Restarting with video: {}, audio: {}",
                sources.video, sources.audio
            ),
        }),
    )
        .into_response()
}

/// GET /platforms
pub async fn list_platforms(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.studio.platforms().entries()))
}

/// POST /platforms/:platform/connect
/// Placeholder round trip until OAuth exists
pub async fn connect_platform(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Response {
    let platform = match parse_platform(&platform) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let platforms = state.studio.platforms();
    if !platforms.request_connect(platform) {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("{} connect already pending", platform),
                message: "Hold on, still connecting.".to_string(),
            }),
        )
            .into_response();
    }

    let entry = PlatformEntry {
        platform,
        state: platforms.state(platform),
    };
    (StatusCode::ACCEPTED, Json(entry)).into_response()
}

/// POST /platforms/:platform/disconnect
pub async fn disconnect_platform(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Response {
    match parse_platform(&platform) {
        Ok(platform) => {
            let entry = state.studio.platforms().request_disconnect(platform);
            (StatusCode::OK, Json(entry)).into_response()
        }
        Err(response) => response,
    }
}

/// GET /events
/// Server-sent studio events
pub async fn studio_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Event stream client connected");

    let stream = BroadcastStream::new(state.studio.subscribe()).filter_map(|result| match result {
        Ok(event) => match Event::default().event(event.name()).json_data(&event) {
            Ok(sse) => Some(Ok(sse)),
            Err(e) => {
                error!("Failed to encode studio event: {}", e);
                None
            }
        },
        Err(e) => {
            debug!("Event stream lagged: {}", e);
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
