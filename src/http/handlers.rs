use super::state::AppState;
use crate::audio::CaptureError;
use crate::session::{PipelineError, StatusSnapshot};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{error, info};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RecordingResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub capture_state: crate::audio::CaptureState,
    #[serde(flatten)]
    pub status: StatusSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_status(e: &PipelineError) -> StatusCode {
    match e {
        PipelineError::Config => StatusCode::BAD_REQUEST,
        PipelineError::Capture(CaptureError::AlreadyRecording) => StatusCode::CONFLICT,
        PipelineError::Capture(CaptureError::NoActiveSession) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /recordings/start
/// Start the microphone recording
pub async fn start_recording(State(state): State<AppState>) -> impl IntoResponse {
    info!("Start recording requested");

    match state.pipeline.begin_recording().await {
        Ok(()) => (
            StatusCode::OK,
            Json(RecordingResponse {
                status: "recording".to_string(),
                message: "Recording started".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to start recording: {}", e);
            (
                error_status(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /recordings/stop
/// Stop recording; transcription and summarization continue in the background
pub async fn stop_recording(State(state): State<AppState>) -> impl IntoResponse {
    info!("Stop recording requested");

    match state.pipeline.end_recording().await {
        Ok(()) => (
            StatusCode::OK,
            Json(RecordingResponse {
                status: "processing".to_string(),
                message: "Recording stopped, processing in background".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to stop recording: {}", e);
            (
                error_status(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /recordings/status
/// Current pipeline stage and status line
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let response = StatusResponse {
        capture_state: state.pipeline.capture_state().await,
        status: state.pipeline.status(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
