//! HTTP API for external control (note-taking app integration)
//!
//! This module provides a REST API for controlling the recording pipeline:
//! - POST /recordings/start - Start the microphone recording
//! - POST /recordings/stop - Stop and process in the background
//! - GET /recordings/status - Query pipeline stage and status line
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
