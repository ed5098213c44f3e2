use std::sync::Arc;

use crate::session::NotePipeline;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single recording pipeline controlled by this service
    pub pipeline: Arc<NotePipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<NotePipeline>) -> Self {
        Self { pipeline }
    }
}
