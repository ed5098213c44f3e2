use std::path::Path;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stage of the recording pipeline, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    Recording,
    Transcribing,
    Summarizing,
    Writing,
    Success,
    PartialSuccess,
    Failed,
}

#[derive(Debug, Default)]
struct StatusInner {
    stage: Option<PipelineStage>,
    message: Option<String>,
    recording_since: Option<DateTime<Utc>>,
    last_note: Option<String>,
}

/// Read-only view of the status line
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub stage: PipelineStage,
    pub message: Option<String>,
    /// Elapsed recording time as `M:SS`, present while recording
    pub recording_elapsed: Option<String>,
    /// Path of the most recently written note
    pub last_note: Option<String>,
}

/// Single updatable status line shared between the pipeline and the HTTP
/// surface.
///
/// Mirrors a notice lifecycle: created, updated from each stage of one
/// background run, then hidden. Only one run mutates the board at a time.
#[derive(Clone, Default)]
pub struct StatusBoard {
    inner: Arc<RwLock<StatusInner>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_recording(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.stage = Some(PipelineStage::Recording);
        inner.message = Some("Recording".to_string());
        inner.recording_since = Some(Utc::now());
    }

    pub fn update(&self, stage: PipelineStage, message: impl Into<String>) {
        let mut inner = self.inner.write().unwrap();
        inner.stage = Some(stage);
        inner.message = Some(message.into());
        inner.recording_since = None;
    }

    pub fn succeed(&self, note: &Path) {
        let mut inner = self.inner.write().unwrap();
        inner.stage = Some(PipelineStage::Success);
        inner.message = Some("Meeting notes created successfully!".to_string());
        inner.recording_since = None;
        inner.last_note = Some(note.display().to_string());
    }

    pub fn partial(&self, note: &Path) {
        let mut inner = self.inner.write().unwrap();
        inner.stage = Some(PipelineStage::PartialSuccess);
        inner.message = Some("AI processing failed, but transcript was saved!".to_string());
        inner.recording_since = None;
        inner.last_note = Some(note.display().to_string());
    }

    pub fn fail(&self, message: impl Into<String>) {
        let mut inner = self.inner.write().unwrap();
        inner.stage = Some(PipelineStage::Failed);
        inner.message = Some(message.into());
        inner.recording_since = None;
    }

    /// Dismiss the status line
    pub fn hide(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.stage = None;
        inner.message = None;
        inner.recording_since = None;
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let inner = self.inner.read().unwrap();

        let recording_elapsed = inner.recording_since.map(|since| {
            let secs = Utc::now().signed_duration_since(since).num_seconds().max(0);
            format!("{}:{:02}", secs / 60, secs % 60)
        });

        StatusSnapshot {
            stage: inner.stage.unwrap_or(PipelineStage::Idle),
            message: inner.message.clone(),
            recording_elapsed,
            last_note: inner.last_note.clone(),
        }
    }
}
