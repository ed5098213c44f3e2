use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::status::{PipelineStage, StatusBoard, StatusSnapshot};
use crate::audio::{
    AudioBackend, AudioBackendConfig, AudioCapture, CaptureError, CaptureState,
};
use crate::config::TranscriptionConfig;
use crate::notes::{NoteWriter, StorageError};
use crate::summary::Summarizer;
use crate::transcription::{Transcriber, TranscriptionError};

/// Errors surfaced by the pipeline's synchronous edges
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("transcription API key is not configured")]
    Config,

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Final durable result of one background processing run
#[derive(Debug)]
pub enum ProcessingOutcome {
    /// Summary succeeded: one combined note, checkpoint removed
    Full { path: PathBuf },
    /// Summary failed: the transcript-only checkpoint remains
    TranscriptOnly { path: PathBuf },
}

/// Drives one recording at a time through
/// capture -> transcribe -> summarize -> write.
///
/// `end_recording` returns as soon as the audio artifact exists; the remote
/// calls continue in a spawned task whose errors are logged, not re-raised to
/// the caller that stopped the recording.
#[derive(Clone)]
pub struct NotePipeline {
    transcription: TranscriptionConfig,
    transcriber: Arc<dyn Transcriber>,
    summarizer: Arc<dyn Summarizer>,
    writer: NoteWriter,
    status: StatusBoard,
    // The single active capture session; None while idle
    capture: Arc<Mutex<Option<AudioCapture>>>,
}

impl NotePipeline {
    pub fn new(
        transcription: TranscriptionConfig,
        transcriber: Arc<dyn Transcriber>,
        summarizer: Arc<dyn Summarizer>,
        writer: NoteWriter,
    ) -> Self {
        Self {
            transcription,
            transcriber,
            summarizer,
            writer,
            status: StatusBoard::new(),
            capture: Arc::new(Mutex::new(None)),
        }
    }

    pub fn status(&self) -> StatusSnapshot {
        self.status.snapshot()
    }

    pub async fn capture_state(&self) -> CaptureState {
        match self.capture.lock().await.as_ref() {
            Some(capture) => capture.state(),
            None => CaptureState::Idle,
        }
    }

    /// Start recording from the platform microphone
    pub async fn begin_recording(&self) -> Result<(), PipelineError> {
        let backend = crate::audio::AudioBackendFactory::microphone(AudioBackendConfig::default())?;
        self.begin_recording_with(backend).await
    }

    /// Start recording from an explicit backend
    pub async fn begin_recording_with(
        &self,
        backend: Box<dyn AudioBackend>,
    ) -> Result<(), PipelineError> {
        // Credential check happens before any capture resource is touched
        if self.transcription.api_key.trim().is_empty() {
            return Err(PipelineError::Config);
        }

        let mut slot = self.capture.lock().await;
        if slot.is_some() {
            return Err(CaptureError::AlreadyRecording.into());
        }

        let session_id = uuid::Uuid::new_v4();
        info!("Starting recording session {}", session_id);

        let mut capture = AudioCapture::with_backend(backend);
        match capture.start().await {
            Ok(()) => {
                self.status.begin_recording();
                *slot = Some(capture);
                Ok(())
            }
            Err(e) => {
                error!("Failed to start recording: {}", e);
                self.status.hide();
                Err(e.into())
            }
        }
    }

    /// Stop recording and hand the artifact to background processing.
    ///
    /// Returns once the artifact exists; transcription and summarization have
    /// not happened yet when this returns.
    pub async fn end_recording(&self) -> Result<(), PipelineError> {
        let mut capture = {
            let mut slot = self.capture.lock().await;
            slot.take().ok_or(CaptureError::NoActiveSession)?
        };

        self.status
            .update(PipelineStage::Transcribing, "Processing recording...");

        let artifact = match capture.stop().await {
            Ok(artifact) => artifact,
            Err(e) => {
                error!("Failed to stop recording: {}", e);
                self.status.hide();
                return Err(e.into());
            }
        };

        let pipeline = self.clone();
        tokio::spawn(async move {
            if let Err(e) = pipeline.process_artifact(artifact).await {
                error!("Background processing failed: {}", e);
            }
        });

        Ok(())
    }

    /// Body of the background run.
    ///
    /// Transcription failure is returned (nothing durable exists yet);
    /// summarization failure is absorbed into a transcript-only outcome.
    pub async fn process_artifact(
        &self,
        artifact: crate::audio::AudioArtifact,
    ) -> Result<ProcessingOutcome, PipelineError> {
        self.status.update(
            PipelineStage::Transcribing,
            "Transcribing audio... (this may take a while)",
        );

        let transcript = match self.transcriber.transcribe(&artifact).await {
            Ok(text) => text,
            Err(e) => {
                self.status.fail(format!("Failed to transcribe audio: {e}"));
                return Err(e.into());
            }
        };

        let timestamp = Local::now();

        // Durability checkpoint before the riskier summarization step
        let checkpoint = match self.writer.write_transcript_only(&transcript, timestamp) {
            Ok(path) => path,
            Err(e) => {
                self.status.fail(format!("Failed to save transcript: {e}"));
                return Err(e.into());
            }
        };

        self.status.update(
            PipelineStage::Summarizing,
            "Transcript saved! Generating summary...",
        );

        let summary = match self.summarizer.summarize(&transcript).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("AI processing failed: {}", e);
                self.status.partial(&checkpoint);
                return Ok(ProcessingOutcome::TranscriptOnly { path: checkpoint });
            }
        };

        self.status
            .update(PipelineStage::Writing, "Writing meeting note...");

        match self.writer.write_full_note(&transcript, &summary, timestamp) {
            Ok(path) => {
                // Replace the checkpoint, never keep both
                if let Err(e) = self.writer.delete(&checkpoint) {
                    warn!("Failed to remove transcript checkpoint: {}", e);
                }
                self.status.succeed(&path);
                Ok(ProcessingOutcome::Full { path })
            }
            Err(e) => {
                warn!("Failed to write full note, keeping transcript: {}", e);
                self.status.partial(&checkpoint);
                Ok(ProcessingOutcome::TranscriptOnly { path: checkpoint })
            }
        }
    }
}
