pub mod audio;
pub mod config;
pub mod http;
pub mod notes;
pub mod ollama;
pub mod session;
pub mod summary;
pub mod transcription;

pub use audio::{
    AudioArtifact, AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioCapture,
    AudioFrame, CaptureError, CaptureState,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use notes::{NoteWriter, StorageError, Vault};
pub use ollama::{OllamaClient, OllamaError};
pub use session::{NotePipeline, PipelineError, PipelineStage, ProcessingOutcome, StatusSnapshot};
pub use summary::{Summarizer, Summary, SummaryError, SummaryGenerator};
pub use transcription::{Transcriber, TranscriptionError, WhisperClient};
