//! Recording pipeline orchestration
//!
//! This module drives the full lifecycle of a meeting recording:
//! - Single-session capture management
//! - Background transcription and summarization after stop
//! - Checkpoint-then-replace note persistence
//! - The shared user-visible status line

mod pipeline;
mod status;

pub use pipeline::{NotePipeline, PipelineError, ProcessingOutcome};
pub use status::{PipelineStage, StatusBoard, StatusSnapshot};
