// Integration tests for the recording pipeline
//
// These tests drive NotePipeline with mock transcription/summarization
// backends and verify the checkpoint-then-replace flow, the partial-success
// fallback, and the single-session invariant.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use meeting_notes::audio::{AudioArtifact, AudioBackend, AudioFrame, CaptureError};
use meeting_notes::config::TranscriptionConfig;
use meeting_notes::{
    NotePipeline, NoteWriter, PipelineError, PipelineStage, ProcessingOutcome, Summarizer,
    Summary, SummaryError, Transcriber, TranscriptionError, Vault,
};
use tempfile::TempDir;
use tokio::sync::mpsc;

// ============================================================================
// Mocks
// ============================================================================

enum TranscribeMode {
    Ok(String),
    SlowOk(String),
    Auth,
}

struct MockTranscriber {
    mode: TranscribeMode,
}

#[async_trait::async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _artifact: &AudioArtifact) -> Result<String, TranscriptionError> {
        match &self.mode {
            TranscribeMode::Ok(text) => Ok(text.clone()),
            TranscribeMode::SlowOk(text) => {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(text.clone())
            }
            TranscribeMode::Auth => Err(TranscriptionError::Auth),
        }
    }
}

enum SummarizeMode {
    Ok(Summary),
    Malformed,
}

struct MockSummarizer {
    mode: SummarizeMode,
}

#[async_trait::async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, _transcript: &str) -> Result<Summary, SummaryError> {
        match &self.mode {
            SummarizeMode::Ok(summary) => Ok(summary.clone()),
            SummarizeMode::Malformed => Err(SummaryError::MalformedResponse(
                "expected value at line 1".to_string(),
            )),
        }
    }
}

/// Minimal backend delivering one silent frame
struct OneFrameBackend {
    tx: Option<mpsc::Sender<AudioFrame>>,
    started: Arc<AtomicBool>,
}

impl OneFrameBackend {
    fn new() -> Self {
        Self {
            tx: None,
            started: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for OneFrameBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        let (tx, rx) = mpsc::channel(4);
        tx.send(AudioFrame {
            samples: vec![0; 1600],
            sample_rate: 16000,
            channels: 1,
            timestamp_ms: 0,
        })
        .await
        .expect("frame send");

        self.tx = Some(tx);
        self.started.store(true, Ordering::SeqCst);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        self.tx.take();
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.tx.is_some()
    }

    fn name(&self) -> &str {
        "one-frame"
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn build_pipeline(
    temp: &TempDir,
    transcriber: MockTranscriber,
    summarizer: MockSummarizer,
) -> Arc<NotePipeline> {
    let config = TranscriptionConfig {
        api_key: "test-key".to_string(),
        ..Default::default()
    };

    Arc::new(NotePipeline::new(
        config,
        Arc::new(transcriber),
        Arc::new(summarizer),
        NoteWriter::new(Vault::new(temp.path()), "Meetings"),
    ))
}

fn artifact() -> AudioArtifact {
    AudioArtifact {
        bytes: vec![0; 64],
        mime_type: "audio/wav",
        duration_seconds: 1.0,
    }
}

fn sample_summary() -> Summary {
    Summary {
        key_points: vec!["Discussed budget".to_string()],
        action_items: vec!["Decide on vendor".to_string()],
        follow_ups: vec![],
    }
}

/// All note files under the vault root, in path order
fn note_files(root: &Path) -> Vec<PathBuf> {
    fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, out);
                } else if path.extension().is_some_and(|e| e == "md") {
                    out.push(path);
                }
            }
        }
    }

    let mut out = Vec::new();
    walk(root, &mut out);
    out.sort();
    out
}

// ============================================================================
// Background processing
// ============================================================================

#[tokio::test]
async fn test_success_replaces_checkpoint_with_full_note() -> Result<()> {
    let temp = TempDir::new()?;
    let pipeline = build_pipeline(
        &temp,
        MockTranscriber {
            mode: TranscribeMode::Ok("Discuss budget. Decide on vendor.".to_string()),
        },
        MockSummarizer {
            mode: SummarizeMode::Ok(sample_summary()),
        },
    );

    let outcome = pipeline.process_artifact(artifact()).await?;

    let path = match outcome {
        ProcessingOutcome::Full { path } => path,
        other => panic!("expected full note, got {:?}", other),
    };

    // Exactly one note remains: the checkpoint was deleted
    let files = note_files(temp.path());
    assert_eq!(files, vec![path.clone()]);
    assert!(!path.to_string_lossy().contains("-transcript"));

    let content = std::fs::read_to_string(&path)?;
    assert!(content.contains("## Summary\n- Discussed budget"));
    assert!(content.contains("## Action Items\n- [ ] Decide on vendor"));
    assert!(content.contains("## Full Transcript\nDiscuss budget. Decide on vendor."));

    assert_eq!(pipeline.status().stage, PipelineStage::Success);
    Ok(())
}

#[tokio::test]
async fn test_summary_failure_keeps_transcript_checkpoint() -> Result<()> {
    let temp = TempDir::new()?;
    let pipeline = build_pipeline(
        &temp,
        MockTranscriber {
            mode: TranscribeMode::Ok("Discuss budget.".to_string()),
        },
        MockSummarizer {
            mode: SummarizeMode::Malformed,
        },
    );

    let outcome = pipeline.process_artifact(artifact()).await?;

    let path = match outcome {
        ProcessingOutcome::TranscriptOnly { path } => path,
        other => panic!("expected transcript-only outcome, got {:?}", other),
    };

    // The transcript-only note is the only persisted output
    let files = note_files(temp.path());
    assert_eq!(files, vec![path.clone()]);

    let content = std::fs::read_to_string(&path)?;
    assert!(content.contains("AI Processing Incomplete"));
    assert!(content.contains("Discuss budget."));

    assert_eq!(pipeline.status().stage, PipelineStage::PartialSuccess);
    Ok(())
}

#[tokio::test]
async fn test_transcription_failure_writes_nothing() -> Result<()> {
    let temp = TempDir::new()?;
    let pipeline = build_pipeline(
        &temp,
        MockTranscriber {
            mode: TranscribeMode::Auth,
        },
        MockSummarizer {
            mode: SummarizeMode::Ok(sample_summary()),
        },
    );

    let result = pipeline.process_artifact(artifact()).await;

    assert!(matches!(
        result,
        Err(PipelineError::Transcription(TranscriptionError::Auth))
    ));
    assert!(note_files(temp.path()).is_empty());
    assert_eq!(pipeline.status().stage, PipelineStage::Failed);
    Ok(())
}

// ============================================================================
// Recording control
// ============================================================================

#[tokio::test]
async fn test_begin_requires_credential() -> Result<()> {
    let temp = TempDir::new()?;
    let pipeline = Arc::new(NotePipeline::new(
        TranscriptionConfig::default(), // empty api_key
        Arc::new(MockTranscriber {
            mode: TranscribeMode::Ok(String::new()),
        }),
        Arc::new(MockSummarizer {
            mode: SummarizeMode::Malformed,
        }),
        NoteWriter::new(Vault::new(temp.path()), "Meetings"),
    ));

    let backend = OneFrameBackend::new();
    let started = Arc::clone(&backend.started);

    let result = pipeline.begin_recording_with(Box::new(backend)).await;

    assert!(matches!(result, Err(PipelineError::Config)));
    // Fail-fast: capture was never touched
    assert!(!started.load(Ordering::SeqCst));
    Ok(())
}

#[tokio::test]
async fn test_second_recording_rejected_while_active() -> Result<()> {
    let temp = TempDir::new()?;
    let pipeline = build_pipeline(
        &temp,
        MockTranscriber {
            mode: TranscribeMode::Ok("words".to_string()),
        },
        MockSummarizer {
            mode: SummarizeMode::Ok(sample_summary()),
        },
    );

    pipeline
        .begin_recording_with(Box::new(OneFrameBackend::new()))
        .await?;

    let result = pipeline
        .begin_recording_with(Box::new(OneFrameBackend::new()))
        .await;

    assert!(matches!(
        result,
        Err(PipelineError::Capture(CaptureError::AlreadyRecording))
    ));

    pipeline.end_recording().await?;
    Ok(())
}

#[tokio::test]
async fn test_stop_without_recording_fails() -> Result<()> {
    let temp = TempDir::new()?;
    let pipeline = build_pipeline(
        &temp,
        MockTranscriber {
            mode: TranscribeMode::Ok("words".to_string()),
        },
        MockSummarizer {
            mode: SummarizeMode::Ok(sample_summary()),
        },
    );

    let result = pipeline.end_recording().await;

    assert!(matches!(
        result,
        Err(PipelineError::Capture(CaptureError::NoActiveSession))
    ));
    Ok(())
}

#[tokio::test]
async fn test_stop_returns_before_processing_completes() -> Result<()> {
    let temp = TempDir::new()?;
    let pipeline = build_pipeline(
        &temp,
        MockTranscriber {
            mode: TranscribeMode::SlowOk("slow words".to_string()),
        },
        MockSummarizer {
            mode: SummarizeMode::Ok(sample_summary()),
        },
    );

    pipeline
        .begin_recording_with(Box::new(OneFrameBackend::new()))
        .await?;

    pipeline.end_recording().await?;

    // Processing is still in flight when stop returns
    assert_ne!(pipeline.status().stage, PipelineStage::Success);
    assert!(note_files(temp.path()).is_empty());

    // The background task finishes on its own
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while pipeline.status().stage != PipelineStage::Success {
        assert!(
            tokio::time::Instant::now() < deadline,
            "background processing never completed"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    assert_eq!(note_files(temp.path()).len(), 1);
    Ok(())
}
