use std::sync::atomic::{AtomicU8, Ordering};

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::audio::AudioArtifact;
use crate::config::TranscriptionConfig;

/// Transcription errors
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("transcription endpoint rejected authorization")]
    Auth,

    #[error("transcription request failed ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("transcription request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transcription returned no text")]
    Empty,
}

/// Port for speech-to-text conversion
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a finished capture into plain text.
    ///
    /// Single attempt, no retry. Errors carry a named kind so the caller can
    /// distinguish auth problems from endpoint failures.
    async fn transcribe(&self, artifact: &AudioArtifact) -> Result<String, TranscriptionError>;
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Client for an OpenAI-compatible Whisper transcription endpoint.
///
/// Uploads the artifact as a multipart form with `model` and `language`
/// fields and a bearer token, and reads the `text` field of the reply.
pub struct WhisperClient {
    client: reqwest::Client,
    config: TranscriptionConfig,
    // Coarse 0-100 indicator for external display, not backpressure
    progress: AtomicU8,
}

impl WhisperClient {
    pub fn new(config: TranscriptionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            progress: AtomicU8::new(0),
        }
    }

    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Relaxed)
    }

    /// Validate the endpoint's text and mark the transcription complete.
    ///
    /// Progress only reaches 100 once usable text exists.
    fn finish(&self, text: String) -> Result<String, TranscriptionError> {
        let text = usable_text(text)?;
        self.progress.store(100, Ordering::Relaxed);
        Ok(text)
    }
}

/// Whitespace-only text counts as no result
fn usable_text(text: String) -> Result<String, TranscriptionError> {
    if text.trim().is_empty() {
        return Err(TranscriptionError::Empty);
    }
    Ok(text)
}

#[async_trait::async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, artifact: &AudioArtifact) -> Result<String, TranscriptionError> {
        self.progress.store(0, Ordering::Relaxed);

        let part = reqwest::multipart::Part::bytes(artifact.bytes.clone())
            .file_name("recording.wav")
            .mime_str(artifact.mime_type)
            .map_err(TranscriptionError::Http)?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("language", self.config.language.clone());

        info!(
            "Uploading {} bytes to {} (model={})",
            artifact.bytes.len(),
            self.config.endpoint,
            self.config.model
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, message));
        }

        let body: TranscriptionResponse = response.json().await?;

        let text = self.finish(body.text)?;
        info!("Transcription complete: {} chars", text.len());

        Ok(text)
    }
}

fn classify_failure(status: StatusCode, message: String) -> TranscriptionError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TranscriptionError::Auth,
        _ => TranscriptionError::Remote {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_auth() {
        let err = classify_failure(StatusCode::UNAUTHORIZED, "bad key".to_string());
        assert!(matches!(err, TranscriptionError::Auth));

        let err = classify_failure(StatusCode::FORBIDDEN, String::new());
        assert!(matches!(err, TranscriptionError::Auth));
    }

    #[test]
    fn whitespace_only_text_is_empty() {
        assert!(matches!(
            usable_text(String::new()),
            Err(TranscriptionError::Empty)
        ));
        assert!(matches!(
            usable_text("  \n".to_string()),
            Err(TranscriptionError::Empty)
        ));
        assert_eq!(usable_text("hello".to_string()).unwrap(), "hello");
    }

    #[test]
    fn progress_reaches_100_only_on_usable_text() {
        let client = WhisperClient::new(TranscriptionConfig::default());
        assert_eq!(client.progress(), 0);

        assert!(client.finish("   ".to_string()).is_err());
        assert_eq!(client.progress(), 0);

        client.finish("some words".to_string()).unwrap();
        assert_eq!(client.progress(), 100);
    }

    #[test]
    fn other_failures_keep_status_and_message() {
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "slow down".to_string());
        match err {
            TranscriptionError::Remote { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "slow down");
            }
            other => panic!("expected Remote, got {:?}", other),
        }
    }
}
