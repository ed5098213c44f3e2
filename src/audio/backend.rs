use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from the capture layer
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("microphone unavailable: {0}")]
    Unavailable(String),

    #[error("no recording in progress")]
    NoActiveSession,

    #[error("a recording is already in progress")]
    AlreadyRecording,

    #[error("failed to encode captured audio: {0}")]
    Encode(String),
}

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for audio backend
#[derive(Debug, Clone)]
pub struct AudioBackendConfig {
    /// Requested sample rate (backend may substitute the device rate)
    pub sample_rate: u32,
    /// Requested channel count (1 = mono, 2 = stereo)
    pub channels: u16,
    /// How often buffered samples are flushed as a frame, in milliseconds
    pub buffer_duration_ms: u64,
}

impl Default for AudioBackendConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // 16kHz for Whisper
            channels: 1,        // Mono
            buffer_duration_ms: 1000,
        }
    }
}

/// Audio capture backend trait
///
/// Implementations deliver frames in capture order over the returned channel
/// until `stop()` is called, at which point the channel closes.
#[async_trait::async_trait]
pub trait AudioBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError>;

    /// Stop capturing audio and release the input device
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Audio backend factory
pub struct AudioBackendFactory;

impl AudioBackendFactory {
    /// Create the microphone backend for this platform
    pub fn microphone(config: AudioBackendConfig) -> Result<Box<dyn AudioBackend>, CaptureError> {
        let backend = super::mic::MicBackend::new(config);
        Ok(Box::new(backend))
    }
}
