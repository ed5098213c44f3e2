use std::io::Cursor;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, CaptureError};

/// Capture session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureState {
    Idle,
    Recording,
    Stopped,
}

/// Immutable result of one completed capture: a WAV payload ready for upload.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub duration_seconds: f64,
}

/// One microphone recording session.
///
/// Buffers frames from the backend in arrival order and finalizes them into a
/// single `AudioArtifact` on `stop()`. The backend is stopped before artifact
/// encoding, so the device is released even when encoding fails.
pub struct AudioCapture {
    backend: Box<dyn AudioBackend>,
    state: CaptureState,
    frames: Arc<Mutex<Vec<AudioFrame>>>,
    drain_task: Option<JoinHandle<()>>,
}

impl AudioCapture {
    /// Create a capture session over the platform microphone
    pub fn new(config: AudioBackendConfig) -> Result<Self, CaptureError> {
        let backend = AudioBackendFactory::microphone(config)?;
        Ok(Self::with_backend(backend))
    }

    /// Create a capture session over an explicit backend
    pub fn with_backend(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            state: CaptureState::Idle,
            frames: Arc::new(Mutex::new(Vec::new())),
            drain_task: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Start capturing from the backend
    pub async fn start(&mut self) -> Result<(), CaptureError> {
        if self.state == CaptureState::Recording {
            return Err(CaptureError::AlreadyRecording);
        }

        let mut rx = self.backend.start().await?;

        let frames = Arc::clone(&self.frames);
        let drain_task = tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                frames.lock().await.push(frame);
            }
        });

        self.drain_task = Some(drain_task);
        self.state = CaptureState::Recording;
        info!("Recording started ({})", self.backend.name());

        Ok(())
    }

    /// Stop capturing and finalize the buffered frames into one artifact
    pub async fn stop(&mut self) -> Result<AudioArtifact, CaptureError> {
        if self.state != CaptureState::Recording {
            return Err(CaptureError::NoActiveSession);
        }

        // Release the device first; the frame channel closes as a side
        // effect, letting the drain task finish with all delivered frames.
        let stop_result = self.backend.stop().await;
        self.state = CaptureState::Stopped;

        if let Some(task) = self.drain_task.take() {
            if let Err(e) = task.await {
                error!("Frame drain task panicked: {}", e);
            }
        }

        stop_result?;

        let frames = {
            let mut buf = self.frames.lock().await;
            std::mem::take(&mut *buf)
        };

        let artifact = encode_wav(&frames)?;
        info!(
            "Capture finalized: {:.1}s, {} bytes",
            artifact.duration_seconds,
            artifact.bytes.len()
        );

        Ok(artifact)
    }
}

/// Concatenate captured frames into an in-memory WAV payload
fn encode_wav(frames: &[AudioFrame]) -> Result<AudioArtifact, CaptureError> {
    let (sample_rate, channels) = frames
        .first()
        .map(|f| (f.sample_rate, f.channels))
        .unwrap_or((16000, 1));

    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;

        for frame in frames {
            for &sample in &frame.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| CaptureError::Encode(e.to_string()))?;
            }
        }

        writer
            .finalize()
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
    }

    let sample_count: usize = frames.iter().map(|f| f.samples.len()).sum();
    let duration_seconds = sample_count as f64 / (sample_rate as f64 * channels as f64);

    Ok(AudioArtifact {
        bytes: cursor.into_inner(),
        mime_type: "audio/wav",
        duration_seconds,
    })
}
