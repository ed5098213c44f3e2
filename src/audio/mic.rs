use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use super::backend::{AudioBackend, AudioBackendConfig, AudioFrame, CaptureError};

/// Microphone capture backend over cpal.
///
/// `cpal::Stream` is not `Send`, so a dedicated thread owns the stream for
/// the lifetime of the capture and flushes buffered samples as `AudioFrame`s
/// on the configured cadence.
pub struct MicBackend {
    config: AudioBackendConfig,
    capturing: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl MicBackend {
    pub fn new(config: AudioBackendConfig) -> Self {
        Self {
            config,
            capturing: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for MicBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        if self.capturing.load(Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRecording);
        }

        let (frame_tx, frame_rx) = mpsc::channel::<AudioFrame>(100);
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), CaptureError>>();

        let capturing = Arc::clone(&self.capturing);
        capturing.store(true, Ordering::SeqCst);

        let flush_interval = Duration::from_millis(self.config.buffer_duration_ms.max(10));

        let worker = std::thread::spawn(move || {
            capture_loop(capturing, frame_tx, ready_tx, flush_interval);
        });

        // Wait for the thread to report device/stream setup
        match ready_rx.await {
            Ok(Ok(())) => {
                self.worker = Some(worker);
                info!("Microphone capture started");
                Ok(frame_rx)
            }
            Ok(Err(e)) => {
                self.capturing.store(false, Ordering::SeqCst);
                let _ = worker.join();
                Err(e)
            }
            Err(_) => {
                self.capturing.store(false, Ordering::SeqCst);
                let _ = worker.join();
                Err(CaptureError::Unavailable(
                    "capture thread exited during setup".to_string(),
                ))
            }
        }
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        self.capturing.store(false, Ordering::SeqCst);

        if let Some(worker) = self.worker.take() {
            // Joining releases the stream and the device handle
            let joined = tokio::task::spawn_blocking(move || worker.join()).await;
            match joined {
                Ok(Ok(())) => info!("Microphone capture stopped"),
                _ => warn!("Capture thread did not shut down cleanly"),
            }
        }

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "cpal-microphone"
    }
}

/// Body of the capture thread: owns the cpal stream, flushes frames until
/// the capturing flag clears, then drops the stream to release hardware.
fn capture_loop(
    capturing: Arc<AtomicBool>,
    frame_tx: mpsc::Sender<AudioFrame>,
    ready_tx: oneshot::Sender<Result<(), CaptureError>>,
    flush_interval: Duration,
) {
    let host = cpal::default_host();
    let device = match host.default_input_device() {
        Some(d) => d,
        None => {
            let _ = ready_tx.send(Err(CaptureError::Unavailable(
                "no input device available".to_string(),
            )));
            return;
        }
    };

    let supported = match device.default_input_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = ready_tx.send(Err(CaptureError::Unavailable(e.to_string())));
            return;
        }
    };

    let sample_format = supported.sample_format();
    let stream_config: cpal::StreamConfig = supported.config();
    let sample_rate = stream_config.sample_rate.0;
    let channels = stream_config.channels;

    let buffer: Arc<StdMutex<Vec<i16>>> = Arc::new(StdMutex::new(Vec::new()));

    let err_fn = |err| warn!("Audio stream error (non-fatal): {}", err);

    let stream = {
        let buffer = Arc::clone(&buffer);
        let result = match sample_format {
            SampleFormat::I16 => device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    buffer.lock().unwrap().extend_from_slice(data);
                },
                err_fn,
                None,
            ),
            SampleFormat::U16 => device.build_input_stream(
                &stream_config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    let mut buf = buffer.lock().unwrap();
                    buf.extend(data.iter().map(|&s| (s as i32 - 32768) as i16));
                },
                err_fn,
                None,
            ),
            SampleFormat::F32 => device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mut buf = buffer.lock().unwrap();
                    buf.extend(
                        data.iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16),
                    );
                },
                err_fn,
                None,
            ),
            other => {
                let _ = ready_tx.send(Err(CaptureError::Unavailable(format!(
                    "unsupported sample format: {:?}",
                    other
                ))));
                return;
            }
        };

        match result {
            Ok(s) => s,
            Err(e) => {
                let _ = ready_tx.send(Err(CaptureError::Unavailable(e.to_string())));
                return;
            }
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(CaptureError::Unavailable(e.to_string())));
        return;
    }

    let _ = ready_tx.send(Ok(()));
    info!(
        "Capturing from default input device: {}Hz, {} channels, {:?}",
        sample_rate, channels, sample_format
    );

    let started = Instant::now();

    while capturing.load(Ordering::SeqCst) {
        std::thread::sleep(flush_interval);

        let samples: Vec<i16> = {
            let mut buf = buffer.lock().unwrap();
            std::mem::take(&mut *buf)
        };

        if samples.is_empty() {
            continue;
        }

        let frame = AudioFrame {
            samples,
            sample_rate,
            channels,
            timestamp_ms: started.elapsed().as_millis() as u64,
        };

        if frame_tx.blocking_send(frame).is_err() {
            // Receiver gone, nothing left to deliver to
            break;
        }
    }

    // Release the device before the final flush
    drop(stream);

    let samples: Vec<i16> = {
        let mut buf = buffer.lock().unwrap();
        std::mem::take(&mut *buf)
    };

    if !samples.is_empty() {
        let frame = AudioFrame {
            samples,
            sample_rate,
            channels,
            timestamp_ms: started.elapsed().as_millis() as u64,
        };
        let _ = frame_tx.blocking_send(frame);
    }
}
