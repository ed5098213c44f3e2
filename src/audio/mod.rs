pub mod backend;
pub mod capture;
pub mod mic;

pub use backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, CaptureError};
pub use capture::{AudioArtifact, AudioCapture, CaptureState};
pub use mic::MicBackend;
