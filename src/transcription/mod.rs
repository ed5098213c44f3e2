mod client;

pub use client::{Transcriber, TranscriptionError, WhisperClient};
