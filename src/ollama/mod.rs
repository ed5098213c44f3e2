mod client;

pub use client::{OllamaClient, OllamaError};
