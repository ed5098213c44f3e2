use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Errors from the Ollama generation endpoint
#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("ollama request failed ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("ollama request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for a local Ollama instance
pub struct OllamaClient {
    client: reqwest::Client,
    host: String,
}

impl OllamaClient {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.into(),
        }
    }

    /// Run a non-streaming completion and return the generated text
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, OllamaError> {
        let url = format!("{}/api/generate", self.host);

        info!("Requesting completion from {} (model={})", url, model);

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OllamaError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.response)
    }
}
