use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    pub vault: VaultConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Whisper transcription endpoint settings.
///
/// The API key is the one required credential: recording refuses to start
/// without it.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_transcription_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_transcription_model")]
    pub model: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_transcription_endpoint(),
            model: default_transcription_model(),
            language: default_language(),
        }
    }
}

/// Ollama generation endpoint settings for summarization.
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_host")]
    pub host: String,
    #[serde(default = "default_summary_model")]
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_summary_model(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaultConfig {
    pub path: String,
    #[serde(default = "default_notes_folder")]
    pub notes_folder: String,
}

fn default_transcription_endpoint() -> String {
    "https://api.openai.com/v1/audio/transcriptions".to_string()
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_summary_model() -> String {
    "mistral".to_string()
}

fn default_notes_folder() -> String {
    "Meetings".to_string()
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("MEETING_NOTES").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
