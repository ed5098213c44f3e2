use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::ollama::{OllamaClient, OllamaError};

/// Summarization errors
///
/// `MalformedResponse` is an expected failure mode: the model is free-form
/// and regularly emits something other than the requested JSON. The pipeline
/// recovers by keeping the transcript-only note.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Remote(#[from] OllamaError),

    #[error("model response was not a valid summary: {0}")]
    MalformedResponse(String),
}

/// Structured summary extracted from a meeting transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub key_points: Vec<String>,
    pub action_items: Vec<String>,
    pub follow_ups: Vec<String>,
}

/// Port for transcript summarization
#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript: &str) -> Result<Summary, SummaryError>;
}

/// Summarizer backed by an Ollama model prompted for three JSON lists
pub struct SummaryGenerator {
    client: OllamaClient,
    model: String,
}

impl SummaryGenerator {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn build_prompt(transcript: &str) -> String {
        format!(
            r#"Analyze the following meeting transcript and provide:
1. Key points discussed
2. Action items (tasks that need to be done)
3. Follow-up items (topics for future discussion)

Format the response in JSON with the following structure:
{{
    "keyPoints": ["point 1", "point 2", ...],
    "actionItems": ["task 1", "task 2", ...],
    "followUps": ["topic 1", "topic 2", ...]
}}

Transcript:
{transcript}
"#
        )
    }
}

#[async_trait::async_trait]
impl Summarizer for SummaryGenerator {
    async fn summarize(&self, transcript: &str) -> Result<Summary, SummaryError> {
        let prompt = Self::build_prompt(transcript);
        let response = self.client.generate(&self.model, &prompt).await?;

        let summary = parse_summary(&response)?;
        info!(
            "Summary generated: {} key points, {} action items, {} follow-ups",
            summary.key_points.len(),
            summary.action_items.len(),
            summary.follow_ups.len()
        );

        Ok(summary)
    }
}

/// Parse the model reply into a `Summary`, tolerating markdown code fences
pub fn parse_summary(response: &str) -> Result<Summary, SummaryError> {
    let text = strip_code_fence(response.trim());

    serde_json::from_str(text).map_err(|e| SummaryError::MalformedResponse(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // Drop the language tag (e.g. ```json) up to the first newline
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };

    rest.strip_suffix("```").map(str::trim).unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let summary = parse_summary(
            r#"{"keyPoints":["Discussed budget"],"actionItems":["Decide on vendor"],"followUps":[]}"#,
        )
        .unwrap();

        assert_eq!(summary.key_points, vec!["Discussed budget"]);
        assert_eq!(summary.action_items, vec!["Decide on vendor"]);
        assert!(summary.follow_ups.is_empty());
    }

    #[test]
    fn parses_fenced_json() {
        let response = "```json\n{\"keyPoints\":[\"a\"],\"actionItems\":[],\"followUps\":[\"b\"]}\n```";
        let summary = parse_summary(response).unwrap();

        assert_eq!(summary.key_points, vec!["a"]);
        assert_eq!(summary.follow_ups, vec!["b"]);
    }

    #[test]
    fn rejects_free_text() {
        let result = parse_summary("Sure! Here are the key points from your meeting...");
        assert!(matches!(result, Err(SummaryError::MalformedResponse(_))));
    }

    #[test]
    fn rejects_json_with_missing_fields() {
        let result = parse_summary(r#"{"keyPoints":["a"]}"#);
        assert!(matches!(result, Err(SummaryError::MalformedResponse(_))));
    }

    #[test]
    fn prompt_embeds_transcript() {
        let prompt = SummaryGenerator::build_prompt("Discuss budget.");
        assert!(prompt.contains("Discuss budget."));
        assert!(prompt.contains("keyPoints"));
        assert!(prompt.contains("actionItems"));
        assert!(prompt.contains("followUps"));
    }
}
