//! Caption generation via an OpenAI-compatible chat-completions API
//!
//! Produces a short enrichment text for a delivery: either a notable verbatim
//! lyric (attributed) or a two-line evocative interpretation of the song.
//! Any failure is logged by the caller and the delivery proceeds with the
//! tag line alone; no retry at this layer.

use crate::config::CaptionConfig;
use crate::types::{CaptionError, CaptionSource};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Caption calls are small; a short bound keeps a slow API from stalling the run
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenAI-backed caption source
pub struct OpenAiCaptioner {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiCaptioner {
    pub fn new(config: &CaptionConfig) -> Result<Self, CaptionError> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| CaptionError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CaptionSource for OpenAiCaptioner {
    async fn generate(&self, artist: &str, title: &str) -> Result<String, CaptionError> {
        let prompt = build_prompt(artist, title);

        tracing::debug!(artist = %artist, title = %title, model = %self.model, "Requesting caption");

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "max_tokens": 120,
            "temperature": 0.8,
        });

        let response = self
            .http_client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CaptionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CaptionError::Api(format!(
                "Caption API returned {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CaptionError::Parse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

/// Instruction template for the caption request
fn build_prompt(artist: &str, title: &str) -> String {
    format!(
        "For the song \"{title}\" by {artist}, reply with either one short \
         notable lyric quoted verbatim and attributed to the artist, or a \
         short evocative two-line interpretation of the song's mood. Reply \
         with the text only, no preamble, at most three lines."
    )
}

/// Compose the final delivery caption from the optional enrichment text and
/// the configured channel tag line.
///
/// The enrichment is wrapped in a fixed decorative frame; when it is absent
/// or empty the caption is the tag line alone (possibly empty, which the
/// channel accepts as "no caption").
pub fn compose_caption(enrichment: Option<&str>, tag_line: &str) -> String {
    match enrichment.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => {
            if tag_line.is_empty() {
                format!("✧ ✧ ✧\n{text}\n✧ ✧ ✧")
            } else {
                format!("✧ ✧ ✧\n{text}\n✧ ✧ ✧\n\n{tag_line}")
            }
        }
        None => tag_line.to_string(),
    }
}

// ============================================================================
// Chat completions response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_song_and_artist() {
        let prompt = build_prompt("Nova", "Echo");
        assert!(prompt.contains("\"Echo\""));
        assert!(prompt.contains("Nova"));
    }

    #[test]
    fn test_compose_caption_with_enrichment() {
        let caption = compose_caption(Some("Two lines\nof mood"), "@channel");
        assert!(caption.starts_with("✧ ✧ ✧\n"));
        assert!(caption.contains("Two lines\nof mood"));
        assert!(caption.ends_with("\n\n@channel"));
    }

    #[test]
    fn test_compose_caption_without_enrichment() {
        assert_eq!(compose_caption(None, "@channel"), "@channel");
        assert_eq!(compose_caption(Some("   "), "@channel"), "@channel");
    }

    #[test]
    fn test_compose_caption_empty_tag() {
        assert_eq!(compose_caption(None, ""), "");
        let caption = compose_caption(Some("lyric"), "");
        assert!(caption.ends_with("✧ ✧ ✧"));
    }

    #[test]
    fn test_parse_completion_response() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "  a lyric  "}}
            ]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content.trim(), "a lyric");
    }

    #[test]
    fn test_parse_empty_choices() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(response.choices.is_empty());
    }
}
