//! Telegram Bot API transport
//!
//! Delivers one audio file per call via `sendAudio` with multipart upload.
//! The connect leg and the total request each carry their own bound; the
//! request bound is generous because audio payloads can be large.

use crate::config::TelegramConfig;
use crate::types::{ChannelTransport, TrackMetadata, TransportError};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram channel transport
pub struct TelegramClient {
    http_client: reqwest::Client,
    bot_token: String,
    chat_id: String,
    request_timeout: Duration,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            request_timeout: config.request_timeout,
        })
    }
}

#[async_trait]
impl ChannelTransport for TelegramClient {
    fn name(&self) -> &'static str {
        "Telegram"
    }

    async fn send_audio(
        &self,
        file_path: &Path,
        metadata: &TrackMetadata,
        caption: &str,
    ) -> Result<(), TransportError> {
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        let bytes = tokio::fs::read(file_path).await?;

        tracing::debug!(
            file = %file_name,
            size_bytes = bytes.len(),
            title = %metadata.title,
            performer = %metadata.artist,
            "Sending audio to channel"
        );

        let audio_part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("title", metadata.title.clone())
            .text("performer", metadata.artist.clone())
            .text("caption", caption.to_string())
            .part("audio", audio_part);

        let url = format!("{}/bot{}/sendAudio", TELEGRAM_API_BASE, self.bot_token);

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Api(format!("Unparseable response: {}", e)))?;

        if !api_response.ok {
            return Err(TransportError::Api(format!(
                "sendAudio failed ({}): {}",
                status,
                api_response
                    .description
                    .unwrap_or_else(|| "no description".to_string())
            )));
        }

        Ok(())
    }
}

/// Bot API response envelope; the payload itself is not needed
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TelegramConfig {
        TelegramConfig {
            bot_token: "123:abc".to_string(),
            chat_id: "@channel".to_string(),
            request_timeout: Duration::from_secs(300),
        }
    }

    #[test]
    fn test_client_creation() {
        let client = TelegramClient::new(&test_config());
        assert!(client.is_ok());
        assert_eq!(client.unwrap().name(), "Telegram");
    }

    #[test]
    fn test_parse_ok_response() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"ok": true, "result": {"message_id": 7}}"#).unwrap();
        assert!(response.ok);
        assert!(response.description.is_none());
    }

    #[test]
    fn test_parse_error_response() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#,
        )
        .unwrap();
        assert!(!response.ok);
        assert_eq!(
            response.description.as_deref(),
            Some("Bad Request: chat not found")
        );
    }

    #[tokio::test]
    async fn test_send_missing_file_is_io_error() {
        let client = TelegramClient::new(&test_config()).unwrap();
        let metadata = TrackMetadata {
            title: "Echo".to_string(),
            artist: "Nova".to_string(),
        };

        let result = client
            .send_audio(Path::new("/nonexistent/song1.mp3"), &metadata, "")
            .await;

        match result {
            Err(TransportError::Io(_)) => {}
            other => panic!("Expected Io error, got {:?}", other),
        }
    }
}
