//! Configuration loading and resolution
//!
//! Resolution priority for every key: command line > environment variable >
//! TOML config file > compiled default. Secrets (bot token, caption API key)
//! are never compiled in and have no default.

use crate::services::uploader::RetryPolicy;
use crate::{cli::Args, Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_BASE_SECS: u64 = 2;
const DEFAULT_CAPTION_MODEL: &str = "gpt-4o-mini";

/// Raw deserialized shape of the TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub music_dir: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub telegram: TelegramSection,
    #[serde(default)]
    pub caption: CaptionSection,
    #[serde(default)]
    pub upload: UploadSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramSection {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptionSection {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub tag_line: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadSection {
    pub max_attempts: Option<u32>,
    pub backoff_base_secs: Option<u64>,
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of audio files to watch
    pub music_dir: PathBuf,
    /// SQLite delivery-record database
    pub database_path: PathBuf,
    /// Telegram transport settings
    pub telegram: TelegramConfig,
    /// Caption service settings; `None` disables caption generation
    pub caption: Option<CaptionConfig>,
    /// Trailing tag line appended to every caption (may be empty)
    pub tag_line: String,
    /// Delivery retry policy
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    /// Total per-request bound; generous because audio payloads can be large
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CaptionConfig {
    pub api_key: String,
    pub model: String,
}

impl Config {
    /// Resolve the runtime configuration from CLI args, environment and the
    /// TOML config file.
    pub fn resolve(args: &Args) -> Result<Self> {
        let file = load_file_config(args)?;

        // clap already merged CLI over TUNEDROP_MUSIC_DIR / TUNEDROP_DATABASE
        let music_dir = args
            .music_dir
            .clone()
            .or(file.music_dir)
            .ok_or_else(|| {
                Error::Config(
                    "Music directory not configured. Set music_dir in the config file, \
                     TUNEDROP_MUSIC_DIR, or pass --music-dir."
                        .to_string(),
                )
            })?;

        let database_path = args
            .database
            .clone()
            .or(file.database_path)
            .unwrap_or_else(default_database_path);

        let bot_token = resolve_secret("TUNEDROP_BOT_TOKEN", file.telegram.bot_token.as_deref())
            .ok_or_else(|| Error::Config("Telegram bot token not configured".to_string()))?;
        let chat_id = resolve_secret("TUNEDROP_CHAT_ID", file.telegram.chat_id.as_deref())
            .ok_or_else(|| Error::Config("Telegram chat id not configured".to_string()))?;

        let caption = match resolve_secret(
            "TUNEDROP_CAPTION_API_KEY",
            file.caption.api_key.as_deref(),
        ) {
            Some(api_key) => Some(CaptionConfig {
                api_key,
                model: file
                    .caption
                    .model
                    .unwrap_or_else(|| DEFAULT_CAPTION_MODEL.to_string()),
            }),
            None => {
                info!("No caption API key configured; deliveries will carry the tag line only");
                None
            }
        };

        Ok(Config {
            music_dir,
            database_path,
            telegram: TelegramConfig {
                bot_token,
                chat_id,
                request_timeout: Duration::from_secs(
                    file.telegram
                        .request_timeout_secs
                        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
                ),
            },
            caption,
            tag_line: file.caption.tag_line.unwrap_or_default(),
            retry: RetryPolicy {
                max_attempts: file.upload.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
                backoff_base_secs: file
                    .upload
                    .backoff_base_secs
                    .unwrap_or(DEFAULT_BACKOFF_BASE_SECS),
            },
        })
    }
}

/// Load the TOML config file, tolerating a missing file only at the default
/// location. An explicitly named file that cannot be read is a fatal
/// configuration error.
fn load_file_config(args: &Args) -> Result<FileConfig> {
    let (path, explicit) = match &args.config {
        Some(path) => (path.clone(), true),
        None => (default_config_path(), false),
    };

    if !path.exists() {
        if explicit {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(FileConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let config: FileConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Default config file location: `~/.config/tunedrop/config.toml`
fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("tunedrop").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("tunedrop.toml"))
}

/// Default database location: `~/.local/share/tunedrop/tunedrop.db`
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tunedrop").join("tunedrop.db"))
        .unwrap_or_else(|| PathBuf::from("tunedrop.db"))
}

/// Resolve a secret from environment over the config file, warning when both
/// are set (potential misconfiguration).
fn resolve_secret(env_name: &str, file_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_name)
        .ok()
        .filter(|v| !v.trim().is_empty());
    let file_value = file_value
        .map(str::to_string)
        .filter(|v| !v.trim().is_empty());

    if env_value.is_some() && file_value.is_some() {
        warn!(
            "{} set in both environment and config file; using environment value",
            env_name
        );
    }

    env_value.or(file_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            music_dir = "/srv/music"
            database_path = "/var/lib/tunedrop/tunedrop.db"

            [telegram]
            bot_token = "123:abc"
            chat_id = "@channel"
            request_timeout_secs = 120

            [caption]
            api_key = "sk-test"
            model = "gpt-4o"
            tag_line = "@channel"

            [upload]
            max_attempts = 5
            backoff_base_secs = 3
        "#;

        let config: FileConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.music_dir, Some(PathBuf::from("/srv/music")));
        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.telegram.request_timeout_secs, Some(120));
        assert_eq!(config.caption.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.upload.max_attempts, Some(5));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: FileConfig = toml::from_str("music_dir = \"/srv/music\"").unwrap();
        assert!(config.telegram.bot_token.is_none());
        assert!(config.caption.api_key.is_none());
        assert!(config.upload.max_attempts.is_none());
    }

    #[test]
    fn test_resolve_secret_prefers_file_when_env_unset() {
        let value = resolve_secret("TUNEDROP_TEST_UNSET_SECRET", Some("from-file"));
        assert_eq!(value.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_resolve_secret_ignores_blank_file_value() {
        let value = resolve_secret("TUNEDROP_TEST_UNSET_SECRET", Some("   "));
        assert!(value.is_none());
    }
}
