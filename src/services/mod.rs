//! Pipeline components
//!
//! - `file_scanner`: candidate discovery in the watched directory
//! - `metadata_extractor`: tag-derived (title, performer) with fallback
//! - `caption_generator`: LLM enrichment caption
//! - `telegram_client`: Telegram Bot API transport
//! - `uploader`: bounded-retry delivery state machine

pub mod caption_generator;
pub mod file_scanner;
pub mod metadata_extractor;
pub mod telegram_client;
pub mod uploader;
