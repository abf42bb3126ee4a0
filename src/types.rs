//! Shared types and collaborator seams
//!
//! The two external collaborators (the messaging channel and the caption
//! service) are reached through async traits so the pipeline and uploader can
//! be exercised with stub implementations in tests.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Identity of a delivered song, used for duplicate suppression.
///
/// Keys compare case-insensitively on (artist, title); a re-encoded or
/// renamed copy of an already-delivered song hashes to the same key. The
/// source path is deliberately not part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackKey {
    artist: String,
    title: String,
}

impl TrackKey {
    pub fn new(artist: &str, title: &str) -> Self {
        Self {
            artist: artist.trim().to_lowercase(),
            title: title.trim().to_lowercase(),
        }
    }
}

/// Title/performer pair derived from embedded tags (or the filename fallback)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    /// Track title
    pub title: String,
    /// Performer (artist) name
    pub artist: String,
}

impl TrackMetadata {
    pub fn key(&self) -> TrackKey {
        TrackKey::new(&self.artist, &self.title)
    }
}

/// Terminal outcome of the uploader's retry state machine for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Delivery confirmed by the channel
    Delivered {
        /// Attempts made, including the successful one
        attempts: u32,
    },
    /// Retry bound reached without a confirmed delivery
    Exhausted {
        /// Attempts made, all failed
        attempts: u32,
    },
}

/// Per-run outcome counts
///
/// Invariant: `delivered + skipped_duplicates + failed == discovered`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// New candidates this run (after the path pre-filter)
    pub discovered: usize,
    /// Items confirmed delivered and recorded
    pub delivered: usize,
    /// Items skipped because their (artist, title) was already recorded
    pub skipped_duplicates: usize,
    /// Items that exhausted their retry budget
    pub failed: usize,
}

/// Transport errors from the messaging channel
///
/// The uploader treats every variant uniformly as retryable; the distinction
/// exists for logging and tests.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request never completed (connect failure, timeout, broken transfer)
    #[error("Network error: {0}")]
    Network(String),

    /// Channel answered but refused the delivery
    #[error("API error: {0}")]
    Api(String),

    /// Local file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Caption service errors, always recovered by delivering without enrichment
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Messaging channel collaborator
///
/// One call delivers one file plus its derived metadata and caption, and
/// either confirms success or fails. Retry policy lives in the uploader,
/// never in implementations of this trait.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Human-readable transport name for logging
    fn name(&self) -> &'static str;

    /// Deliver one audio file to the channel
    async fn send_audio(
        &self,
        file_path: &Path,
        metadata: &TrackMetadata,
        caption: &str,
    ) -> Result<(), TransportError>;
}

/// Caption service collaborator
///
/// Purely functional from the pipeline's perspective: (artist, title) in,
/// enrichment text out. May fail or return empty text; neither blocks
/// delivery.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn generate(&self, artist: &str, title: &str) -> Result<String, CaptionError>;
}
