//! Audio metadata extraction
//!
//! Pulls title/artist from embedded tags using lofty. Extraction never fails
//! the run or the item: any unreadable or untagged file degrades to
//! (file name, "Unknown Artist").

use crate::types::TrackMetadata;
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::path::Path;
use thiserror::Error;

/// Performer used when no artist tag can be read
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Metadata extraction errors; always recovered via the filename fallback
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Could not open or parse the file
    #[error("Failed to read file: {0}")]
    ReadError(String),

    /// File parsed but carries no usable tag
    #[error("No metadata found")]
    NoMetadata,
}

/// Metadata extractor
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract (title, performer) for a file, falling back to
    /// (file name, "Unknown Artist") on any failure. The failure is logged
    /// and the fallback pair returned; callers never see an error.
    pub fn extract(&self, file_path: &Path) -> TrackMetadata {
        match self.read_tags(file_path) {
            Ok(metadata) => {
                tracing::debug!(
                    file = %file_path.display(),
                    artist = %metadata.artist,
                    title = %metadata.title,
                    "Extracted metadata"
                );
                metadata
            }
            Err(e) => {
                tracing::warn!(
                    file = %file_path.display(),
                    error = %e,
                    "Metadata extraction failed; using filename fallback"
                );
                fallback_metadata(file_path)
            }
        }
    }

    fn read_tags(&self, file_path: &Path) -> Result<TrackMetadata, MetadataError> {
        let tagged_file = Probe::open(file_path)
            .map_err(|e| MetadataError::ReadError(e.to_string()))?
            .read()
            .map_err(|e| MetadataError::ReadError(e.to_string()))?;

        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .ok_or(MetadataError::NoMetadata)?;

        let title = tag.title().map(|s| s.to_string());
        let artist = tag.artist().map(|s| s.to_string());

        // Missing frames fall back individually, mirroring the degraded pair
        let fallback = fallback_metadata(file_path);
        Ok(TrackMetadata {
            title: title.filter(|s| !s.trim().is_empty()).unwrap_or(fallback.title),
            artist: artist
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(fallback.artist),
        })
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Degraded metadata: file name as title, "Unknown Artist" as performer
fn fallback_metadata(file_path: &Path) -> TrackMetadata {
    let title = file_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.to_string_lossy().to_string());

    TrackMetadata {
        title,
        artist: UNKNOWN_ARTIST.to_string(),
    }
}
