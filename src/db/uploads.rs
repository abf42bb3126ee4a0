//! Delivery-record queries
//!
//! The uploads table is the single source of truth for "already delivered".
//! Rows are append-only and written only after a confirmed delivery, so a
//! crash mid-run can at worst leave one delivery unrecorded (re-run prunes
//! manually), never a silent loss.

use crate::types::{TrackKey, TrackMetadata};
use crate::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::Path;

/// One persisted delivery fact
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub artist: String,
    pub title: String,
    pub source_path: String,
    /// ISO-8601 timestamp of the confirmed delivery
    pub uploaded_at: String,
}

impl UploadRecord {
    pub fn new(metadata: &TrackMetadata, source_path: &Path) -> Self {
        Self {
            artist: metadata.artist.clone(),
            title: metadata.title.clone(),
            source_path: source_path.to_string_lossy().to_string(),
            uploaded_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Load every recorded (artist, title) identity, read once at run start.
pub async fn load_known_keys(pool: &SqlitePool) -> Result<HashSet<TrackKey>> {
    let rows = sqlx::query_as::<_, (String, String)>("SELECT artist, title FROM uploads")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|(artist, title)| TrackKey::new(artist, title))
        .collect())
}

/// Load the file names of every recorded source path.
///
/// Compared by file name rather than full path so the record stays valid when
/// the music directory is reached via a different prefix across runs.
pub async fn load_known_file_names(pool: &SqlitePool) -> Result<HashSet<String>> {
    let rows = sqlx::query_as::<_, (String,)>("SELECT source_path FROM uploads")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .filter_map(|(path,)| {
            Path::new(path)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
        })
        .collect())
}

/// Append one delivery record. Called only after the channel confirmed the
/// delivery; the INSERT is durable before this function returns.
pub async fn record_upload(pool: &SqlitePool, record: &UploadRecord) -> Result<()> {
    sqlx::query(
        "INSERT INTO uploads (artist, title, source_path, uploaded_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&record.artist)
    .bind(&record.title)
    .bind(&record.source_path)
    .bind(&record.uploaded_at)
    .execute(pool)
    .await?;

    tracing::debug!(
        artist = %record.artist,
        title = %record.title,
        source = %record.source_path,
        "Delivery recorded"
    );

    Ok(())
}
