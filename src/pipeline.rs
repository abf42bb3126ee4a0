//! Run orchestration
//!
//! Drives one end-to-end run: scan → resolve new work → per item: extract
//! metadata → duplicate check → caption → deliver → record. Per-item failures
//! are isolated — one bad file never blocks the rest of the batch. Only a
//! directory fault or a delivery-record fault aborts the run.

use crate::db::uploads::{self, UploadRecord};
use crate::services::caption_generator::compose_caption;
use crate::services::file_scanner::FileScanner;
use crate::services::metadata_extractor::MetadataExtractor;
use crate::services::uploader::Uploader;
use crate::types::{CaptionSource, RunSummary, UploadOutcome};
use crate::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// One-run pipeline over explicit dependencies; no ambient state
pub struct Pipeline {
    db: SqlitePool,
    music_dir: PathBuf,
    scanner: FileScanner,
    extractor: MetadataExtractor,
    uploader: Uploader,
    captioner: Option<Box<dyn CaptionSource>>,
    tag_line: String,
}

impl Pipeline {
    pub fn new(
        db: SqlitePool,
        music_dir: PathBuf,
        uploader: Uploader,
        captioner: Option<Box<dyn CaptionSource>>,
        tag_line: String,
    ) -> Self {
        Self {
            db,
            music_dir,
            scanner: FileScanner::new(),
            extractor: MetadataExtractor::new(),
            uploader,
            captioner,
            tag_line,
        }
    }

    /// Execute one complete run and return the outcome counts.
    ///
    /// Items left undelivered (exhausted retries) are not recorded and are
    /// naturally rediscovered on the next invocation.
    pub async fn run(&self) -> Result<RunSummary> {
        let candidates = self
            .scanner
            .list_candidates(&self.music_dir)
            .map_err(|e| Error::Config(e.to_string()))?;

        info!(
            directory = %self.music_dir.display(),
            candidates = candidates.len(),
            "Scan complete"
        );

        let mut known_keys = uploads::load_known_keys(&self.db).await?;
        let known_names = uploads::load_known_file_names(&self.db).await?;

        let work = resolve_new(candidates, &known_names);

        let mut summary = RunSummary {
            discovered: work.len(),
            ..RunSummary::default()
        };

        if work.is_empty() {
            info!("No new audio files found");
            return Ok(summary);
        }

        info!(new_files = work.len(), "Found new files to process");

        for path in &work {
            let metadata = self.extractor.extract(path);
            let key = metadata.key();

            // A "new" path may still carry an already-delivered song
            // (renamed or re-encoded copy); skip it by identity.
            if known_keys.contains(&key) {
                info!(
                    file = %path.display(),
                    artist = %metadata.artist,
                    title = %metadata.title,
                    "Already delivered under this identity; skipping"
                );
                summary.skipped_duplicates += 1;
                continue;
            }

            let caption = self.build_caption(&metadata.artist, &metadata.title).await;

            match self.uploader.deliver(path, &metadata, &caption).await {
                UploadOutcome::Delivered { attempts } => {
                    uploads::record_upload(&self.db, &UploadRecord::new(&metadata, path)).await?;
                    known_keys.insert(key);
                    summary.delivered += 1;
                    info!(
                        file = %path.display(),
                        artist = %metadata.artist,
                        title = %metadata.title,
                        attempts,
                        "Delivered"
                    );
                }
                UploadOutcome::Exhausted { attempts } => {
                    summary.failed += 1;
                    error!(
                        file = %path.display(),
                        attempts,
                        "Delivery failed; will retry on a future run"
                    );
                }
            }
        }

        info!(
            discovered = summary.discovered,
            delivered = summary.delivered,
            skipped_duplicates = summary.skipped_duplicates,
            failed = summary.failed,
            "Run complete"
        );

        Ok(summary)
    }

    /// Generate the delivery caption, degrading to the tag line on any
    /// caption-service failure.
    async fn build_caption(&self, artist: &str, title: &str) -> String {
        let enrichment = match &self.captioner {
            Some(captioner) => match captioner.generate(artist, title).await {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!(
                        artist = %artist,
                        title = %title,
                        error = %e,
                        "Caption generation failed; delivering without enrichment"
                    );
                    None
                }
            },
            None => None,
        };

        compose_caption(enrichment.as_deref(), &self.tag_line)
    }
}

/// Set-difference the candidate paths against already-recorded file names.
///
/// Computed fresh every run. Uses set semantics: a name listed twice yields
/// one work item.
fn resolve_new(candidates: Vec<PathBuf>, known_names: &HashSet<String>) -> Vec<PathBuf> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut work = Vec::new();

    for path in candidates {
        let Some(name) = file_name_of(&path) else {
            continue;
        };

        if known_names.contains(&name) || !seen.insert(name) {
            continue;
        }

        work.push(path);
    }

    work
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().to_string())
}
