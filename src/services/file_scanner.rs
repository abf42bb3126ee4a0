//! Audio file scanner
//!
//! Lists candidate files directly inside the watched directory. No recursion
//! and no filesystem watching; every run rebuilds the candidate set from
//! scratch.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Supported audio extensions, matched case-insensitively
const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "wave", "flac", "aac", "m4a", "alac"];

/// Scanner errors; all fatal to the run (misconfiguration, not transient)
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory exists but cannot be listed
    #[error("Cannot list {0}: {1}")]
    Unlistable(PathBuf, String),
}

/// Audio file scanner
pub struct FileScanner;

impl FileScanner {
    pub fn new() -> Self {
        Self
    }

    /// List candidate audio files: regular files directly inside `directory`
    /// whose extension is in the supported set.
    ///
    /// Order is directory listing order and is not guaranteed stable across
    /// runs; nothing downstream may depend on it.
    pub fn list_candidates(&self, directory: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !directory.exists() {
            return Err(ScanError::PathNotFound(directory.to_path_buf()));
        }

        if !directory.is_dir() {
            return Err(ScanError::NotADirectory(directory.to_path_buf()));
        }

        let mut candidates = Vec::new();

        // Direct children only; subdirectories are out of scope
        for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                ScanError::Unlistable(directory.to_path_buf(), e.to_string())
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            if is_supported_extension(entry.path()) {
                candidates.push(entry.path().to_path_buf());
            }
        }

        tracing::debug!(
            directory = %directory.display(),
            candidates = candidates.len(),
            "Directory scan complete"
        );

        Ok(candidates)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-insensitive extension check against the supported set
fn is_supported_extension(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext_lower.as_str())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_supported_extension_detection() {
        assert!(is_supported_extension(Path::new("song.mp3")));
        assert!(is_supported_extension(Path::new("song.FLAC")));
        assert!(is_supported_extension(Path::new("song.Wave")));
        assert!(!is_supported_extension(Path::new("notes.txt")));
        assert!(!is_supported_extension(Path::new("song.ogg")));
        assert!(!is_supported_extension(Path::new("no_extension")));
    }

    #[test]
    fn test_scan_nonexistent_path() {
        let scanner = FileScanner::new();
        let result = scanner.list_candidates(Path::new("/nonexistent/path"));
        match result {
            Err(ScanError::PathNotFound(_)) => {}
            other => panic!("Expected PathNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_file_as_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("song.mp3");
        fs::write(&file, b"not a directory").unwrap();

        let scanner = FileScanner::new();
        match scanner.list_candidates(&file) {
            Err(ScanError::NotADirectory(_)) => {}
            other => panic!("Expected NotADirectory, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = FileScanner::new();
        assert!(scanner.list_candidates(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_scan_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("song1.mp3"), b"x").unwrap();
        fs::write(dir.path().join("song2.M4A"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("cover.jpg"), b"x").unwrap();

        let scanner = FileScanner::new();
        let mut names: Vec<String> = scanner
            .list_candidates(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();

        assert_eq!(names, vec!["song1.mp3", "song2.M4A"]);
    }

    #[test]
    fn test_scan_ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("album");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("nested.mp3"), b"x").unwrap();
        fs::write(dir.path().join("top.mp3"), b"x").unwrap();

        let scanner = FileScanner::new();
        let candidates = scanner.list_candidates(dir.path()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].file_name().unwrap().to_string_lossy(),
            "top.mp3"
        );
    }
}
