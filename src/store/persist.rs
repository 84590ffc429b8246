//! Whole-document persistence.
//!
//! Loading never fails: a missing file yields an empty document and an
//! unreadable or corrupt one is logged and replaced by an empty document.
//! Writes replace the file atomically (temp file + rename) while holding an
//! exclusive `fs2` lock on the destination.

use fs2::FileExt;
use log::{error, info};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use super::errors::StoreError;
use super::records::Document;

/// Read the document at `path`.
pub async fn load_document(path: &Path) -> Document {
    match tokio::fs::read_to_string(path).await {
        Ok(data) => {
            // Guard against any accidental leading NULs from an interrupted write
            let cleaned = data.trim_start_matches('\0');
            if cleaned.trim().is_empty() {
                info!("Data file {} is empty, starting fresh", path.display());
                return Document::default();
            }
            match serde_json::from_str::<Document>(cleaned) {
                Ok(doc) => {
                    info!("Loaded bot data from {}", path.display());
                    doc
                }
                Err(e) => {
                    error!(
                        "Data file {} is corrupt ({}); resetting to an empty store",
                        path.display(),
                        e
                    );
                    Document::default()
                }
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No existing data file at {}, starting fresh", path.display());
            Document::default()
        }
        Err(e) => {
            error!(
                "Failed reading data file {} ({}); resetting to an empty store",
                path.display(),
                e
            );
            Document::default()
        }
    }
}

/// Serialize a document snapshot.
pub fn encode_document(doc: &Document) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Replace `path` with `content` under an exclusive lock. Blocking.
pub fn write_file_locked(path: &Path, content: &str) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let lock_file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)?;
    lock_file.lock_exclusive()?;

    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("merlin_data.json");
    let mut counter = 0u32;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut tmp) => {
                tmp.write_all(content.as_bytes())?;
                tmp.flush()?;
                let _ = tmp.sync_all();
                break candidate;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
            }
            Err(e) => return Err(e.into()),
        }
    };

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }

    drop(lock_file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let doc = load_document(&dir.path().join("nope.json")).await;
        assert_eq!(doc, Document::default());
    }

    #[tokio::test]
    async fn corrupt_file_resets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_document(&path).await, Document::default());
    }

    #[tokio::test]
    async fn write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");
        let mut doc = Document::default();
        doc.reputation.entry(1).or_default().insert(2, 7);
        write_file_locked(&path, &encode_document(&doc).unwrap()).unwrap();
        assert_eq!(load_document(&path).await, doc);
        // No temp files left behind
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
