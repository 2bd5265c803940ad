use crate::error::AppError;
use crate::models::archive_types::{EntryFailure, ExtractedImage, ExtractionReport};
use crate::services::fs_service;
use crate::services::task_group::{FailurePolicy, TaskGroup};
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use zip::ZipArchive;

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];
const ARCHIVE_EXTENSION: &str = "zip";

type SharedArchive = ZipArchive<Cursor<Arc<[u8]>>>;

struct QualifyingEntry {
    index: usize,
    path: String,
}

pub fn is_image_entry(path: &str) -> bool {
    let lower = path.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Last `/`-separated segment of an archive path.
pub fn entry_filename(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => path,
    }
}

/// Extract every image entry of a ZIP blob.
///
/// Entries are listed in central-directory order, filtered, then decompressed
/// in parallel and joined before returning. Blocks the calling thread.
pub fn extract_images(data: Arc<[u8]>, policy: FailurePolicy) -> Result<ExtractionReport, AppError> {
    let mut archive: SharedArchive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| AppError::InvalidArchive(e.to_string()))?;

    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let file = archive.by_index_raw(index).map_err(|e| {
            AppError::InvalidArchive(format!("Failed to read entry {}: {}", index, e))
        })?;
        if file.is_dir() || !is_image_entry(file.name()) {
            continue;
        }
        entries.push(QualifyingEntry {
            index,
            path: file.name().to_string(),
        });
    }

    tracing::debug!(
        total = archive.len(),
        qualifying = entries.len(),
        "Scanned archive entries"
    );

    if entries.is_empty() {
        return Ok(ExtractionReport::default());
    }

    let outcome = TaskGroup::new(policy)
        .run(&entries, |entry| read_entry(&archive, entry))
        .map_err(|failure| {
            AppError::InvalidArchive(format!(
                "Failed to extract {}: {}",
                entries[failure.index].path, failure.error
            ))
        })?;

    let failures: Vec<EntryFailure> = outcome
        .failures
        .into_iter()
        .map(|failure| {
            let entry = entries[failure.index].path.clone();
            tracing::warn!("Skipping archive entry {}: {}", entry, failure.error);
            EntryFailure {
                entry,
                reason: failure.error,
            }
        })
        .collect();

    Ok(ExtractionReport {
        images: outcome.completed,
        failures,
    })
}

fn read_entry(archive: &SharedArchive, entry: &QualifyingEntry) -> Result<ExtractedImage, String> {
    // Each worker gets its own cursor; the parsed directory is shared.
    let mut archive = archive.clone();
    let mut file = archive.by_index(entry.index).map_err(|e| e.to_string())?;

    let mut data = Vec::new();
    file.read_to_end(&mut data).map_err(|e| e.to_string())?;

    Ok(ExtractedImage {
        filename: entry_filename(&entry.path).to_string(),
        data: Arc::from(data),
    })
}

pub async fn read_archive(data: Arc<[u8]>, policy: FailurePolicy) -> Result<ExtractionReport, AppError> {
    tokio::task::spawn_blocking(move || extract_images(data, policy))
        .await
        .map_err(|e| AppError::Processing(format!("Task join failed: {}", e)))?
}

pub async fn read_archive_file(path: &Path, policy: FailurePolicy) -> Result<ExtractionReport, AppError> {
    if !fs_service::has_extension(path, ARCHIVE_EXTENSION) {
        return Err(AppError::InvalidArchive(format!(
            "{} is not a .zip file",
            path.display()
        )));
    }

    let data = tokio::fs::read(path).await.map_err(|e| {
        AppError::InvalidArchive(format!("Failed to read {}: {}", path.display(), e))
    })?;

    read_archive(Arc::from(data), policy).await
}
