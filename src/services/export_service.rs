use crate::error::AppError;
use crate::models::archive_types::{ExportArtifact, ExportSummary};
use crate::models::classify_types::{ClassificationResult, DocumentLabel, LabelCounts};
use crate::services::fs_service;
use crate::services::image_store::ImageStore;
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

fn entry_options() -> SimpleFileOptions {
    // Fixed timestamp so the same result set always yields the same bytes.
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
}

/// Pack every result's image into `aadhar_cards/` or `pan_cards/`.
///
/// Both folders are always present. Blocks the calling thread.
pub fn build_export_archive(
    results: &[ClassificationResult],
    store: &ImageStore,
) -> Result<ExportArtifact, AppError> {
    if results.is_empty() {
        return Err(AppError::NothingToExport);
    }

    let options = entry_options();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for label in DocumentLabel::ALL {
        writer
            .add_directory(format!("{}/", label.folder_name()), options)
            .map_err(|e| AppError::Export(format!("Failed to add {}: {}", label.folder_name(), e)))?;
    }

    let mut taken: HashMap<DocumentLabel, HashSet<String>> = HashMap::new();
    let mut counts = LabelCounts::default();

    for result in results {
        let data = store.resolve(&result.image).ok_or_else(|| {
            AppError::Export(format!("Image data for {} is no longer available", result.filename))
        })?;

        let label = result.classification;
        let name = unique_name(taken.entry(label).or_default(), &result.filename);
        let entry = format!("{}/{}", label.folder_name(), name);

        writer
            .start_file(entry.clone(), options)
            .map_err(|e| AppError::Export(format!("Failed to start {}: {}", entry, e)))?;
        writer
            .write_all(&data)
            .map_err(|e| AppError::Export(format!("Failed to write {}: {}", entry, e)))?;

        counts.record(label);
    }

    let bytes = writer
        .finish()
        .map_err(|e| AppError::Export(format!("Failed to finalize archive: {}", e)))?
        .into_inner();

    Ok(ExportArtifact { bytes, counts })
}

/// `name`, or `stem (n).ext` with the smallest free `n`.
fn unique_name(taken: &mut HashSet<String>, name: &str) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };

    let mut n = 1;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Build the archive off the async runtime and deliver it as `dir/file_name`.
pub async fn export_results(
    results: Vec<ClassificationResult>,
    store: ImageStore,
    dir: &Path,
    file_name: &str,
) -> Result<ExportSummary, AppError> {
    if results.is_empty() {
        return Err(AppError::NothingToExport);
    }

    let artifact = tokio::task::spawn_blocking(move || build_export_archive(&results, &store))
        .await
        .map_err(|e| AppError::Export(format!("Task join failed: {}", e)))??;

    let path = fs_service::write_atomically(dir, file_name, &artifact.bytes).await?;
    tracing::info!(
        path = %path.display(),
        aadhar = artifact.counts.aadhar,
        pancard = artifact.counts.pancard,
        "Export written"
    );

    Ok(ExportSummary {
        path,
        size: artifact.bytes.len() as u64,
        counts: artifact.counts,
    })
}
