use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// An image pulled out of an uploaded archive.
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    /// Last path segment of the archive entry.
    pub filename: String,
    pub data: Arc<[u8]>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub entry: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub images: Vec<ExtractedImage>,
    /// Only populated under the best-effort policy.
    pub failures: Vec<EntryFailure>,
}

#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub counts: super::classify_types::LabelCounts,
}

#[derive(Debug, Serialize, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub size: u64,
    pub counts: super::classify_types::LabelCounts,
}
