use crate::models::classify_types::{ClassifyProgress, LabelCounts};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Destructive,
}

/// Event raised by the command handlers. Everything except progress is a
/// user-facing toast.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    ModelSelected { name: String },
    ModelLoadError { name: String, reason: String },
    NoModelLoaded,
    NoImagesFound,
    ProcessingStarted { count: usize },
    ClassificationProgress(ClassifyProgress),
    ClassificationComplete {
        total: usize,
        counts: LabelCounts,
        skipped: usize,
    },
    ProcessingError { reason: String },
    ProcessingCancelled,
    NoResults,
    ExportComplete { path: PathBuf, counts: LabelCounts },
    ExportFailed { reason: String },
}

impl Notification {
    pub fn title(&self) -> &'static str {
        match self {
            Notification::ModelSelected { .. } => "Model Selected",
            Notification::ModelLoadError { .. } => "Model Load Error",
            Notification::NoModelLoaded => "No Model Loaded",
            Notification::NoImagesFound => "No Images Found",
            Notification::ProcessingStarted { .. } => "Processing Started",
            Notification::ClassificationProgress(_) => "Classifying",
            Notification::ClassificationComplete { .. } => "Classification Complete",
            Notification::ProcessingError { .. } => "Processing Error",
            Notification::ProcessingCancelled => "Processing Cancelled",
            Notification::NoResults => "No Results",
            Notification::ExportComplete { .. } => "Export Complete",
            Notification::ExportFailed { .. } => "Export Failed",
        }
    }

    pub fn description(&self) -> String {
        match self {
            Notification::ModelSelected { name } => format!("{} is ready.", name),
            Notification::ModelLoadError { name, reason } => {
                format!("Failed to load {}: {}. Please try again.", name, reason)
            }
            Notification::NoModelLoaded => {
                "Please load a model first before processing images.".to_string()
            }
            Notification::NoImagesFound => {
                "The ZIP file doesn't contain any valid images.".to_string()
            }
            Notification::ProcessingStarted { count } => {
                format!("Found {} images to classify.", count)
            }
            Notification::ClassificationProgress(progress) => format!(
                "Classified {} of {}: {}",
                progress.current, progress.total, progress.current_file
            ),
            Notification::ClassificationComplete {
                total,
                counts,
                skipped,
            } => {
                let mut text = format!(
                    "Processed {} documents: {} Aadhar, {} PAN Cards",
                    total, counts.aadhar, counts.pancard
                );
                if *skipped > 0 {
                    text.push_str(&format!(" ({} unreadable files skipped)", skipped));
                }
                text
            }
            Notification::ProcessingError { reason } => format!(
                "Failed to process the ZIP file. Please ensure it's valid. ({})",
                reason
            ),
            Notification::ProcessingCancelled => "Classification was cancelled.".to_string(),
            Notification::NoResults => "There are no classified documents to export.".to_string(),
            Notification::ExportComplete { path, counts } => format!(
                "Exported {} Aadhar and {} PAN Cards to {}",
                counts.aadhar,
                counts.pancard,
                path.display()
            ),
            Notification::ExportFailed { reason } => format!("Export failed: {}", reason),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Notification::ModelLoadError { .. }
            | Notification::NoModelLoaded
            | Notification::NoImagesFound
            | Notification::ProcessingError { .. }
            | Notification::NoResults
            | Notification::ExportFailed { .. } => Severity::Destructive,
            _ => Severity::Info,
        }
    }
}
