use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),
    #[error("The archive does not contain any images")]
    NoQualifyingImages,
    #[error("No model loaded")]
    ModelNotLoaded,
    #[error("Failed to load model: {0}")]
    ModelLoad(String),
    #[error("Processing failed: {0}")]
    Processing(String),
    #[error("Classification cancelled")]
    Cancelled,
    #[error("There are no results to export")]
    NothingToExport,
    #[error("Export failed: {0}")]
    Export(String),
    #[error("Failed to build preview: {0}")]
    Preview(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    /// Stable identifier for front ends that branch on the error type.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidArchive(_) => "invalid_archive",
            AppError::NoQualifyingImages => "no_qualifying_images",
            AppError::ModelNotLoaded => "model_not_loaded",
            AppError::ModelLoad(_) => "model_load",
            AppError::Processing(_) => "processing",
            AppError::Cancelled => "cancelled",
            AppError::NothingToExport => "nothing_to_export",
            AppError::Export(_) => "export",
            AppError::Preview(_) => "preview",
            AppError::Config(_) => "config",
        }
    }
}

impl Serialize for AppError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AppError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}
