use crate::error::AppError;
use crate::services::task_group::FailurePolicy;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Largest thumbnail edge `validate` accepts.
pub const MAX_THUMBNAIL_SIZE: u32 = 4096;

/// Runtime knobs for a classification session.
///
/// Every field has a default, so a settings file only needs the keys it
/// overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Simulated model load time.
    pub model_load_delay_ms: u64,
    /// Pause between classified items. Zero disables it.
    pub pacing_delay_ms: u64,
    pub confidence_min: f32,
    pub confidence_max: f32,
    pub extraction_policy: FailurePolicy,
    pub thumbnail_size: u32,
    pub thumbnail_quality: u8,
    pub export_file_name: String,
    /// Accepted model file extension, without the dot.
    pub model_extension: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_load_delay_ms: 1500,
            pacing_delay_ms: 100,
            confidence_min: 0.75,
            confidence_max: 0.99,
            extraction_policy: FailurePolicy::FailFast,
            thumbnail_size: 200,
            thumbnail_quality: 60,
            export_file_name: "classified_documents.zip".to_string(),
            model_extension: "h5".to_string(),
        }
    }
}

impl Settings {
    pub async fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Config(format!("Failed to read settings file {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, AppError> {
        let settings: Settings = serde_json::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let in_unit = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_unit(self.confidence_min) || !in_unit(self.confidence_max) {
            return Err(AppError::Config(format!(
                "confidence range [{}, {}] must lie within [0, 1]",
                self.confidence_min, self.confidence_max
            )));
        }
        if self.confidence_min > self.confidence_max {
            return Err(AppError::Config(format!(
                "confidence_min {} is greater than confidence_max {}",
                self.confidence_min, self.confidence_max
            )));
        }
        if self.thumbnail_size == 0 || self.thumbnail_quality == 0 {
            return Err(AppError::Config(
                "thumbnail size and quality must be non-zero".to_string(),
            ));
        }
        if self.thumbnail_size > MAX_THUMBNAIL_SIZE {
            return Err(AppError::Config(format!(
                "thumbnail_size {} exceeds {}",
                self.thumbnail_size, MAX_THUMBNAIL_SIZE
            )));
        }
        if self.thumbnail_quality > 100 {
            return Err(AppError::Config(format!(
                "thumbnail_quality {} exceeds 100",
                self.thumbnail_quality
            )));
        }
        if self.export_file_name.trim().is_empty() {
            return Err(AppError::Config("export_file_name is empty".to_string()));
        }
        Ok(())
    }

    pub fn model_load_delay(&self) -> Duration {
        Duration::from_millis(self.model_load_delay_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    /// Settings with every artificial delay removed.
    pub fn without_delays(mut self) -> Self {
        self.model_load_delay_ms = 0;
        self.pacing_delay_ms = 0;
        self
    }
}
