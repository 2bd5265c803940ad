use super::archive_types::EntryFailure;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentLabel {
    #[serde(rename = "aadhar")]
    Aadhar,
    #[serde(rename = "pancard")]
    PanCard,
}

impl DocumentLabel {
    pub const ALL: [DocumentLabel; 2] = [DocumentLabel::Aadhar, DocumentLabel::PanCard];

    /// Top-level folder name inside the exported archive.
    pub fn folder_name(&self) -> &'static str {
        match self {
            DocumentLabel::Aadhar => "aadhar_cards",
            DocumentLabel::PanCard => "pan_cards",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentLabel::Aadhar => "Aadhar Card",
            DocumentLabel::PanCard => "PAN Card",
        }
    }
}

impl fmt::Display for DocumentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Opaque reference to image bytes held by the session's image store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageHandle(Uuid);

impl ImageHandle {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image:{}", self.0)
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ClassificationResult {
    pub id: Uuid,
    pub filename: String,
    pub image: ImageHandle,
    pub classification: DocumentLabel,
    pub confidence: f32,
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub aadhar: usize,
    pub pancard: usize,
}

impl LabelCounts {
    pub fn from_results(results: &[ClassificationResult]) -> Self {
        let mut counts = Self::default();
        for result in results {
            counts.record(result.classification);
        }
        counts
    }

    pub fn record(&mut self, label: DocumentLabel) {
        match label {
            DocumentLabel::Aadhar => self.aadhar += 1,
            DocumentLabel::PanCard => self.pancard += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.aadhar + self.pancard
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFilter {
    #[default]
    All,
    Aadhar,
    #[serde(rename = "pancard")]
    PanCard,
}

impl ResultFilter {
    pub fn matches(&self, label: DocumentLabel) -> bool {
        match self {
            ResultFilter::All => true,
            ResultFilter::Aadhar => label == DocumentLabel::Aadhar,
            ResultFilter::PanCard => label == DocumentLabel::PanCard,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub counts: LabelCounts,
    /// Archive entries left out under the best-effort extraction policy.
    pub skipped: Vec<EntryFailure>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ModelStatus {
    pub selected: Option<String>,
    pub loading: bool,
    pub ready: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ClassifyProgress {
    pub current: usize,
    pub total: usize,
    pub current_file: String,
}
