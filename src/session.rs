use crate::config::Settings;
use crate::error::AppError;
use crate::models::classify_types::{ClassificationResult, LabelCounts, ResultFilter};
use crate::services::classifier::engine::{InferenceEngine, RandomEngine};
use crate::services::classifier::model_manager::ModelManager;
use crate::services::image_store::ImageStore;
use crate::services::notifier::{Notifier, TracingNotifier};
use crate::services::thumbnail_service::ThumbnailOptions;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Everything one user session owns: the active model, the current result
/// set and the image bytes behind it.
///
/// Cheap to clone; clones share state. Command handlers take it by reference.
#[derive(Clone)]
pub struct DocumentSession {
    settings: Arc<Settings>,
    model_manager: ModelManager,
    engine: Arc<dyn InferenceEngine>,
    images: ImageStore,
    results: Arc<RwLock<Vec<ClassificationResult>>>,
    cancel_flag: Arc<AtomicBool>,
    notifier: Arc<dyn Notifier>,
}

impl DocumentSession {
    /// Session with the placeholder engine and log-only notifications.
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        settings.validate()?;
        Ok(Self {
            model_manager: ModelManager::new(&settings),
            engine: Arc::new(RandomEngine::from_settings(&settings)?),
            images: ImageStore::new(),
            results: Arc::new(RwLock::new(Vec::new())),
            cancel_flag: Arc::new(AtomicBool::new(false)),
            notifier: Arc::new(TracingNotifier),
            settings: Arc::new(settings),
        })
    }

    pub fn with_engine(mut self, engine: Arc<dyn InferenceEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn model_manager(&self) -> &ModelManager {
        &self.model_manager
    }

    pub fn engine(&self) -> &dyn InferenceEngine {
        self.engine.as_ref()
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn thumbnail_options(&self) -> ThumbnailOptions {
        ThumbnailOptions {
            size: self.settings.thumbnail_size,
            quality: self.settings.thumbnail_quality,
        }
    }

    pub fn results(&self) -> Vec<ClassificationResult> {
        self.results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn filtered_results(&self, filter: ResultFilter) -> Vec<ClassificationResult> {
        self.results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| filter.matches(r.classification))
            .cloned()
            .collect()
    }

    pub fn counts(&self) -> LabelCounts {
        LabelCounts::from_results(&self.results.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Install a new result set, releasing the images of the old one.
    pub fn replace_results(&self, results: Vec<ClassificationResult>) {
        let previous = std::mem::replace(
            &mut *self.results.write().unwrap_or_else(PoisonError::into_inner),
            results,
        );
        self.images.revoke_all(previous.iter().map(|r| &r.image));
    }

    pub fn clear_results(&self) {
        self.replace_results(Vec::new());
    }

    pub fn cancel_flag(&self) -> &AtomicBool {
        &self.cancel_flag
    }

    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    pub fn reset_cancel_flag(&self) {
        self.cancel_flag.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classify_types::DocumentLabel;
    use crate::test_support::result_for;

    fn session() -> DocumentSession {
        DocumentSession::new(Settings::default().without_delays()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let mut settings = Settings::default();
        settings.confidence_min = -0.1;
        assert!(matches!(DocumentSession::new(settings), Err(AppError::Config(_))));
    }

    #[test]
    fn test_replace_results_revokes_previous_images() {
        let session = session();
        let first = result_for(session.images(), "a.jpg", b"a", DocumentLabel::Aadhar);
        session.replace_results(vec![first.clone()]);

        let second = result_for(session.images(), "b.jpg", b"b", DocumentLabel::PanCard);
        session.replace_results(vec![second.clone()]);

        assert!(session.images().resolve(&first.image).is_none());
        assert!(session.images().resolve(&second.image).is_some());
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.results()[0].id, second.id);
    }

    #[test]
    fn test_filter_and_counts() {
        let session = session();
        let store = session.images().clone();
        session.replace_results(vec![
            result_for(&store, "a.jpg", b"a", DocumentLabel::Aadhar),
            result_for(&store, "p.jpg", b"p", DocumentLabel::PanCard),
            result_for(&store, "b.jpg", b"b", DocumentLabel::Aadhar),
        ]);

        assert_eq!(session.filtered_results(ResultFilter::All).len(), 3);
        let aadhar: Vec<String> = session
            .filtered_results(ResultFilter::Aadhar)
            .into_iter()
            .map(|r| r.filename)
            .collect();
        assert_eq!(aadhar, vec!["a.jpg", "b.jpg"]);
        assert_eq!(session.counts(), LabelCounts { aadhar: 2, pancard: 1 });

        session.clear_results();
        assert!(session.results().is_empty());
        assert!(session.images().is_empty());
    }

    #[test]
    fn test_cancel_flag_round_trip() {
        let session = session();
        session.cancel();
        assert!(session.cancel_flag().load(Ordering::Relaxed));
        session.reset_cancel_flag();
        assert!(!session.cancel_flag().load(Ordering::Relaxed));
    }
}
