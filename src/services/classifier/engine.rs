//! The seam between the pipeline and whatever produces a label.
//!
//! A real engine (ONNX, TensorFlow, a remote service) implements
//! [`InferenceEngine`] and is handed to the session. Implementations must be
//! deterministic for the same model and image, return one of the two
//! [`DocumentLabel`] values, and report a calibrated confidence in `[0, 1]`.
//! [`RandomEngine`] ignores all of that and flips a coin.

use crate::config::Settings;
use crate::error::AppError;
use crate::models::archive_types::ExtractedImage;
use crate::models::classify_types::DocumentLabel;
use crate::services::classifier::model_manager::ModelDescriptor;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inference {
    pub label: DocumentLabel,
    pub confidence: f32,
}

#[async_trait]
pub trait InferenceEngine: Send + Sync {
    fn name(&self) -> &str;

    async fn infer(&self, model: &ModelDescriptor, image: &ExtractedImage) -> Result<Inference, AppError>;
}

/// Placeholder engine: uniform label, uniform confidence in a fixed range.
pub struct RandomEngine {
    rng: Mutex<StdRng>,
    confidence_min: f32,
    confidence_max: f32,
}

impl RandomEngine {
    pub fn new(confidence_min: f32, confidence_max: f32) -> Result<Self, AppError> {
        Self::with_rng(StdRng::from_os_rng(), confidence_min, confidence_max)
    }

    /// Reproducible sequence of draws for a given seed.
    pub fn seeded(seed: u64, confidence_min: f32, confidence_max: f32) -> Result<Self, AppError> {
        Self::with_rng(StdRng::seed_from_u64(seed), confidence_min, confidence_max)
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        Self::new(settings.confidence_min, settings.confidence_max)
    }

    /// Bounds are ordered and clamped into `[0, 1]`; NaN or infinite ones are rejected.
    fn with_rng(rng: StdRng, confidence_min: f32, confidence_max: f32) -> Result<Self, AppError> {
        if !confidence_min.is_finite() || !confidence_max.is_finite() {
            return Err(AppError::Config(format!(
                "confidence range [{}, {}] is not finite",
                confidence_min, confidence_max
            )));
        }
        let (lo, hi) = if confidence_min <= confidence_max {
            (confidence_min, confidence_max)
        } else {
            (confidence_max, confidence_min)
        };
        Ok(Self {
            rng: Mutex::new(rng),
            confidence_min: lo.clamp(0.0, 1.0),
            confidence_max: hi.clamp(0.0, 1.0),
        })
    }
}

#[async_trait]
impl InferenceEngine for RandomEngine {
    fn name(&self) -> &str {
        "random"
    }

    async fn infer(&self, _model: &ModelDescriptor, _image: &ExtractedImage) -> Result<Inference, AppError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let label = if rng.random_bool(0.5) {
            DocumentLabel::Aadhar
        } else {
            DocumentLabel::PanCard
        };
        let confidence = rng.random_range(self.confidence_min..=self.confidence_max);
        Ok(Inference { label, confidence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{extracted, loaded_model};

    #[tokio::test]
    async fn test_random_engine_stays_in_range() {
        let engine = RandomEngine::seeded(7, 0.75, 0.99).unwrap();
        let model = loaded_model();
        let image = extracted("a.jpg", b"data");

        let mut seen_aadhar = false;
        let mut seen_pan = false;
        for _ in 0..500 {
            let inference = engine.infer(&model, &image).await.unwrap();
            assert!((0.75..=0.99).contains(&inference.confidence));
            match inference.label {
                DocumentLabel::Aadhar => seen_aadhar = true,
                DocumentLabel::PanCard => seen_pan = true,
            }
        }
        assert!(seen_aadhar && seen_pan);
    }

    #[tokio::test]
    async fn test_seeded_engines_agree() {
        let a = RandomEngine::seeded(42, 0.75, 0.99).unwrap();
        let b = RandomEngine::seeded(42, 0.75, 0.99).unwrap();
        let model = loaded_model();
        let image = extracted("a.jpg", b"data");

        for _ in 0..20 {
            assert_eq!(
                a.infer(&model, &image).await.unwrap(),
                b.infer(&model, &image).await.unwrap()
            );
        }
    }

    #[tokio::test]
    async fn test_inverted_range_is_normalized() {
        let engine = RandomEngine::seeded(1, 0.9, 0.8).unwrap();
        let inference = engine
            .infer(&loaded_model(), &extracted("a.png", b"x"))
            .await
            .unwrap();
        assert!((0.8..=0.9).contains(&inference.confidence));
    }

    #[tokio::test]
    async fn test_non_finite_bounds_are_rejected() {
        assert!(matches!(RandomEngine::seeded(1, f32::NAN, 0.9), Err(AppError::Config(_))));
        assert!(matches!(RandomEngine::new(0.5, f32::INFINITY), Err(AppError::Config(_))));

        let engine = RandomEngine::seeded(1, -3.0, 7.0).unwrap();
        let inference = engine
            .infer(&loaded_model(), &extracted("a.png", b"x"))
            .await
            .unwrap();
        assert!((0.0..=1.0).contains(&inference.confidence));
    }
}
