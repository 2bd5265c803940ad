use crate::error::AppError;
use crate::models::archive_types::ExtractedImage;
use crate::models::classify_types::ClassificationResult;
use crate::services::classifier::engine::InferenceEngine;
use crate::services::classifier::model_manager::ModelDescriptor;
use crate::services::image_store::ImageStore;
use uuid::Uuid;

/// Classify one extracted image and register its bytes for display and export.
pub async fn classify_image(
    engine: &dyn InferenceEngine,
    model: &ModelDescriptor,
    image: &ExtractedImage,
    store: &ImageStore,
) -> Result<ClassificationResult, AppError> {
    if !model.loaded {
        return Err(AppError::ModelNotLoaded);
    }

    let inference = engine.infer(model, image).await.map_err(|e| match e {
        AppError::Processing(_) => e,
        other => AppError::Processing(format!("{}: {}", image.filename, other)),
    })?;

    if !inference.confidence.is_finite() || !(0.0..=1.0).contains(&inference.confidence) {
        return Err(AppError::Processing(format!(
            "{} returned confidence {} for {}",
            engine.name(),
            inference.confidence,
            image.filename
        )));
    }

    let handle = store.insert(image.data.clone());

    Ok(ClassificationResult {
        id: Uuid::new_v4(),
        filename: image.filename.clone(),
        image: handle,
        classification: inference.label,
        confidence: inference.confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classify_types::DocumentLabel;
    use crate::services::classifier::engine::RandomEngine;
    use crate::test_support::{extracted, loaded_model, FixedEngine};

    #[tokio::test]
    async fn test_result_carries_filename_and_bytes() {
        let store = ImageStore::new();
        let engine = FixedEngine::new(DocumentLabel::PanCard, 0.9);

        let result = classify_image(&engine, &loaded_model(), &extracted("card.jpg", b"jpeg"), &store)
            .await
            .unwrap();

        assert_eq!(result.filename, "card.jpg");
        assert_eq!(result.classification, DocumentLabel::PanCard);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(store.resolve(&result.image).as_deref(), Some(b"jpeg".as_slice()));
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = ImageStore::new();
        let engine = RandomEngine::seeded(3, 0.75, 0.99).unwrap();
        let model = loaded_model();
        let image = extracted("a.jpg", b"x");

        let a = classify_image(&engine, &model, &image, &store).await.unwrap();
        let b = classify_image(&engine, &model, &image, &store).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.image, b.image);
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_confidence() {
        let store = ImageStore::new();
        let engine = FixedEngine::new(DocumentLabel::Aadhar, 1.5);

        let result = classify_image(&engine, &loaded_model(), &extracted("a.jpg", b"x"), &store).await;
        assert!(matches!(result, Err(AppError::Processing(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_unloaded_model_never_reaches_engine() {
        let store = ImageStore::new();
        let engine = FixedEngine::new(DocumentLabel::Aadhar, 0.8);
        let mut model = loaded_model();
        model.loaded = false;

        let result = classify_image(&engine, &model, &extracted("a.jpg", b"x"), &store).await;
        assert!(matches!(result, Err(AppError::ModelNotLoaded)));
        assert_eq!(engine.calls(), 0);
    }
}
