use crate::error::AppError;
use crate::models::archive_types::ExtractedImage;
use crate::models::classify_types::{ClassificationResult, ClassifyProgress};
use crate::services::classifier::engine::InferenceEngine;
use crate::services::classifier::inference;
use crate::services::classifier::model_manager::ModelDescriptor;
use crate::services::image_store::ImageStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub struct RunContext<'a> {
    pub engine: &'a dyn InferenceEngine,
    pub store: &'a ImageStore,
    /// Pause between items. Zero disables it.
    pub pacing: Duration,
    pub cancel_flag: &'a AtomicBool,
}

/// Classify `images` one by one, in order.
///
/// Any failure or a cancellation aborts the run. Image handles created so far
/// are revoked and no results are returned.
pub async fn classify_all<F>(
    ctx: &RunContext<'_>,
    model: Option<&ModelDescriptor>,
    images: &[ExtractedImage],
    mut on_progress: F,
) -> Result<Vec<ClassificationResult>, AppError>
where
    F: FnMut(ClassifyProgress),
{
    let model = match model {
        Some(m) if m.loaded => m,
        _ => return Err(AppError::ModelNotLoaded),
    };

    let total = images.len();
    let mut results: Vec<ClassificationResult> = Vec::with_capacity(total);

    for (i, image) in images.iter().enumerate() {
        if ctx.cancel_flag.load(Ordering::Relaxed) {
            return Err(abort(ctx.store, &results, AppError::Cancelled));
        }

        match inference::classify_image(ctx.engine, model, image, ctx.store).await {
            Ok(result) => results.push(result),
            Err(e) => return Err(abort(ctx.store, &results, e)),
        }

        on_progress(ClassifyProgress {
            current: i + 1,
            total,
            current_file: image.filename.clone(),
        });

        if !ctx.pacing.is_zero() && i + 1 < total {
            tokio::time::sleep(ctx.pacing).await;
        }
    }

    if ctx.cancel_flag.load(Ordering::Relaxed) {
        return Err(abort(ctx.store, &results, AppError::Cancelled));
    }

    Ok(results)
}

fn abort(store: &ImageStore, partial: &[ClassificationResult], error: AppError) -> AppError {
    let released = store.revoke_all(partial.iter().map(|r| &r.image));
    tracing::warn!(
        completed = partial.len(),
        released,
        "Classification run aborted: {}",
        error
    );
    error
}
