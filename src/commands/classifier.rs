use crate::error::AppError;
use crate::models::archive_types::ExtractionReport;
use crate::models::classify_types::{ClassificationResult, LabelCounts, ResultFilter, RunSummary};
use crate::models::notification_types::Notification;
use crate::services::archive_service;
use crate::services::pipeline::{self, RunContext};
use crate::services::thumbnail_service;
use crate::session::DocumentSession;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

enum ArchiveInput<'a> {
    Memory(Arc<[u8]>),
    File(&'a Path),
}

/// Classify every image in an uploaded ZIP and make the results current.
pub async fn process_archive(session: &DocumentSession, data: Vec<u8>) -> Result<RunSummary, AppError> {
    let outcome = run_classification(session, ArchiveInput::Memory(Arc::from(data))).await;
    outcome.map_err(|e| report_run_error(session, e))
}

pub async fn process_archive_file(session: &DocumentSession, path: &Path) -> Result<RunSummary, AppError> {
    let outcome = run_classification(session, ArchiveInput::File(path)).await;
    outcome.map_err(|e| report_run_error(session, e))
}

async fn run_classification(session: &DocumentSession, input: ArchiveInput<'_>) -> Result<RunSummary, AppError> {
    let model = session
        .model_manager()
        .current()
        .await
        .filter(|m| m.loaded)
        .ok_or(AppError::ModelNotLoaded)?;

    session.clear_results();
    session.reset_cancel_flag();

    let policy = session.settings().extraction_policy;
    let ExtractionReport { images, failures } = match input {
        ArchiveInput::Memory(data) => archive_service::read_archive(data, policy).await?,
        ArchiveInput::File(path) => archive_service::read_archive_file(path, policy).await?,
    };

    if !failures.is_empty() {
        tracing::warn!(skipped = failures.len(), "Some archive entries could not be extracted");
    }

    if images.is_empty() {
        return Err(AppError::NoQualifyingImages);
    }

    let total = images.len();
    tracing::info!(model = %model.name, total, "Classification started");
    session
        .notifier()
        .notify(Notification::ProcessingStarted { count: total });

    let ctx = RunContext {
        engine: session.engine(),
        store: session.images(),
        pacing: session.settings().pacing_delay(),
        cancel_flag: session.cancel_flag(),
    };
    let results = pipeline::classify_all(&ctx, Some(&model), &images, |progress| {
        session
            .notifier()
            .notify(Notification::ClassificationProgress(progress));
    })
    .await?;

    let counts = LabelCounts::from_results(&results);
    session.replace_results(results);

    tracing::info!(total, aadhar = counts.aadhar, pancard = counts.pancard, "Classification complete");
    session
        .notifier()
        .notify(Notification::ClassificationComplete {
            total,
            counts,
            skipped: failures.len(),
        });

    Ok(RunSummary {
        total,
        counts,
        skipped: failures,
    })
}

fn report_run_error(session: &DocumentSession, error: AppError) -> AppError {
    let notification = match &error {
        AppError::ModelNotLoaded => Notification::NoModelLoaded,
        AppError::NoQualifyingImages => Notification::NoImagesFound,
        AppError::Cancelled => Notification::ProcessingCancelled,
        other => {
            tracing::error!("Error processing archive: {}", other);
            Notification::ProcessingError {
                reason: other.to_string(),
            }
        }
    };
    session.notifier().notify(notification);
    error
}

/// Ask a running classification to stop at its next item.
pub fn cancel_classification(session: &DocumentSession) {
    session.cancel();
}

pub fn get_results(session: &DocumentSession, filter: Option<ResultFilter>) -> Vec<ClassificationResult> {
    session.filtered_results(filter.unwrap_or_default())
}

pub fn get_counts(session: &DocumentSession) -> LabelCounts {
    session.counts()
}

/// Drop the current results so a new archive can be uploaded.
pub fn reset_results(session: &DocumentSession) {
    session.clear_results();
}

/// Thumbnail of a result's image as a data URI.
pub async fn get_preview(session: &DocumentSession, id: Uuid) -> Result<String, AppError> {
    let result = session
        .results()
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::Preview(format!("No result with id {}", id)))?;

    let data = session
        .images()
        .resolve(&result.image)
        .ok_or_else(|| AppError::Preview(format!("Image for {} is no longer available", result.filename)))?;

    let options = session.thumbnail_options();
    tokio::task::spawn_blocking(move || thumbnail_service::generate_thumbnail(&data, options))
        .await
        .map_err(|e| AppError::Preview(format!("Task join failed: {}", e)))?
}
