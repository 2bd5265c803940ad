use crate::error::AppError;
use crate::models::archive_types::{ExportArtifact, ExportSummary};
use crate::models::notification_types::Notification;
use crate::services::export_service;
use crate::session::DocumentSession;
use std::path::Path;

/// Write the sorted archive into `dir` and report per-label counts.
pub async fn export_results(session: &DocumentSession, dir: &Path) -> Result<ExportSummary, AppError> {
    let results = session.results();
    let file_name = session.settings().export_file_name.clone();

    match export_service::export_results(results, session.images().clone(), dir, &file_name).await {
        Ok(summary) => {
            session.notifier().notify(Notification::ExportComplete {
                path: summary.path.clone(),
                counts: summary.counts,
            });
            Ok(summary)
        }
        Err(e) => Err(report_export_error(session, e)),
    }
}

/// Build the sorted archive in memory for callers that deliver it themselves.
pub async fn build_export(session: &DocumentSession) -> Result<ExportArtifact, AppError> {
    let results = session.results();
    if results.is_empty() {
        return Err(report_export_error(session, AppError::NothingToExport));
    }

    let store = session.images().clone();
    let built = tokio::task::spawn_blocking(move || export_service::build_export_archive(&results, &store))
        .await
        .map_err(|e| AppError::Export(format!("Task join failed: {}", e)))
        .and_then(|r| r);

    built.map_err(|e| report_export_error(session, e))
}

fn report_export_error(session: &DocumentSession, error: AppError) -> AppError {
    let notification = match &error {
        AppError::NothingToExport => Notification::NoResults,
        other => {
            tracing::error!("Error exporting results: {}", other);
            Notification::ExportFailed {
                reason: other.to_string(),
            }
        }
    };
    session.notifier().notify(notification);
    error
}
