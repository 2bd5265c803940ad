use crate::error::AppError;
use crate::models::classify_types::ModelStatus;
use crate::models::notification_types::Notification;
use crate::services::classifier::model_manager::ModelSource;
use crate::services::fs_service;
use crate::session::DocumentSession;
use std::path::Path;
use std::sync::Arc;

pub async fn get_model_status(session: &DocumentSession) -> ModelStatus {
    session.model_manager().status().await
}

/// Select a model and run its load. Replaces any earlier model.
pub async fn select_model(
    session: &DocumentSession,
    name: &str,
    source: ModelSource,
) -> Result<ModelStatus, AppError> {
    let manager = session.model_manager();

    let generation = match manager.select_model(name, source).await {
        Ok(g) => g,
        Err(e) => return Err(report_load_error(session, name, e)),
    };

    session.notifier().notify(Notification::ModelSelected {
        name: name.to_string(),
    });

    if let Err(e) = manager.load_model(generation).await {
        return Err(report_load_error(session, name, e));
    }

    Ok(manager.status().await)
}

pub async fn select_model_file(session: &DocumentSession, path: &Path) -> Result<ModelStatus, AppError> {
    let name = fs_service::file_name_string(path);
    select_model(session, &name, ModelSource::File(path.to_path_buf())).await
}

pub async fn select_model_bytes(
    session: &DocumentSession,
    name: &str,
    data: Vec<u8>,
) -> Result<ModelStatus, AppError> {
    select_model(session, name, ModelSource::Memory(Arc::from(data))).await
}

fn report_load_error(session: &DocumentSession, name: &str, error: AppError) -> AppError {
    tracing::error!("Error loading model {}: {}", name, error);
    session.notifier().notify(Notification::ModelLoadError {
        name: name.to_string(),
        reason: error.to_string(),
    });
    error
}
