use crate::config::Settings;
use crate::error::AppError;
use crate::models::classify_types::ModelStatus;
use crate::services::fs_service;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Where the model weights live. The bytes are never inspected.
#[derive(Debug, Clone)]
pub enum ModelSource {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    pub name: String,
    pub source: ModelSource,
    pub loaded: bool,
}

/// Holds the single active model and drives its (simulated) load.
///
/// Every selection bumps a generation counter; a load only marks the
/// descriptor loaded if no newer selection happened in the meantime. The
/// counter lives under the same lock as the descriptor, so the check and the
/// write cannot interleave with a selection.
#[derive(Clone)]
pub struct ModelManager {
    state: Arc<Mutex<ModelState>>,
    extension: String,
    load_delay: Duration,
}

#[derive(Default)]
struct ModelState {
    descriptor: Option<ModelDescriptor>,
    generation: u64,
    loading: bool,
    error: Option<String>,
}

impl ModelManager {
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: Arc::new(Mutex::new(ModelState::default())),
            extension: settings.model_extension.clone(),
            load_delay: settings.model_load_delay(),
        }
    }

    /// Replace the active model with an unloaded descriptor.
    ///
    /// Returns the generation to pass to [`ModelManager::load_model`].
    pub async fn select_model(&self, name: &str, source: ModelSource) -> Result<u64, AppError> {
        if !fs_service::has_extension(Path::new(name), &self.extension) {
            return Err(AppError::ModelLoad(format!(
                "{} is not a .{} model file",
                name, self.extension
            )));
        }

        let mut state = self.state.lock().await;
        state.generation += 1;
        state.descriptor = Some(ModelDescriptor {
            name: name.to_string(),
            source,
            loaded: false,
        });
        state.error = None;
        state.loading = true;

        tracing::info!(model = name, generation = state.generation, "Model selected");
        Ok(state.generation)
    }

    /// Run the load for `generation`.
    ///
    /// Returns `Ok(false)` when a newer selection superseded this one.
    pub async fn load_model(&self, generation: u64) -> Result<bool, AppError> {
        let source = {
            let state = self.state.lock().await;
            if state.generation != generation {
                return Ok(false);
            }
            match state.descriptor.as_ref() {
                Some(d) => d.source.clone(),
                None => return Err(AppError::ModelNotLoaded),
            }
        };

        let result = self.do_load_model(&source).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(generation, "Discarding superseded model load");
            return Ok(false);
        }

        state.loading = false;
        match result {
            Ok(()) => {
                if let Some(d) = state.descriptor.as_mut() {
                    d.loaded = true;
                    tracing::info!(model = %d.name, "Model loaded");
                }
                Ok(true)
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn do_load_model(&self, source: &ModelSource) -> Result<(), AppError> {
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        match source {
            ModelSource::File(path) => {
                let metadata = tokio::fs::metadata(path).await.map_err(|e| {
                    AppError::ModelLoad(format!("Failed to read model file {}: {}", path.display(), e))
                })?;
                if !metadata.is_file() {
                    return Err(AppError::ModelLoad(format!(
                        "{} is not a file",
                        path.display()
                    )));
                }
                Ok(())
            }
            ModelSource::Memory(_) => Ok(()),
        }
    }

    pub async fn current(&self) -> Option<ModelDescriptor> {
        self.state.lock().await.descriptor.clone()
    }

    pub async fn is_ready(&self) -> bool {
        self.state
            .lock()
            .await
            .descriptor
            .as_ref()
            .map(|d| d.loaded)
            .unwrap_or(false)
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    pub async fn get_error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    pub async fn status(&self) -> ModelStatus {
        let state = self.state.lock().await;
        ModelStatus {
            selected: state.descriptor.as_ref().map(|d| d.name.clone()),
            loading: state.loading,
            ready: state.descriptor.as_ref().map(|d| d.loaded).unwrap_or(false),
            error: state.error.clone(),
        }
    }
}
