//! Load-once handle to the classifier.
//!
//! [`SharedModel`] is created cheaply at startup and loads its weights the
//! first time [`get_or_load`](SharedModel::get_or_load) is called.  The
//! outcome is memoised: a corrupt artifact is reported as
//! [`ModelStatus::Failed`] on every later call instead of being re-read.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::config::{AppConfig, AppPaths};

use super::classifier::{EmotionClassifier, LstmClassifier};
use super::info::ModelPaths;
use super::weights::ModelError;

/// Availability of the classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelStatus {
    /// No load has been attempted yet.
    NotLoaded,
    /// Weights loaded; predictions can be served.
    Ready,
    /// Loading failed with the given reason.
    Failed(String),
}

impl ModelStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ModelStatus::NotLoaded => "not loaded",
            ModelStatus::Ready => "ready",
            ModelStatus::Failed(_) => "failed",
        }
    }
}

/// Thread-safe, lazily loaded classifier handle.
///
/// ```rust,no_run
/// use speech_emotion::config::{AppConfig, AppPaths};
/// use speech_emotion::model::SharedModel;
///
/// let model = SharedModel::from_config(&AppConfig::default(), &AppPaths::new());
/// match model.get_or_load() {
///     Ok(classifier) => println!("input shape {:?}", classifier.input_shape()),
///     Err(e) => eprintln!("model unavailable: {e}"),
/// }
/// ```
pub struct SharedModel {
    path: PathBuf,
    input_shape: (usize, usize),
    slot: OnceLock<Result<Arc<dyn EmotionClassifier>, ModelError>>,
}

impl std::fmt::Debug for SharedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedModel")
            .field("path", &self.path)
            .field("input_shape", &self.input_shape)
            .field("status", &self.status())
            .finish()
    }
}

impl SharedModel {
    pub fn new(path: impl Into<PathBuf>, input_shape: (usize, usize)) -> Self {
        Self {
            path: path.into(),
            input_shape,
            slot: OnceLock::new(),
        }
    }

    /// Weights path from `config.model`, falling back to the models directory.
    pub fn from_config(config: &AppConfig, app_paths: &AppPaths) -> Self {
        let path = ModelPaths::from_app_paths(app_paths).resolve(&config.model);
        Self::new(path, (config.model.input_frames, config.model.input_features))
    }

    /// Wrap an already-constructed classifier.
    pub fn preloaded(classifier: Arc<dyn EmotionClassifier>) -> Self {
        let slot = OnceLock::new();
        let input_shape = classifier.input_shape();
        let _ = slot.set(Ok(classifier));
        Self {
            path: PathBuf::new(),
            input_shape,
            slot,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> ModelStatus {
        match self.slot.get() {
            None => ModelStatus::NotLoaded,
            Some(Ok(_)) => ModelStatus::Ready,
            Some(Err(e)) => ModelStatus::Failed(e.to_string()),
        }
    }

    /// The classifier, loading it on first use.
    ///
    /// Concurrent first calls block until one of them finishes loading.
    pub fn get_or_load(&self) -> Result<Arc<dyn EmotionClassifier>, ModelError> {
        self.slot
            .get_or_init(|| {
                log::debug!("loading emotion model from {}", self.path.display());
                match LstmClassifier::load(&self.path, self.input_shape) {
                    Ok(model) => Ok(Arc::new(model) as Arc<dyn EmotionClassifier>),
                    Err(e) => {
                        log::error!("emotion model unavailable: {e}");
                        Err(e)
                    }
                }
            })
            .clone()
    }
}
