//! Model metadata and weights path resolution.
//!
//! [`ModelPaths`] resolves the on-disk weights location given an
//! [`AppPaths`] instance, honouring an explicit override from
//! [`ModelConfig::weights_file`].

use std::path::PathBuf;

use crate::config::{AppPaths, ModelConfig};

// ---------------------------------------------------------------------------
// ModelInfo
// ---------------------------------------------------------------------------

/// Static metadata describing the trained classifier.
#[derive(Debug)]
pub struct ModelInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// Reported test accuracy.
    pub accuracy: &'static str,
    /// Corpora the weights were trained on.
    pub datasets: &'static [&'static str],
    pub architecture: &'static str,
    pub input_features: &'static str,
    /// File name under the models directory.
    pub file_name: &'static str,
}

/// The bundled two-layer LSTM emotion model.
pub const MODEL_INFO: ModelInfo = ModelInfo {
    name: "Speech Emotion Recognition LSTM",
    version: "1.0.0",
    accuracy: "90%+",
    datasets: &["CREMA-D", "RAVDESS", "SAVEE", "TESS"],
    architecture: "LSTM",
    input_features: "ZCR + RMS + MFCC (13 coefficients)",
    file_name: "ser.safetensors",
};

// ---------------------------------------------------------------------------
// ModelPaths
// ---------------------------------------------------------------------------

/// Resolves the location of model files.
///
/// ```rust,no_run
/// use speech_emotion::config::{AppConfig, AppPaths};
/// use speech_emotion::model::ModelPaths;
///
/// let config = AppConfig::load().unwrap();
/// let paths = ModelPaths::from_app_paths(&AppPaths::new());
/// let weights = paths.resolve(&config.model);
/// println!("weights: {}", weights.display());
/// ```
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub models_dir: PathBuf,
}

impl ModelPaths {
    pub fn from_app_paths(app_paths: &AppPaths) -> Self {
        Self {
            models_dir: app_paths.models_dir.clone(),
        }
    }

    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    /// Path of `model`'s weights file inside the models directory.
    pub fn model_path(&self, model: &ModelInfo) -> PathBuf {
        self.models_dir.join(model.file_name)
    }

    pub fn is_available(&self, model: &ModelInfo) -> bool {
        self.model_path(model).exists()
    }

    /// `config.weights_file` when set, otherwise the default model's path.
    pub fn resolve(&self, config: &ModelConfig) -> PathBuf {
        config
            .weights_file
            .clone()
            .unwrap_or_else(|| self.model_path(&MODEL_INFO))
    }
}
