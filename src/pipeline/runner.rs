//! Inference runner: audio file → emotion prediction.
//!
//! [`InferencePipeline`] owns the immutable [`AudioLoader`] and
//! [`FeatureExtractor`]; the classifier is passed in per call so one loaded
//! model can be shared by any number of pipelines and threads.
//!
//! # Flow
//!
//! ```text
//! path ──AudioLoader::load──▶ Waveform            [Start → Loaded]
//!      ──FeatureExtractor::extract──▶ FeatureMatrix [Loaded → FeaturesExtracted]
//!      ──EmotionClassifier::predict──▶ ScoreVector  [FeaturesExtracted → Predicted]
//!      ──argmax──▶ PredictionResult                 [Predicted → Done]
//! ```
//!
//! The first failing stage ends the request; later stages never run.

use std::path::Path;

use thiserror::Error;

use crate::audio::{AudioLoader, DecodeError};
use crate::config::AppConfig;
use crate::features::{ExtractionError, FeatureExtractor};
use crate::model::{EmotionClassifier, ModelError, PredictionError, SharedModel};

use super::result::PredictionResult;
use super::state::{PipelineStage, StageTracker};

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Why a request produced no prediction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("decode failure: {0}")]
    Decode(#[from] DecodeError),

    #[error("feature extraction failure: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),

    #[error("prediction failure: {0}")]
    Prediction(#[from] PredictionError),

    /// The worker running the request died (e.g. a panicked blocking task).
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Stage that was active when the error occurred.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Decode(_)
            | PipelineError::ModelUnavailable(_)
            | PipelineError::Internal(_) => PipelineStage::Start,
            PipelineError::Extraction(_) => PipelineStage::Loaded,
            PipelineError::Prediction(_) => PipelineStage::FeaturesExtracted,
        }
    }
}

// ---------------------------------------------------------------------------
// InferencePipeline
// ---------------------------------------------------------------------------

/// Stateless orchestrator for single-file emotion inference.
///
/// ```rust,no_run
/// use speech_emotion::config::{AppConfig, AppPaths};
/// use speech_emotion::model::SharedModel;
/// use speech_emotion::pipeline::InferencePipeline;
///
/// let config = AppConfig::default();
/// let model = SharedModel::from_config(&config, &AppPaths::new());
/// let classifier = model.get_or_load().unwrap();
///
/// let pipeline = InferencePipeline::from_config(&config);
/// match pipeline.predict_from_file("clip.wav", classifier.as_ref()) {
///     Some(r) => println!("{} ({:.0}%)", r.emotion, r.confidence * 100.0),
///     None => println!("analysis unavailable"),
/// }
/// ```
#[derive(Debug, Default)]
pub struct InferencePipeline {
    loader: AudioLoader,
    extractor: FeatureExtractor,
}

impl InferencePipeline {
    pub fn new(loader: AudioLoader, extractor: FeatureExtractor) -> Self {
        Self { loader, extractor }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            AudioLoader::from_config(config),
            FeatureExtractor::from_config(config),
        )
    }

    /// Predict the emotion of `path`, collapsing every failure to `None`.
    ///
    /// The failing stage and cause are logged at `error` level.
    pub fn predict_from_file(
        &self,
        path: impl AsRef<Path>,
        classifier: &dyn EmotionClassifier,
    ) -> Option<PredictionResult> {
        self.try_predict_from_file(path, classifier).ok()
    }

    /// Like [`predict_from_file`](Self::predict_from_file) but keeps the
    /// error.
    pub fn try_predict_from_file(
        &self,
        path: impl AsRef<Path>,
        classifier: &dyn EmotionClassifier,
    ) -> Result<PredictionResult, PipelineError> {
        let path = path.as_ref();
        let mut tracker = StageTracker::new();

        match self.run_stages(path, classifier, &mut tracker) {
            Ok(result) => {
                log::info!(
                    "{}: {} ({:.3})",
                    path.display(),
                    result.emotion,
                    result.confidence
                );
                Ok(result)
            }
            Err(e) => {
                tracker.fail();
                log::error!(
                    "{}: {} failed: {e}",
                    path.display(),
                    tracker.failed_at().unwrap_or(e.stage()).label()
                );
                Err(e)
            }
        }
    }

    /// Load the shared model if needed, then predict.
    pub fn predict_with_model(
        &self,
        path: impl AsRef<Path>,
        model: &SharedModel,
    ) -> Result<PredictionResult, PipelineError> {
        let classifier = model.get_or_load()?;
        self.try_predict_from_file(path, classifier.as_ref())
    }

    fn run_stages(
        &self,
        path: &Path,
        classifier: &dyn EmotionClassifier,
        tracker: &mut StageTracker,
    ) -> Result<PredictionResult, PipelineError> {
        let waveform = self.loader.load(path)?;
        tracker.advance();

        let features = self.extractor.extract(&waveform)?;
        tracker.advance();

        let scores = classifier.predict(&features)?;
        tracker.advance();

        let result = PredictionResult::from_scores(&scores);
        tracker.advance();
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
