//! Emotion classifier module.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │              EmotionClassifier (trait)               │
//! │                                                      │
//! │   ┌─────────────┐    ┌───────────────┐               │
//! │   │ SharedModel │    │ LstmClassifier│               │
//! │   │ - status    │───▶│ - lstm_1      │               │
//! │   │ - get_or_   │    │ - lstm_2      │               │
//! │   │   load      │    │ - dense       │               │
//! │   └─────────────┘    └──────┬────────┘               │
//! │                             │                        │
//! │                             ▼                        │
//! │                   ┌──────────────────┐               │
//! │                   │ predict()        │               │
//! │                   │ features → probs │               │
//! │                   └──────────────────┘               │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use speech_emotion::features::FeatureMatrix;
//! use speech_emotion::model::{EmotionClassifier, LstmClassifier};
//!
//! let model = LstmClassifier::load("models/ser.safetensors", (352, 15))
//!     .expect("weights missing");
//! let features = FeatureMatrix::from_array(ndarray::Array2::zeros((352, 15)));
//! let scores = model.predict(&features).unwrap();
//! println!("{:?}", scores.top());
//! ```

pub mod classifier;
pub mod emotion;
pub mod info;
pub mod lstm;
pub mod store;
pub mod weights;

#[cfg(test)]
pub(crate) mod testing;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use classifier::{EmotionClassifier, LstmClassifier, PredictionError, ScoreVector};
pub use emotion::Emotion;
pub use info::{ModelInfo, ModelPaths, MODEL_INFO};
pub use store::{ModelStatus, SharedModel};
pub use weights::{ClassifierWeights, ModelError};

#[cfg(test)]
pub use classifier::MockClassifier;
