//! Inference pipeline: audio file → emotion label.
//!
//! # Architecture
//!
//! ```text
//! path
//!   │
//!   ▼
//! InferencePipeline::try_predict_from_file
//!   ├─ AudioLoader::load            Start → Loaded
//!   ├─ FeatureExtractor::extract    Loaded → FeaturesExtracted
//!   ├─ EmotionClassifier::predict   FeaturesExtracted → Predicted
//!   └─ PredictionResult             Predicted → Done
//!
//! any error ──▶ Failed (logged with stage) ──▶ None / Err(PipelineError)
//!
//! analyze_files ── spawn_blocking per file, shared Arc<dyn EmotionClassifier>
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use speech_emotion::model::LstmClassifier;
//! use speech_emotion::pipeline::{analyze_files, InferencePipeline};
//!
//! #[tokio::main]
//! async fn main() {
//!     let model = LstmClassifier::load("models/ser.safetensors", (352, 15)).unwrap();
//!     let outcomes = analyze_files(
//!         Arc::new(InferencePipeline::default()),
//!         Arc::new(model),
//!         vec!["a.wav".into(), "b.mp3".into()],
//!     )
//!     .await;
//!     for o in outcomes {
//!         println!("{}: {:?}", o.path.display(), o.result.map(|r| r.emotion));
//!     }
//! }
//! ```

pub mod batch;
pub mod result;
pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use batch::{analyze_files, FileOutcome};
pub use result::PredictionResult;
pub use runner::{InferencePipeline, PipelineError};
pub use state::{PipelineStage, StageTracker};
