//! Concurrent analysis of many files on the tokio blocking pool.
//!
//! Each file runs the full synchronous pipeline inside
//! `tokio::task::spawn_blocking`; the model and pipeline are shared through
//! `Arc` and never locked.

use std::path::PathBuf;
use std::sync::Arc;

use crate::model::EmotionClassifier;

use super::result::PredictionResult;
use super::runner::{InferencePipeline, PipelineError};

/// Outcome for one input file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<PredictionResult, PipelineError>,
}

/// Analyse `paths` concurrently.  Outcomes are returned in input order.
pub async fn analyze_files(
    pipeline: Arc<InferencePipeline>,
    classifier: Arc<dyn EmotionClassifier>,
    paths: Vec<PathBuf>,
) -> Vec<FileOutcome> {
    let handles: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let pipeline = Arc::clone(&pipeline);
            let classifier = Arc::clone(&classifier);
            let task_path = path.clone();
            let handle = tokio::task::spawn_blocking(move || {
                pipeline.try_predict_from_file(&task_path, classifier.as_ref())
            });
            (path, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                log::error!("{}: analysis task failed: {e}", path.display());
                Err(PipelineError::Internal(e.to_string()))
            }
        };
        outcomes.push(FileOutcome { path, result });
    }
    outcomes
}
