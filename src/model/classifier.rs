//! Emotion classifier trait and the LSTM implementation.
//!
//! # Overview
//!
//! [`EmotionClassifier`] is the interface used by the pipeline.  It is
//! object-safe and `Send + Sync` so one loaded model can sit behind an
//! `Arc<dyn EmotionClassifier>` and serve concurrent callers.
//!
//! [`LstmClassifier`] is the production implementation:
//!
//! ```text
//! (352 × 15) ─▶ LSTM(64, sequence) ─▶ LSTM(64, last) ─▶ Dense(6) ─▶ softmax
//! ```
//!
//! [`MockClassifier`] (available under `#[cfg(test)]`) returns a fixed score
//! vector so pipeline tests do not need a weights file.

use std::path::Path;

use ndarray::Array1;
use thiserror::Error;

use crate::config::constants::NUM_EMOTIONS;
use crate::features::FeatureMatrix;

use super::emotion::Emotion;
use super::lstm::LstmLayer;
use super::weights::{ClassifierWeights, ModelError};

// ---------------------------------------------------------------------------
// PredictionError
// ---------------------------------------------------------------------------

/// A loaded classifier could not score its input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    /// The feature matrix does not have the model's input shape.
    #[error("feature matrix shape {got:?} does not match model input {expected:?}")]
    InputShape {
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// The forward pass produced NaN or infinity.
    #[error("model produced non-finite scores")]
    NonFinite,
}

// ---------------------------------------------------------------------------
// ScoreVector
// ---------------------------------------------------------------------------

/// Probability per emotion, indexed by [`Emotion::index`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreVector([f32; NUM_EMOTIONS]);

impl ScoreVector {
    pub fn new(scores: [f32; NUM_EMOTIONS]) -> Self {
        Self(scores)
    }

    /// Softmax of `logits`.  The maximum is subtracted first so large logits
    /// do not overflow.
    ///
    /// ```
    /// use speech_emotion::model::ScoreVector;
    ///
    /// let s = ScoreVector::softmax([1000.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    /// assert!((s.as_slice()[0] - 1.0).abs() < 1e-6);
    /// assert!((s.sum() - 1.0).abs() < 1e-6);
    /// ```
    pub fn softmax(logits: [f32; NUM_EMOTIONS]) -> Self {
        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut out = logits.map(|l| (l - max).exp());
        let sum: f32 = out.iter().sum();
        for p in &mut out {
            *p /= sum;
        }
        Self(out)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn get(&self, emotion: Emotion) -> f32 {
        self.0[emotion.index()]
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Highest-scoring label and its score.  Ties go to the lower index.
    pub fn top(&self) -> (Emotion, f32) {
        let mut best = 0;
        for (i, &s) in self.0.iter().enumerate().skip(1) {
            if s > self.0[best] {
                best = i;
            }
        }
        (Emotion::ALL[best], self.0[best])
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.0.to_vec()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|s| s.is_finite())
    }
}

// ---------------------------------------------------------------------------
// EmotionClassifier trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for emotion classifiers.
///
/// # Contract
///
/// - `features` must have shape [`input_shape`](Self::input_shape); anything
///   else is [`PredictionError::InputShape`].
/// - On success the scores are non-negative and sum to 1.
pub trait EmotionClassifier: Send + Sync {
    /// `(frames, features)` the classifier accepts.
    fn input_shape(&self) -> (usize, usize);

    fn predict(&self, features: &FeatureMatrix) -> Result<ScoreVector, PredictionError>;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn EmotionClassifier>) {}
};

// ---------------------------------------------------------------------------
// LstmClassifier
// ---------------------------------------------------------------------------

/// Two stacked LSTM layers followed by a softmax dense layer.
///
/// Weights are read-only after loading; every [`predict`](EmotionClassifier::predict)
/// call allocates its own activations.
#[derive(Debug, Clone)]
pub struct LstmClassifier {
    lstm_1: LstmLayer,
    lstm_2: LstmLayer,
    dense_kernel: ndarray::Array2<f32>,
    dense_bias: Array1<f32>,
    input_frames: usize,
}

impl LstmClassifier {
    /// Load weights from a safetensors file for inputs of `input_shape`.
    ///
    /// # Errors
    ///
    /// Any [`ModelError`]: missing or unreadable file, malformed container,
    /// missing tensor, wrong shape or dtype.
    pub fn load(path: impl AsRef<Path>, input_shape: (usize, usize)) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let weights = ClassifierWeights::load(path, input_shape.1)?;
        let model = Self::from_weights(weights, input_shape.0)?;
        log::info!(
            "loaded emotion model from {} (input {:?})",
            path.display(),
            model.input_shape()
        );
        Ok(model)
    }

    /// Assemble a classifier from already-decoded weights.
    pub fn from_weights(weights: ClassifierWeights, input_frames: usize) -> Result<Self, ModelError> {
        let lstm_1 = LstmLayer::new(weights.lstm_1);
        let lstm_2 = LstmLayer::new(weights.lstm_2);

        if lstm_2.input_size() != lstm_1.units() {
            return Err(ModelError::ShapeMismatch {
                name: "lstm_2.kernel".into(),
                expected: vec![lstm_1.units(), 4 * lstm_2.units()],
                got: vec![lstm_2.input_size(), 4 * lstm_2.units()],
            });
        }
        let dense = weights.dense;
        if dense.kernel.dim() != (lstm_2.units(), NUM_EMOTIONS) || dense.bias.len() != NUM_EMOTIONS {
            return Err(ModelError::ShapeMismatch {
                name: "dense.kernel".into(),
                expected: vec![lstm_2.units(), NUM_EMOTIONS],
                got: dense.kernel.shape().to_vec(),
            });
        }

        Ok(Self {
            lstm_1,
            lstm_2,
            dense_kernel: dense.kernel,
            dense_bias: dense.bias,
            input_frames,
        })
    }
}

impl EmotionClassifier for LstmClassifier {
    fn input_shape(&self) -> (usize, usize) {
        (self.input_frames, self.lstm_1.input_size())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<ScoreVector, PredictionError> {
        if features.shape() != self.input_shape() {
            return Err(PredictionError::InputShape {
                expected: self.input_shape(),
                got: features.shape(),
            });
        }

        let hidden = self.lstm_1.forward_sequence(features.view());
        let last = self.lstm_2.forward_last(hidden.view());
        let logits = last.dot(&self.dense_kernel) + &self.dense_bias;

        let mut raw = [0.0_f32; NUM_EMOTIONS];
        for (dst, &l) in raw.iter_mut().zip(logits.iter()) {
            *dst = l;
        }
        let scores = ScoreVector::softmax(raw);
        if !scores.is_finite() {
            return Err(PredictionError::NonFinite);
        }
        Ok(scores)
    }
}

// ---------------------------------------------------------------------------
// MockClassifier  (test-only)
// ---------------------------------------------------------------------------

/// Returns a fixed response after checking the input shape.
#[cfg(test)]
pub struct MockClassifier {
    input_shape: (usize, usize),
    response: Result<ScoreVector, PredictionError>,
}

#[cfg(test)]
impl MockClassifier {
    pub fn ok(scores: [f32; NUM_EMOTIONS]) -> Self {
        Self {
            input_shape: crate::config::constants::INPUT_SHAPE,
            response: Ok(ScoreVector::new(scores)),
        }
    }

    pub fn err(error: PredictionError) -> Self {
        Self {
            input_shape: crate::config::constants::INPUT_SHAPE,
            response: Err(error),
        }
    }
}

#[cfg(test)]
impl EmotionClassifier for MockClassifier {
    fn input_shape(&self) -> (usize, usize) {
        self.input_shape
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<ScoreVector, PredictionError> {
        if features.shape() != self.input_shape {
            return Err(PredictionError::InputShape {
                expected: self.input_shape,
                got: features.shape(),
            });
        }
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ndarray::Array2;

    use super::*;
    use crate::config::constants::INPUT_SHAPE;
    use crate::model::testing::seeded_classifier;

    fn features(seed: f32) -> FeatureMatrix {
        FeatureMatrix::from_array(Array2::from_shape_fn(INPUT_SHAPE, |(t, j)| {
            ((t as f32 * 0.05 + j as f32) * seed).sin()
        }))
    }

    // --- ScoreVector ---

    #[test]
    fn softmax_is_a_distribution() {
        let s = ScoreVector::softmax([0.3, -1.2, 2.0, 0.0, 5.5, -3.0]);
        assert!((s.sum() - 1.0).abs() < 1e-6);
        assert!(s.as_slice().iter().all(|&p| p >= 0.0));
        assert_eq!(s.top().0, Emotion::Fear);
    }

    #[test]
    fn top_breaks_ties_towards_lower_index() {
        let s = ScoreVector::new([0.1, 0.4, 0.4, 0.1, 0.0, 0.0]);
        assert_eq!(s.top(), (Emotion::Happy, 0.4));
    }

    #[test]
    fn get_reads_by_label() {
        let s = ScoreVector::new([0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(s.get(Emotion::Disgust), 1.0);
        assert_eq!(s.get(Emotion::Neutral), 0.0);
    }

    // --- LstmClassifier ---

    #[test]
    fn prediction_sums_to_one() {
        let model = seeded_classifier(42);
        for seed in [0.1, 0.7, 1.3] {
            let scores = model.predict(&features(seed)).unwrap();
            assert!((scores.sum() - 1.0).abs() < 1e-4, "sum = {}", scores.sum());
            assert!(scores.as_slice().iter().all(|&p| p >= 0.0));
        }
    }

    #[test]
    fn prediction_is_deterministic() {
        let model = seeded_classifier(42);
        let x = features(0.9);
        assert_eq!(model.predict(&x).unwrap(), model.predict(&x).unwrap());
    }

    #[test]
    fn zero_features_are_finite() {
        let model = seeded_classifier(3);
        let x = FeatureMatrix::from_array(Array2::zeros(INPUT_SHAPE));
        assert!(model.predict(&x).unwrap().is_finite());
    }

    #[test]
    fn wrong_input_shape_is_rejected() {
        let model = seeded_classifier(42);
        let x = FeatureMatrix::from_array(Array2::zeros((100, 15)));
        assert_eq!(
            model.predict(&x).unwrap_err(),
            PredictionError::InputShape {
                expected: (352, 15),
                got: (100, 15)
            }
        );
    }

    #[test]
    fn concurrent_predictions_match_sequential() {
        let model: Arc<dyn EmotionClassifier> = Arc::new(seeded_classifier(11));
        let inputs: Vec<FeatureMatrix> = (1..=4).map(|i| features(i as f32 * 0.3)).collect();
        let sequential: Vec<ScoreVector> =
            inputs.iter().map(|x| model.predict(x).unwrap()).collect();

        let handles: Vec<_> = inputs
            .into_iter()
            .map(|x| {
                let model = Arc::clone(&model);
                std::thread::spawn(move || model.predict(&x).unwrap())
            })
            .collect();
        let concurrent: Vec<ScoreVector> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(sequential, concurrent);
    }

    #[test]
    fn load_missing_weights_is_model_error() {
        let err = LstmClassifier::load("/nonexistent/ser.safetensors", INPUT_SHAPE).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
    }

    // --- MockClassifier ---

    #[test]
    fn mock_returns_configured_scores() {
        let mock = MockClassifier::ok([0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        let scores = mock.predict(&features(0.5)).unwrap();
        assert_eq!(scores.top(), (Emotion::Sad, 1.0));
    }

    #[test]
    fn box_dyn_classifier_compiles() {
        let c: Box<dyn EmotionClassifier> = Box::new(MockClassifier::err(PredictionError::NonFinite));
        assert_eq!(c.predict(&features(0.5)), Err(PredictionError::NonFinite));
    }
}
