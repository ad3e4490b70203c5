//! Successful inference outcome.

use serde::{Deserialize, Serialize};

use crate::model::{Emotion, ScoreVector};

/// Predicted label, its probability and the full distribution.
///
/// Serialises as
/// `{"emotion":"happy","confidence":0.71,"all_scores":[…6 floats…]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub emotion: Emotion,
    /// Score of `emotion`, in `[0, 1]`.
    pub confidence: f32,
    /// One score per label in [`Emotion::ALL`] order.
    pub all_scores: Vec<f32>,
}

impl PredictionResult {
    pub fn from_scores(scores: &ScoreVector) -> Self {
        let (emotion, confidence) = scores.top();
        Self {
            emotion,
            confidence,
            all_scores: scores.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_argmax_as_label() {
        let r = PredictionResult::from_scores(&ScoreVector::new([0.05, 0.7, 0.05, 0.1, 0.05, 0.05]));
        assert_eq!(r.emotion, Emotion::Happy);
        assert_eq!(r.confidence, 0.7);
        assert_eq!(r.all_scores.len(), 6);
        assert_eq!(r.all_scores[Emotion::Angry.index()], 0.1);
    }

    #[test]
    fn json_shape() {
        let r = PredictionResult::from_scores(&ScoreVector::new([0.0, 0.0, 0.0, 1.0, 0.0, 0.0]));
        let v: serde_json::Value = serde_json::to_value(&r).unwrap();
        assert_eq!(v["emotion"], "angry");
        assert_eq!(v["confidence"], 1.0);
        assert_eq!(v["all_scores"].as_array().map(|a| a.len()), Some(6));

        let back: PredictionResult = serde_json::from_value(v).unwrap();
        assert_eq!(back, r);
    }
}
