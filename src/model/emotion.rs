//! The fixed emotion label set.
//!
//! The order of [`Emotion::ALL`] is the order of the classifier's output
//! units; it must never change without retraining.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::constants::NUM_EMOTIONS;

/// One of the six emotion categories the classifier distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Angry,
    Fear,
    Disgust,
}

impl Emotion {
    /// All labels, indexed by classifier output unit.
    pub const ALL: [Emotion; NUM_EMOTIONS] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fear,
        Emotion::Disgust,
    ];

    /// Output-unit index of this label.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label for output unit `index`, or `None` when out of range.
    ///
    /// ```
    /// use speech_emotion::model::Emotion;
    ///
    /// assert_eq!(Emotion::from_index(3), Some(Emotion::Angry));
    /// assert_eq!(Emotion::from_index(6), None);
    /// ```
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fear => "fear",
            Emotion::Disgust => "disgust",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == lower)
            .ok_or_else(|| format!("unknown emotion label: {s}"))
    }
}
