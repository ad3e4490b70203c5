//! Frame-wise acoustic descriptors.
//!
//! # Pipeline
//!
//! ```text
//! Waveform (180 000 samples @ 22 050 Hz)
//!   ├─ zero_crossing_rate ─┐
//!   ├─ rms ────────────────┼─▶ FeatureMatrix (352 × 15, f32)
//!   └─ Mfcc::compute ──────┘
//! ```
//!
//! All three descriptors share one centred framing (see [`framing`]) so the
//! frame counts line up by construction.
//!
//! # Quick Start
//!
//! ```rust
//! use speech_emotion::audio::Waveform;
//! use speech_emotion::features::FeatureExtractor;
//!
//! let extractor = FeatureExtractor::default();
//! let waveform = Waveform::fit(vec![0.0; 22_050], 180_000, 22_050);
//! let features = extractor.extract(&waveform).unwrap();
//! assert_eq!(features.shape(), (352, 15));
//! ```

pub mod descriptors;
pub mod extractor;
pub mod framing;
pub mod mfcc;

pub use descriptors::{rms, zero_crossing_rate};
pub use extractor::{ExtractionError, FeatureExtractor, FeatureMatrix};
pub use mfcc::Mfcc;
