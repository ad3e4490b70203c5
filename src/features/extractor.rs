//! Waveform → `(frames × features)` matrix.
//!
//! [`FeatureExtractor::extract`] computes, per centred frame,
//!
//! | column | descriptor |
//! |--------|------------|
//! | 0      | zero-crossing rate |
//! | 1      | RMS energy |
//! | 2..    | MFCC₁ … MFCCₙ |
//!
//! and refuses to return anything but the exact shape the classifier was
//! configured for.

use ndarray::{s, Array2, ArrayView2};
use thiserror::Error;

use crate::audio::Waveform;
use crate::config::AppConfig;

use super::descriptors::{rms, zero_crossing_rate};
use super::mfcc::Mfcc;

// ---------------------------------------------------------------------------
// ExtractionError
// ---------------------------------------------------------------------------

/// Reasons feature extraction can fail.  No partial matrix is ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    /// The waveform has no samples.
    #[error("cannot extract features from an empty waveform")]
    EmptyInput,

    /// The waveform is not the fixed length the extractor expects.
    #[error("waveform has {got} samples, expected {expected}")]
    InvalidLength { expected: usize, got: usize },

    /// The waveform was not sampled at the rate the mel filterbank was built for.
    #[error("waveform is {got} Hz, expected {expected} Hz")]
    SampleRate { expected: u32, got: u32 },

    /// The descriptors disagree on the number of frames.
    #[error("descriptor frame counts differ: zcr {zcr}, rms {rms}, mfcc {mfcc}")]
    FrameMismatch { zcr: usize, rms: usize, mfcc: usize },

    /// The assembled matrix does not have the configured shape.
    #[error("feature matrix shape {got:?} does not match expected {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// A NaN or infinity appeared in the input or the output.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    /// The FFT backend rejected its buffers.
    #[error("FFT failed: {0}")]
    Fft(String),

    /// An array could not be built from the computed values.
    #[error("array construction failed: {0}")]
    Array(String),
}

// ---------------------------------------------------------------------------
// FeatureMatrix
// ---------------------------------------------------------------------------

/// Time-by-feature matrix handed to the classifier, `f32`, row-major
/// (one row per frame).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Array2<f32>,
}

impl FeatureMatrix {
    /// Wrap an existing `(frames, features)` array.
    pub fn from_array(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// `(frames, features)`.
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Borrow the underlying array.
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }
}

// ---------------------------------------------------------------------------
// FeatureExtractor
// ---------------------------------------------------------------------------

/// Computes [`FeatureMatrix`]es from fixed-length waveforms.
///
/// Immutable after construction and `Send + Sync`; share one instance behind
/// an `Arc` across concurrent requests.
#[derive(Debug)]
pub struct FeatureExtractor {
    sample_rate: u32,
    frame_length: usize,
    hop_length: usize,
    expected_samples: usize,
    expected_shape: (usize, usize),
    mfcc: Mfcc,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl FeatureExtractor {
    /// Build an extractor for `config`.  Call [`AppConfig::validate`] first;
    /// an inconsistent config produces an extractor whose every call fails
    /// with [`ExtractionError::ShapeMismatch`].
    pub fn from_config(config: &AppConfig) -> Self {
        let f = &config.features;
        Self {
            sample_rate: config.audio.sample_rate,
            frame_length: f.frame_length,
            hop_length: f.hop_length,
            expected_samples: config.audio.max_audio_length,
            expected_shape: (config.model.input_frames, config.model.input_features),
            mfcc: Mfcc::new(
                config.audio.sample_rate,
                f.frame_length,
                f.hop_length,
                f.n_mels,
                f.n_mfcc,
                f.spectrum_top_db,
            ),
        }
    }

    /// Shape every successful [`extract`](Self::extract) returns.
    pub fn output_shape(&self) -> (usize, usize) {
        self.expected_shape
    }

    /// Extract `[ZCR, RMS, MFCC…]` per frame from `waveform`.
    pub fn extract(&self, waveform: &Waveform) -> Result<FeatureMatrix, ExtractionError> {
        let y = waveform.samples();

        if y.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }
        if y.len() != self.expected_samples {
            return Err(ExtractionError::InvalidLength {
                expected: self.expected_samples,
                got: y.len(),
            });
        }
        if waveform.sample_rate() != self.sample_rate {
            return Err(ExtractionError::SampleRate {
                expected: self.sample_rate,
                got: waveform.sample_rate(),
            });
        }
        if y.iter().any(|s| !s.is_finite()) {
            return Err(ExtractionError::NonFinite("waveform"));
        }

        let zcr = zero_crossing_rate(y, self.frame_length, self.hop_length);
        let energy = rms(y, self.frame_length, self.hop_length);
        let mfcc = self.mfcc.compute(y)?;

        let n_frames = zcr.len();
        if energy.len() != n_frames || mfcc.nrows() != n_frames {
            return Err(ExtractionError::FrameMismatch {
                zcr: zcr.len(),
                rms: energy.len(),
                mfcc: mfcc.nrows(),
            });
        }

        let width = 2 + self.mfcc.n_mfcc();
        if (n_frames, width) != self.expected_shape {
            return Err(ExtractionError::ShapeMismatch {
                expected: self.expected_shape,
                got: (n_frames, width),
            });
        }

        let mut data = Array2::<f32>::zeros((n_frames, width));
        for (t, mut row) in data.outer_iter_mut().enumerate() {
            row[0] = zcr[t];
            row[1] = energy[t];
        }
        data.slice_mut(s![.., 2..]).assign(&mfcc);

        if data.iter().any(|v| !v.is_finite()) {
            return Err(ExtractionError::NonFinite("feature matrix"));
        }

        log::debug!("extracted features: {n_frames} frames x {width}");
        Ok(FeatureMatrix { data })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::{sine, speech_like};
    use crate::config::constants::{INPUT_SHAPE, MAX_AUDIO_LENGTH, SAMPLE_RATE};

    fn waveform(samples: Vec<f32>) -> Waveform {
        Waveform::fit(samples, MAX_AUDIO_LENGTH, SAMPLE_RATE)
    }

    #[test]
    fn full_waveform_gives_input_shape() {
        let extractor = FeatureExtractor::default();
        let w = waveform(speech_like(SAMPLE_RATE, 3.0));
        let features = extractor.extract(&w).unwrap();
        assert_eq!(features.shape(), INPUT_SHAPE);
        assert_eq!(extractor.output_shape(), (352, 15));
    }

    #[test]
    fn column_order_is_zcr_rms_mfcc() {
        let extractor = FeatureExtractor::default();
        let mut samples = sine(440.0, SAMPLE_RATE, 8.2, 0.5);
        samples.truncate(MAX_AUDIO_LENGTH);
        let features = extractor.extract(&waveform(samples.clone())).unwrap();
        let view = features.view();

        let zcr = zero_crossing_rate(&samples, 2_048, 512);
        let energy = rms(&samples, 2_048, 512);
        for t in [0, 100, 351] {
            assert_eq!(view[[t, 0]], zcr[t]);
            assert_eq!(view[[t, 1]], energy[t]);
        }
        // Interior RMS of a 0.5 sine is 0.5 / sqrt(2).
        assert!((view[[176, 1]] - 0.5 / 2.0_f32.sqrt()).abs() < 5e-3);
        // 440 Hz: ~2 * 440 / 22050 crossings per sample.
        assert!((view[[176, 0]] - 880.0 / 22_050.0).abs() < 2e-3);
    }

    #[test]
    fn silence_extracts_finite_features() {
        let extractor = FeatureExtractor::default();
        let features = extractor.extract(&waveform(vec![0.0; 10])).unwrap();
        assert_eq!(features.shape(), (352, 15));
        assert!(features.view().iter().all(|v| v.is_finite()));
        assert!(features.view().column(0).iter().all(|&z| z == 0.0));
        assert!(features.view().column(1).iter().all(|&r| r == 0.0));
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = FeatureExtractor::default();
        let w = waveform(speech_like(SAMPLE_RATE, 1.5));
        assert_eq!(extractor.extract(&w).unwrap(), extractor.extract(&w).unwrap());
    }

    #[test]
    fn wrong_length_is_rejected() {
        let extractor = FeatureExtractor::default();
        let short = Waveform::fit(vec![0.1; 100], 1_000, SAMPLE_RATE);
        let err = extractor.extract(&short).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::InvalidLength {
                expected: 180_000,
                got: 1_000
            }
        );
    }

    #[test]
    fn other_sample_rate_is_rejected() {
        let extractor = FeatureExtractor::default();
        let w = Waveform::fit(sine(1_000.0, 44_100, 4.0, 0.5), MAX_AUDIO_LENGTH, 44_100);
        assert_eq!(
            extractor.extract(&w).unwrap_err(),
            ExtractionError::SampleRate {
                expected: 22_050,
                got: 44_100
            }
        );
    }

    #[test]
    fn nan_sample_is_rejected() {
        let extractor = FeatureExtractor::default();
        let mut samples = vec![0.1_f32; 1_000];
        samples[10] = f32::NAN;
        let err = extractor.extract(&waveform(samples)).unwrap_err();
        assert_eq!(err, ExtractionError::NonFinite("waveform"));
    }

    #[test]
    fn mismatched_model_shape_is_hard_failure() {
        let mut config = AppConfig::default();
        config.model.input_frames = 350;
        let extractor = FeatureExtractor::from_config(&config);
        let err = extractor.extract(&waveform(vec![0.2; 5_000])).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::ShapeMismatch {
                expected: (350, 15),
                got: (352, 15)
            }
        );
    }

    #[test]
    fn extractor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FeatureExtractor>();
    }
}
