//! Fixed-length mono waveform handed to feature extraction.
//!
//! # Example
//!
//! ```rust
//! use speech_emotion::audio::Waveform;
//!
//! // Half a second of audio, padded to the model's input length.
//! let waveform = Waveform::fit(vec![0.25; 11_025], 180_000, 22_050);
//! assert_eq!(waveform.len(), 180_000);
//! assert_eq!(waveform.samples()[11_024], 0.25);
//! assert_eq!(waveform.samples()[11_025], 0.0);
//! ```

// ---------------------------------------------------------------------------
// Waveform
// ---------------------------------------------------------------------------

/// Mono `f32` samples at a known rate, already cut or padded to length.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Truncate or zero-pad `samples` to exactly `len` samples.
    ///
    /// Longer input keeps its first `len` samples; shorter input gets
    /// trailing zeros.  Never fails.
    pub fn fit(mut samples: Vec<f32>, len: usize, sample_rate: u32) -> Self {
        samples.resize(len, 0.0);
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.samples
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
