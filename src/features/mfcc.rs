//! Mel-frequency cepstral coefficients.
//!
//! Pipeline per centred frame:
//!
//! ```text
//! frame (zero-padded borders)
//!   → periodic Hann window → real FFT → power spectrum
//!   → Slaney mel filterbank (n_mels bands, 0 Hz … Nyquist)
//!   → 10·log10(max(1e-10, S)), floored at (global max − top_db)
//!   → orthonormal DCT-II → first n_mfcc coefficients
//! ```
//!
//! All tables (window, filterbank, DCT basis, FFT plan) are built once in
//! [`Mfcc::new`] and only read afterwards, so one instance can serve any
//! number of threads.

use std::f64::consts::PI;
use std::sync::Arc;

use ndarray::{Array1, Array2};
use realfft::{RealFftPlanner, RealToComplex};

use super::extractor::ExtractionError;
use super::framing::{frames, pad_center, PadMode};

/// Power floor before taking the logarithm.
const AMIN: f32 = 1e-10;

// ---------------------------------------------------------------------------
// Mel scale (Slaney)
// ---------------------------------------------------------------------------

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1_000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

#[inline]
fn logstep() -> f64 {
    6.4_f64.ln() / 27.0
}

/// Hz → mel on the Slaney scale (linear below 1 kHz, logarithmic above).
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / logstep()
    } else {
        hz / F_SP
    }
}

/// Inverse of [`hz_to_mel`].
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (logstep() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Area-normalised triangular mel filterbank, shape `(n_mels, n_fft/2 + 1)`.
pub fn mel_filterbank(sample_rate: u32, n_fft: usize, n_mels: usize) -> Array2<f32> {
    let n_bins = n_fft / 2 + 1;
    let sr = sample_rate as f64;

    let fft_freqs: Vec<f64> = (0..n_bins).map(|k| k as f64 * sr / n_fft as f64).collect();

    let mel_min = hz_to_mel(0.0);
    let mel_max = hz_to_mel(sr / 2.0);
    let hz_points: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f64 / (n_mels + 1) as f64))
        .collect();

    let mut weights = Array2::<f32>::zeros((n_mels, n_bins));
    for m in 0..n_mels {
        let (left, center, right) = (hz_points[m], hz_points[m + 1], hz_points[m + 2]);
        let enorm = 2.0 / (right - left);
        for (k, &f) in fft_freqs.iter().enumerate() {
            let lower = (f - left) / (center - left);
            let upper = (right - f) / (right - center);
            let w = lower.min(upper).max(0.0);
            weights[[m, k]] = (w * enorm) as f32;
        }
    }
    weights
}

/// Orthonormal DCT-II basis, shape `(n_out, n_in)`.
pub fn dct_basis(n_out: usize, n_in: usize) -> Array2<f32> {
    let n = n_in as f64;
    Array2::from_shape_fn((n_out, n_in), |(k, i)| {
        let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
        (scale * (PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n)).cos()) as f32
    })
}

/// Periodic Hann window of `len` samples.
pub fn hann_window(len: usize) -> Array1<f32> {
    Array1::from_shape_fn(len, |i| {
        (0.5 - 0.5 * (2.0 * PI * i as f64 / len as f64).cos()) as f32
    })
}

// ---------------------------------------------------------------------------
// Mfcc
// ---------------------------------------------------------------------------

/// Precomputed MFCC analyser.
pub struct Mfcc {
    n_fft: usize,
    hop: usize,
    top_db: f32,
    fft: Arc<dyn RealToComplex<f32>>,
    window: Array1<f32>,
    filterbank: Array2<f32>,
    dct: Array2<f32>,
}

impl std::fmt::Debug for Mfcc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mfcc")
            .field("n_fft", &self.n_fft)
            .field("hop", &self.hop)
            .field("n_mels", &self.filterbank.nrows())
            .field("n_mfcc", &self.dct.nrows())
            .finish_non_exhaustive()
    }
}

impl Mfcc {
    pub fn new(
        sample_rate: u32,
        n_fft: usize,
        hop: usize,
        n_mels: usize,
        n_mfcc: usize,
        top_db: f32,
    ) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        Self {
            n_fft,
            hop,
            top_db,
            fft: planner.plan_fft_forward(n_fft),
            window: hann_window(n_fft),
            filterbank: mel_filterbank(sample_rate, n_fft, n_mels),
            dct: dct_basis(n_mfcc, n_mels),
        }
    }

    /// Mel power spectrogram, shape `(frames, n_mels)`.
    pub fn mel_spectrogram(&self, signal: &[f32]) -> Result<Array2<f32>, ExtractionError> {
        let padded = pad_center(signal, self.n_fft, PadMode::Constant);
        let n_mels = self.filterbank.nrows();

        let mut input = self.fft.make_input_vec();
        let mut spectrum = self.fft.make_output_vec();
        let mut power = Array1::<f32>::zeros(spectrum.len());
        let mut rows: Vec<f32> = Vec::new();
        let mut n_frames = 0usize;

        for frame in frames(&padded, self.n_fft, self.hop) {
            for ((dst, &s), &w) in input.iter_mut().zip(frame).zip(self.window.iter()) {
                *dst = s * w;
            }
            self.fft
                .process(&mut input, &mut spectrum)
                .map_err(|e| ExtractionError::Fft(e.to_string()))?;

            for (p, c) in power.iter_mut().zip(spectrum.iter()) {
                *p = c.re * c.re + c.im * c.im;
            }
            rows.extend(self.filterbank.dot(&power).iter());
            n_frames += 1;
        }

        Array2::from_shape_vec((n_frames, n_mels), rows)
            .map_err(|e| ExtractionError::Array(e.to_string()))
    }

    /// MFCC matrix, shape `(frames, n_mfcc)`.
    pub fn compute(&self, signal: &[f32]) -> Result<Array2<f32>, ExtractionError> {
        if signal.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let mut log_mel = self.mel_spectrogram(signal)?;
        log_mel.mapv_inplace(|s| 10.0 * s.max(AMIN).log10());

        let peak = log_mel.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let floor = peak - self.top_db;
        log_mel.mapv_inplace(|db| db.max(floor));

        Ok(log_mel.dot(&self.dct.t()))
    }

    /// Number of coefficients per frame.
    pub fn n_mfcc(&self) -> usize {
        self.dct.nrows()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
