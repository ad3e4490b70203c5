//! Time-domain frame descriptors: zero-crossing rate and RMS energy.

use super::framing::{frames, pad_center, PadMode};

/// Magnitudes at or below this are treated as exact zeros when counting
/// sign changes, so numerical dust around silence does not register.
const ZCR_THRESHOLD: f32 = 1e-10;

/// Zero-crossing rate per centred frame.
///
/// Each value is the number of sign-bit changes between adjacent samples in
/// the frame divided by `frame_length`, so it lies in `[0, 1)`.  Borders are
/// edge-padded.
pub fn zero_crossing_rate(signal: &[f32], frame_length: usize, hop: usize) -> Vec<f32> {
    let padded = pad_center(signal, frame_length, PadMode::Edge);
    frames(&padded, frame_length, hop)
        .map(|frame| {
            let crossings = frame
                .windows(2)
                .filter(|pair| negative(pair[0]) != negative(pair[1]))
                .count();
            crossings as f32 / frame_length as f32
        })
        .collect()
}

#[inline]
fn negative(x: f32) -> bool {
    x.abs() > ZCR_THRESHOLD && x.is_sign_negative()
}

/// Root-mean-square energy per centred frame (zero-padded borders).
pub fn rms(signal: &[f32], frame_length: usize, hop: usize) -> Vec<f32> {
    let padded = pad_center(signal, frame_length, PadMode::Constant);
    frames(&padded, frame_length, hop)
        .map(|frame| {
            let mean_sq = frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32;
            mean_sq.sqrt()
        })
        .collect()
}
