//! Leading/trailing silence removal.
//!
//! Frames are scored by RMS energy in dB relative to the loudest frame of the
//! clip.  Anything more than `top_db` below that peak counts as silence; the
//! clip is cut to the span between the first and last non-silent frame.

use std::ops::Range;

use crate::features::rms;

/// Amplitude floor before converting to dB.
const AMIN: f32 = 1e-5;

/// Sample range of `signal` that survives trimming.
///
/// Because levels are relative to the clip's own peak, a perfectly silent
/// (all-zero) clip has no frame below the threshold and is kept whole.
/// Empty input yields `0..0`.
pub fn non_silent_range(
    signal: &[f32],
    top_db: f32,
    frame_length: usize,
    hop: usize,
) -> Range<usize> {
    if signal.is_empty() || hop == 0 {
        return 0..0;
    }

    let power_db: Vec<f32> = rms(signal, frame_length, hop)
        .into_iter()
        .map(|r| 10.0 * (r * r).max(AMIN * AMIN).log10())
        .collect();
    let peak_db = power_db.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let loud = |db: &f32| *db - peak_db > -top_db;
    match (power_db.iter().position(loud), power_db.iter().rposition(loud)) {
        (Some(first), Some(last)) => {
            let start = (first * hop).min(signal.len());
            let end = ((last + 1) * hop).min(signal.len());
            start..end
        }
        _ => 0..0,
    }
}

/// Trim leading and trailing silence from `signal`.
///
/// ```
/// use speech_emotion::audio::trim_silence;
///
/// let mut clip = vec![0.0_f32; 10_000];
/// clip.extend(std::iter::repeat(0.5).take(10_000));
/// clip.extend(vec![0.0_f32; 10_000]);
///
/// let trimmed = trim_silence(&clip, 25.0, 2_048, 512);
/// assert!(trimmed.len() < clip.len());
/// assert!(trimmed.len() >= 10_000);
/// ```
pub fn trim_silence(signal: &[f32], top_db: f32, frame_length: usize, hop: usize) -> &[f32] {
    &signal[non_silent_range(signal, top_db, frame_length, hop)]
}
