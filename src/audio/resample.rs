//! Channel mixing and sample-rate conversion.
//!
//! Feature extraction assumes **22 050 Hz mono `f32`** audio.  Decoded files
//! go through two conversion steps:
//!
//! 1. [`stereo_to_mono`]: downmix any number of interleaved channels to mono.
//! 2. [`resample`]: FFT-based sample-rate conversion with `rubato`.

use rubato::{FftFixedIn, Resampler};

use super::decode::DecodeError;

// ---------------------------------------------------------------------------
// stereo_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging all channels.
///
/// The output length is `samples.len() / channels`; a trailing partial frame
/// is dropped.
///
/// * If `channels == 1` the input slice is returned as an owned `Vec`.
/// * If `channels == 0` an empty vector is returned.
///
/// # Example
///
/// ```rust
/// use speech_emotion::audio::stereo_to_mono;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, 0.4]; // L R L R
/// let mono = stereo_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[0] - 0.0).abs() < 1e-6);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn stereo_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => samples
            .chunks_exact(n)
            .map(|frame| frame.iter().sum::<f32>() / n as f32)
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// resample
// ---------------------------------------------------------------------------

/// Number of input frames handed to the resampler per call.
const CHUNK: usize = 1024;
/// FFT sub-chunks per chunk (quality vs. latency trade-off).
const SUB_CHUNKS: usize = 2;

/// Expected output length when converting `len` samples between two rates.
pub fn resampled_len(len: usize, source_rate: u32, target_rate: u32) -> usize {
    (len as f64 * target_rate as f64 / source_rate as f64).ceil() as usize
}

/// Resample mono `samples` from `source_rate` Hz to `target_rate` Hz.
///
/// * Equal rates return a copy of the input.
/// * Empty input returns an empty vector.
///
/// The resampler's group delay is compensated, so the output is aligned with
/// the input and has exactly [`resampled_len`] samples.
pub fn resample(
    samples: &[f32],
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, DecodeError> {
    if source_rate == target_rate {
        return Ok(samples.to_vec());
    }
    if samples.is_empty() {
        return Ok(Vec::new());
    }
    if source_rate == 0 || target_rate == 0 {
        return Err(DecodeError::Resample(format!(
            "invalid sample rate conversion {source_rate} Hz -> {target_rate} Hz"
        )));
    }

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        CHUNK,
        SUB_CHUNKS,
        1,
    )
    .map_err(|e| DecodeError::Resample(format!("failed to create resampler: {e}")))?;

    let delay = resampler.output_delay();
    let expected_len = resampled_len(samples.len(), source_rate, target_rate);
    let mut out = Vec::with_capacity(expected_len + delay + CHUNK);

    let mut pos = 0;
    // Keep feeding (zero-padded once the input is exhausted) until the
    // delayed tail of the signal has come out.
    while out.len() < delay + expected_len {
        let frames = resampler.input_frames_next();
        let mut chunk = vec![0.0_f32; frames];
        if pos < samples.len() {
            let end = (pos + frames).min(samples.len());
            chunk[..end - pos].copy_from_slice(&samples[pos..end]);
            pos = end;
        }

        let block = resampler
            .process(&[chunk], None)
            .map_err(|e| DecodeError::Resample(format!("resampling failed: {e}")))?;
        out.extend_from_slice(&block[0]);
    }

    out.drain(..delay);
    out.truncate(expected_len);

    log::debug!(
        "resampled {} samples @ {source_rate} Hz -> {} samples @ {target_rate} Hz",
        samples.len(),
        out.len()
    );
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
