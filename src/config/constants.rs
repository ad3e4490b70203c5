//! Fixed signal-processing and model constants.
//!
//! These values are shared by the audio loader, the feature extractor and the
//! classifier.  They are mutually dependent: the number of feature frames
//! produced from a [`MAX_AUDIO_LENGTH`]-sample waveform must equal
//! [`INPUT_SHAPE`]`.0`, which is asserted at compile time below.

/// Sample rate every waveform is brought to before feature extraction (Hz).
pub const SAMPLE_RATE: u32 = 22_050;

/// Analysis window length in samples (ZCR, RMS and STFT).
pub const FRAME_LENGTH: usize = 2_048;

/// Stride between consecutive analysis frames in samples.
pub const HOP_LENGTH: usize = 512;

/// Number of cepstral coefficients kept per frame.
pub const N_MFCC: usize = 13;

/// Number of mel bands the MFCCs are computed from.
pub const N_MELS: usize = 128;

/// Silence-trim threshold: frames quieter than the peak by more than this many
/// decibels are treated as silence.
pub const TOP_DB: f32 = 25.0;

/// Dynamic range kept in the log-mel spectrogram before the DCT.
pub const SPECTRUM_TOP_DB: f32 = 80.0;

/// Fixed waveform length in samples (~8.2 s at 22 050 Hz).
pub const MAX_AUDIO_LENGTH: usize = 180_000;

/// Classifier input shape: `(time_steps, features)`.
pub const INPUT_SHAPE: (usize, usize) = (352, 15);

/// Hidden units of the first recurrent layer.
pub const LSTM_UNITS_1: usize = 64;

/// Hidden units of the second recurrent layer.
pub const LSTM_UNITS_2: usize = 64;

/// Number of emotion classes.
pub const NUM_EMOTIONS: usize = 6;

/// Audio container extensions accepted by the loader (lowercase, no dot).
pub const SUPPORTED_FORMATS: &[&str] = &["wav", "mp3", "flac", "ogg", "m4a"];

/// Number of centred analysis frames for a signal of `len` samples.
///
/// Frames are centred on multiples of `hop`, i.e. the signal is padded by
/// `frame_length / 2` on both sides before framing.
///
/// ```
/// use speech_emotion::config::constants::{frame_count, FRAME_LENGTH, HOP_LENGTH};
///
/// assert_eq!(frame_count(180_000, FRAME_LENGTH, HOP_LENGTH), Some(352));
/// assert_eq!(frame_count(0, FRAME_LENGTH, HOP_LENGTH), Some(1));
/// assert_eq!(frame_count(usize::MAX, FRAME_LENGTH, HOP_LENGTH), None);
/// ```
///
/// `None` when `hop` is zero or the padded length overflows `usize`.
pub const fn frame_count(len: usize, frame_length: usize, hop: usize) -> Option<usize> {
    if hop == 0 {
        return None;
    }
    let padded = match len.checked_add(2 * (frame_length / 2)) {
        Some(p) => p,
        None => return None,
    };
    if padded < frame_length {
        return Some(0);
    }
    Some(1 + (padded - frame_length) / hop)
}

// Feature frames and width must line up with the classifier input.
const _: () = assert!(matches!(
    frame_count(MAX_AUDIO_LENGTH, FRAME_LENGTH, HOP_LENGTH),
    Some(n) if n == INPUT_SHAPE.0
));
const _: () = assert!(2 + N_MFCC == INPUT_SHAPE.1);
