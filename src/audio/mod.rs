//! Audio input: file decoding → mono → resampling → silence trim → fixed length.
//!
//! # Pipeline
//!
//! ```text
//! file (.wav/.mp3/.flac/.ogg/.m4a) → decode_file (Symphonia)
//!     → stereo_to_mono → resample (rubato, 22 050 Hz)
//!     → trim_silence (25 dB) → Waveform::fit (180 000 samples)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use speech_emotion::audio::AudioLoader;
//!
//! let loader = AudioLoader::default();
//! let waveform = loader.load("speech.wav").unwrap();
//! println!("{} samples @ {} Hz", waveform.len(), waveform.sample_rate());
//! ```

pub mod decode;
pub mod loader;
pub mod resample;
pub mod trim;
pub mod waveform;

#[cfg(test)]
pub(crate) mod testing;

pub use decode::{decode_file, is_supported_format, DecodeError, DecodedAudio};
pub use loader::AudioLoader;
pub use resample::{resample, stereo_to_mono};
pub use trim::{non_silent_range, trim_silence};
pub use waveform::Waveform;
