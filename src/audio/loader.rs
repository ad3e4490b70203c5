//! File → fixed-length [`Waveform`].
//!
//! ```text
//! decode_file → stereo_to_mono → resample (22 050 Hz)
//!             → non_silent_range (top_db) → Waveform::fit (max_audio_length)
//! ```

use std::path::Path;

use crate::config::AppConfig;

use super::decode::{decode_file, DecodeError, DecodedAudio};
use super::resample::{resample, stereo_to_mono};
use super::trim::non_silent_range;
use super::waveform::Waveform;

/// Loads audio files into the fixed-length waveforms the extractor expects.
///
/// Holds only scalar settings; cheap to clone and safe to share.
#[derive(Debug, Clone)]
pub struct AudioLoader {
    sample_rate: u32,
    resample: bool,
    top_db: f32,
    max_audio_length: usize,
    frame_length: usize,
    hop_length: usize,
}

impl Default for AudioLoader {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl AudioLoader {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            sample_rate: config.audio.sample_rate,
            resample: config.audio.resample,
            top_db: config.audio.top_db,
            max_audio_length: config.audio.max_audio_length,
            frame_length: config.features.frame_length,
            hop_length: config.features.hop_length,
        }
    }

    /// Decode `path` and prepare it for feature extraction.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Waveform, DecodeError> {
        self.prepare(decode_file(path.as_ref())?)
    }

    /// Mix down, resample, trim and fit already-decoded audio.
    pub fn prepare(&self, decoded: DecodedAudio) -> Result<Waveform, DecodeError> {
        let mono = if decoded.channels > 1 {
            stereo_to_mono(&decoded.samples, decoded.channels)
        } else {
            decoded.samples
        };
        if mono.is_empty() {
            return Err(DecodeError::Empty);
        }

        let (mono, rate) = if self.resample && decoded.sample_rate != self.sample_rate {
            (
                resample(&mono, decoded.sample_rate, self.sample_rate)?,
                self.sample_rate,
            )
        } else {
            (mono, decoded.sample_rate)
        };

        let range = non_silent_range(&mono, self.top_db, self.frame_length, self.hop_length);
        log::debug!(
            "trimmed to samples {}..{} of {}",
            range.start,
            range.end,
            mono.len()
        );
        let trimmed = mono[range].to_vec();

        if trimmed.len() > self.max_audio_length {
            log::debug!(
                "truncating {} samples to {}",
                trimmed.len(),
                self.max_audio_length
            );
        }
        Ok(Waveform::fit(trimmed, self.max_audio_length, rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::{sine, write_wav};
    use tempfile::tempdir;

    fn decoded(samples: Vec<f32>, sample_rate: u32, channels: usize) -> DecodedAudio {
        DecodedAudio {
            samples,
            sample_rate,
            channels,
        }
    }

    #[test]
    fn short_clip_is_padded_to_fixed_length() {
        let loader = AudioLoader::default();
        let w = loader
            .prepare(decoded(sine(300.0, 22_050, 1.0, 0.5), 22_050, 1))
            .unwrap();
        assert_eq!(w.len(), 180_000);
        assert_eq!(w.sample_rate(), 22_050);
        assert!(w.samples()[170_000..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn long_clip_is_truncated_to_fixed_length() {
        let loader = AudioLoader::default();
        let w = loader
            .prepare(decoded(sine(300.0, 22_050, 10.0, 0.5), 22_050, 1))
            .unwrap();
        assert_eq!(w.len(), 180_000);
        assert!(w.samples()[179_000..].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn leading_silence_is_trimmed() {
        let loader = AudioLoader::default();
        let mut samples = vec![0.0_f32; 44_100];
        samples.extend(sine(300.0, 22_050, 1.0, 0.5));
        let w = loader.prepare(decoded(samples, 22_050, 1)).unwrap();
        // Audio now starts within the first frame instead of after 2 s.
        assert!(w.samples()[..2_048].iter().any(|&s| s.abs() > 0.1));
    }

    #[test]
    fn stereo_is_mixed_to_mono() {
        let loader = AudioLoader::default();
        let left = sine(300.0, 22_050, 1.0, 0.5);
        let interleaved: Vec<f32> = left.iter().flat_map(|&s| [s, s]).collect();
        let w = loader.prepare(decoded(interleaved, 22_050, 2)).unwrap();
        assert_eq!(w.len(), 180_000);
        let peak = w.samples().iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.5).abs() < 1e-3, "peak = {peak}");
    }

    #[test]
    fn other_rates_are_resampled() {
        let loader = AudioLoader::default();
        let w = loader
            .prepare(decoded(sine(300.0, 44_100, 1.0, 0.5), 44_100, 1))
            .unwrap();
        assert_eq!(w.sample_rate(), 22_050);
        // One second at 22.05 kHz, the rest padding.
        let voiced = w.samples().iter().rposition(|s| s.abs() > 1e-3).unwrap();
        assert!((21_000..=22_050).contains(&voiced), "last voiced sample {voiced}");
    }

    #[test]
    fn resampling_can_be_disabled() {
        let mut config = AppConfig::default();
        config.audio.resample = false;
        let loader = AudioLoader::from_config(&config);
        let w = loader
            .prepare(decoded(sine(300.0, 44_100, 1.0, 0.5), 44_100, 1))
            .unwrap();
        assert_eq!(w.sample_rate(), 44_100);
        assert_eq!(w.len(), 180_000);
    }

    #[test]
    fn silent_clip_is_kept_as_silence() {
        let loader = AudioLoader::default();
        let w = loader.prepare(decoded(vec![0.0; 5_000], 22_050, 1)).unwrap();
        assert_eq!(w.len(), 180_000);
        assert!(w.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn empty_audio_is_an_error() {
        let loader = AudioLoader::default();
        assert_eq!(
            loader.prepare(decoded(Vec::new(), 22_050, 1)),
            Err(DecodeError::Empty)
        );
    }

    #[test]
    fn loads_wav_file_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, &sine(440.0, 44_100, 0.5, 0.5), 44_100, 1);

        let w = AudioLoader::default().load(&path).unwrap();
        assert_eq!(w.len(), 180_000);
        assert_eq!(w.sample_rate(), 22_050);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"definitely not riff data").unwrap();
        assert!(AudioLoader::default().load(&path).is_err());
    }
}
