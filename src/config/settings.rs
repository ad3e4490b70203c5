//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! The defaults mirror [`crate::config::constants`].  A loaded file may tune
//! them, so [`AppConfig::validate`] re-checks the frame/shape coupling at
//! startup instead of trusting the file.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    frame_count, FRAME_LENGTH, HOP_LENGTH, INPUT_SHAPE, MAX_AUDIO_LENGTH, N_MELS, N_MFCC,
    SAMPLE_RATE, SPECTRUM_TOP_DB, TOP_DB,
};
use super::AppPaths;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// A configuration that cannot drive the pipeline consistently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Feature frames produced from a full waveform do not match the
    /// classifier's expected time steps.
    #[error(
        "frame count {got} (length {max_audio_length}, frame {frame_length}, hop {hop_length}) \
         does not match model input frames {expected}"
    )]
    FrameCountMismatch {
        max_audio_length: usize,
        frame_length: usize,
        hop_length: usize,
        got: usize,
        expected: usize,
    },

    /// `2 + n_mfcc` does not match the classifier's feature width.
    #[error("feature width {got} (ZCR + RMS + {n_mfcc} MFCC) does not match model input features {expected}")]
    FeatureWidthMismatch {
        n_mfcc: usize,
        got: usize,
        expected: usize,
    },

    /// A numeric field is outside its valid range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for decoding, trimming and length normalisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Target sample rate in Hz (22 050).
    pub sample_rate: u32,
    /// Silence-trim threshold in dB below the loudest frame.
    pub top_db: f32,
    /// Fixed waveform length in samples after trimming.
    pub max_audio_length: usize,
    /// Resample decoded audio to `sample_rate` when the file uses another
    /// rate.  When `false` files must already be at `sample_rate`; anything
    /// else fails feature extraction.
    pub resample: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            top_db: TOP_DB,
            max_audio_length: MAX_AUDIO_LENGTH,
            resample: true,
        }
    }
}

// ---------------------------------------------------------------------------
// FeatureConfig
// ---------------------------------------------------------------------------

/// Framing and spectral settings shared by all three descriptors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Analysis window length in samples (also the FFT size).
    pub frame_length: usize,
    /// Stride between frames in samples.
    pub hop_length: usize,
    /// Number of cepstral coefficients kept.
    pub n_mfcc: usize,
    /// Number of mel bands.
    pub n_mels: usize,
    /// Dynamic range (dB) of the log-mel spectrogram.
    pub spectrum_top_db: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            frame_length: FRAME_LENGTH,
            hop_length: HOP_LENGTH,
            n_mfcc: N_MFCC,
            n_mels: N_MELS,
            spectrum_top_db: SPECTRUM_TOP_DB,
        }
    }
}

impl FeatureConfig {
    /// Width of one feature frame: ZCR + RMS + MFCCs.
    pub fn feature_width(&self) -> usize {
        2 + self.n_mfcc
    }
}

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

/// Classifier artifact location and declared input shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Explicit weights file.  `None` means `<models_dir>/ser.safetensors`.
    pub weights_file: Option<PathBuf>,
    /// Expected time steps per input sequence.
    pub input_frames: usize,
    /// Expected features per time step.
    pub input_features: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_file: None,
            input_frames: INPUT_SHAPE.0,
            input_features: INPUT_SHAPE.1,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use speech_emotion::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Decoding / trimming settings.
    pub audio: AudioConfig,
    /// Feature extraction settings.
    pub features: FeatureConfig,
    /// Classifier settings.
    pub model: ModelConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that the audio, feature and model settings agree.
    ///
    /// Must be called once at startup before any inference.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.features;
        let a = &self.audio;
        let m = &self.model;

        if f.hop_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "features.hop_length",
                reason: "must be greater than zero".into(),
            });
        }
        if f.frame_length < 2 || f.hop_length > f.frame_length {
            return Err(ConfigError::InvalidValue {
                field: "features.frame_length",
                reason: format!(
                    "must be at least 2 and not shorter than hop_length ({})",
                    f.hop_length
                ),
            });
        }
        if f.n_mfcc == 0 || f.n_mfcc > f.n_mels {
            return Err(ConfigError::InvalidValue {
                field: "features.n_mfcc",
                reason: format!("must be in 1..={}", f.n_mels),
            });
        }
        if a.sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audio.sample_rate",
                reason: "must be greater than zero".into(),
            });
        }
        if a.max_audio_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audio.max_audio_length",
                reason: "must be greater than zero".into(),
            });
        }
        if !(a.top_db > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "audio.top_db",
                reason: format!("must be positive, got {}", a.top_db),
            });
        }

        let frames = frame_count(a.max_audio_length, f.frame_length, f.hop_length)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "audio.max_audio_length",
                reason: format!("{} samples overflows framing", a.max_audio_length),
            })?;
        if frames != m.input_frames {
            return Err(ConfigError::FrameCountMismatch {
                max_audio_length: a.max_audio_length,
                frame_length: f.frame_length,
                hop_length: f.hop_length,
                got: frames,
                expected: m.input_frames,
            });
        }

        if f.feature_width() != m.input_features {
            return Err(ConfigError::FeatureWidthMismatch {
                n_mfcc: f.n_mfcc,
                got: f.feature_width(),
                expected: m.input_features,
            });
        }

        Ok(())
    }

    /// Returns `true` when no `settings.toml` file exists yet.
    pub fn is_first_run() -> bool {
        !AppPaths::new().settings_file.exists()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
