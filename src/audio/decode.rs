//! Container/codec decoding with Symphonia.
//!
//! [`decode_file`] turns any supported audio file into interleaved `f32`
//! samples normalised to `[-1, 1]`, together with the stream's sample rate
//! and channel count.  Everything format-specific stays in here.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use crate::config::constants::SUPPORTED_FORMATS;

// ---------------------------------------------------------------------------
// DecodeError
// ---------------------------------------------------------------------------

/// Reasons an audio file could not be turned into a waveform.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The file could not be opened or read.
    #[error("cannot read audio file {path}: {reason}")]
    Io { path: String, reason: String },

    /// The file extension is not one of the supported formats.
    #[error("unsupported audio format: .{0}")]
    UnsupportedFormat(String),

    /// The container could not be recognised (not audio, or corrupt header).
    #[error("unrecognised or corrupt audio container: {0}")]
    Probe(String),

    /// The container holds no track with a decodable codec.
    #[error("no decodable audio track found")]
    NoAudioTrack,

    /// The track's codec is not supported.
    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),

    /// Packet decoding failed part-way through the stream.
    #[error("decoding failed: {0}")]
    Decode(String),

    /// The stream decoded to zero samples.
    #[error("audio contains no samples")]
    Empty,

    /// Sample-rate conversion failed.
    #[error("resampling failed: {0}")]
    Resample(String),
}

// ---------------------------------------------------------------------------
// DecodedAudio
// ---------------------------------------------------------------------------

/// Raw decoder output before channel mixing and resampling.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved samples in `[-1, 1]`.
    pub samples: Vec<f32>,
    /// Native sample rate of the stream in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: usize,
}

impl DecodedAudio {
    /// Duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.channels as f32 / self.sample_rate as f32
    }
}

// ---------------------------------------------------------------------------
// Format helpers
// ---------------------------------------------------------------------------

/// Lowercase extension of `path`, if it has one.
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Returns `true` when `path` carries one of the supported extensions.
///
/// ```
/// use speech_emotion::audio::is_supported_format;
///
/// assert!(is_supported_format("clip.WAV"));
/// assert!(is_supported_format("voice.m4a"));
/// assert!(!is_supported_format("notes.txt"));
/// assert!(!is_supported_format("no_extension"));
/// ```
pub fn is_supported_format(path: impl AsRef<Path>) -> bool {
    extension(path.as_ref()).is_some_and(|ext| SUPPORTED_FORMATS.contains(&ext.as_str()))
}

// ---------------------------------------------------------------------------
// decode_file
// ---------------------------------------------------------------------------

/// Decode the first audio track of `path`.
///
/// Files with an extension outside the supported set are rejected before
/// probing; files without an extension are probed by content.  Individual
/// corrupt packets are skipped with a warning, but a stream that yields no
/// samples at all is [`DecodeError::Empty`].
pub fn decode_file(path: impl AsRef<Path>) -> Result<DecodedAudio, DecodeError> {
    let path = path.as_ref();

    let mut hint = Hint::new();
    if let Some(ext) = extension(path) {
        if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
            return Err(DecodeError::UnsupportedFormat(ext));
        }
        hint.with_extension(&ext);
    }

    let file = File::open(path).map_err(|e| DecodeError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::Probe(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::UnsupportedCodec(e.to_string()))?;

    let mut samples = Vec::new();
    let mut skipped = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count();

                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            Err(SymphoniaError::DecodeError(e)) => {
                skipped += 1;
                log::warn!("skipping corrupt packet in {}: {e}", path.display());
            }
            Err(e) => return Err(DecodeError::Decode(e.to_string())),
        }
    }

    if skipped > 0 {
        log::debug!("{skipped} packet(s) skipped while decoding {}", path.display());
    }

    if samples.is_empty() || channels == 0 || sample_rate == 0 {
        return Err(DecodeError::Empty);
    }

    let audio = DecodedAudio {
        samples,
        sample_rate,
        channels,
    };
    log::debug!(
        "decoded {}: {:.2}s @ {} Hz, {} ch",
        path.display(),
        audio.duration_secs(),
        audio.sample_rate,
        audio.channels
    );
    Ok(audio)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
