//! Speech emotion recognition.
//!
//! Decodes a short speech clip, reduces it to a `352 × 15` sequence of
//! frame descriptors (zero-crossing rate, RMS energy, 13 MFCCs) and
//! classifies it into one of six emotions with a two-layer LSTM.
//!
//! | module       | role |
//! |--------------|------|
//! | [`audio`]    | decode, mix down, resample, trim silence, fix length |
//! | [`features`] | ZCR, RMS and MFCC per centred frame |
//! | [`model`]    | safetensors weights, LSTM forward pass, label set |
//! | [`pipeline`] | per-file orchestration and batch analysis |
//! | [`config`]   | constants and `settings.toml` |

pub mod audio;
pub mod config;
pub mod features;
pub mod model;
pub mod pipeline;
