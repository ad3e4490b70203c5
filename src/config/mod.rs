//! Configuration module for speech emotion recognition.
//!
//! Provides the fixed [`constants`], `AppConfig` (top-level settings) with a
//! sub-config per pipeline stage, `AppPaths` for cross-platform data
//! directories, and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod constants;
pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, AudioConfig, ConfigError, FeatureConfig, ModelConfig};
