//! Configuration module for the speech translator.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each hosted
//! collaborator, `AppPaths` for cross-platform data directories, and TOML
//! persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, SynthesisConfig, TranscriptionConfig, TranslationConfig};
