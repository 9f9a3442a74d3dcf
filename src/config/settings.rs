//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::lang;

use super::AppPaths;

// ---------------------------------------------------------------------------
// TranslationConfig
// ---------------------------------------------------------------------------

/// Settings for the translation gateway.
///
/// The gateway speaks the JSON shape `{text, targetLanguage, fastMode}` →
/// `{translatedText, detectedLanguage, targetLanguage}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Base URL of the translation gateway.
    pub base_url: String,
    /// API key — `None` for gateways that require no authentication.
    pub api_key: Option<String>,
    /// Hint the gateway to prefer lower latency over quality.
    pub fast_mode: bool,
    /// Default target language as an ISO-639-1 code, used when no
    /// persisted preference exists yet.
    pub default_target_language: String,
    /// Maximum seconds to wait for a translation response.
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            api_key: None,
            fast_mode: true,
            default_target_language: lang::DEFAULT_TARGET.into(),
            timeout_secs: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// TranscriptionConfig
// ---------------------------------------------------------------------------

/// Settings for the hosted speech-to-text collaborator (OpenAI-audio wire
/// shape: multipart upload → `{ text }`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Base URL of the transcription API.
    pub base_url: String,
    /// API key — required by hosted providers.
    pub api_key: Option<String>,
    /// Model identifier sent with the upload (e.g. `"whisper-1"`).
    pub model: String,
    /// Spoken-language hint as an ISO-639-1 code.
    pub language: String,
    /// Sampling temperature passed to the recognizer.
    pub temperature: f32,
    /// Maximum seconds to wait for a transcription response.
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "whisper-1".into(),
            language: "en".into(),
            temperature: 0.2,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// SynthesisConfig
// ---------------------------------------------------------------------------

/// Settings for the hosted text-to-speech collaborator (JSON
/// `{model, input, voice}` → binary audio).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Base URL of the synthesis API.
    pub base_url: String,
    /// API key — required by hosted providers.
    pub api_key: Option<String>,
    /// Model identifier (e.g. `"tts-1"`).
    pub model: String,
    /// Voice identifier (e.g. `"alloy"`).
    pub voice: String,
    /// Maximum seconds to wait for a synthesis response.
    pub timeout_secs: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "tts-1".into(),
            voice: "alloy".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use speech_translator::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Translation gateway settings.
    pub translation: TranslationConfig,
    /// Speech-to-text collaborator settings.
    pub transcription: TranscriptionConfig,
    /// Text-to-speech collaborator settings.
    pub synthesis: SynthesisConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
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
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
