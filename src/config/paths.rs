//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\speech-translator\
//!   macOS:   ~/Library/Application Support/speech-translator/
//!   Linux:   ~/.config/speech-translator/
//!
//! Data dir (transcript, language preference, translation cache):
//!   Windows: %LOCALAPPDATA%\speech-translator\
//!   macOS:   ~/Library/Application Support/speech-translator/
//!   Linux:   ~/.local/share/speech-translator/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for session data (`messages.json`, `language.txt`,
    /// `cache.json`).
    pub session_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "speech-translator";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let session_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME)
            .join("session");

        let settings_file = config_dir.join("settings.toml");

        Self {
            config_dir,
            settings_file,
            session_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
