//! Best-effort persistence for session state.
//!
//! [`SessionStore`] writes the three persisted surfaces to a session
//! directory as plain files:
//!
//! | File            | Contents                                   |
//! |-----------------|--------------------------------------------|
//! | `messages.json` | transcript (array of conversation messages)|
//! | `language.txt`  | target-language preference                 |
//! | `cache.json`    | translation cache (key → entry map)        |
//!
//! Every method returns a `Result`, but callers treat persistence as
//! best-effort: failures are logged at the call site and the in-memory state
//! stays authoritative for the rest of the session.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;

use crate::cache::CacheEntry;
use crate::config::AppPaths;
use crate::session::ConversationMessage;

/// File-backed persistence for transcript, language preference and cache.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Open the platform-default session directory.
    pub fn open_default() -> Self {
        Self::open(AppPaths::new().session_dir)
    }

    /// Open an explicit directory (useful for tests).
    pub fn open(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn messages_file(&self) -> PathBuf {
        self.dir.join("messages.json")
    }

    fn language_file(&self) -> PathBuf {
        self.dir.join("language.txt")
    }

    fn cache_file(&self) -> PathBuf {
        self.dir.join("cache.json")
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transcript
    // -----------------------------------------------------------------------

    /// Load the persisted transcript, or an empty one when absent.
    pub fn load_messages(&self) -> Vec<ConversationMessage> {
        let path = self.messages_file();
        if !path.exists() {
            return Vec::new();
        }
        let data = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&data).unwrap_or_default()
    }

    /// Persist the whole transcript.
    pub fn save_messages(&self, messages: &[ConversationMessage]) -> Result<()> {
        self.ensure_dir()?;
        let data = serde_json::to_string(messages)?;
        std::fs::write(self.messages_file(), data)?;
        Ok(())
    }

    /// Remove the persisted transcript entirely.
    pub fn clear_messages(&self) -> Result<()> {
        let path = self.messages_file();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Returns `true` while a persisted transcript exists on disk.
    pub fn has_messages(&self) -> bool {
        self.messages_file().exists()
    }

    // -----------------------------------------------------------------------
    // Language preference
    // -----------------------------------------------------------------------

    /// Load the persisted target-language preference, if any.
    pub fn load_language(&self) -> Option<String> {
        let path = self.language_file();
        if !path.exists() {
            return None;
        }
        let code = std::fs::read_to_string(path).ok()?.trim().to_string();
        if code.is_empty() {
            None
        } else {
            Some(code)
        }
    }

    /// Persist the target-language preference.
    pub fn save_language(&self, code: &str) -> Result<()> {
        self.ensure_dir()?;
        std::fs::write(self.language_file(), code)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Translation cache
    // -----------------------------------------------------------------------

    /// Load the persisted cache entries, or an empty map when absent.
    ///
    /// Expiry filtering is the cache's job, not the store's — the session
    /// calls `purge_expired` right after rebuilding the cache from this map.
    pub fn load_cache(&self) -> HashMap<String, CacheEntry> {
        let path = self.cache_file();
        if !path.exists() {
            return HashMap::new();
        }
        let data = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&data).unwrap_or_default()
    }

    /// Persist the cache entries.
    pub fn save_cache(&self, entries: &HashMap<String, CacheEntry>) -> Result<()> {
        self.ensure_dir()?;
        let data = serde_json::to_string(entries)?;
        std::fs::write(self.cache_file(), data)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
