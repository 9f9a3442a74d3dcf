//! Expiring translation cache.
//!
//! [`TranslationCache`] memoizes translation results for 30 minutes, keyed by
//! the exact source text and target-language code concatenated as
//! `"{text}_{lang}"`. No normalization is applied — text differing only in
//! case or trailing whitespace is a deliberate cache miss.
//!
//! Expiry is lazy: [`get`](TranslationCache::get) ignores stale entries and
//! [`purge_expired`](TranslationCache::purge_expired) drops them, which the
//! session runs when the cache is reloaded from disk. Every method takes the
//! current time in Unix milliseconds so TTL behaviour is testable without a
//! clock.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Validity window for a cache entry: 30 minutes.
pub const CACHE_TTL_MS: u64 = 30 * 60 * 1000;

// ---------------------------------------------------------------------------
// CacheEntry
// ---------------------------------------------------------------------------

/// A single memoized translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The text in the target language.
    pub translated_text: String,
    /// Source language the service detected when the entry was created.
    pub detected_language: String,
    /// Creation time in Unix milliseconds.
    pub timestamp_ms: u64,
}

impl CacheEntry {
    /// Returns `true` while `now_ms − timestamp < TTL`.
    pub fn is_valid(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.timestamp_ms) < CACHE_TTL_MS
    }
}

// ---------------------------------------------------------------------------
// TranslationCache
// ---------------------------------------------------------------------------

/// Keyed, expiring memoization of translation results.
///
/// Owned by one [`SessionController`](crate::session::SessionController);
/// there is no cross-process consistency guarantee.
#[derive(Debug, Default, Clone)]
pub struct TranslationCache {
    entries: HashMap<String, CacheEntry>,
}

impl TranslationCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cache from persisted entries.
    ///
    /// Callers should follow up with [`purge_expired`](Self::purge_expired)
    /// so stale entries never survive a reload.
    pub fn from_entries(entries: HashMap<String, CacheEntry>) -> Self {
        Self { entries }
    }

    /// The composite lookup key: exact source text + target-language code.
    pub fn key(text: &str, target_language: &str) -> String {
        format!("{text}_{target_language}")
    }

    /// Look up a valid (non-expired) entry. Stale entries are ignored but
    /// not removed; removal happens in [`purge_expired`](Self::purge_expired).
    pub fn get(&self, text: &str, target_language: &str, now_ms: u64) -> Option<&CacheEntry> {
        self.entries
            .get(&Self::key(text, target_language))
            .filter(|e| e.is_valid(now_ms))
    }

    /// Insert or overwrite an entry, stamped with `now_ms`.
    pub fn put(
        &mut self,
        text: &str,
        target_language: &str,
        translated_text: String,
        detected_language: String,
        now_ms: u64,
    ) {
        self.entries.insert(
            Self::key(text, target_language),
            CacheEntry {
                translated_text,
                detected_language,
                timestamp_ms: now_ms,
            },
        );
    }

    /// Drop every entry that has outlived the TTL.
    pub fn purge_expired(&mut self, now_ms: u64) {
        self.entries.retain(|_, e| e.is_valid(now_ms));
    }

    /// Borrow the underlying map for persistence.
    pub fn entries(&self) -> &HashMap<String, CacheEntry> {
        &self.entries
    }

    /// Number of entries, valid or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
