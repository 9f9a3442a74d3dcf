//! Conversation transcript entries.
//!
//! The transcript is an append-only sequence of [`ConversationMessage`]s for
//! the lifetime of one session: the recognised source utterance first, its
//! translation second. It is persisted as JSON on every change
//! (see [`SessionStore`](crate::store::SessionStore)) using camelCase field
//! names, matching the shape earlier clients of the gateway wrote.

use serde::{Deserialize, Serialize};

/// One entry in the conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    /// The utterance content — recognised speech or a translation of the
    /// preceding entry.
    pub text: String,

    /// `false` for source entries, `true` for translated entries.
    pub is_translated: bool,

    /// Source language reported by the upstream service; `"unknown"` on
    /// translated entries when the service omitted it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,

    /// The language requested for this specific translation. Only set on
    /// translated entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
}

impl ConversationMessage {
    /// A source entry, straight from the transcription step.
    pub fn source(text: &str, detected_language: Option<&str>) -> Self {
        Self {
            text: text.to_string(),
            is_translated: false,
            detected_language: detected_language.map(str::to_string),
            target_language: None,
        }
    }

    /// A translated entry.
    pub fn translated(text: &str, detected_language: &str, target_language: &str) -> Self {
        Self {
            text: text.to_string(),
            is_translated: true,
            detected_language: Some(detected_language.to_string()),
            target_language: Some(target_language.to_string()),
        }
    }
}
