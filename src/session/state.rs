//! Session state machine and shared state.
//!
//! [`CycleState`] tracks where the current translation cycle is;
//! [`LoadingFlags`] are the per-step in-flight indicators a frontend renders;
//! [`SessionState`] bundles both with the transcript and the target-language
//! preference.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<SessionState>>` — cheap to
//! clone and safe to share between the controller and the detached synthesis
//! task.

use std::sync::{Arc, Mutex};

use super::transcript::ConversationMessage;

// ---------------------------------------------------------------------------
// CycleState
// ---------------------------------------------------------------------------

/// States of one utterance-translation cycle.
///
/// The state machine transitions are:
///
/// ```text
/// Idle ──audio──▶ Transcribing ──text──▶ Translating
///                                          ├─ cache hit or 2xx ─▶ Synthesizing ─▶ Done
///                                          └─ failure ──────────▶ Failed
/// Done / Failed ──next cycle──▶ (overwritten by the next cycle's states)
/// ```
///
/// `Failed` is terminal for its cycle: nothing is retried, and the next
/// recording starts a fresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// No cycle in flight.
    Idle,

    /// The audio payload is at the transcription collaborator.
    Transcribing,

    /// The cache is being probed or the translation request is in flight.
    Translating,

    /// Translation appended; the detached synthesis task is running.
    Synthesizing,

    /// The cycle completed. Synthesis may or may not have produced audio.
    Done,

    /// Transcription or translation failed; the cycle produced no further
    /// transcript entries.
    Failed,
}

impl CycleState {
    /// Returns `true` while a collaborator call for this cycle is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            CycleState::Transcribing | CycleState::Translating | CycleState::Synthesizing
        )
    }

    /// A short human-readable label for status display.
    pub fn label(&self) -> &'static str {
        match self {
            CycleState::Idle => "Idle",
            CycleState::Transcribing => "Converting speech to text",
            CycleState::Translating => "Translating",
            CycleState::Synthesizing => "Generating audio",
            CycleState::Done => "Done",
            CycleState::Failed => "Failed",
        }
    }
}

impl Default for CycleState {
    fn default() -> Self {
        CycleState::Idle
    }
}

// ---------------------------------------------------------------------------
// LoadingFlags
// ---------------------------------------------------------------------------

/// Per-step in-flight indicators.
///
/// Each flag is set when its step starts and cleared on every exit path of
/// that step — including error paths. Synthesis has its own flag because its
/// failure must not affect the translation step's indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    pub transcription: bool,
    pub translation: bool,
    pub synthesis: bool,
}

impl LoadingFlags {
    /// Returns `true` when any step is in flight.
    pub fn any(&self) -> bool {
        self.transcription || self.translation || self.synthesis
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Shared session state — the single source of truth a frontend reads.
///
/// Held behind [`SharedState`]. The controller mutates it; the detached
/// synthesis task clears its own flag when playback resolves.
#[derive(Debug)]
pub struct SessionState {
    /// Current phase of the in-flight cycle.
    pub cycle: CycleState,

    /// Append-only conversation transcript.
    pub transcript: Vec<ConversationMessage>,

    /// Selected target language (ISO-639-1 code).
    pub target_language: String,

    /// Coarse "a cycle is being processed" indicator: set when a cycle
    /// starts, cleared on every exit path of the translation step.
    pub processing: bool,

    /// Per-step indicators.
    pub loading: LoadingFlags,

    /// User-visible error for the last failed cycle, e.g. the translation
    /// failure alert. `None` after a successful cycle starts.
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn new(target_language: String) -> Self {
        Self {
            cycle: CycleState::Idle,
            transcript: Vec::new(),
            target_language,
            processing: false,
            loading: LoadingFlags::default(),
            last_error: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].
///
/// Lock for a short critical section; do **not** hold the lock across
/// `.await` points.
pub type SharedState = Arc<Mutex<SessionState>>;

/// Construct a new [`SharedState`].
pub fn new_shared_state(target_language: String) -> SharedState {
    Arc::new(Mutex::new(SessionState::new(target_language)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
