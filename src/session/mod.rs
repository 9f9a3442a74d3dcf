//! Translation session module.
//!
//! This module wires the full transcribe → translate → synthesize pipeline
//! and exposes the shared state a frontend reads.
//!
//! # Architecture
//!
//! ```text
//! SessionController  ← owns transcript, target language, TranslationCache
//!        │
//!        ├─ run_cycle(audio)        — full cycle from an audio payload
//!        ├─ handle_transcription()  — entry point when text already exists
//!        ├─ translate_text()        — cache probe → gateway → append + stamp
//!        ├─ play_translated_audio() — detached synthesis task
//!        ├─ set_target_language()
//!        └─ clear_conversation()
//!
//! SharedState (Arc<Mutex<SessionState>>) ←── read by the frontend
//! SynthesisOutcome (mpsc)                ←── observed by the frontend/tests
//! ```

pub mod controller;
pub mod state;
pub mod transcript;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::{SessionController, SynthesisOutcome, TRANSLATION_FAILED_ALERT};
pub use state::{new_shared_state, CycleState, LoadingFlags, SessionState, SharedState};
pub use transcript::ConversationMessage;
