//! Speech-to-speech translator core.
//!
//! One recorded utterance at a time flows through a strict pipeline:
//!
//! ```text
//! audio ─▶ Transcriber ─▶ Translator ─▶ Synthesizer ─▶ AudioPlayer
//!               │              │              │
//!               ▼              ▼              └─ detached task, errors logged
//!          transcript     transcript +
//!          (source)       TranslationCache (30 min TTL)
//! ```
//!
//! [`session::SessionController`] owns the transcript, the target-language
//! preference and the cache, and drives the pipeline. The three hosted
//! collaborators are consumed through object-safe async traits in
//! [`services`] so the pipeline can be tested without a network.

pub mod audio;
pub mod cache;
pub mod config;
pub mod lang;
pub mod services;
pub mod session;
pub mod store;
