//! Audio playback for synthesized speech.
//!
//! [`AudioPlayer`] is the blocking playback seam; [`RodioPlayer`] is the
//! production implementation. The session pushes playback onto
//! `tokio::task::spawn_blocking` so the async runtime never stalls while a
//! clip plays out.

pub mod playback;

pub use playback::{AudioPlayer, PlaybackError, RodioPlayer};
