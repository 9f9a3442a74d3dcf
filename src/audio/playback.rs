//! Blocking audio playback via `rodio`.

use std::io::Cursor;

use thiserror::Error;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors that can occur while decoding or playing an audio payload.
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    /// No output device could be opened.
    #[error("audio output unavailable: {0}")]
    Device(String),

    /// The payload could not be decoded as audio.
    #[error("failed to decode audio: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// AudioPlayer trait
// ---------------------------------------------------------------------------

/// Blocking playback of an encoded audio payload.
///
/// Implementations must be `Send + Sync` so they can be held behind an
/// `Arc<dyn AudioPlayer>` and invoked from a `spawn_blocking` closure.
/// `play` returns once the clip has finished (or failed).
pub trait AudioPlayer: Send + Sync {
    /// Decode `audio` and play it to completion.
    fn play(&self, audio: &[u8]) -> Result<(), PlaybackError>;
}

// Compile-time assertion: Box<dyn AudioPlayer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioPlayer>) {}
};

// ---------------------------------------------------------------------------
// RodioPlayer
// ---------------------------------------------------------------------------

/// Production player backed by the system default output device.
///
/// The output stream is opened per call and dropped when [`play`] returns,
/// on success and on error alike, so no device handle outlives a clip.
#[derive(Debug, Default, Clone)]
pub struct RodioPlayer;

impl RodioPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl AudioPlayer for RodioPlayer {
    fn play(&self, audio: &[u8]) -> Result<(), PlaybackError> {
        let (_stream, handle) = rodio::OutputStream::try_default()
            .map_err(|e| PlaybackError::Device(e.to_string()))?;

        let sink =
            rodio::Sink::try_new(&handle).map_err(|e| PlaybackError::Device(e.to_string()))?;

        let source = rodio::Decoder::new(Cursor::new(audio.to_vec()))
            .map_err(|e| PlaybackError::Decode(e.to_string()))?;

        sink.append(source);
        sink.sleep_until_end();

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
