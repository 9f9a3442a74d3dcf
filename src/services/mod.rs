//! Hosted collaborator clients.
//!
//! This module provides one object-safe async trait per collaborator:
//! * [`Transcriber`] — speech → text.
//! * [`Translator`] — text → text in a target language.
//! * [`Synthesizer`] — text → audio payload.
//!
//! The production implementations ([`ApiTranscriber`], [`ApiTranslator`],
//! [`ApiSynthesizer`]) speak the wire shapes each hosted service actually
//! uses; all connection details (`base_url`, `api_key`, timeouts) come
//! exclusively from config — nothing is hardcoded.
//!
//! [`ServiceError`] is shared by all three so the pipeline can distinguish
//! transport failures from service-side errors without caring which
//! collaborator produced them.

pub mod synthesizer;
pub mod transcriber;
pub mod translator;

use thiserror::Error;

// ---------------------------------------------------------------------------
// ServiceError
// ---------------------------------------------------------------------------

/// Errors that can occur when calling a hosted collaborator.
///
/// `Transport` and `Timeout` mean no usable response arrived; `Status` means
/// the service itself answered with an error. Both end a translation cycle
/// the same way, but the distinction is kept for observability.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// HTTP transport or connection error — the service never answered.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be parsed as the expected shape.
    #[error("failed to parse service response: {0}")]
    Parse(String),

    /// The service answered 2xx but the payload carried no usable result.
    #[error("service returned an empty result")]
    EmptyResult,
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::Timeout
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use synthesizer::{ApiSynthesizer, Synthesizer};
pub use transcriber::{ApiTranscriber, Transcriber, Transcription};
pub use translator::{ApiTranslator, Translation, Translator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_code_and_message() {
        let err = ServiceError::Status {
            status: 500,
            message: "internal error".into(),
        };
        let text = err.to_string();
        assert!(text.contains("500"));
        assert!(text.contains("internal error"));
    }

    #[test]
    fn timeout_is_not_a_transport_error() {
        // The two variants must stay distinguishable for logging.
        assert_ne!(
            ServiceError::Timeout.to_string(),
            ServiceError::Transport("connection refused".into()).to_string()
        );
    }
}
