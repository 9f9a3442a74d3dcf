//! Core `Transcriber` trait and `ApiTranscriber` implementation.
//!
//! `ApiTranscriber` uploads an audio payload as a multipart form to an
//! OpenAI-audio-compatible `/v1/audio/transcriptions` endpoint and expects
//! `{ text }` back. All connection details come from [`TranscriptionConfig`].

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::TranscriptionConfig;

use super::ServiceError;

// ---------------------------------------------------------------------------
// Transcription
// ---------------------------------------------------------------------------

/// A successful transcription result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcription {
    /// The recognised text.
    pub text: String,
    /// Spoken language detected by the recogniser, when it reports one.
    pub detected_language: Option<String>,
}

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Async trait for the speech-to-text collaborator.
///
/// Implementors must be `Send + Sync` so they can be held behind an
/// `Arc<dyn Transcriber>`.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an encoded audio payload (e.g. WAV or WebM bytes).
    ///
    /// `filename` is forwarded with the upload so the service can pick a
    /// decoder from the extension.
    async fn transcribe(
        &self,
        audio: &[u8],
        filename: &str,
    ) -> Result<Transcription, ServiceError>;
}

#[derive(Deserialize)]
struct TranscribeResponse {
    text: String,
}

// ---------------------------------------------------------------------------
// ApiTranscriber
// ---------------------------------------------------------------------------

/// Calls an OpenAI-audio-compatible transcription endpoint.
pub struct ApiTranscriber {
    client: reqwest::Client,
    config: TranscriptionConfig,
}

impl ApiTranscriber {
    /// Build an `ApiTranscriber` from application config.
    pub fn from_config(config: &TranscriptionConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Transcriber for ApiTranscriber {
    async fn transcribe(
        &self,
        audio: &[u8],
        filename: &str,
    ) -> Result<Transcription, ServiceError> {
        let url = format!("{}/v1/audio/transcriptions", self.config.base_url);

        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name(filename.to_string());

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("language", self.config.language.clone())
            .text("temperature", self.config.temperature.to_string());

        let mut req = self.client.post(&url).multipart(form);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;

        if parsed.text.is_empty() {
            return Err(ServiceError::EmptyResult);
        }

        Ok(Transcription {
            text: parsed.text,
            // The OpenAI-audio wire shape does not report a detection; the
            // session falls back to "unknown".
            detected_language: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
