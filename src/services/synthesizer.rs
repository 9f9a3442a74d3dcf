//! Core `Synthesizer` trait and `ApiSynthesizer` implementation.
//!
//! `ApiSynthesizer` posts `{model, input, voice}` to an
//! OpenAI-audio-compatible `/v1/audio/speech` endpoint and returns the raw
//! audio payload (`audio/mpeg`). All connection details come from
//! [`SynthesisConfig`].

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::SynthesisConfig;

use super::ServiceError;

// ---------------------------------------------------------------------------
// Synthesizer trait
// ---------------------------------------------------------------------------

/// Async trait for the text-to-speech collaborator.
///
/// Implementors must be `Send + Sync` so the synthesis continuation can run
/// on a detached task behind an `Arc<dyn Synthesizer>`.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize `text` and return the encoded audio payload.
    async fn synthesize(&self, text: &str) -> Result<Bytes, ServiceError>;
}

// ---------------------------------------------------------------------------
// ApiSynthesizer
// ---------------------------------------------------------------------------

/// Calls an OpenAI-audio-compatible speech endpoint.
pub struct ApiSynthesizer {
    client: reqwest::Client,
    config: SynthesisConfig,
}

impl ApiSynthesizer {
    /// Build an `ApiSynthesizer` from application config.
    pub fn from_config(config: &SynthesisConfig) -> Self {
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
impl Synthesizer for ApiSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Bytes, ServiceError> {
        let url = format!("{}/v1/audio/speech", self.config.base_url);

        let body = serde_json::json!({
            "model": self.config.model,
            "input": text,
            "voice": self.config.voice,
        });

        let mut req = self.client.post(&url).json(&body);

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

        let audio = response.bytes().await?;

        if audio.is_empty() {
            return Err(ServiceError::EmptyResult);
        }

        Ok(audio)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> SynthesisConfig {
        SynthesisConfig {
            base_url: "https://api.openai.com".into(),
            api_key: Some("sk-test".into()),
            model: "tts-1".into(),
            voice: "alloy".into(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _synthesizer = ApiSynthesizer::from_config(&make_config());
    }

    /// Verify that `ApiSynthesizer` is object-safe (usable as `dyn Synthesizer`).
    #[test]
    fn synthesizer_is_object_safe() {
        let synthesizer: Box<dyn Synthesizer> =
            Box::new(ApiSynthesizer::from_config(&make_config()));
        drop(synthesizer);
    }
}
