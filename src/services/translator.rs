//! Core `Translator` trait and `ApiTranslator` implementation.
//!
//! `ApiTranslator` calls the translation gateway's `/api/translate` endpoint
//! with `{text, targetLanguage, fastMode}` and expects
//! `{translatedText, detectedLanguageCode?, targetLanguageCode?}` back.
//! All connection details come from [`TranslationConfig`]; nothing is
//! hardcoded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::TranslationConfig;

use super::ServiceError;

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

/// A successful translation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// The text in the requested target language.
    pub translated_text: String,
    /// Source language detected by the service, when it reports one.
    pub detected_language: Option<String>,
}

// ---------------------------------------------------------------------------
// Translator trait
// ---------------------------------------------------------------------------

/// Async trait for the translation collaborator.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn Translator>`).
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language` (ISO-639-1 code).
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<Translation, ServiceError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest<'a> {
    text: &'a str,
    target_language: &'a str,
    fast_mode: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    #[serde(default)]
    translated_text: String,
    detected_language: Option<String>,
}

#[derive(Deserialize)]
struct GatewayError {
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// ApiTranslator
// ---------------------------------------------------------------------------

/// Calls the translation gateway over HTTP.
pub struct ApiTranslator {
    client: reqwest::Client,
    config: TranslationConfig,
}

impl ApiTranslator {
    /// Build an `ApiTranslator` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`. A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &TranslationConfig) -> Self {
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
impl Translator for ApiTranslator {
    /// Send `text` to the gateway for translation.
    ///
    /// The `Authorization: Bearer …` header is attached only when
    /// `config.api_key` is a non-empty string — the gateway may run
    /// unauthenticated locally.
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<Translation, ServiceError> {
        let url = format!("{}/api/translate", self.config.base_url);

        let body = TranslateRequest {
            text,
            target_language,
            fast_mode: self.config.fast_mode,
        };

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            // The gateway reports failures as {"error": "..."} when it can.
            let message = response
                .json::<GatewayError>()
                .await
                .ok()
                .and_then(|e| e.error)
                .unwrap_or_else(|| "translation request failed".into());
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;

        if parsed.translated_text.is_empty() {
            return Err(ServiceError::EmptyResult);
        }

        Ok(Translation {
            translated_text: parsed.translated_text,
            detected_language: parsed.detected_language,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
