//! Translation session controller — drives the full
//! audio → transcribe → translate → synthesize → play cycle.
//!
//! [`SessionController`] owns the conversation transcript, the
//! target-language preference and the expiring [`TranslationCache`], and is
//! the only mutator of session state. The three hosted collaborators are
//! injected as trait objects so the whole pipeline runs without a network in
//! tests.
//!
//! # Cycle flow
//!
//! ```text
//! run_cycle(audio)
//!   └─▶ Transcriber::transcribe          [Transcribing]
//!         ├─ Err → record error, stop before translation
//!         └─ Ok  → handle_transcription
//!                    ├─ append source message
//!                    └─▶ translate_text                  [Translating]
//!                          ├─ cache hit → reuse entry (no network)
//!                          ├─ miss → Translator::translate
//!                          │          ├─ Err → alert, cycle Failed
//!                          │          └─ Ok  → stamp cache entry
//!                          ├─ append translated message
//!                          └─▶ play_translated_audio     [Synthesizing]
//!                                └─ detached tokio task; failures logged,
//!                                   never block the cycle
//! ```
//!
//! Persistence of the transcript, language preference and cache is
//! best-effort: failures are logged and the in-memory state stays
//! authoritative.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::audio::AudioPlayer;
use crate::cache::TranslationCache;
use crate::lang;
use crate::services::{Synthesizer, Transcriber, Translator};
use crate::store::SessionStore;

use super::state::{new_shared_state, CycleState, SharedState};
use super::transcript::ConversationMessage;

/// User-visible alert recorded when the translation step fails.
pub const TRANSLATION_FAILED_ALERT: &str = "Translation failed. Please try again.";

/// Fallback language code when the service reports no detection.
const UNKNOWN_LANGUAGE: &str = "unknown";

// ---------------------------------------------------------------------------
// SynthesisOutcome
// ---------------------------------------------------------------------------

/// Result of one detached synthesis-and-playback task, delivered on the
/// controller's outcome channel.
///
/// Observers (the CLI, tests) can consume these without the outcome ever
/// feeding back into the translation cycle's own completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// The clip was synthesized and played to completion.
    Played,
    /// Synthesis or playback failed; the error was logged and swallowed.
    Failed(String),
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Current Unix time in milliseconds. `0` if the system clock is before the
/// epoch.
fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Drives utterance-translation cycles and maintains the running transcript
/// and cache.
pub struct SessionController {
    state: SharedState,
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn Synthesizer>,
    player: Arc<dyn AudioPlayer>,
    cache: TranslationCache,
    store: SessionStore,
    synthesis_task: Option<JoinHandle<()>>,
    synthesis_tx: mpsc::UnboundedSender<SynthesisOutcome>,
    synthesis_rx: Option<mpsc::UnboundedReceiver<SynthesisOutcome>>,
}

impl SessionController {
    /// Build a controller, restoring the persisted transcript, language
    /// preference and cache from `store`.
    ///
    /// Expired cache entries are purged before the cache is reinstated, so a
    /// reload never resurrects a stale translation.
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn Synthesizer>,
        player: Arc<dyn AudioPlayer>,
        store: SessionStore,
        default_target_language: &str,
    ) -> Self {
        let target_language = store
            .load_language()
            .unwrap_or_else(|| default_target_language.to_string());

        let mut cache = TranslationCache::from_entries(store.load_cache());
        cache.purge_expired(unix_millis());

        let state = new_shared_state(target_language);
        state.lock().unwrap().transcript = store.load_messages();

        let (synthesis_tx, synthesis_rx) = mpsc::unbounded_channel();

        Self {
            state,
            transcriber,
            translator,
            synthesizer,
            player,
            cache,
            store,
            synthesis_task: None,
            synthesis_tx,
            synthesis_rx: Some(synthesis_rx),
        }
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Drive one full cycle from an encoded audio payload.
    ///
    /// A transcription failure is recorded and stops the cycle before
    /// translation starts; it never reaches the translation collaborator.
    pub async fn run_cycle(&mut self, audio: &[u8], filename: &str) {
        if audio.is_empty() {
            log::warn!("cycle: empty audio payload, nothing to do");
            return;
        }

        {
            let mut st = self.state.lock().unwrap();
            st.cycle = CycleState::Transcribing;
            st.loading.transcription = true;
            st.processing = true;
            st.last_error = None;
        }

        let result = self.transcriber.transcribe(audio, filename).await;

        match result {
            Ok(transcription) => {
                self.state.lock().unwrap().loading.transcription = false;
                log::debug!("cycle: transcribed {:?}", transcription.text);
                self.handle_transcription(
                    &transcription.text,
                    transcription.detected_language.as_deref(),
                )
                .await;
            }
            Err(e) => {
                log::error!("transcription failed: {e}");
                let mut st = self.state.lock().unwrap();
                st.cycle = CycleState::Failed;
                st.last_error = Some(format!("Transcription failed: {e}"));
                st.loading.transcription = false;
                st.processing = false;
            }
        }
    }

    /// Accept recognised text and continue into translation with the current
    /// target-language preference.
    ///
    /// Empty text is a silent no-op — an explicit policy, not an error.
    /// The no-op still resolves the processing indicator, which `run_cycle`
    /// may have set before the recogniser came back empty.
    pub async fn handle_transcription(&mut self, text: &str, detected_language: Option<&str>) {
        if text.is_empty() {
            let mut st = self.state.lock().unwrap();
            st.processing = false;
            if st.cycle.is_busy() {
                st.cycle = CycleState::Idle;
            }
            return;
        }

        let target_language = {
            let mut st = self.state.lock().unwrap();
            st.transcript
                .push(ConversationMessage::source(text, detected_language));
            st.processing = true;
            st.last_error = None;
            st.target_language.clone()
        };
        self.persist_transcript();

        self.translate_text(text, &target_language).await;
    }

    /// Translate `text` into `target_language`, append the result to the
    /// transcript, and start synthesis as a detached continuation.
    ///
    /// The processing indicator is set on entry and cleared on every exit
    /// path. A cache hit within the TTL skips the network entirely and keeps
    /// the entry's original timestamp; only a fresh network result is
    /// stamped into the cache. On failure the user-visible alert is recorded,
    /// no transcript entry is appended, and nothing is retried.
    pub async fn translate_text(&mut self, text: &str, target_language: &str) {
        self.state.lock().unwrap().processing = true;

        if text.is_empty() {
            self.state.lock().unwrap().processing = false;
            return;
        }

        {
            let mut st = self.state.lock().unwrap();
            st.cycle = CycleState::Translating;
            st.loading.translation = true;
        }

        let now_ms = unix_millis();
        let cached = self.cache.get(text, target_language, now_ms).cloned();

        let (translated_text, detected_language, fresh) = match cached {
            Some(entry) => {
                log::debug!("translation: cache hit for → {target_language}");
                (entry.translated_text, entry.detected_language, false)
            }
            None => match self.translator.translate(text, target_language).await {
                Ok(t) => (
                    t.translated_text,
                    t.detected_language
                        .unwrap_or_else(|| UNKNOWN_LANGUAGE.into()),
                    true,
                ),
                Err(e) => {
                    log::error!("translation failed: {e}");
                    let mut st = self.state.lock().unwrap();
                    st.cycle = CycleState::Failed;
                    st.last_error = Some(TRANSLATION_FAILED_ALERT.into());
                    st.loading.translation = false;
                    st.processing = false;
                    return;
                }
            },
        };

        {
            let mut st = self.state.lock().unwrap();
            st.transcript.push(ConversationMessage::translated(
                &translated_text,
                &detected_language,
                target_language,
            ));
        }
        self.persist_transcript();

        if fresh {
            // Re-read the clock: `now_ms` predates the network round trip,
            // and a stamp from before the request would shave the latency
            // off the entry's validity window.
            self.cache.put(
                text,
                target_language,
                translated_text.clone(),
                detected_language,
                unix_millis(),
            );
            self.persist_cache();
        }

        self.play_translated_audio(&translated_text);

        let mut st = self.state.lock().unwrap();
        st.loading.translation = false;
        st.processing = false;
        if st.cycle == CycleState::Translating {
            // Synthesis was a no-op; the cycle is already complete.
            st.cycle = CycleState::Done;
        }
    }

    /// Start speech synthesis and playback for `text` on a detached task.
    ///
    /// Empty text is a no-op. Failures of the request, the decode or the
    /// playback are logged and swallowed — the translated text already
    /// satisfies the cycle's contract. A synthesis still in flight from the
    /// previous cycle is superseded (aborted) rather than left to race.
    ///
    /// Supersession is effective up to the hand-off to the output device:
    /// aborting cancels a pending request or decode, but a clip already
    /// inside the blocking playback call plays out — `abort` cannot
    /// interrupt `spawn_blocking`.
    pub fn play_translated_audio(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        if let Some(handle) = self.synthesis_task.take() {
            if !handle.is_finished() {
                log::debug!("synthesis: superseding in-flight playback");
                handle.abort();
                self.state.lock().unwrap().loading.synthesis = false;
            }
        }

        {
            let mut st = self.state.lock().unwrap();
            st.loading.synthesis = true;
            st.cycle = CycleState::Synthesizing;
        }

        let synthesizer = Arc::clone(&self.synthesizer);
        let player = Arc::clone(&self.player);
        let state = Arc::clone(&self.state);
        let events = self.synthesis_tx.clone();
        let text = text.to_string();

        self.synthesis_task = Some(tokio::spawn(async move {
            let result = synthesize_and_play(synthesizer, player, &text).await;

            match &result {
                Ok(()) => log::debug!("synthesis: playback finished"),
                Err(e) => log::warn!("synthesis failed (audio skipped): {e}"),
            }

            {
                let mut st = state.lock().unwrap();
                st.loading.synthesis = false;
                if st.cycle == CycleState::Synthesizing {
                    st.cycle = CycleState::Done;
                }
            }

            let outcome = match result {
                Ok(()) => SynthesisOutcome::Played,
                Err(e) => SynthesisOutcome::Failed(e),
            };
            let _ = events.send(outcome);
        }));
    }

    /// Select a new target language. Pure preference mutation — existing
    /// transcript entries are not retranslated.
    pub fn set_target_language(&mut self, code: &str) {
        if code.is_empty() {
            return;
        }
        if !lang::is_supported(code) {
            log::warn!("language: {code:?} is not in the supported table, sending it anyway");
        }

        self.state.lock().unwrap().target_language = code.to_string();

        if let Err(e) = self.store.save_language(code) {
            log::warn!("persistence: failed to save language preference: {e}");
        }
    }

    /// Empty the transcript and remove its persisted copy. The translation
    /// cache and the language preference are untouched.
    pub fn clear_conversation(&mut self) {
        self.state.lock().unwrap().transcript.clear();

        if let Err(e) = self.store.clear_messages() {
            log::warn!("persistence: failed to remove transcript: {e}");
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Shared handle to session state, for frontends that poll it.
    pub fn shared_state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Snapshot of the transcript.
    pub fn transcript(&self) -> Vec<ConversationMessage> {
        self.state.lock().unwrap().transcript.clone()
    }

    /// Currently selected target language.
    pub fn target_language(&self) -> String {
        self.state.lock().unwrap().target_language.clone()
    }

    /// User-visible error from the last failed cycle, if any.
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().unwrap().last_error.clone()
    }

    /// The translation cache (read-only).
    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Take the synthesis outcome receiver. Returns `None` after the first
    /// call; there is exactly one observer.
    pub fn take_synthesis_events(&mut self) -> Option<mpsc::UnboundedReceiver<SynthesisOutcome>> {
        self.synthesis_rx.take()
    }

    /// Wait for a still-running synthesis task to resolve. Used by the CLI
    /// before exiting so playback is not cut off.
    pub async fn wait_for_synthesis(&mut self) {
        if let Some(handle) = self.synthesis_task.take() {
            let _ = handle.await;
        }
    }

    // -----------------------------------------------------------------------
    // Persistence helpers (best-effort)
    // -----------------------------------------------------------------------

    fn persist_transcript(&self) {
        let messages = self.state.lock().unwrap().transcript.clone();
        if let Err(e) = self.store.save_messages(&messages) {
            log::warn!("persistence: failed to save transcript: {e}");
        }
    }

    fn persist_cache(&self) {
        if let Err(e) = self.store.save_cache(self.cache.entries()) {
            log::warn!("persistence: failed to save translation cache: {e}");
        }
    }
}

/// Request synthesis, then play the clip on the blocking thread pool.
async fn synthesize_and_play(
    synthesizer: Arc<dyn Synthesizer>,
    player: Arc<dyn AudioPlayer>,
    text: &str,
) -> Result<(), String> {
    let audio = synthesizer
        .synthesize(text)
        .await
        .map_err(|e| e.to_string())?;

    let join = tokio::task::spawn_blocking(move || player.play(&audio)).await;
    match join {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("playback task panicked: {e}")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;
    use tempfile::{tempdir, TempDir};

    use crate::audio::PlaybackError;
    use crate::cache::CACHE_TTL_MS;
    use crate::services::{ServiceError, Transcription, Translation};

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Translator that succeeds with a fixed result and counts calls.
    struct CountingTranslator {
        translated: String,
        detected: Option<String>,
        calls: AtomicUsize,
    }

    impl CountingTranslator {
        fn new(translated: &str, detected: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                translated: translated.into(),
                detected: detected.map(str::to_string),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Translator for CountingTranslator {
        async fn translate(
            &self,
            _text: &str,
            _target_language: &str,
        ) -> Result<Translation, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Translation {
                translated_text: self.translated.clone(),
                detected_language: self.detected.clone(),
            })
        }
    }

    /// Translator that always fails as if the service returned HTTP 500.
    struct FailTranslator;

    #[async_trait]
    impl Translator for FailTranslator {
        async fn translate(
            &self,
            _text: &str,
            _target_language: &str,
        ) -> Result<Translation, ServiceError> {
            Err(ServiceError::Status {
                status: 500,
                message: "internal error".into(),
            })
        }
    }

    /// Translator that waits before answering, like a slow gateway.
    struct SlowTranslator {
        delay_ms: u64,
    }

    #[async_trait]
    impl Translator for SlowTranslator {
        async fn translate(
            &self,
            _text: &str,
            _target_language: &str,
        ) -> Result<Translation, ServiceError> {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            Ok(Translation {
                translated_text: "Hallo".into(),
                detected_language: Some("en".into()),
            })
        }
    }

    /// Transcriber that succeeds with fixed text.
    struct OkTranscriber(String);

    #[async_trait]
    impl Transcriber for OkTranscriber {
        async fn transcribe(
            &self,
            _audio: &[u8],
            _filename: &str,
        ) -> Result<Transcription, ServiceError> {
            Ok(Transcription {
                text: self.0.clone(),
                detected_language: None,
            })
        }
    }

    /// Transcriber that always fails.
    struct FailTranscriber;

    #[async_trait]
    impl Transcriber for FailTranscriber {
        async fn transcribe(
            &self,
            _audio: &[u8],
            _filename: &str,
        ) -> Result<Transcription, ServiceError> {
            Err(ServiceError::Timeout)
        }
    }

    /// Synthesizer that returns a fixed payload.
    struct OkSynthesizer;

    #[async_trait]
    impl Synthesizer for OkSynthesizer {
        async fn synthesize(&self, _text: &str) -> Result<Bytes, ServiceError> {
            Ok(Bytes::from_static(b"audio-bytes"))
        }
    }

    /// Synthesizer that always fails.
    struct FailSynthesizer;

    #[async_trait]
    impl Synthesizer for FailSynthesizer {
        async fn synthesize(&self, _text: &str) -> Result<Bytes, ServiceError> {
            Err(ServiceError::Status {
                status: 500,
                message: "tts down".into(),
            })
        }
    }

    /// Player that accepts everything without touching a device.
    struct NullPlayer;

    impl AudioPlayer for NullPlayer {
        fn play(&self, _audio: &[u8]) -> Result<(), PlaybackError> {
            Ok(())
        }
    }

    /// Player that always fails to decode.
    struct FailPlayer;

    impl AudioPlayer for FailPlayer {
        fn play(&self, _audio: &[u8]) -> Result<(), PlaybackError> {
            Err(PlaybackError::Decode("bad header".into()))
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn make_controller(
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn Synthesizer>,
        player: Arc<dyn AudioPlayer>,
    ) -> (SessionController, TempDir) {
        let dir = tempdir().expect("temp dir");
        let store = SessionStore::open(dir.path().join("session"));
        let controller = SessionController::new(
            Arc::new(OkTranscriber("Hello".into())),
            translator,
            synthesizer,
            player,
            store,
            "de",
        );
        (controller, dir)
    }

    fn default_controller() -> (SessionController, TempDir) {
        make_controller(
            CountingTranslator::new("Hallo", Some("en")),
            Arc::new(OkSynthesizer),
            Arc::new(NullPlayer),
        )
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    /// The "Hello" → "Hallo" scenario: two transcript entries in pipeline
    /// order and a freshly stamped cache entry.
    #[tokio::test]
    async fn successful_cycle_appends_source_then_translation() {
        let (mut controller, _dir) = default_controller();

        controller.handle_transcription("Hello", Some("en")).await;
        controller.wait_for_synthesis().await;

        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0], ConversationMessage::source("Hello", Some("en")));
        assert_eq!(
            transcript[1],
            ConversationMessage::translated("Hallo", "en", "de")
        );

        let entry = controller
            .cache()
            .get("Hello", "de", unix_millis())
            .expect("cache entry stamped");
        assert_eq!(entry.translated_text, "Hallo");
        assert_eq!(entry.detected_language, "en");

        let st = controller.shared_state();
        let st = st.lock().unwrap();
        assert!(!st.processing);
        assert!(!st.loading.any());
        assert_eq!(st.cycle, CycleState::Done);
        assert!(st.last_error.is_none());
    }

    /// A second identical request within the TTL must not invoke the
    /// translation collaborator again.
    #[tokio::test]
    async fn repeat_translation_is_served_from_cache() {
        let translator = CountingTranslator::new("Hallo", Some("en"));
        let (mut controller, _dir) = make_controller(
            Arc::clone(&translator) as Arc<dyn Translator>,
            Arc::new(OkSynthesizer),
            Arc::new(NullPlayer),
        );

        controller.translate_text("Hello", "de").await;
        let stamped = controller
            .cache()
            .get("Hello", "de", unix_millis())
            .expect("entry stamped by the first call")
            .timestamp_ms;

        controller.translate_text("Hello", "de").await;
        controller.wait_for_synthesis().await;

        assert_eq!(translator.calls(), 1);

        // Both cycles produced identical translated entries.
        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0], transcript[1]);

        // A hit reuses the entry as-is; only fresh network results restamp.
        let entry = controller
            .cache()
            .get("Hello", "de", unix_millis())
            .expect("entry still present");
        assert_eq!(entry.timestamp_ms, stamped);
    }

    /// A different target language is a cache miss even for identical text.
    #[tokio::test]
    async fn different_target_language_misses_cache() {
        let translator = CountingTranslator::new("Hallo", Some("en"));
        let (mut controller, _dir) = make_controller(
            Arc::clone(&translator) as Arc<dyn Translator>,
            Arc::new(OkSynthesizer),
            Arc::new(NullPlayer),
        );

        controller.translate_text("Hello", "de").await;
        controller.translate_text("Hello", "fr").await;
        controller.wait_for_synthesis().await;

        assert_eq!(translator.calls(), 2);
    }

    /// Empty inputs leave the transcript and cache unchanged.
    #[tokio::test]
    async fn empty_inputs_are_silent_no_ops() {
        let (mut controller, _dir) = default_controller();

        controller.handle_transcription("", Some("en")).await;
        controller.translate_text("", "de").await;

        assert!(controller.transcript().is_empty());
        assert!(controller.cache().is_empty());
        assert!(!controller.shared_state().lock().unwrap().processing);
    }

    /// A recogniser that comes back with empty text must still resolve the
    /// processing indicator `run_cycle` set before it ran.
    #[tokio::test]
    async fn empty_transcription_resolves_processing_indicator() {
        let dir = tempdir().expect("temp dir");
        let store = SessionStore::open(dir.path().join("session"));
        let mut controller = SessionController::new(
            Arc::new(OkTranscriber(String::new())),
            CountingTranslator::new("Hallo", Some("en")),
            Arc::new(OkSynthesizer),
            Arc::new(NullPlayer),
            store,
            "de",
        );

        controller.run_cycle(b"fake-wav-bytes", "clip.wav").await;

        assert!(controller.transcript().is_empty());
        let st = controller.shared_state();
        let st = st.lock().unwrap();
        assert!(!st.processing);
        assert!(!st.loading.any());
        assert_eq!(st.cycle, CycleState::Idle);
    }

    /// A fresh cache entry is stamped after the network round trip, so a
    /// slow gateway does not eat into the entry's validity window.
    #[tokio::test]
    async fn fresh_entry_is_stamped_after_the_round_trip() {
        let (mut controller, _dir) = make_controller(
            Arc::new(SlowTranslator { delay_ms: 30 }),
            Arc::new(OkSynthesizer),
            Arc::new(NullPlayer),
        );

        let before = unix_millis();
        controller.translate_text("Hello", "de").await;
        controller.wait_for_synthesis().await;

        let entry = controller
            .cache()
            .get("Hello", "de", unix_millis())
            .expect("entry stamped");
        // sleep guarantees at least delay_ms elapsed before the stamp.
        assert!(entry.timestamp_ms >= before + 30);
    }

    /// A translation failure records the alert, appends nothing beyond the
    /// source entry, and resolves the in-flight indicator.
    #[tokio::test]
    async fn translation_failure_is_terminal_for_the_cycle() {
        let (mut controller, _dir) = make_controller(
            Arc::new(FailTranslator),
            Arc::new(OkSynthesizer),
            Arc::new(NullPlayer),
        );

        controller.handle_transcription("Hello", Some("en")).await;

        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 1);
        assert!(!transcript[0].is_translated);

        assert_eq!(
            controller.last_error().as_deref(),
            Some(TRANSLATION_FAILED_ALERT)
        );

        let st = controller.shared_state();
        let st = st.lock().unwrap();
        assert!(!st.processing);
        assert!(!st.loading.translation);
        assert_eq!(st.cycle, CycleState::Failed);
    }

    /// A synthesis failure after a successful translation keeps both
    /// transcript entries, raises no alert, and only resolves the
    /// synthesis-specific indicator.
    #[tokio::test]
    async fn synthesis_failure_is_swallowed() {
        let (mut controller, _dir) = make_controller(
            CountingTranslator::new("Hallo", Some("en")),
            Arc::new(FailSynthesizer),
            Arc::new(NullPlayer),
        );
        let mut events = controller.take_synthesis_events().expect("observer");

        controller.handle_transcription("Hello", Some("en")).await;
        controller.wait_for_synthesis().await;

        assert_eq!(controller.transcript().len(), 2);
        assert!(controller.last_error().is_none());

        match events.recv().await {
            Some(SynthesisOutcome::Failed(_)) => {}
            other => panic!("expected a Failed outcome, got {other:?}"),
        }

        assert!(!controller.shared_state().lock().unwrap().loading.synthesis);
    }

    /// A playback (decode) failure is also swallowed and reported only on
    /// the outcome channel.
    #[tokio::test]
    async fn playback_failure_is_swallowed() {
        let (mut controller, _dir) = make_controller(
            CountingTranslator::new("Hallo", Some("en")),
            Arc::new(OkSynthesizer),
            Arc::new(FailPlayer),
        );
        let mut events = controller.take_synthesis_events().expect("observer");

        controller.handle_transcription("Hello", None).await;
        controller.wait_for_synthesis().await;

        assert_eq!(controller.transcript().len(), 2);
        assert!(controller.last_error().is_none());
        assert!(matches!(
            events.recv().await,
            Some(SynthesisOutcome::Failed(_))
        ));
    }

    /// A successful playback reports `Played` on the outcome channel.
    #[tokio::test]
    async fn playback_success_reports_played() {
        let (mut controller, _dir) = default_controller();
        let mut events = controller.take_synthesis_events().expect("observer");

        controller.translate_text("Hello", "de").await;
        controller.wait_for_synthesis().await;

        assert_eq!(events.recv().await, Some(SynthesisOutcome::Played));
    }

    /// When the service omits the detection, the translated entry carries
    /// `"unknown"`.
    #[tokio::test]
    async fn missing_detection_falls_back_to_unknown() {
        let (mut controller, _dir) = make_controller(
            CountingTranslator::new("Hallo", None),
            Arc::new(OkSynthesizer),
            Arc::new(NullPlayer),
        );

        controller.translate_text("Hello", "de").await;
        controller.wait_for_synthesis().await;

        let transcript = controller.transcript();
        assert_eq!(transcript[0].detected_language.as_deref(), Some("unknown"));
    }

    /// `clear_conversation` empties the transcript and removes its persisted
    /// copy, leaving cache and language preference alone.
    #[tokio::test]
    async fn clear_conversation_keeps_cache_and_language() {
        let (mut controller, dir) = default_controller();

        controller.set_target_language("ja");
        controller.handle_transcription("Hello", Some("en")).await;
        controller.wait_for_synthesis().await;
        assert_eq!(controller.transcript().len(), 2);

        controller.clear_conversation();

        assert!(controller.transcript().is_empty());
        let store = SessionStore::open(dir.path().join("session"));
        assert!(!store.has_messages());
        assert!(!store.load_cache().is_empty());
        assert_eq!(store.load_language().as_deref(), Some("ja"));
        assert!(!controller.cache().is_empty());
        assert_eq!(controller.target_language(), "ja");
    }

    /// Changing the target language does not retranslate earlier entries.
    #[tokio::test]
    async fn set_target_language_does_not_retranslate() {
        let translator = CountingTranslator::new("Hallo", Some("en"));
        let (mut controller, _dir) = make_controller(
            Arc::clone(&translator) as Arc<dyn Translator>,
            Arc::new(OkSynthesizer),
            Arc::new(NullPlayer),
        );

        controller.handle_transcription("Hello", Some("en")).await;
        controller.wait_for_synthesis().await;
        let before = translator.calls();

        controller.set_target_language("fr");

        assert_eq!(translator.calls(), before);
        assert_eq!(controller.target_language(), "fr");
        assert_eq!(controller.transcript().len(), 2);
    }

    /// `run_cycle` drives the full pipeline from an audio payload.
    #[tokio::test]
    async fn run_cycle_from_audio_reaches_done() {
        let (mut controller, _dir) = default_controller();

        controller.run_cycle(b"fake-wav-bytes", "clip.wav").await;
        controller.wait_for_synthesis().await;

        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].text, "Hello");
        assert_eq!(transcript[1].text, "Hallo");
        assert_eq!(
            controller.shared_state().lock().unwrap().cycle,
            CycleState::Done
        );
    }

    /// A transcription failure stops the cycle before translation starts.
    #[tokio::test]
    async fn transcription_failure_stops_before_translation() {
        let dir = tempdir().expect("temp dir");
        let store = SessionStore::open(dir.path().join("session"));
        let translator = CountingTranslator::new("Hallo", Some("en"));
        let mut controller = SessionController::new(
            Arc::new(FailTranscriber),
            Arc::clone(&translator) as Arc<dyn Translator>,
            Arc::new(OkSynthesizer),
            Arc::new(NullPlayer),
            store,
            "de",
        );

        controller.run_cycle(b"fake-wav-bytes", "clip.wav").await;

        assert_eq!(translator.calls(), 0);
        assert!(controller.transcript().is_empty());
        assert!(controller.last_error().is_some());
        let st = controller.shared_state();
        let st = st.lock().unwrap();
        assert_eq!(st.cycle, CycleState::Failed);
        assert!(!st.processing);
        assert!(!st.loading.transcription);
    }

    /// An empty audio payload is a no-op.
    #[tokio::test]
    async fn empty_audio_is_a_no_op() {
        let (mut controller, _dir) = default_controller();
        controller.run_cycle(b"", "clip.wav").await;
        assert!(controller.transcript().is_empty());
        assert_eq!(
            controller.shared_state().lock().unwrap().cycle,
            CycleState::Idle
        );
    }

    /// Transcript, language and cache survive a controller restart on the
    /// same store, and restored cache entries keep serving hits.
    #[tokio::test]
    async fn session_state_survives_restart() {
        let dir = tempdir().expect("temp dir");
        let store = SessionStore::open(dir.path().join("session"));

        {
            let translator = CountingTranslator::new("Hallo", Some("en"));
            let mut controller = SessionController::new(
                Arc::new(OkTranscriber("Hello".into())),
                translator,
                Arc::new(OkSynthesizer),
                Arc::new(NullPlayer),
                store.clone(),
                "de",
            );
            controller.set_target_language("de");
            controller.handle_transcription("Hello", Some("en")).await;
            controller.wait_for_synthesis().await;
        }

        let translator = CountingTranslator::new("should not be called", None);
        let mut controller = SessionController::new(
            Arc::new(OkTranscriber("Hello".into())),
            Arc::clone(&translator) as Arc<dyn Translator>,
            Arc::new(OkSynthesizer),
            Arc::new(NullPlayer),
            store,
            "de",
        );

        assert_eq!(controller.transcript().len(), 2);

        // Cache hit without a network call.
        controller.translate_text("Hello", "de").await;
        controller.wait_for_synthesis().await;
        assert_eq!(translator.calls(), 0);
        assert_eq!(controller.transcript()[2].text, "Hallo");
    }

    /// Expired cache entries are filtered out when the cache is reloaded.
    #[tokio::test]
    async fn expired_entries_do_not_survive_reload() {
        let dir = tempdir().expect("temp dir");
        let store = SessionStore::open(dir.path().join("session"));

        let stale = unix_millis().saturating_sub(CACHE_TTL_MS + 1_000);
        let mut entries = std::collections::HashMap::new();
        entries.insert(
            "Hello_de".to_string(),
            crate::cache::CacheEntry {
                translated_text: "Hallo".into(),
                detected_language: "en".into(),
                timestamp_ms: stale,
            },
        );
        store.save_cache(&entries).expect("seed cache");

        let controller = SessionController::new(
            Arc::new(OkTranscriber("Hello".into())),
            CountingTranslator::new("Hallo", Some("en")),
            Arc::new(OkSynthesizer),
            Arc::new(NullPlayer),
            store,
            "de",
        );

        assert!(controller.cache().is_empty());
    }
}
