//! Command-line entry point for the speech translator.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Build the three collaborator clients and the audio player.
//! 4. Restore the session (transcript, language preference, cache) and
//!    construct the [`SessionController`].
//! 5. Dispatch the subcommand; wait for any in-flight synthesis before exit
//!    so playback is not cut off.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use speech_translator::{
    audio::RodioPlayer,
    config::AppConfig,
    lang,
    services::{ApiSynthesizer, ApiTranscriber, ApiTranslator},
    session::SessionController,
    store::SessionStore,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "speech-translator")]
#[command(about = "Speech-to-speech translator: transcribe, translate, speak")]
struct Cli {
    /// Path to an alternative settings.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a recorded utterance from an audio file and speak the result.
    Speak {
        /// Audio file (WAV/MP3/WebM — whatever the transcription service accepts).
        file: PathBuf,
        /// Target language code; switches the persisted preference.
        #[arg(long)]
        to: Option<String>,
    },

    /// Translate text directly (skips the transcription step) and speak it.
    Translate {
        text: String,
        /// Target language code; switches the persisted preference.
        #[arg(long)]
        to: Option<String>,
    },

    /// Select and persist the target language.
    SetLanguage { code: String },

    /// List the supported target languages.
    Languages,

    /// Print the conversation transcript.
    History,

    /// Clear the conversation transcript (cache and language are kept).
    Clear,
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("failed to load config ({e}); using defaults");
            AppConfig::default()
        }),
    };

    let mut controller = SessionController::new(
        Arc::new(ApiTranscriber::from_config(&config.transcription)),
        Arc::new(ApiTranslator::from_config(&config.translation)),
        Arc::new(ApiSynthesizer::from_config(&config.synthesis)),
        Arc::new(RodioPlayer::new()),
        SessionStore::open_default(),
        &config.translation.default_target_language,
    );

    match cli.command {
        Command::Speak { file, to } => {
            if let Some(code) = to {
                controller.set_target_language(&code);
            }
            let audio = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let filename = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("recording.wav")
                .to_string();

            controller.run_cycle(&audio, &filename).await;
            finish_cycle(&mut controller).await?;
        }

        Command::Translate { text, to } => {
            if let Some(code) = to {
                controller.set_target_language(&code);
            }
            controller.handle_transcription(&text, None).await;
            finish_cycle(&mut controller).await?;
        }

        Command::SetLanguage { code } => {
            controller.set_target_language(&code);
            println!("Target language set to {code}");
        }

        Command::Languages => {
            let current = controller.target_language();
            for l in lang::SUPPORTED_LANGUAGES {
                let marker = if l.code == current { "*" } else { " " };
                println!("{marker} {:4} {}", l.code, l.name);
            }
        }

        Command::History => {
            for msg in controller.transcript() {
                let direction = if msg.is_translated {
                    format!(
                        "→ {}",
                        msg.target_language.as_deref().unwrap_or("?")
                    )
                } else {
                    format!(
                        "· {}",
                        msg.detected_language.as_deref().unwrap_or("unknown")
                    )
                };
                println!("{direction:12} {}", msg.text);
            }
        }

        Command::Clear => {
            controller.clear_conversation();
            println!("Conversation cleared");
        }
    }

    Ok(())
}

/// Print the cycle's result, wait for playback, and fail the process when
/// the cycle recorded a user-visible error.
async fn finish_cycle(controller: &mut SessionController) -> Result<()> {
    if let Some(error) = controller.last_error() {
        bail!("{error}");
    }

    let transcript = controller.transcript();
    if let [.., source, translated] = transcript.as_slice() {
        println!("{}", source.text);
        println!(
            "→ [{}] {}",
            translated.target_language.as_deref().unwrap_or("?"),
            translated.text
        );
    }

    controller.wait_for_synthesis().await;
    Ok(())
}
