//! Classroom relay CLI
//!
//! Runs single utterances through the speech pipeline and maintains the TTS
//! audio cache.

#![allow(clippy::print_stdout)]

use std::path::{Path, PathBuf};

use ai_speech::AudioFormat;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use domain::TtsOptions;
use infrastructure::{AppConfig, build_pipeline, init_telemetry};

/// Classroom relay CLI
#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(author, version, about = "Classroom speech relay CLI", long_about = None)]
struct Cli {
    /// Verbosity level (overrides the configured log filter)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ./config.toml if present)
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one utterance through STT, translation and TTS
    ///
    /// Example: relay-cli process --text "Bonjour à tous" --from fr --to en
    /// Example: relay-cli process --audio question.webm --from es --to en --tts cloud --out answer.mp3
    Process {
        /// Already transcribed text (skips speech-to-text)
        #[arg(long, conflicts_with = "audio", required_unless_present = "audio")]
        text: Option<String>,

        /// Audio file to transcribe
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Source language (e.g. "fr", "pt-BR")
        #[arg(long)]
        from: String,

        /// Target language
        #[arg(long)]
        to: String,

        /// Synthesis strategy: browser, cloud or silent
        #[arg(long, default_value = "browser")]
        tts: String,

        /// Voice for cloud synthesis
        #[arg(long)]
        voice: Option<String>,

        /// Speech speed (0.25 - 4.0)
        #[arg(long)]
        speed: Option<f32>,

        /// Adapt voice and speed to the tone of the text
        #[arg(long)]
        emotions: bool,

        /// Write synthesized audio to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Remove expired entries from the TTS audio cache
    CacheSweep,

    /// Validate configuration and show the assembled providers
    CheckConfig,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Container format of an audio file, by extension
fn audio_format_for(path: &Path) -> Option<AudioFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(AudioFormat::from_extension)
}

fn tts_options(
    service_type: String,
    voice: Option<String>,
    speed: Option<f32>,
    emotions: bool,
) -> TtsOptions {
    TtsOptions {
        service_type,
        voice,
        speed,
        preserve_emotions: emotions,
    }
}

#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        AppConfig::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(filter) = log_filter_from_verbosity(cli.verbose) {
        filter.clone_into(&mut config.telemetry.log_filter);
    }
    init_telemetry(&config.telemetry)?;

    let mut pipeline = build_pipeline(&config)
        .await
        .context("Failed to assemble pipeline")?;
    let sweep_task = pipeline.sweep_task.take();

    match cli.command {
        Commands::Process {
            text,
            audio,
            from,
            to,
            tts,
            voice,
            speed,
            emotions,
            out,
        } => {
            let options = tts_options(tts, voice, speed, emotions);

            let (bytes, orchestrator) = match &audio {
                Some(path) => {
                    let bytes = tokio::fs::read(path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    let format = audio_format_for(path).unwrap_or(config.speech.input_format);
                    (bytes, pipeline.orchestrator.with_input_format(format))
                },
                None => (Vec::new(), pipeline.orchestrator),
            };

            let result = orchestrator
                .process_parts(bytes, &from, &to, text.as_deref(), &options)
                .await
                .map_err(|e| anyhow::anyhow!("{} ({})", e, e.failed_state()))?;

            println!("📝 Original:   {}", result.original_text);
            println!("🌍 Translated: {}", result.translated_text);
            println!(
                "🔊 Audio:      {} bytes ({})",
                result.audio.len(),
                result.tts_service_type
            );
            println!("⏱️  Latency:    {}ms", result.latency_ms);

            if let Some(out) = out {
                if result.audio.is_empty() {
                    println!("⚠️  No audio produced, {} not written", out.display());
                } else {
                    tokio::fs::write(&out, &result.audio)
                        .await
                        .with_context(|| format!("Failed to write {}", out.display()))?;
                    println!("💾 Saved to {}", out.display());
                }
            }
        },

        Commands::CacheSweep => {
            let Some(cache) = pipeline.cache else {
                bail!("TTS cache is disabled");
            };
            let removed = cache
                .sweep_expired()
                .await
                .context("Failed to sweep TTS cache")?;
            let noun = if removed == 1 { "entry" } else { "entries" };
            println!("🧹 Removed {removed} expired cache {noun}");
        },

        Commands::CheckConfig => {
            let orchestrator = &pipeline.orchestrator;
            println!("✅ Configuration valid");
            println!(
                "   STT:         {}",
                orchestrator.stt().chain().provider_names().join(" → ")
            );
            println!(
                "   Translation: {}",
                orchestrator.translation().chain().provider_names().join(" → ")
            );
            println!("   TTS cache:   {}", config.tts_cache.backend);
            if config.tts_cache.backend == infrastructure::CacheBackend::File {
                println!("   Cache dir:   {}", config.tts_cache.resolved_dir().display());
            }
        },
    }

    if let Some(task) = sweep_task {
        task.abort();
    }
    Ok(())
}
