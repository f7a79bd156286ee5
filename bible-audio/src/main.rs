//! bible-audio - Narrate scripture chapters from markdown into per-chapter MP3 files

mod config;
mod discovery;
mod generator;
mod text;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{BibleAudioConfig, ContentPaths, Overrides, RunSettings};
use discovery::{ChapterFilter, count_by_book_dir, filter_chapters};
use generator::{GenerationSummary, Generator};
use std::path::PathBuf;
use tts_client::{AzureSettings, AzureSynthesizer, SpeechSynthesizer, VoiceInfo, english_voices};

#[derive(Parser, Debug)]
#[command(name = "bible-audio")]
#[command(about = "Generate narrated audio for scripture chapters using Azure text-to-speech", long_about = None)]
#[command(version)]
struct Args {
    /// Content root containing bibles/, data/ and audio/
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Azure subscription key (overrides AZURE_TTS_KEY)
    #[arg(long)]
    key: Option<String>,

    /// Azure region (overrides AZURE_TTS_REGION)
    #[arg(long)]
    region: Option<String>,

    /// List available English voices and exit
    #[arg(long)]
    list_voices: bool,

    /// Voice short name (default from config: en-US-JennyNeural)
    #[arg(long, value_name = "NAME")]
    voice: Option<String>,

    /// Prosody rate multiplier (default from config: 0.9)
    #[arg(long)]
    rate: Option<f32>,

    /// Only generate chapters of this book
    #[arg(long, value_name = "NAME")]
    book: Option<String>,

    /// Only generate this chapter (requires --book)
    #[arg(long, value_name = "NUM", requires = "book")]
    chapter: Option<u32>,

    /// Show what would be generated without calling the speech service
    #[arg(long)]
    dry_run: bool,

    /// Regenerate audio that already exists
    #[arg(long)]
    force: bool,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice
    SetVoice {
        /// Voice short name, e.g. en-US-GuyNeural
        name: String,
    },
    /// Set default speech rate
    SetRate {
        /// Value (0.5-2.0)
        value: f32,
    },
    /// Set default region
    SetRegion {
        /// Azure region, e.g. westeurope
        region: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();
    init_logging(args.debug);

    match dotenv {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) => log::debug!("No .env loaded: {}", e),
    }

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let config = BibleAudioConfig::load().context("Failed to load configuration")?;
    let settings = RunSettings::resolve(
        &config,
        &Overrides {
            voice: args.voice.clone(),
            speech_rate: args.rate,
            region: args.region.clone(),
            subscription_key: args.key.clone(),
        },
    );
    log::debug!(
        "Settings: voice={}, rate={}, region={}, key={}",
        settings.voice,
        settings.speech_rate,
        settings.region,
        if settings.subscription_key.is_some() { "set" } else { "missing" }
    );

    if args.list_voices {
        let synthesizer = create_synthesizer(&settings)?;
        return list_voices(&synthesizer).await;
    }

    let paths = ContentPaths::new(&args.root);
    let summary = generate(&args, &settings, &paths).await?;

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder
            .filter_module("bible_audio", log::LevelFilter::Debug)
            .filter_module("tts_client", log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn create_synthesizer(settings: &RunSettings) -> Result<AzureSynthesizer> {
    let azure = AzureSettings::new(
        settings.subscription_key.clone().unwrap_or_default(),
        &settings.region,
    )
    .with_output_format(&settings.output_format);
    Ok(AzureSynthesizer::new(azure)?)
}

async fn list_voices(synthesizer: &dyn SpeechSynthesizer) -> Result<()> {
    let voices = synthesizer
        .list_voices()
        .await
        .context("Failed to fetch voice list")?;
    let voices = english_voices(voices);

    println!("\nAvailable English voices:\n");
    print_voice_table(&voices);
    println!("\nTotal: {} English voices", voices.len());
    Ok(())
}

fn print_voice_table(voices: &[VoiceInfo]) {
    println!("{:<40} {:<10} {:<10} Type", "Name", "Gender", "Locale");
    println!("{}", "-".repeat(75));
    for voice in voices {
        println!(
            "{:<40} {:<10} {:<10} {}",
            voice.short_name,
            voice.gender,
            voice.locale,
            voice.voice_type.as_deref().unwrap_or("")
        );
    }
}

async fn generate(
    args: &Args,
    settings: &RunSettings,
    paths: &ContentPaths,
) -> Result<GenerationSummary> {
    // Credentials are checked before any content is touched
    let synthesizer = if args.dry_run {
        None
    } else {
        Some(create_synthesizer(settings)?)
    };

    let manifest = discovery::load_manifest(&paths.manifest_path)?;

    let all = discovery::discover(manifest.as_ref(), paths);
    if all.is_empty() {
        anyhow::bail!("No chapters found under {}", paths.root.display());
    }

    let filter = ChapterFilter {
        book: args.book.clone(),
        chapter: args.chapter,
        skip_existing: !args.force,
    };
    let chapters = filter_chapters(&all, &filter);
    let matching = filter_chapters(
        &all,
        &ChapterFilter {
            skip_existing: false,
            ..filter.clone()
        },
    )
    .len();

    if chapters.is_empty() {
        if matching == 0 {
            eprintln!("No matching chapters found.");
        } else {
            eprintln!("All audio files already exist. Use --force to regenerate.");
        }
        return Ok(GenerationSummary::default());
    }

    let books = count_by_book_dir(&chapters);
    eprintln!(
        "Found {} chapters to process across {} books",
        chapters.len(),
        books.len()
    );
    if matching > chapters.len() {
        eprintln!(
            "({} chapters skipped - audio already exists)",
            matching - chapters.len()
        );
    }
    for (book_dir, count) in &books {
        log::debug!("  {}: {} chapters", book_dir, count);
    }
    eprintln!("Using voice: {}", settings.voice);
    eprintln!("Output directory: {}", paths.audio_dir.display());

    let generator = match &synthesizer {
        Some(synthesizer) => {
            log::debug!("Synthesizing with {}", synthesizer.name());
            Generator::new(settings, paths, synthesizer)
        }
        None => {
            eprintln!("\nDry run - no files will be created:\n");
            Generator::dry_run(settings, paths)
        }
    };

    let summary = generator.run(&chapters).await;
    if synthesizer.is_some() {
        print_summary(&summary);
    }
    Ok(summary)
}

fn print_summary(summary: &GenerationSummary) {
    eprintln!();
    eprintln!("{}", "=".repeat(50));
    eprintln!("Generation complete!");
    eprintln!("  Success: {}", summary.succeeded);
    eprintln!("  Failures: {}", summary.failed);
    if summary.empty > 0 {
        eprintln!("  No verses: {}", summary.empty);
    }
    eprintln!("{}", "=".repeat(50));
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = BibleAudioConfig::load()?;
            println!("Configuration file: {:?}", BibleAudioConfig::config_path()?);
            println!();
            println!("voice = \"{}\"", config.voice);
            println!("speech_rate = {}", config.speech_rate);
            println!("region = \"{}\"", config.region);
            println!("output_format = \"{}\"", config.output_format);
            if config.subscription_key.is_some() {
                println!("subscription_key = (set)");
            } else {
                println!("subscription_key = (none)");
            }
        }
        ConfigAction::SetVoice { name } => {
            let mut config = BibleAudioConfig::load()?;
            config.voice = name.clone();
            config.save()?;
            println!("Default voice set to: {}", config.voice);
        }
        ConfigAction::SetRate { value } => {
            let mut config = BibleAudioConfig::load()?;
            config.set_speech_rate(*value);
            config.save()?;
            println!("Default speech rate set to: {}", config.speech_rate);
        }
        ConfigAction::SetRegion { region } => {
            let mut config = BibleAudioConfig::load()?;
            config.region = region.clone();
            config.save()?;
            println!("Default region set to: {}", config.region);
        }
    }
    Ok(())
}
