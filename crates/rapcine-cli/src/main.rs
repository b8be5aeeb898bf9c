//! RapCine CLI - Headless tooling for the beat studio
//!
//! Features:
//! - Beat payload inspection (decode + levels)
//! - Score service round trip against a local video
//! - Beat prompt preview

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

/// RapCine CLI - Beat studio toolkit
#[derive(Parser)]
#[command(name = "rapcine")]
#[command(version)]
#[command(about = "Score service and beat payload toolkit", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a base64 PCM beat payload and report its levels
    Inspect {
        /// File containing the base64 payload
        payload: PathBuf,

        /// Sample rate of the payload
        #[arg(short, long, default_value_t = rapcine_core::SERVICE_SAMPLE_RATE)]
        sample_rate: u32,
    },

    /// Analyze a performance video and generate its beat
    Analyze {
        /// Input video file
        input: PathBuf,

        /// MIME type of the video (guessed from the extension if omitted)
        #[arg(short, long)]
        mime: Option<String>,
    },

    /// Print the beat prompt for a given analysis
    Prompt {
        /// Mood of the performance
        #[arg(long)]
        mood: String,

        /// Tempo
        #[arg(long)]
        bpm: f64,

        /// Instrument layer (repeatable)
        #[arg(short, long = "layer")]
        layers: Vec<String>,

        /// Beat length in seconds
        #[arg(short, long, default_value = "20")]
        duration: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    rapcine_core::init();

    match cli.command {
        Commands::Inspect { payload, sample_rate } => {
            commands::inspect(&payload, sample_rate, &cli.format)?;
        }
        Commands::Analyze { input, mime } => {
            commands::analyze(&input, mime, &cli.format).await?;
        }
        Commands::Prompt { mood, bpm, layers, duration } => {
            commands::prompt(mood, bpm, layers, duration)?;
        }
    }

    Ok(())
}
