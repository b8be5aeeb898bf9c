//! CLI command implementations

use crate::output::{self, BeatStats, OutputFormat};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use rapcine_core::{
    decode, service::prompt as prompts, AnalysisResult, GeminiClient, ScoreService, ServiceConfig,
};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[derive(Serialize)]
struct AnalyzeReport<'a> {
    analysis: &'a AnalysisResult,
    beat: BeatStats,
}

/// Decode a payload file and print its levels
pub fn inspect(path: &Path, sample_rate: u32, format: &str) -> anyhow::Result<()> {
    let payload = std::fs::read_to_string(path)
        .with_context(|| format!("reading payload {}", path.display()))?;
    let buffer = decode(&payload, sample_rate)?;
    let stats = BeatStats::from(&buffer);

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&stats)),
        OutputFormat::Text => {
            println!("Beat payload: {}", path.display());
            println!("{}", output::stats_table(&stats));
        }
    }
    Ok(())
}

/// Run the score service against a local video
pub async fn analyze(path: &Path, mime: Option<String>, format: &str) -> anyhow::Result<()> {
    let video = std::fs::read(path).with_context(|| format!("reading video {}", path.display()))?;
    let mime_type = mime.unwrap_or_else(|| guess_mime(path).to_string());

    let client = GeminiClient::new(ServiceConfig::from_env())
        .context("set GEMINI_API_KEY to call the score service")?;
    let sample_rate = client.config().beat_sample_rate;

    info!(bytes = video.len(), mime = %mime_type, "Uploading performance");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")?);
    spinner.set_message("Scoring performance...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = client.score(&video, &mime_type).await;
    spinner.finish_and_clear();
    let result = result?;

    let buffer = decode(&result.beat_payload, sample_rate)?;
    let report = AnalyzeReport {
        analysis: &result.analysis,
        beat: BeatStats::from(&buffer),
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&report)),
        OutputFormat::Text => {
            println!("{}\n", output::analysis_text(report.analysis));
            println!("{}", output::stats_table(&report.beat));
        }
    }
    Ok(())
}

/// Print the beat prompt for an analysis given on the command line
pub fn prompt(mood: String, bpm: f64, layers: Vec<String>, duration: u32) -> anyhow::Result<()> {
    let analysis = AnalysisResult {
        mood,
        bpm,
        intensity: 0.0,
        layers,
        report: String::new(),
    };
    analysis.validate()?;
    println!("{}", prompts::beat_prompt(&analysis, duration));
    Ok(())
}

fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        _ => "video/mp4",
    }
}
