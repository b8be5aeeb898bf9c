//! Output formatting for CLI

use rapcine_core::{AnalysisResult, NormalizedAudioBuffer};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Level statistics of a decoded beat
#[derive(Debug, Serialize)]
pub struct BeatStats {
    pub samples: usize,
    pub sample_rate: u32,
    pub duration_secs: f64,
    pub peak: f32,
    pub rms: f32,
}

impl From<&NormalizedAudioBuffer> for BeatStats {
    fn from(buffer: &NormalizedAudioBuffer) -> Self {
        Self {
            samples: buffer.len(),
            sample_rate: buffer.sample_rate(),
            duration_secs: buffer.duration_secs(),
            peak: buffer.peak(),
            rms: buffer.rms(),
        }
    }
}

#[derive(Tabled)]
struct Row {
    metric: &'static str,
    value: String,
}

/// Render beat statistics as a table
pub fn stats_table(stats: &BeatStats) -> String {
    let rows = vec![
        Row { metric: "Samples", value: stats.samples.to_string() },
        Row { metric: "Sample rate", value: format!("{} Hz", stats.sample_rate) },
        Row { metric: "Loop length", value: format!("{:.2} s", stats.duration_secs) },
        Row { metric: "Peak", value: format!("{:.4}", stats.peak) },
        Row { metric: "RMS", value: format!("{:.4}", stats.rms) },
    ];
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Render an analysis for the terminal
pub fn analysis_text(analysis: &AnalysisResult) -> String {
    let mut out = format!(
        "Mood:      {}\nBPM:       {}\nIntensity: {:.2}\nLayers:\n",
        analysis.mood, analysis.bpm, analysis.intensity
    );
    for (i, layer) in analysis.layers.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, layer));
    }
    out.push_str(&format!("Report:    \"{}\"", analysis.report));
    out
}

/// Pretty JSON for machine consumption
pub fn to_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}
