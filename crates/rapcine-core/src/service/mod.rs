//! Generative score service
//!
//! The score service is an external collaborator: it analyzes the uploaded
//! performance and generates an instrumental beat for it. Each call is a
//! single attempt with no retry.

mod gemini;
pub mod prompt;

pub use gemini::{GeminiClient, GenerateContentResponse};

use crate::{
    types::{AnalysisResult, ScoreResult},
    Result,
};
use async_trait::async_trait;

/// Trait for score services
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ScoreService {
    /// Analyze a performance video
    async fn analyze(&self, video: &[u8], mime_type: &str) -> Result<AnalysisResult>;

    /// Generate a beat for an analysis, returning base64 PCM
    async fn generate_beat(&self, analysis: &AnalysisResult) -> Result<String>;

    /// Analyze, then generate the matching beat
    async fn score(&self, video: &[u8], mime_type: &str) -> Result<ScoreResult> {
        let analysis = self.analyze(video, mime_type).await?;
        analysis.validate()?;
        let beat_payload = self.generate_beat(&analysis).await?;
        Ok(ScoreResult {
            analysis,
            beat_payload,
        })
    }
}
