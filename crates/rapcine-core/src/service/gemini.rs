//! Gemini `generateContent` client

use super::{prompt, ScoreService};
use crate::{config::ServiceConfig, types::AnalysisResult, Error, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

/// Response envelope of `models/{model}:generateContent`
#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|content| content.parts.iter())
    }

    /// First text part of the first candidate
    pub fn text(&self) -> Option<&str> {
        self.parts().find_map(|p| p.text.as_deref())
    }

    /// First inline data payload of the first candidate
    pub fn inline_data(&self) -> Option<&str> {
        self.parts()
            .find_map(|p| p.inline_data.as_ref())
            .map(|d| d.data.as_str())
    }

    /// Parse the JSON analysis returned as text
    pub fn analysis(&self) -> Result<AnalysisResult> {
        let text = self
            .text()
            .ok_or_else(|| Error::UnexpectedResponse("analysis response has no text".into()))?;
        let analysis: AnalysisResult = serde_json::from_str(text)
            .map_err(|e| Error::UnexpectedResponse(format!("analysis is not valid JSON: {e}")))?;
        analysis.validate()?;
        Ok(analysis)
    }

    /// Take the base64 beat payload
    pub fn beat_payload(&self) -> Result<String> {
        self.inline_data()
            .map(str::to_string)
            .ok_or_else(|| Error::UnexpectedResponse("beat response has no audio".into()))
    }
}

/// Request body asking for a structured analysis of `video`
pub(crate) fn analysis_request(video_b64: &str, mime_type: &str, prompt: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                { "inlineData": { "data": video_b64, "mimeType": mime_type } },
                { "text": prompt }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "mood": { "type": "STRING" },
                    "bpm": { "type": "NUMBER" },
                    "intensity": { "type": "NUMBER" },
                    "layers": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "report": { "type": "STRING" }
                }
            }
        }
    })
}

/// Request body asking for an audio-only response to `prompt`
pub(crate) fn beat_request(prompt: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": { "responseModalities": ["AUDIO"] }
    })
}

/// HTTP client for the Gemini API
pub struct GeminiClient {
    config: ServiceConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a client, validating the configuration
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;

        #[cfg(not(target_arch = "wasm32"))]
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;
        #[cfg(target_arch = "wasm32")]
        let client = Client::builder().build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate(&self, model: &str, body: &Value) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Service(format!("{model} returned {status}: {detail}")));
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| Error::UnexpectedResponse(e.to_string()))?;
        debug!(model, candidates = parsed.candidates.len(), "Service responded");
        Ok(parsed)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ScoreService for GeminiClient {
    #[instrument(skip(self, video), fields(bytes = video.len()))]
    async fn analyze(&self, video: &[u8], mime_type: &str) -> Result<AnalysisResult> {
        let prompt = prompt::analysis_prompt(self.config.layer_count, &self.config.report_language);
        let body = analysis_request(&STANDARD.encode(video), mime_type, &prompt);

        let analysis = self.generate(&self.config.analysis_model, &body).await?.analysis()?;
        info!(mood = %analysis.mood, bpm = analysis.bpm, layers = analysis.layers.len(), "Performance analyzed");
        Ok(analysis)
    }

    #[instrument(skip(self, analysis), fields(mood = %analysis.mood))]
    async fn generate_beat(&self, analysis: &AnalysisResult) -> Result<String> {
        let prompt = prompt::beat_prompt(analysis, self.config.beat_duration_secs);
        let body = beat_request(&prompt);

        let payload = self.generate(&self.config.audio_model, &body).await?.beat_payload()?;
        info!(payload_len = payload.len(), "Beat generated");
        Ok(payload)
    }
}
