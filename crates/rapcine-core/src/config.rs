//! Studio configuration

use crate::{
    error::{Error, Result},
    pcm::SERVICE_SAMPLE_RATE,
    types::Gain,
};
use serde::{Deserialize, Serialize};

/// Score service connection and prompt settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// API key sent with every request
    pub api_key: String,
    /// REST endpoint root
    pub base_url: String,
    /// Model used to analyze the uploaded video
    pub analysis_model: String,
    /// Model used to generate the beat audio
    pub audio_model: String,
    /// Sample rate of the returned PCM beat
    pub beat_sample_rate: u32,
    /// Requested beat length in seconds
    pub beat_duration_secs: u32,
    /// Number of instrument layers requested from the analysis
    pub layer_count: u32,
    /// Language of the one-sentence report
    pub report_language: String,
    /// Request timeout in milliseconds (ignored in the browser)
    pub request_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            analysis_model: "gemini-3-flash-preview".to_string(),
            audio_model: "gemini-2.5-flash-native-audio-preview-09-2025".to_string(),
            beat_sample_rate: SERVICE_SAMPLE_RATE,
            beat_duration_secs: 20,
            layer_count: 4,
            report_language: "Vietnamese".to_string(),
            request_timeout_ms: 120_000,
        }
    }
}

impl ServiceConfig {
    /// Read the API key and endpoint overrides from the environment
    ///
    /// `GEMINI_API_KEY` wins over `API_KEY`; `RAPCINE_BASE_URL` replaces
    /// the default endpoint.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("GEMINI_API_KEY").or_else(|_| std::env::var("API_KEY")) {
            config.api_key = key;
        }
        if let Ok(url) = std::env::var("RAPCINE_BASE_URL") {
            config.base_url = url;
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("api_key is empty".into()));
        }
        if self.beat_sample_rate == 0 {
            return Err(Error::InvalidConfig("beat_sample_rate must be positive".into()));
        }
        if self.layer_count == 0 {
            return Err(Error::InvalidConfig("layer_count must be positive".into()));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::InvalidConfig(format!("base_url: {e}")))?;
        Ok(())
    }
}

/// Initial slider levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MixDefaults {
    pub vocal_gain: f32,
    pub beat_gain: f32,
}

impl Default for MixDefaults {
    fn default() -> Self {
        // Vocal sits under the beat so the generated score is audible
        Self {
            vocal_gain: 0.4,
            beat_gain: 0.9,
        }
    }
}

impl MixDefaults {
    pub fn vocal(&self) -> Result<Gain> {
        Gain::new(self.vocal_gain)
    }

    pub fn beat(&self) -> Result<Gain> {
        Gain::new(self.beat_gain)
    }
}

/// Complete studio configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub service: ServiceConfig,
    pub mix: MixDefaults,
}

impl StudioConfig {
    /// Parse a JSON configuration, filling omitted fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.service.validate()?;
        self.mix.vocal()?;
        self.mix.beat()?;
        Ok(())
    }
}
