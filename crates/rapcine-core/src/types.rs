//! Core types for RapCine

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique mix session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amplitude multiplier in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Gain(f32);

impl Gain {
    pub const SILENT: Gain = Gain(0.0);
    pub const UNITY: Gain = Gain(1.0);

    /// Create a gain, rejecting NaN and values outside `0.0..=1.0`
    pub fn new(level: f32) -> Result<Self> {
        if (0.0..=1.0).contains(&level) {
            Ok(Self(level))
        } else {
            Err(Error::InvalidGain(level))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Whole-number percentage, as shown next to the mixer sliders
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

impl TryFrom<f32> for Gain {
    type Error = Error;

    fn try_from(level: f32) -> Result<Self> {
        Gain::new(level)
    }
}

impl From<Gain> for f32 {
    fn from(gain: Gain) -> f32 {
        gain.0
    }
}

impl std::fmt::Display for Gain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Mix session playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Nothing is producing sound
    #[default]
    Idle,
    /// Beat loop and video are playing
    Running,
}

impl SessionState {
    pub fn is_running(self) -> bool {
        self == SessionState::Running
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Running => write!(f, "running"),
        }
    }
}

/// Studio workflow state shown by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudioState {
    /// No result loaded, nothing in flight
    #[default]
    Idle,
    /// Waiting for the score service
    Processing,
    /// A result is loaded and can be played
    Complete,
}

impl std::fmt::Display for StudioState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StudioState::Idle => write!(f, "idle"),
            StudioState::Processing => write!(f, "processing"),
            StudioState::Complete => write!(f, "complete"),
        }
    }
}

/// Mood and tempo analysis of an uploaded performance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Core emotional mood, e.g. "Dark" or "Epic"
    pub mood: String,
    /// Detected tempo
    pub bpm: f64,
    /// Energy of the performance
    #[serde(default, alias = "energy")]
    pub intensity: f64,
    /// Instrument layers suggested for the beat, in order
    #[serde(default)]
    pub layers: Vec<String>,
    /// One-sentence summary
    #[serde(default)]
    pub report: String,
}

impl AnalysisResult {
    /// Reject analyses the beat prompt cannot be built from
    pub fn validate(&self) -> Result<()> {
        if self.mood.trim().is_empty() {
            return Err(Error::UnexpectedResponse("analysis has no mood".into()));
        }
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(Error::UnexpectedResponse(format!(
                "analysis has invalid bpm {}",
                self.bpm
            )));
        }
        Ok(())
    }
}

/// Analysis plus the generated beat, as returned by the score service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub analysis: AnalysisResult,
    /// Base64 16-bit little-endian mono PCM
    pub beat_payload: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_bounds() {
        assert!(Gain::new(0.0).is_ok());
        assert!(Gain::new(1.0).is_ok());
        assert!(matches!(Gain::new(1.01), Err(Error::InvalidGain(_))));
        assert!(matches!(Gain::new(-0.1), Err(Error::InvalidGain(_))));
        assert!(Gain::new(f32::NAN).is_err());
    }

    #[test]
    fn test_gain_percent() {
        assert_eq!(Gain::new(0.4).unwrap().percent(), 40);
        assert_eq!(Gain::new(0.9).unwrap().to_string(), "90%");
    }

    #[test]
    fn test_gain_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<Gain>("0.25").is_ok());
        assert!(serde_json::from_str::<Gain>("2.0").is_err());
    }

    #[test]
    fn test_analysis_energy_alias() {
        let json = r#"{"mood":"Dark","bpm":92,"energy":0.8,"layers":["808 Bass"],"report":"ok"}"#;
        let analysis: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.intensity, 0.8);
        assert_eq!(analysis.layers, vec!["808 Bass".to_string()]);
    }

    #[test]
    fn test_analysis_validation() {
        let mut analysis: AnalysisResult =
            serde_json::from_str(r#"{"mood":"Epic","bpm":140}"#).unwrap();
        assert!(analysis.validate().is_ok());
        assert!(analysis.layers.is_empty());

        analysis.bpm = 0.0;
        assert!(analysis.validate().is_err());

        analysis.bpm = 90.0;
        analysis.mood = "  ".into();
        assert!(analysis.validate().is_err());
    }
}
