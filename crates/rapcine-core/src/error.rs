//! Error types for RapCine Core

use thiserror::Error;

/// Result type alias for studio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to turn a raw beat payload into samples
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("PCM payload has odd byte length {len}, cannot form 16-bit samples")]
    OddLength { len: usize },

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
}

/// Studio error types
#[derive(Error, Debug)]
pub enum Error {
    // Payload errors
    #[error("Failed to decode beat payload: {0}")]
    Decode(#[from] DecodeError),

    // Session errors
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),

    #[error("Gain {0} is outside 0.0..=1.0")]
    InvalidGain(f32),

    #[error("Audio pipeline error: {0}")]
    Audio(String),

    // Service errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Score service failed: {0}")]
    Service(String),

    #[error("Unexpected service response: {0}")]
    UnexpectedResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create an audio pipeline error
    pub fn audio(msg: impl Into<String>) -> Self {
        Error::Audio(msg.into())
    }

    /// Returns true if the user can reasonably try the same action again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Service(_) | Error::UnexpectedResponse(_)
        )
    }

    /// Returns the error code shown by the UI
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Decode(_) => "DECODE",
            Error::InvalidBuffer(_) => "INVALID_BUFFER",
            Error::InvalidGain(_) => "INVALID_GAIN",
            Error::Audio(_) => "AUDIO",
            Error::Network(_) => "NETWORK",
            Error::Service(_) => "SERVICE",
            Error::UnexpectedResponse(_) => "UNEXPECTED_RESPONSE",
            Error::Json(_) => "JSON",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}
