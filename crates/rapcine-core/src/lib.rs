//! RapCine Core - Beat mixing library for RapCinematic
//!
//! This crate provides the core functionality behind the studio:
//! - Decoding the generated beat from base64 16-bit PCM
//! - Looping the beat against the uploaded video's vocal track
//! - Independent, live vocal and beat gain control
//! - Score service client (performance analysis and beat generation)
//! - Stale-response protection for outstanding service requests
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         RapCine Core                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐        ┌──────────────┐                       │
//! │  │    Score     │──────▶│     PCM      │                       │
//! │  │   Service    │ base64 │   Decoder    │                       │
//! │  └──────────────┘        └──────┬───────┘                       │
//! │                                 │ samples                       │
//! │                          ┌──────┴───────┐                       │
//! │                          │    Studio    │ request generations   │
//! │                          └──────┬───────┘                       │
//! │                                 │                               │
//! │                          ┌──────┴───────┐                       │
//! │                          │     Mix      │                       │
//! │                          │   Session    │                       │
//! │                          └──┬────────┬──┘                       │
//! │                             │        │                          │
//! │  ┌──────────────────────────┴─┐  ┌───┴──────────────────┐       │
//! │  │ Loop Source → Gain → Output│  │ Video Element volume │       │
//! │  │          (beat)            │  │       (vocal)        │       │
//! │  └────────────────────────────┘  └──────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod pcm;
pub mod service;
pub mod session;
pub mod studio;
pub mod types;

#[cfg(test)]
mod fakes;

pub use config::{MixDefaults, ServiceConfig, StudioConfig};
pub use engine::{AudioOutput, GainStage, LoopSource, MediaElement};
pub use error::{DecodeError, Error, Result};
pub use pcm::{decode, NormalizedAudioBuffer, SERVICE_SAMPLE_RATE};
pub use service::{GeminiClient, ScoreService};
pub use session::MixSession;
pub use studio::{ApplyOutcome, RequestTicket, Studio};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "RapCine Core initialized");
}
