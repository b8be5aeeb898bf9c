//! PCM beat decoding
//!
//! The score service returns the generated beat as base64 text wrapping
//! signed 16-bit little-endian mono samples. [`decode`] turns that payload
//! into a [`NormalizedAudioBuffer`] of `f32` samples in `[-1.0, 1.0)`.

use crate::error::{DecodeError, Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;

/// Sample rate of the beats produced by the score service
pub const SERVICE_SAMPLE_RATE: u32 = 24_000;

const BYTES_PER_SAMPLE: usize = 2;
const I16_SCALE: f32 = 32768.0;

/// Mono floating-point audio at a known sample rate
///
/// Samples are shared behind an `Arc`, so cloning a buffer to hand it to a
/// session does not copy audio data.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAudioBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl NormalizedAudioBuffer {
    /// Wrap already-normalized samples
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback length of one loop iteration
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    /// Root-mean-square level
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        (sum / self.samples.len() as f64).sqrt() as f32
    }

    /// Check the buffer can back a loop source
    pub fn validate(&self) -> Result<()> {
        if self.samples.is_empty() {
            return Err(Error::InvalidBuffer("buffer has no samples".into()));
        }
        if self.sample_rate == 0 {
            return Err(Error::InvalidBuffer("sample rate is zero".into()));
        }
        if let Some(index) = self.samples.iter().position(|s| !s.is_finite()) {
            return Err(Error::InvalidBuffer(format!(
                "sample {index} is not a finite number"
            )));
        }
        Ok(())
    }
}

/// Decode a base64 payload of 16-bit little-endian mono PCM
///
/// ASCII whitespace anywhere in the payload is ignored, so line-wrapped
/// base64 (76 columns, as written by `base64` and MIME encoders) decodes.
pub fn decode(payload: &str, sample_rate: u32) -> std::result::Result<NormalizedAudioBuffer, DecodeError> {
    if sample_rate == 0 {
        return Err(DecodeError::InvalidSampleRate(sample_rate));
    }

    let bytes = if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: Vec<u8> = payload
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        STANDARD.decode(compact)?
    } else {
        STANDARD.decode(payload)?
    };
    let samples = samples_from_le_bytes(&bytes)?;

    Ok(NormalizedAudioBuffer::new(samples, sample_rate))
}

/// Reinterpret raw little-endian byte pairs as normalized samples
pub fn samples_from_le_bytes(bytes: &[u8]) -> std::result::Result<Vec<f32>, DecodeError> {
    if bytes.len() % BYTES_PER_SAMPLE != 0 {
        return Err(DecodeError::OddLength { len: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / I16_SCALE)
        .collect())
}
