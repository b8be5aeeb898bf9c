//! Audio pipeline seams
//!
//! A [`MixSession`](crate::session::MixSession) drives two very different
//! sound sources: the generated beat, which it plays through its own output
//! context, and the vocal carried by the uploaded video, which only the
//! video element itself can play. These traits describe the control surface
//! of each so the session logic stays independent of the host (Web Audio in
//! the browser, recording fakes in tests).

use crate::{pcm::NormalizedAudioBuffer, types::Gain, Result};

/// Playback context owning one output destination
pub trait AudioOutput {
    /// Looping buffer source produced by this output
    type Source: LoopSource;
    /// Gain stage produced by this output
    type Gain: GainStage;

    /// Create a gain stage at `level`, connected to the destination
    fn create_gain(&mut self, level: Gain) -> Result<Self::Gain>;

    /// Create a source that repeats `buffer` until stopped, routed through `gain`
    ///
    /// The source must not produce sound before [`LoopSource::start`].
    fn create_loop_source(
        &mut self,
        buffer: &NormalizedAudioBuffer,
        gain: &Self::Gain,
    ) -> Result<Self::Source>;

    /// Make sure the context is allowed to produce sound
    fn resume(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Scheduled source playing one buffer on repeat
pub trait LoopSource {
    /// Begin producing sound immediately
    fn start(&mut self) -> Result<()>;

    /// Stop producing sound
    ///
    /// Fails if the source already stopped; callers treat that as benign.
    fn stop(&mut self) -> Result<()>;

    /// Detach from the graph, releasing the source
    fn disconnect(&mut self);
}

/// Controllable amplitude multiplier in the beat path
pub trait GainStage {
    fn set_level(&mut self, level: Gain);

    fn level(&self) -> Gain;

    /// Detach from the destination
    fn disconnect(&mut self);
}

/// Control surface of the externally owned video element
pub trait MediaElement {
    fn set_current_time(&mut self, seconds: f64);

    fn set_volume(&mut self, level: Gain);

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;
}
