//! Mix Session - live mix of the generated beat against the video's vocal
//!
//! Coordinates:
//! - Loop source and gain stage lifecycle on the owned audio output
//! - Volume and transport of the bound video element
//! - Idle/Running state transitions
//!
//! At most one loop source is ever producing sound: a new source is fully
//! built before the previous one is stopped and released, and it only starts
//! after that release.

use crate::{
    engine::{AudioOutput, GainStage, LoopSource, MediaElement},
    pcm::NormalizedAudioBuffer,
    types::{Gain, SessionId, SessionState},
    Result,
};
use tracing::{debug, info, instrument, warn};

/// Beat nodes currently wired into the output
struct ActiveLoop<S: LoopSource, G: GainStage> {
    source: S,
    gain: G,
}

impl<S: LoopSource, G: GainStage> ActiveLoop<S, G> {
    /// Stop and detach both nodes; an already-stopped source is fine
    fn release(mut self) {
        if let Err(e) = self.source.stop() {
            debug!(error = %e, "Loop source already stopped");
        }
        self.source.disconnect();
        self.gain.disconnect();
    }
}

/// Mix session owning one audio output and bound to one video element
pub struct MixSession<O: AudioOutput, M: MediaElement> {
    /// Unique session ID
    id: SessionId,
    /// Exclusively owned playback context
    output: O,
    /// Current playback state
    state: SessionState,
    /// Vocal level, applied through the video element volume
    vocal_gain: Gain,
    /// Beat level, applied through the gain stage
    beat_gain: Gain,
    /// Buffer of the current or most recent loop
    buffer: Option<NormalizedAudioBuffer>,
    /// Live beat nodes, present only while running
    active: Option<ActiveLoop<O::Source, O::Gain>>,
    /// Video element carrying the vocal
    video: Option<M>,
}

impl<O: AudioOutput, M: MediaElement> MixSession<O, M> {
    /// Create an idle session with the given remembered levels
    pub fn new(output: O, vocal_gain: Gain, beat_gain: Gain) -> Self {
        Self {
            id: SessionId::new(),
            output,
            state: SessionState::Idle,
            vocal_gain,
            beat_gain,
            buffer: None,
            active: None,
            video: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn vocal_gain(&self) -> Gain {
        self.vocal_gain
    }

    pub fn beat_gain(&self) -> Gain {
        self.beat_gain
    }

    /// Buffer of the current or most recent loop
    pub fn buffer(&self) -> Option<&NormalizedAudioBuffer> {
        self.buffer.as_ref()
    }

    /// Bound video element, if any
    pub fn video(&self) -> Option<&M> {
        self.video.as_ref()
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Start looping `buffer` against `video` from position zero
    ///
    /// Restarting a running session stops and releases the previous source
    /// first; the session never passes through an observable idle state.
    /// An invalid buffer or a failure while building the new nodes leaves
    /// the session exactly as it was.
    #[instrument(skip(self, buffer, video), fields(session_id = %self.id))]
    pub fn start(
        &mut self,
        buffer: NormalizedAudioBuffer,
        vocal_gain: Gain,
        beat_gain: Gain,
        video: M,
    ) -> Result<()> {
        buffer.validate()?;

        let mut gain = self.output.create_gain(beat_gain)?;
        let source = match self.output.create_loop_source(&buffer, &gain) {
            Ok(source) => source,
            Err(e) => {
                gain.disconnect();
                return Err(e);
            }
        };
        let mut next = ActiveLoop { source, gain };

        if let Err(e) = self.output.resume() {
            next.release();
            return Err(e);
        }

        // Committed: tear down whatever is playing
        if let Some(previous) = self.active.take() {
            debug!("Releasing previous loop source");
            previous.release();
        }
        if let Some(mut previous_video) = self.video.take() {
            if self.state.is_running() {
                if let Err(e) = previous_video.pause() {
                    warn!(error = %e, "Failed to pause previous video element");
                }
            }
        }

        self.vocal_gain = vocal_gain;
        self.beat_gain = beat_gain;

        let mut video = video;
        video.set_current_time(0.0);
        video.set_volume(vocal_gain);

        // Back to back so both streams begin in the same tick
        let started = video.play().and_then(|()| next.source.start());

        if let Err(e) = started {
            warn!(error = %e, "Failed to start mix, returning to idle");
            next.release();
            if let Err(pause_err) = video.pause() {
                debug!(error = %pause_err, "Video element was not playing");
            }
            self.video = Some(video);
            self.buffer = Some(buffer);
            self.state = SessionState::Idle;
            return Err(e);
        }

        info!(
            samples = buffer.len(),
            loop_secs = buffer.duration_secs(),
            vocal = %vocal_gain,
            beat = %beat_gain,
            "Mix started"
        );

        self.active = Some(next);
        self.video = Some(video);
        self.buffer = Some(buffer);
        self.state = SessionState::Running;

        Ok(())
    }

    /// Swap in a new beat, keeping the remembered levels
    ///
    /// Equivalent to stopping and starting again with `buffer`, except that
    /// an invalid buffer is rejected before anything is stopped.
    #[instrument(skip(self, buffer, video), fields(session_id = %self.id))]
    pub fn replace(&mut self, buffer: NormalizedAudioBuffer, video: M) -> Result<()> {
        buffer.validate()?;
        self.start(buffer, self.vocal_gain, self.beat_gain, video)
    }

    /// Stop the loop source and pause the video
    ///
    /// Calling this on an idle session does nothing.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn stop(&mut self) {
        if !self.state.is_running() && self.active.is_none() {
            debug!("Stop on idle session ignored");
            return;
        }

        if let Some(active) = self.active.take() {
            active.release();
        }
        if let Some(video) = self.video.as_mut() {
            if let Err(e) = video.pause() {
                warn!(error = %e, "Failed to pause video element");
            }
        }

        self.state = SessionState::Idle;
        info!("Mix stopped");
    }

    /// Change the vocal level, live if running
    pub fn set_vocal_gain(&mut self, level: Gain) {
        self.vocal_gain = level;
        if self.state.is_running() {
            if let Some(video) = self.video.as_mut() {
                video.set_volume(level);
            }
        }
        debug!(session_id = %self.id, vocal = %level, "Vocal gain updated");
    }

    /// Change the beat level, live if running
    pub fn set_beat_gain(&mut self, level: Gain) {
        self.beat_gain = level;
        if let Some(active) = self.active.as_mut() {
            active.gain.set_level(level);
        }
        debug!(session_id = %self.id, beat = %level, "Beat gain updated");
    }
}

impl<O: AudioOutput, M: MediaElement> Drop for MixSession<O, M> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.release();
        }
    }
}
