//! Studio - workflow around one mix session
//!
//! Tracks the upload/score/play workflow the UI presents and guards the
//! session against late service responses: every request is tagged with a
//! [`RequestTicket`] carrying the generation it was issued in, and any
//! response whose generation is no longer current is discarded.

use crate::{
    engine::{AudioOutput, MediaElement},
    pcm::{self, NormalizedAudioBuffer},
    session::MixSession,
    types::{AnalysisResult, Gain, ScoreResult, SessionState, StudioState},
    Error, Result,
};
use tracing::{info, warn};

/// Handle identifying one outstanding service request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    generation: u64,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a service response handed to the studio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The response was current and is now reflected in the studio
    Applied,
    /// A newer request or a reset superseded the response
    Discarded,
}

/// Result currently loaded into the studio
struct LoadedScore {
    analysis: AnalysisResult,
    buffer: NormalizedAudioBuffer,
}

/// Studio controller owning the mix session
pub struct Studio<O: AudioOutput, M: MediaElement> {
    session: MixSession<O, M>,
    state: StudioState,
    generation: u64,
    sample_rate: u32,
    loaded: Option<LoadedScore>,
    last_error: Option<String>,
}

impl<O: AudioOutput, M: MediaElement> Studio<O, M> {
    /// Create an idle studio decoding beats at `sample_rate`
    pub fn new(session: MixSession<O, M>, sample_rate: u32) -> Self {
        Self {
            session,
            state: StudioState::Idle,
            generation: 0,
            sample_rate,
            loaded: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> StudioState {
        self.state
    }

    pub fn session(&self) -> &MixSession<O, M> {
        &self.session
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.loaded.as_ref().map(|l| &l.analysis)
    }

    pub fn beat(&self) -> Option<&NormalizedAudioBuffer> {
        self.loaded.as_ref().map(|l| &l.buffer)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn vocal_gain(&self) -> Gain {
        self.session.vocal_gain()
    }

    pub fn beat_gain(&self) -> Gain {
        self.session.beat_gain()
    }

    /// Mark a new service request as outstanding
    pub fn begin_request(&mut self) -> RequestTicket {
        self.generation += 1;
        self.state = StudioState::Processing;
        self.last_error = None;
        info!(generation = self.generation, "Score request started");
        RequestTicket {
            generation: self.generation,
        }
    }

    fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.generation == self.generation && self.state == StudioState::Processing
    }

    /// Apply a successful service response
    ///
    /// A running session switches to the new beat immediately, reusing its
    /// bound video element.
    pub fn apply_result(&mut self, ticket: RequestTicket, result: ScoreResult) -> Result<ApplyOutcome>
    where
        M: Clone,
    {
        if !self.is_current(ticket) {
            info!(generation = ticket.generation(), current = self.generation, "Stale score discarded");
            return Ok(ApplyOutcome::Discarded);
        }

        let buffer = match pcm::decode(&result.beat_payload, self.sample_rate) {
            Ok(buffer) => buffer,
            Err(e) => {
                let err = Error::from(e);
                self.fail(&err);
                return Err(err);
            }
        };

        info!(
            mood = %result.analysis.mood,
            bpm = result.analysis.bpm,
            beat_secs = buffer.duration_secs(),
            "Score loaded"
        );

        if self.session.is_running() {
            if let Some(video) = self.session.video().cloned() {
                if let Err(e) = self.session.replace(buffer.clone(), video) {
                    warn!(error = %e, "Could not switch running mix to new beat");
                    self.session.stop();
                }
            }
        }

        self.loaded = Some(LoadedScore {
            analysis: result.analysis,
            buffer,
        });
        self.state = StudioState::Complete;
        Ok(ApplyOutcome::Applied)
    }

    /// Apply a failed service response
    pub fn apply_failure(&mut self, ticket: RequestTicket, error: &Error) -> ApplyOutcome {
        if !self.is_current(ticket) {
            info!(generation = ticket.generation(), "Stale failure discarded");
            return ApplyOutcome::Discarded;
        }
        self.fail(error);
        ApplyOutcome::Applied
    }

    /// Record a failed request; an earlier result stays loaded and playable
    fn fail(&mut self, error: &Error) {
        warn!(code = error.error_code(), error = %error, "Score request failed");
        self.last_error = Some(error.to_string());
        self.state = if self.loaded.is_some() {
            StudioState::Complete
        } else {
            StudioState::Idle
        };
    }

    /// Play the loaded beat against `video` from the start
    pub fn play(&mut self, video: M) -> Result<()> {
        let buffer = self
            .loaded
            .as_ref()
            .map(|l| l.buffer.clone())
            .ok_or_else(|| Error::InvalidBuffer("no beat loaded".into()))?;
        let (vocal, beat) = (self.session.vocal_gain(), self.session.beat_gain());
        self.session.start(buffer, vocal, beat, video)
    }

    pub fn stop(&mut self) {
        self.session.stop();
    }

    /// Play when idle, stop when running
    pub fn toggle(&mut self, video: M) -> Result<SessionState> {
        if self.session.is_running() {
            self.session.stop();
        } else {
            self.play(video)?;
        }
        Ok(self.session.state())
    }

    pub fn set_vocal_gain(&mut self, level: f32) -> Result<()> {
        self.session.set_vocal_gain(Gain::new(level)?);
        Ok(())
    }

    pub fn set_beat_gain(&mut self, level: f32) -> Result<()> {
        self.session.set_beat_gain(Gain::new(level)?);
        Ok(())
    }

    /// Stop playback, forget the result and invalidate outstanding requests
    pub fn reset(&mut self) {
        self.session.stop();
        self.generation += 1;
        self.loaded = None;
        self.last_error = None;
        self.state = StudioState::Idle;
        info!(generation = self.generation, "Studio reset");
    }
}
