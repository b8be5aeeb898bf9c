//! Recording doubles of the audio pipeline seams for unit tests

use crate::{
    engine::{AudioOutput, GainStage, LoopSource, MediaElement},
    pcm::NormalizedAudioBuffer,
    types::Gain,
    Error, Result,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// One observed pipeline call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateGain(usize, f32),
    CreateSource(usize, usize),
    Resume,
    Start(usize),
    Stop(usize),
    DisconnectSource(usize),
    SetGain(usize, f32),
    DisconnectGain(usize),
    VideoSeek(f64),
    VideoVolume(f32),
    VideoPlay,
    VideoPause,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// Number of sources started and not yet stopped
pub fn active_sources(log: &CallLog) -> usize {
    let calls = log.borrow();
    let started = calls.iter().filter(|c| matches!(c, Call::Start(_))).count();
    let stopped = calls.iter().filter(|c| matches!(c, Call::Stop(_))).count();
    started - stopped
}

pub struct FakeOutput {
    log: CallLog,
    next_gain: usize,
    next_source: usize,
    fail_source: Cell<bool>,
}

impl FakeOutput {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            next_gain: 0,
            next_source: 0,
            fail_source: Cell::new(false),
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Make the next `create_loop_source` fail
    pub fn fail_next_source(&self) {
        self.fail_source.set(true);
    }
}

impl AudioOutput for FakeOutput {
    type Source = FakeSource;
    type Gain = FakeGain;

    fn create_gain(&mut self, level: Gain) -> Result<FakeGain> {
        let id = self.next_gain;
        self.next_gain += 1;
        self.log.borrow_mut().push(Call::CreateGain(id, level.value()));
        Ok(FakeGain {
            id,
            level,
            log: self.log.clone(),
        })
    }

    fn create_loop_source(
        &mut self,
        buffer: &NormalizedAudioBuffer,
        _gain: &FakeGain,
    ) -> Result<FakeSource> {
        if self.fail_source.replace(false) {
            return Err(Error::audio("source allocation failed"));
        }
        let id = self.next_source;
        self.next_source += 1;
        self.log.borrow_mut().push(Call::CreateSource(id, buffer.len()));
        Ok(FakeSource {
            id,
            started: false,
            stopped: false,
            log: self.log.clone(),
        })
    }

    fn resume(&mut self) -> Result<()> {
        self.log.borrow_mut().push(Call::Resume);
        Ok(())
    }
}

pub struct FakeSource {
    id: usize,
    started: bool,
    stopped: bool,
    log: CallLog,
}

impl LoopSource for FakeSource {
    fn start(&mut self) -> Result<()> {
        self.started = true;
        self.log.borrow_mut().push(Call::Start(self.id));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.started || self.stopped {
            return Err(Error::audio("InvalidStateError: source not playing"));
        }
        self.stopped = true;
        self.log.borrow_mut().push(Call::Stop(self.id));
        Ok(())
    }

    fn disconnect(&mut self) {
        self.log.borrow_mut().push(Call::DisconnectSource(self.id));
    }
}

pub struct FakeGain {
    id: usize,
    level: Gain,
    log: CallLog,
}

impl GainStage for FakeGain {
    fn set_level(&mut self, level: Gain) {
        self.level = level;
        self.log.borrow_mut().push(Call::SetGain(self.id, level.value()));
    }

    fn level(&self) -> Gain {
        self.level
    }

    fn disconnect(&mut self) {
        self.log.borrow_mut().push(Call::DisconnectGain(self.id));
    }
}

#[derive(Clone)]
pub struct FakeVideo {
    volume: Gain,
    current_time: f64,
    playing: bool,
    fail_play: bool,
    log: CallLog,
}

impl FakeVideo {
    pub fn new(log: CallLog) -> Self {
        Self {
            volume: Gain::UNITY,
            current_time: 3.5,
            playing: false,
            fail_play: false,
            log,
        }
    }

    pub fn fail_play(&mut self) {
        self.fail_play = true;
    }

    pub fn volume(&self) -> Gain {
        self.volume
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl MediaElement for FakeVideo {
    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
        self.log.borrow_mut().push(Call::VideoSeek(seconds));
    }

    fn set_volume(&mut self, level: Gain) {
        self.volume = level;
        self.log.borrow_mut().push(Call::VideoVolume(level.value()));
    }

    fn play(&mut self) -> Result<()> {
        if self.fail_play {
            return Err(Error::audio("NotAllowedError: autoplay blocked"));
        }
        self.playing = true;
        self.log.borrow_mut().push(Call::VideoPlay);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.playing = false;
        self.log.borrow_mut().push(Call::VideoPause);
        Ok(())
    }
}
