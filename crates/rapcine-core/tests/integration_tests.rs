//! Integration tests for RapCine Core

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rapcine_core::{
    decode, AnalysisResult, ApplyOutcome, AudioOutput, DecodeError, Error, Gain, GainStage,
    LoopSource, MediaElement, MixSession, NormalizedAudioBuffer, Result, ScoreService,
    SessionState, Studio, StudioState, SERVICE_SAMPLE_RATE,
};
use std::cell::RefCell;
use std::rc::Rc;

// =============================================================================
// Test pipeline
// =============================================================================

#[derive(Default)]
struct Graph {
    playing_sources: usize,
    stops_before_last_start: usize,
    stops: usize,
    beat_level: f32,
    video_volume: f32,
    video_time: f64,
    video_playing: bool,
}

type SharedGraph = Rc<RefCell<Graph>>;

struct TestOutput(SharedGraph);

struct TestSource {
    graph: SharedGraph,
    playing: bool,
}

struct TestGain(SharedGraph, Gain);

#[derive(Clone)]
struct TestVideo(SharedGraph);

impl AudioOutput for TestOutput {
    type Source = TestSource;
    type Gain = TestGain;

    fn create_gain(&mut self, level: Gain) -> Result<TestGain> {
        Ok(TestGain(self.0.clone(), level))
    }

    fn create_loop_source(&mut self, _buffer: &NormalizedAudioBuffer, gain: &TestGain) -> Result<TestSource> {
        self.0.borrow_mut().beat_level = gain.1.value();
        Ok(TestSource {
            graph: self.0.clone(),
            playing: false,
        })
    }
}

impl LoopSource for TestSource {
    fn start(&mut self) -> Result<()> {
        let mut graph = self.graph.borrow_mut();
        graph.stops_before_last_start = graph.stops;
        graph.playing_sources += 1;
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.playing {
            return Err(Error::audio("source not playing"));
        }
        let mut graph = self.graph.borrow_mut();
        graph.playing_sources -= 1;
        graph.stops += 1;
        self.playing = false;
        Ok(())
    }

    fn disconnect(&mut self) {}
}

impl GainStage for TestGain {
    fn set_level(&mut self, level: Gain) {
        self.1 = level;
        self.0.borrow_mut().beat_level = level.value();
    }

    fn level(&self) -> Gain {
        self.1
    }

    fn disconnect(&mut self) {}
}

impl MediaElement for TestVideo {
    fn set_current_time(&mut self, seconds: f64) {
        self.0.borrow_mut().video_time = seconds;
    }

    fn set_volume(&mut self, level: Gain) {
        self.0.borrow_mut().video_volume = level.value();
    }

    fn play(&mut self) -> Result<()> {
        self.0.borrow_mut().video_playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.0.borrow_mut().video_playing = false;
        Ok(())
    }
}

fn gain(level: f32) -> Gain {
    Gain::new(level).unwrap()
}

fn encode(samples: &[i16]) -> String {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    STANDARD.encode(bytes)
}

fn new_session() -> (MixSession<TestOutput, TestVideo>, SharedGraph) {
    let graph = SharedGraph::default();
    let session = MixSession::new(TestOutput(graph.clone()), gain(0.4), gain(0.9));
    (session, graph)
}

// =============================================================================
// PCM Decoder Tests
// =============================================================================

#[test]
fn test_decode_length_and_range() {
    let samples: Vec<i16> = (0..1000).map(|i| ((i * 7919) % 65536 - 32768) as i16).collect();
    let buffer = decode(&encode(&samples), SERVICE_SAMPLE_RATE).unwrap();

    assert_eq!(buffer.len(), samples.len());
    assert!(buffer.samples().iter().all(|s| (-1.0..1.0).contains(s)));
    for (raw, decoded) in samples.iter().zip(buffer.samples()) {
        assert!((*raw as f32 / 32768.0 - decoded).abs() < f32::EPSILON);
    }
}

#[test]
fn test_decode_odd_length_fails() {
    let payload = STANDARD.encode([0u8, 0, 0, 0, 7]);
    assert!(matches!(
        decode(&payload, SERVICE_SAMPLE_RATE),
        Err(DecodeError::OddLength { len: 5 })
    ));
}

// =============================================================================
// Mix Session Tests
// =============================================================================

#[test]
fn test_reference_scenario() {
    let buffer = decode(&encode(&[0, 16384, -16384, 32767]), 24_000).unwrap();
    let expected = [0.0, 0.5, -0.5, 0.99997];
    for (got, want) in buffer.samples().iter().zip(expected) {
        assert!((got - want).abs() < 1e-4);
    }

    let (mut session, graph) = new_session();
    session
        .start(buffer, gain(0.4), gain(0.9), TestVideo(graph.clone()))
        .unwrap();
    assert_eq!(session.state(), SessionState::Running);
    assert_eq!(graph.borrow().video_volume, 0.4);
    assert_eq!(graph.borrow().video_time, 0.0);
    assert_eq!(graph.borrow().beat_level, 0.9);
    assert!(graph.borrow().video_playing);

    session.stop();
    assert_eq!(session.state(), SessionState::Idle);
    assert!(!graph.borrow().video_playing);
    assert_eq!(graph.borrow().playing_sources, 0);
}

#[test]
fn test_start_twice_single_source() {
    let (mut session, graph) = new_session();
    let buffer = decode(&encode(&[1, 2, 3, 4]), 24_000).unwrap();

    session
        .start(buffer.clone(), gain(0.5), gain(0.5), TestVideo(graph.clone()))
        .unwrap();
    session
        .start(buffer, gain(0.5), gain(0.5), TestVideo(graph.clone()))
        .unwrap();

    let graph = graph.borrow();
    assert_eq!(graph.playing_sources, 1);
    assert_eq!(graph.stops_before_last_start, 1);
}

#[test]
fn test_stop_idle_session() {
    let (mut session, graph) = new_session();
    session.stop();
    assert_eq!(session.state(), SessionState::Idle);
    assert!(!graph.borrow().video_playing);
}

#[test]
fn test_live_gain_changes() {
    let (mut session, graph) = new_session();
    let buffer = decode(&encode(&[1, 2]), 24_000).unwrap();
    session
        .start(buffer, gain(0.4), gain(0.9), TestVideo(graph.clone()))
        .unwrap();

    session.set_beat_gain(gain(0.0));
    assert_eq!(graph.borrow().beat_level, 0.0);
    session.set_beat_gain(gain(1.0));
    assert_eq!(graph.borrow().beat_level, 1.0);
    session.set_vocal_gain(gain(0.75));
    assert_eq!(graph.borrow().video_volume, 0.75);

    assert_eq!(session.state(), SessionState::Running);
    assert_eq!(graph.borrow().playing_sources, 1);
}

// =============================================================================
// Studio + Service Tests
// =============================================================================

struct StubService {
    payload: String,
    fail_beat: bool,
}

#[async_trait]
impl ScoreService for StubService {
    async fn analyze(&self, _video: &[u8], _mime_type: &str) -> Result<AnalysisResult> {
        Ok(serde_json::from_str(
            r#"{"mood":"Dark","bpm":88,"intensity":0.6,"layers":["808 Bass","Strings"],"report":"Hype"}"#,
        )?)
    }

    async fn generate_beat(&self, _analysis: &AnalysisResult) -> Result<String> {
        if self.fail_beat {
            return Err(Error::Service("audio model unavailable".into()));
        }
        Ok(self.payload.clone())
    }
}

#[tokio::test]
async fn test_score_and_play() {
    let service = StubService {
        payload: encode(&[0, 8192, -8192, 0]),
        fail_beat: false,
    };
    let (session, graph) = new_session();
    let mut studio = Studio::new(session, SERVICE_SAMPLE_RATE);

    let ticket = studio.begin_request();
    let result = service.score(b"video", "video/mp4").await.unwrap();
    assert_eq!(studio.apply_result(ticket, result).unwrap(), ApplyOutcome::Applied);
    assert_eq!(studio.state(), StudioState::Complete);
    assert_eq!(studio.analysis().unwrap().layers.len(), 2);

    studio.play(TestVideo(graph.clone())).unwrap();
    assert_eq!(studio.session_state(), SessionState::Running);
    assert_eq!(graph.borrow().video_volume, 0.4);
}

#[tokio::test]
async fn test_reset_during_request_discards_response() {
    let service = StubService {
        payload: encode(&[1, 2]),
        fail_beat: false,
    };
    let (session, _graph) = new_session();
    let mut studio = Studio::new(session, SERVICE_SAMPLE_RATE);

    let ticket = studio.begin_request();
    studio.reset();
    let result = service.score(b"video", "video/mp4").await.unwrap();

    assert_eq!(studio.apply_result(ticket, result).unwrap(), ApplyOutcome::Discarded);
    assert_eq!(studio.state(), StudioState::Idle);
    assert!(studio.analysis().is_none());
}

#[tokio::test]
async fn test_reset_while_playing_discards_response() {
    let service = StubService {
        payload: encode(&[100, -100, 200, -200]),
        fail_beat: false,
    };
    let (session, graph) = new_session();
    let mut studio = Studio::new(session, SERVICE_SAMPLE_RATE);

    let ticket = studio.begin_request();
    let result = service.score(b"video", "video/mp4").await.unwrap();
    studio.apply_result(ticket, result).unwrap();
    studio.play(TestVideo(graph.clone())).unwrap();
    assert_eq!(graph.borrow().playing_sources, 1);

    let ticket = studio.begin_request();
    studio.reset();
    let late = service.score(b"video", "video/mp4").await.unwrap();

    assert_eq!(studio.apply_result(ticket, late).unwrap(), ApplyOutcome::Discarded);
    assert_eq!(studio.session_state(), SessionState::Idle);
    assert_eq!(graph.borrow().playing_sources, 0);
    assert!(!graph.borrow().video_playing);
}

#[tokio::test]
async fn test_service_failure_returns_to_idle() {
    let service = StubService {
        payload: String::new(),
        fail_beat: true,
    };
    let (session, _graph) = new_session();
    let mut studio = Studio::new(session, SERVICE_SAMPLE_RATE);

    let ticket = studio.begin_request();
    let err = service.score(b"video", "video/mp4").await.unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(studio.apply_failure(ticket, &err), ApplyOutcome::Applied);
    assert_eq!(studio.state(), StudioState::Idle);
    assert!(studio.last_error().unwrap().contains("audio model unavailable"));
}
