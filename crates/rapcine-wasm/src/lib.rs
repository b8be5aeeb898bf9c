//! RapCine WASM - WebAssembly Studio Library
//!
//! Browser side of the RapCinematic studio:
//! - Sends the uploaded performance to the score service
//! - Decodes the generated 16-bit PCM beat
//! - Loops the beat through Web Audio against the page's `<video>` vocal
//! - Live vocal/beat gain from the mixer sliders
//!
//! ## Integration
//!
//! ```javascript
//! import init, { RapCineStudio } from '@rapcine/wasm';
//!
//! await init();
//! const studio = new RapCineStudio(JSON.stringify({ service: { api_key: KEY } }));
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const analysis = await studio.process(bytes, file.type);
//! studio.play(document.querySelector('video'));
//! studio.set_beat_gain(0.7);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Float32Array;
use rapcine_core::{
    ApplyOutcome, Error, GeminiClient, MixSession, ScoreService, Studio, StudioConfig,
};
use wasm_bindgen::prelude::*;
use web_sys::HtmlVideoElement;

mod web_audio;

pub use web_audio::{VideoElement, WebAudioOutput, WebGain, WebLoopSource};

type WebStudio = Studio<WebAudioOutput, VideoElement>;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"[RapCine WASM] Initialized".into());
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Message shown to the user for a studio error
fn error_message(err: &Error) -> String {
    format!("{}: {}", err.error_code(), err)
}

fn to_js(err: Error) -> JsValue {
    JsValue::from_str(&error_message(&err))
}

/// Decode a base64 16-bit PCM payload into normalized samples
#[wasm_bindgen]
pub fn decode_pcm(payload: &str, sample_rate: u32) -> Result<Float32Array, JsValue> {
    let buffer = rapcine_core::decode(payload, sample_rate).map_err(|e| to_js(e.into()))?;
    Ok(Float32Array::from(buffer.samples()))
}

/// Studio exposed to the page
#[wasm_bindgen]
pub struct RapCineStudio {
    studio: Rc<RefCell<WebStudio>>,
    service: Rc<GeminiClient>,
}

#[wasm_bindgen]
impl RapCineStudio {
    /// Create a studio from a JSON `StudioConfig`
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<RapCineStudio, JsValue> {
        let config = StudioConfig::from_json(config_json).map_err(to_js)?;
        config.validate().map_err(to_js)?;

        let sample_rate = config.service.beat_sample_rate;
        let output = WebAudioOutput::new(sample_rate).map_err(to_js)?;
        let session = MixSession::new(
            output,
            config.mix.vocal().map_err(to_js)?,
            config.mix.beat().map_err(to_js)?,
        );
        let service = GeminiClient::new(config.service).map_err(to_js)?;

        Ok(Self {
            studio: Rc::new(RefCell::new(Studio::new(session, sample_rate))),
            service: Rc::new(service),
        })
    }

    /// Score an uploaded video
    ///
    /// Resolves with the analysis object, or `null` when a reset or a newer
    /// upload superseded this request. Rejects with the error message.
    #[wasm_bindgen]
    pub fn process(&self, video: Vec<u8>, mime_type: String) -> js_sys::Promise {
        let ticket = self.studio.borrow_mut().begin_request();
        let studio = Rc::clone(&self.studio);
        let service = Rc::clone(&self.service);

        wasm_bindgen_futures::future_to_promise(async move {
            let outcome = service.score(&video, &mime_type).await;

            let mut studio = studio.borrow_mut();
            match outcome {
                Ok(result) => match studio.apply_result(ticket, result).map_err(to_js)? {
                    ApplyOutcome::Applied => {
                        web_sys::console::log_1(&"[RapCine] Score ready".into());
                        let analysis = studio.analysis().cloned();
                        serde_wasm_bindgen::to_value(&analysis).map_err(JsValue::from)
                    }
                    ApplyOutcome::Discarded => Ok(JsValue::NULL),
                },
                Err(err) => match studio.apply_failure(ticket, &err) {
                    ApplyOutcome::Applied => Err(to_js(err)),
                    ApplyOutcome::Discarded => Ok(JsValue::NULL),
                },
            }
        })
    }

    /// Start the mix against `video` from the beginning
    #[wasm_bindgen]
    pub fn play(&self, video: HtmlVideoElement) -> Result<(), JsValue> {
        self.studio
            .borrow_mut()
            .play(VideoElement::new(video))
            .map_err(to_js)
    }

    /// Stop the mix; safe to call repeatedly
    #[wasm_bindgen]
    pub fn stop(&self) {
        self.studio.borrow_mut().stop();
    }

    /// Play or stop, returning whether the mix is now running
    #[wasm_bindgen]
    pub fn toggle(&self, video: HtmlVideoElement) -> Result<bool, JsValue> {
        let state = self
            .studio
            .borrow_mut()
            .toggle(VideoElement::new(video))
            .map_err(to_js)?;
        Ok(state.is_running())
    }

    #[wasm_bindgen]
    pub fn set_vocal_gain(&self, level: f32) -> Result<(), JsValue> {
        self.studio.borrow_mut().set_vocal_gain(level).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn set_beat_gain(&self, level: f32) -> Result<(), JsValue> {
        self.studio.borrow_mut().set_beat_gain(level).map_err(to_js)
    }

    /// Stop playback and drop the loaded result
    #[wasm_bindgen]
    pub fn reset(&self) {
        self.studio.borrow_mut().reset();
    }

    /// Workflow state: "idle", "processing" or "complete"
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.studio.borrow().state().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn is_playing(&self) -> bool {
        self.studio.borrow().session_state().is_running()
    }

    #[wasm_bindgen(getter)]
    pub fn vocal_gain(&self) -> f32 {
        self.studio.borrow().vocal_gain().value()
    }

    #[wasm_bindgen(getter)]
    pub fn beat_gain(&self) -> f32 {
        self.studio.borrow().beat_gain().value()
    }

    #[wasm_bindgen(getter)]
    pub fn last_error(&self) -> Option<String> {
        self.studio.borrow().last_error().map(str::to_string)
    }

    /// Loaded analysis as a JS object, or `undefined`
    #[wasm_bindgen]
    pub fn analysis(&self) -> Result<JsValue, JsValue> {
        match self.studio.borrow().analysis() {
            Some(analysis) => serde_wasm_bindgen::to_value(analysis).map_err(JsValue::from),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Loaded analysis as a JSON string
    #[wasm_bindgen]
    pub fn analysis_json(&self) -> Option<String> {
        self.studio
            .borrow()
            .analysis()
            .and_then(|a| serde_json::to_string(a).ok())
    }

    /// Length of one beat loop in seconds
    #[wasm_bindgen(getter)]
    pub fn beat_duration(&self) -> f64 {
        self.studio
            .borrow()
            .beat()
            .map(|b| b.duration_secs())
            .unwrap_or(0.0)
    }
}
