//! Web Audio pipeline
//!
//! Implements the core pipeline seams over `web-sys`: one `AudioContext`
//! per output, `AudioBufferSourceNode` loops routed through a `GainNode`,
//! and the page's `<video>` element for the vocal.

use rapcine_core::{
    AudioOutput, Error, Gain, GainStage, LoopSource, MediaElement, NormalizedAudioBuffer, Result,
};
use js_sys::Promise;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AudioBufferSourceNode, AudioContext, AudioContextOptions, GainNode, HtmlVideoElement,
};

/// Convert a thrown JS value into a pipeline error
pub(crate) fn js_error(value: JsValue) -> Error {
    Error::audio(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

/// Await `promise` off the call stack and log a rejection to the console
fn warn_on_rejection(promise: Promise, label: &'static str) {
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = JsFuture::from(promise).await {
            web_sys::console::warn_2(&label.into(), &e);
        }
    });
}

/// Audio output owning its own `AudioContext`
pub struct WebAudioOutput {
    context: AudioContext,
}

impl WebAudioOutput {
    /// Create a context running at `sample_rate`
    pub fn new(sample_rate: u32) -> Result<Self> {
        let options = AudioContextOptions::new();
        options.set_sample_rate(sample_rate as f32);
        let context = AudioContext::new_with_context_options(&options).map_err(js_error)?;
        Ok(Self { context })
    }
}

impl Drop for WebAudioOutput {
    fn drop(&mut self) {
        match self.context.close() {
            Ok(promise) => warn_on_rejection(promise, "[RapCine] AudioContext close failed:"),
            Err(e) => web_sys::console::warn_2(&"[RapCine] AudioContext close failed:".into(), &e),
        }
    }
}

impl AudioOutput for WebAudioOutput {
    type Source = WebLoopSource;
    type Gain = WebGain;

    fn create_gain(&mut self, level: Gain) -> Result<WebGain> {
        let node = self.context.create_gain().map_err(js_error)?;
        node.gain().set_value(level.value());
        node.connect_with_audio_node(&self.context.destination())
            .map_err(js_error)?;
        Ok(WebGain { node, level })
    }

    fn create_loop_source(
        &mut self,
        buffer: &NormalizedAudioBuffer,
        gain: &WebGain,
    ) -> Result<WebLoopSource> {
        let audio = self
            .context
            .create_buffer(1, buffer.len() as u32, buffer.sample_rate() as f32)
            .map_err(js_error)?;
        audio.copy_to_channel(buffer.samples(), 0).map_err(js_error)?;

        let node = self.context.create_buffer_source().map_err(js_error)?;
        node.set_buffer(Some(&audio));
        node.set_loop(true);
        node.connect_with_audio_node(&gain.node).map_err(js_error)?;

        Ok(WebLoopSource { node })
    }

    fn resume(&mut self) -> Result<()> {
        // Contexts created before a user gesture start suspended
        let promise = self.context.resume().map_err(js_error)?;
        warn_on_rejection(promise, "[RapCine] AudioContext resume failed:");
        Ok(())
    }
}

/// Looping `AudioBufferSourceNode`
pub struct WebLoopSource {
    node: AudioBufferSourceNode,
}

impl LoopSource for WebLoopSource {
    fn start(&mut self) -> Result<()> {
        self.node.start().map_err(js_error)
    }

    fn stop(&mut self) -> Result<()> {
        self.node.stop().map_err(js_error)
    }

    fn disconnect(&mut self) {
        let _ = self.node.disconnect();
    }
}

/// `GainNode` on the beat path
pub struct WebGain {
    node: GainNode,
    level: Gain,
}

impl GainStage for WebGain {
    fn set_level(&mut self, level: Gain) {
        self.level = level;
        self.node.gain().set_value(level.value());
    }

    fn level(&self) -> Gain {
        self.level
    }

    fn disconnect(&mut self) {
        let _ = self.node.disconnect();
    }
}

/// The page's video element carrying the vocal
#[derive(Clone)]
pub struct VideoElement(HtmlVideoElement);

impl VideoElement {
    pub fn new(element: HtmlVideoElement) -> Self {
        Self(element)
    }
}

impl MediaElement for VideoElement {
    fn set_current_time(&mut self, seconds: f64) {
        self.0.set_current_time(seconds);
    }

    fn set_volume(&mut self, level: Gain) {
        self.0.set_volume(level.value() as f64);
    }

    fn play(&mut self) -> Result<()> {
        let promise = self.0.play().map_err(js_error)?;
        warn_on_rejection(promise, "[RapCine] Video playback rejected:");
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.0.pause().map_err(js_error)
    }
}
