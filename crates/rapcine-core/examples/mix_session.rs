//! Mix session example
//!
//! Decodes a short beat payload and walks a mix session through start,
//! live gain changes, restart and stop against a console pipeline that
//! prints every call it receives.
//!
//! Run with: cargo run -p rapcine-core --example mix_session

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rapcine_core::{
    decode, AudioOutput, Gain, GainStage, LoopSource, MediaElement, MixSession,
    NormalizedAudioBuffer, Result, SERVICE_SAMPLE_RATE,
};

struct ConsoleOutput {
    sources: usize,
}

struct ConsoleSource {
    id: usize,
    playing: bool,
}

struct ConsoleGain(Gain);

struct ConsoleVideo;

impl AudioOutput for ConsoleOutput {
    type Source = ConsoleSource;
    type Gain = ConsoleGain;

    fn create_gain(&mut self, level: Gain) -> Result<ConsoleGain> {
        println!("  output: gain stage at {level}");
        Ok(ConsoleGain(level))
    }

    fn create_loop_source(&mut self, buffer: &NormalizedAudioBuffer, _gain: &ConsoleGain) -> Result<ConsoleSource> {
        self.sources += 1;
        println!(
            "  output: loop source #{} over {:.2}s",
            self.sources,
            buffer.duration_secs()
        );
        Ok(ConsoleSource {
            id: self.sources,
            playing: false,
        })
    }
}

impl LoopSource for ConsoleSource {
    fn start(&mut self) -> Result<()> {
        self.playing = true;
        println!("  source #{}: start", self.id);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.playing {
            return Err(rapcine_core::Error::audio("already stopped"));
        }
        self.playing = false;
        println!("  source #{}: stop", self.id);
        Ok(())
    }

    fn disconnect(&mut self) {
        println!("  source #{}: disconnect", self.id);
    }
}

impl GainStage for ConsoleGain {
    fn set_level(&mut self, level: Gain) {
        self.0 = level;
        println!("  gain: {level}");
    }

    fn level(&self) -> Gain {
        self.0
    }

    fn disconnect(&mut self) {}
}

impl MediaElement for ConsoleVideo {
    fn set_current_time(&mut self, seconds: f64) {
        println!("  video: seek to {seconds}s");
    }

    fn set_volume(&mut self, level: Gain) {
        println!("  video: volume {level}");
    }

    fn play(&mut self) -> Result<()> {
        println!("  video: play");
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        println!("  video: pause");
        Ok(())
    }
}

fn main() -> Result<()> {
    println!("RapCine Core - Mix Session Example");
    println!("==================================\n");

    let bytes: Vec<u8> = [0i16, 16384, -16384, 32767]
        .iter()
        .cycle()
        .take(SERVICE_SAMPLE_RATE as usize)
        .flat_map(|s| s.to_le_bytes())
        .collect();
    let buffer = decode(&STANDARD.encode(bytes), SERVICE_SAMPLE_RATE)?;
    println!(
        "Decoded {} samples, peak {:.3}, rms {:.3}\n",
        buffer.len(),
        buffer.peak(),
        buffer.rms()
    );

    let mut session = MixSession::new(ConsoleOutput { sources: 0 }, Gain::new(0.4)?, Gain::new(0.9)?);

    println!("start:");
    session.start(buffer.clone(), Gain::new(0.4)?, Gain::new(0.9)?, ConsoleVideo)?;

    println!("\nlive gain changes:");
    session.set_beat_gain(Gain::SILENT);
    session.set_beat_gain(Gain::UNITY);
    session.set_vocal_gain(Gain::new(0.6)?);

    println!("\nrestart:");
    session.replace(buffer, ConsoleVideo)?;

    println!("\nstop (twice):");
    session.stop();
    session.stop();

    println!("\nFinal state: {}", session.state());
    Ok(())
}
