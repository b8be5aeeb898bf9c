//! Prompt text sent to the score service

use crate::types::AnalysisResult;

/// Prompt asking for mood, tempo, instrument layers and a short report
pub fn analysis_prompt(layer_count: u32, report_language: &str) -> String {
    format!(
        "Analyze this rap performance.\n\
         1. Detect the core emotional mood (e.g. Dark, Epic, Chill, Aggressive).\n\
         2. Detect the BPM (tempo).\n\
         3. Estimate the performance intensity from 0 to 1.\n\
         4. List {layer_count} cinematic instruments that would fit as a background beat \
         (e.g. Heavy 808 Bass, Orchestral Strings, Dark Synths, Taiko Drums).\n\
         5. Write a 1-sentence hype report in {report_language}.\n\
         Return strictly JSON."
    )
}

/// Prompt asking for an instrumental beat matching `analysis`
pub fn beat_prompt(analysis: &AnalysisResult, duration_secs: u32) -> String {
    let instrumentation = if analysis.layers.is_empty() {
        "Heavy drums, deep bass".to_string()
    } else {
        analysis.layers.join(", ")
    };

    format!(
        "Generate a {duration_secs}-second HIGH-QUALITY CINEMATIC BEAT for a rap song.\n\
         STYLE: Cinematic {mood} Rap.\n\
         BPM: {bpm}.\n\
         INSTRUMENTATION: {instrumentation}.\n\
         REQUIREMENT: Pure instrumental music only. Heavy drums, deep bass, and cinematic atmosphere.\n\
         ABSOLUTELY NO HUMAN VOICES OR SPEECH.",
        mood = analysis.mood,
        bpm = analysis.bpm.round(),
    )
}
