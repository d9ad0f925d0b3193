// archivist_core: Midnight Archivist Rust/WASM engine
// Signature analysis, adaptive prompts, and the ledger live here; JS is plumbing.

mod achievements;
mod atmosphere;
mod classifier;
mod config;
mod consistency;
mod error;
mod geometry;
mod ink;
mod ledger;
mod lexicon;
mod mastery;
mod prompt;
mod random;
mod report;
mod sentiment;
mod session;
mod threads;
mod types;

use rand::rngs::SmallRng;
use wasm_bindgen::prelude::*;

pub use achievements::{
    evaluate_achievements, find_achievement, Achievement, AchievementCategory, Condition,
    EarnedAchievement, ACHIEVEMENTS,
};
pub use atmosphere::{
    Ambience, AmbienceSink, AmbienceVoice, AtmosphereCommand, AtmosphereController, InkSound,
    NullSink, RecordingSink,
};
pub use classifier::{classify_style, display_style, style_score, StyleInputs};
pub use config::{AudioSettings, EngineConfig};
pub use consistency::{score_against_history, score_consistency, Footprint};
pub use error::ArchivistError;
pub use geometry::{compute_signature_metrics, svg_path, validate_strokes};
pub use ink::{ink_flow, pointer_velocity, stroke_width, InkEffect, InkFlow};
pub use ledger::{
    clear_persisted, KeyValueStore, Ledger, MemoryStore, SealDraft, SealOutcome, LEDGER_KEYS,
};
pub use lexicon::{
    available_words, check_new_unlock, select_prompt_words, unlocked_lexicon_ids, unlocked_packs,
    LexiconPack, PromptWords, WordKind, CORE_LEXICON, UNLOCKABLE_PACKS,
};
pub use mastery::{mastery_trend, recent_mastery, MasteryLevel, MasterySummary, MasteryTrend};
pub use prompt::{PromptEngine, PromptPath, PromptRequest, FIXED_LEGACY_PROMPTS};
pub use random::{seeded, RandomSource, ScriptedRandom};
pub use report::{generate_report, TelemetryReport};
pub use sentiment::{
    analyze_sentiment, analyze_words, determine_seal_color, sentiment_intensity, Mood, SealColor,
    SentimentScores,
};
pub use session::{SealRequest, SealResponse, Session};
pub use threads::{detect_thread, ThreadState};
pub use types::*;

/// Install the panic hook and console logger.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(feature = "console_log")]
    {
        let _ = console_log::init_with_level(log::Level::Info);
    }
}

fn to_js(err: ArchivistError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Main engine interface exposed to JavaScript.
/// Every call exchanges JSON strings; timestamps come from the host clock.
#[wasm_bindgen]
pub struct Archivist {
    session: Session<SmallRng, RecordingSink>,
}

impl Archivist {
    fn build(
        config_json: &str,
        persisted_json: Option<String>,
        seed: u64,
    ) -> Result<Archivist, ArchivistError> {
        let config = EngineConfig::from_json(config_json)?;
        let rng = seeded(seed);
        let sink = RecordingSink::default();

        let session = match persisted_json {
            Some(json) if !json.trim().is_empty() => {
                let store = MemoryStore::from_json(&json)?;
                Session::restore(config, &store, rng, sink)?
            }
            _ => Session::new(config, rng, sink),
        };
        Ok(Archivist { session })
    }
}

#[wasm_bindgen]
impl Archivist {
    /// `persisted_json` is the object previously returned by `persist`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, persisted_json: Option<String>) -> Result<Archivist, JsValue> {
        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        Archivist::build(config_json, persisted_json, seed).map_err(to_js)
    }

    /// Deterministic construction for replays and tests.
    pub fn with_seed(
        config_json: &str,
        persisted_json: Option<String>,
        seed: u64,
    ) -> Result<Archivist, JsValue> {
        Archivist::build(config_json, persisted_json, seed).map_err(to_js)
    }

    pub fn current_prompt(&self) -> Result<String, JsValue> {
        to_json(self.session.current_prompt())
    }

    /// Seal a `SealRequest`. Returns the record, unlocks, achievements, and the next prompt.
    pub fn seal(&mut self, request_json: &str, now_ms: u64) -> Result<String, JsValue> {
        let request: SealRequest = serde_json::from_str(request_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid seal request: {}", e)))?;
        let response = self.session.seal(request, now_ms).map_err(to_js)?;
        to_json(&response)
    }

    pub fn seal_color_for(&mut self, text: &str) -> Result<String, JsValue> {
        to_json(&self.session.seal_color_for(text))
    }

    pub fn mastery(&self) -> Result<String, JsValue> {
        to_json(&self.session.mastery())
    }

    pub fn report_pending(&self) -> bool {
        self.session.report_pending()
    }

    /// Telemetry report JSON, or `null` before the first seal.
    pub fn report(&mut self, now_ms: u64) -> Result<String, JsValue> {
        to_json(&self.session.report(now_ms))
    }

    /// Entries to write to the host's key-value store.
    pub fn persist(&self) -> Result<String, JsValue> {
        self.session.persist().and_then(|s| s.to_json()).map_err(to_js)
    }

    pub fn ink_flow(&self, velocity: f64) -> Result<String, JsValue> {
        to_json(&ink_flow(velocity))
    }

    pub fn stroke_width(&self, points_json: &str) -> Result<f64, JsValue> {
        let points: Vec<StrokePoint> = serde_json::from_str(points_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid points: {}", e)))?;
        Ok(stroke_width(&points))
    }

    pub fn audio_init(&mut self) {
        self.session.atmosphere_mut().init();
    }

    pub fn audio_teardown(&mut self) {
        self.session.atmosphere_mut().teardown();
    }

    pub fn ink_stroke(&mut self, speed: f32) {
        self.session.atmosphere_mut().ink_stroke(speed);
    }

    /// Audio commands queued since the last drain.
    pub fn drain_audio(&mut self) -> Result<String, JsValue> {
        to_json(&self.session.atmosphere_mut().sink_mut().drain())
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STROKE: &str = r#"{
        "strokes": [{"points": [
            {"x": 100, "y": 300, "time": 0},
            {"x": 150, "y": 300, "time": 250},
            {"x": 200, "y": 300, "time": 500}
        ]}],
        "time_taken_ms": 500
    }"#;

    #[test]
    fn archivist_creation_works() {
        let archivist = Archivist::with_seed("{}", None, 7);
        assert!(archivist.is_ok());
    }

    #[test]
    fn seal_and_persist_round_trip() {
        let mut archivist = Archivist::with_seed("{}", None, 7).unwrap();
        let response = archivist.seal(STROKE, 1_000).unwrap();
        let value: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["record"]["id"], 1_000);
        assert!(value["next_prompt"]["prompt"].is_string());

        let persisted = archivist.persist().unwrap();
        let restored = Archivist::with_seed("{}", Some(persisted), 8).unwrap();
        let mastery: serde_json::Value =
            serde_json::from_str(&restored.mastery().unwrap()).unwrap();
        assert_eq!(mastery["score"], 100);
    }

    #[test]
    fn report_is_null_before_first_seal() {
        let mut archivist = Archivist::with_seed("{}", None, 1).unwrap();
        assert_eq!(archivist.report(0).unwrap(), "null");
        assert!(!archivist.report_pending());
    }

    #[test]
    fn audio_commands_drain() {
        let mut archivist = Archivist::with_seed("{}", None, 3).unwrap();
        archivist.ink_stroke(2.0);
        let drained: serde_json::Value =
            serde_json::from_str(&archivist.drain_audio().unwrap()).unwrap();
        let commands = drained.as_array().unwrap();
        assert_eq!(commands.last().unwrap()["command"], "play_ink");
        assert_eq!(archivist.drain_audio().unwrap(), "[]");
    }

    #[test]
    fn ink_helpers() {
        let archivist = Archivist::with_seed("{}", None, 3).unwrap();
        assert!(archivist.ink_flow(0.01).unwrap().contains("soaking"));
        let width = archivist
            .stroke_width(r#"[{"x":0,"y":0,"time":0},{"x":1,"y":0,"time":1}]"#)
            .unwrap();
        assert_eq!(width, 0.5);
    }
}
