// Session: one drawing surface's worth of state. Wires geometry, scoring, the ledger,
// the prompt engine, and the atmosphere together around the seal action.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::atmosphere::{AmbienceSink, AtmosphereController};
use crate::classifier::{classify_style, StyleInputs};
use crate::config::EngineConfig;
use crate::error::ArchivistError;
use crate::geometry::{compute_signature_metrics, svg_path, validate_strokes};
use crate::ledger::{KeyValueStore, Ledger, MemoryStore, SealDraft, SealOutcome};
use crate::mastery::MasterySummary;
use crate::prompt::{PromptEngine, PromptRequest};
use crate::random::RandomSource;
use crate::report::{generate_report, TelemetryReport};
use crate::sentiment::{analyze_sentiment, determine_seal_color, SealColor};
use crate::types::{CanvasSize, PromptData, StyleAssessment, Stroke};

fn default_ink_color() -> String {
    "#1a1a1a".to_string()
}

/// What the host sends when the user seals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealRequest {
    pub strokes: Vec<Stroke>,
    pub time_taken_ms: u64,
    /// Measured drawing surface; the configured canvas when absent.
    #[serde(default)]
    pub canvas: Option<CanvasSize>,
    #[serde(default = "default_ink_color")]
    pub ink_color: String,
    #[serde(default)]
    pub seal_color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SealResponse {
    #[serde(flatten)]
    pub outcome: SealOutcome,
    pub style: StyleAssessment,
    pub next_prompt: PromptData,
}

pub struct Session<R: RandomSource, S: AmbienceSink> {
    config: EngineConfig,
    engine: PromptEngine,
    ledger: Ledger,
    rng: R,
    atmosphere: AtmosphereController<S>,
    current_prompt: PromptData,
}

impl<R: RandomSource, S: AmbienceSink> Session<R, S> {
    pub fn new(config: EngineConfig, rng: R, sink: S) -> Self {
        let ledger = Ledger::new(&config);
        Self::with_ledger(config, ledger, rng, sink)
    }

    /// Resume from persisted entries.
    pub fn restore<K: KeyValueStore>(
        config: EngineConfig,
        store: &K,
        rng: R,
        sink: S,
    ) -> Result<Self, ArchivistError> {
        let ledger = Ledger::restore(&config, store)?;
        Ok(Self::with_ledger(config, ledger, rng, sink))
    }

    fn with_ledger(config: EngineConfig, ledger: Ledger, mut rng: R, sink: S) -> Self {
        let engine = PromptEngine::from_config(&config);
        let current_prompt = engine.initial_prompt(&mut rng);
        let mut atmosphere = AtmosphereController::new(sink, config.audio.clone());
        atmosphere.set_vibe_tier(current_prompt.vibe_tier);
        Session {
            config,
            engine,
            ledger,
            rng,
            atmosphere,
            current_prompt,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn current_prompt(&self) -> &PromptData {
        &self.current_prompt
    }

    pub fn atmosphere(&self) -> &AtmosphereController<S> {
        &self.atmosphere
    }

    pub fn atmosphere_mut(&mut self) -> &mut AtmosphereController<S> {
        &mut self.atmosphere
    }

    /// Seal the drawn strokes under the current prompt and move to the next prompt.
    pub fn seal(&mut self, request: SealRequest, now_ms: u64) -> Result<SealResponse, ArchivistError> {
        validate_strokes(&request.strokes)?;

        let canvas = request.canvas.unwrap_or(self.config.canvas);
        let metrics = compute_signature_metrics(&request.strokes, request.time_taken_ms, &canvas);
        let style = classify_style(&StyleInputs::from(&metrics));
        let consistency = self.ledger.consistency_for(&metrics);
        let scale = metrics.scale;

        let draft = SealDraft {
            svg_path: svg_path(&request.strokes),
            ink_color: request.ink_color,
            prompt_title: self.current_prompt.prompt.clone(),
            primary_style: style.primary_style,
            metrics,
            consistency,
            prompt_metadata: Some(self.current_prompt.metadata.clone()),
            seal_color: request.seal_color,
        };
        let outcome = self.ledger.seal(draft, now_ms, &mut self.rng);
        info!(
            "sealed {} ({}, consistency {})",
            outcome.record.id, outcome.record.style_tag, consistency
        );

        let next = PromptRequest {
            primary_style: style.primary_style,
            consistency,
            signature_count: self.ledger.signature_count(),
            active_thread: self.ledger.threads().current,
            previous_vibe: self.current_prompt.vibe_tier,
            scale,
        };
        let next_prompt = self.engine.next_prompt(&next, &mut self.rng);
        debug!("next prompt: {}", next_prompt.prompt);
        self.atmosphere.set_vibe_tier(next_prompt.vibe_tier);
        self.current_prompt = next_prompt.clone();

        Ok(SealResponse {
            outcome,
            style,
            next_prompt,
        })
    }

    /// Wax colour the seal button should show for some text.
    pub fn seal_color_for(&mut self, text: &str) -> SealColor {
        determine_seal_color(&analyze_sentiment(text), &mut self.rng)
    }

    pub fn mastery(&self) -> MasterySummary {
        self.ledger.mastery_summary()
    }

    /// Build the telemetry report and clear the pending flag.
    pub fn report(&mut self, now_ms: u64) -> Option<TelemetryReport> {
        let report = generate_report(self.ledger.history(), now_ms)?;
        self.ledger.mark_report_generated();
        Some(report)
    }

    /// True once the first milestone is reached, until the latest report is shown.
    pub fn report_pending(&self) -> bool {
        !self.ledger.report_generated()
            && self.ledger.history().len() >= self.config.report_milestone
    }

    pub fn persist(&self) -> Result<MemoryStore, ArchivistError> {
        let mut store = MemoryStore::new();
        self.ledger.persist(&mut store)?;
        Ok(store)
    }

    /// Wipe the ledger and start over with a fresh first prompt.
    pub fn clear(&mut self) {
        self.ledger.clear();
        self.current_prompt = self.engine.initial_prompt(&mut self.rng);
        self.atmosphere.set_vibe_tier(self.current_prompt.vibe_tier);
        info!("ledger cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::{NullSink, RecordingSink};
    use crate::random::{seeded, ScriptedRandom};
    use crate::types::{PrimaryStyle, StrokePoint};
    use rand::rngs::SmallRng;

    fn line_request(length: f64) -> SealRequest {
        SealRequest {
            strokes: vec![Stroke::new(
                (0..=10)
                    .map(|i| StrokePoint::new(100.0 + i as f64 * length / 10.0, 300.0, i * 50))
                    .collect(),
            )],
            time_taken_ms: 500,
            canvas: None,
            ink_color: default_ink_color(),
            seal_color: None,
        }
    }

    fn session(seed: u64) -> Session<SmallRng, NullSink> {
        Session::new(EngineConfig::default(), seeded(seed), NullSink)
    }

    #[test]
    fn seal_records_current_prompt() {
        let mut s = session(3);
        let prompt = s.current_prompt().prompt.clone();
        let response = s.seal(line_request(100.0), 1_000).unwrap();

        assert_eq!(response.outcome.record.prompt_title, prompt);
        assert_eq!(response.outcome.record.consistency, 100);
        assert!(matches!(
            response.style.primary_style,
            PrimaryStyle::Whispered | PrimaryStyle::Monastic
        ));
        assert_eq!(s.ledger().history().len(), 1);
        assert_eq!(s.current_prompt(), &response.next_prompt);
    }

    #[test]
    fn empty_strokes_are_rejected() {
        let mut s = session(1);
        let request = SealRequest {
            strokes: vec![Stroke::new(Vec::new())],
            ..line_request(10.0)
        };
        assert!(matches!(
            s.seal(request, 0),
            Err(ArchivistError::EmptySignature)
        ));
        assert!(s.ledger().history().is_empty());
    }

    #[test]
    fn overflowing_coordinates_leave_ledger_restorable() {
        let mut s = session(8);
        s.seal(line_request(100.0), 1).unwrap();
        let request = SealRequest {
            strokes: vec![Stroke::new(vec![
                StrokePoint::new(-1.0e200, 0.0, 0),
                StrokePoint::new(1.0e200, 1.0e200, 10),
            ])],
            ..line_request(10.0)
        };
        assert!(matches!(
            s.seal(request, 2),
            Err(ArchivistError::InvalidStroke { .. })
        ));
        assert_eq!(s.ledger().history().len(), 1);

        let store = s.persist().unwrap();
        let restored: Session<SmallRng, NullSink> =
            Session::restore(EngineConfig::default(), &store, seeded(9), NullSink).unwrap();
        assert_eq!(restored.ledger().history().len(), 1);
    }

    #[test]
    fn consistency_drops_for_a_different_size() {
        let mut s = session(9);
        s.seal(line_request(100.0), 1).unwrap();
        let response = s.seal(line_request(50.0), 2).unwrap();
        assert!(response.outcome.record.consistency < 100);
    }

    #[test]
    fn report_clears_pending_flag() {
        let config = EngineConfig {
            report_milestone: 2,
            ..EngineConfig::default()
        };
        let mut s = Session::new(config, seeded(5), NullSink);
        assert!(s.report(0).is_none());
        s.seal(line_request(80.0), 1).unwrap();
        s.seal(line_request(80.0), 2).unwrap();
        assert!(s.report_pending());
        let report = s.report(10).unwrap();
        assert_eq!(report.selected_marks.len(), 2);
        assert!(!s.report_pending());
    }

    #[test]
    fn unviewed_report_stays_pending_past_milestone() {
        let config = EngineConfig {
            report_milestone: 2,
            ..EngineConfig::default()
        };
        let mut s = Session::new(config, seeded(6), NullSink);
        s.seal(line_request(80.0), 1).unwrap();
        assert!(!s.report_pending());
        s.seal(line_request(80.0), 2).unwrap();
        assert!(s.report_pending());
        s.seal(line_request(80.0), 3).unwrap();
        assert!(s.report_pending());

        s.report(10).unwrap();
        s.seal(line_request(80.0), 4).unwrap();
        assert!(s.report_pending());
        s.report(20).unwrap();
        s.seal(line_request(80.0), 5).unwrap();
        assert!(!s.report_pending());
    }

    #[test]
    fn restore_continues_history() {
        let mut s = session(11);
        s.seal(line_request(100.0), 1).unwrap();
        let store = s.persist().unwrap();

        let restored: Session<SmallRng, NullSink> =
            Session::restore(EngineConfig::default(), &store, seeded(12), NullSink).unwrap();
        assert_eq!(restored.ledger().history(), s.ledger().history());
    }

    #[test]
    fn clear_resets_ledger_and_prompt() {
        let mut s = session(2);
        s.seal(line_request(100.0), 1).unwrap();
        s.clear();
        assert!(s.ledger().history().is_empty());
        assert_eq!(s.mastery().score, 0);
    }

    #[test]
    fn seal_color_for_fire_is_passionate() {
        let mut s = Session::new(
            EngineConfig::default(),
            ScriptedRandom::constant(0.1),
            NullSink,
        );
        assert_eq!(s.seal_color_for("fire and blood").name, "Passionate");
    }

    #[test]
    fn atmosphere_follows_prompt_vibe() {
        let mut s = Session::new(EngineConfig::default(), seeded(4), RecordingSink::default());
        s.atmosphere_mut().init();
        for i in 0..5 {
            s.seal(line_request(100.0), i).unwrap();
            let expected = crate::atmosphere::Ambience::from(s.current_prompt().vibe_tier);
            assert_eq!(s.atmosphere().current_ambience(), expected);
        }
    }
}
