// Engine configuration passed from JS. Every field has a default so `{}` is a valid config.

use serde::{Deserialize, Serialize};

use crate::error::ArchivistError;
use crate::types::CanvasSize;

/// Tunables for prompt generation, scoring windows, and the atmosphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Chance that each prompt word comes from an unlocked pack instead of the core lexicon.
    #[serde(default = "default_pack_word_probability")]
    pub pack_word_probability: f64,
    /// Chance of a fixed legacy prompt when no thread continues.
    #[serde(default = "default_legacy_prompt_probability")]
    pub legacy_prompt_probability: f64,
    /// Added to consistency/100 to get the thread continuation chance.
    #[serde(default = "default_thread_continuation_bonus")]
    pub thread_continuation_bonus: f64,
    /// Number of prior records the consistency score compares against.
    #[serde(default = "default_consistency_window")]
    pub consistency_window: usize,
    #[serde(default = "default_mastery_window")]
    pub mastery_window: usize,
    /// Number of mastery scores kept in the ledger.
    #[serde(default = "default_mastery_history_cap")]
    pub mastery_history_cap: usize,
    /// A telemetry report becomes due every time the history length hits a multiple of this.
    #[serde(default = "default_report_milestone")]
    pub report_milestone: usize,
    /// Used when the host cannot measure the drawing surface.
    #[serde(default)]
    pub canvas: CanvasSize,
    #[serde(default)]
    pub audio: AudioSettings,
}

fn default_pack_word_probability() -> f64 {
    0.25
}

fn default_legacy_prompt_probability() -> f64 {
    0.10
}

fn default_thread_continuation_bonus() -> f64 {
    0.2
}

fn default_consistency_window() -> usize {
    3
}

fn default_mastery_window() -> usize {
    10
}

fn default_mastery_history_cap() -> usize {
    20
}

fn default_report_milestone() -> usize {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            pack_word_probability: default_pack_word_probability(),
            legacy_prompt_probability: default_legacy_prompt_probability(),
            thread_continuation_bonus: default_thread_continuation_bonus(),
            consistency_window: default_consistency_window(),
            mastery_window: default_mastery_window(),
            mastery_history_cap: default_mastery_history_cap(),
            report_milestone: default_report_milestone(),
            canvas: CanvasSize::default(),
            audio: AudioSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ArchivistError> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| ArchivistError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ArchivistError> {
        for (name, value) in [
            ("pack_word_probability", self.pack_word_probability),
            ("legacy_prompt_probability", self.legacy_prompt_probability),
            ("thread_continuation_bonus", self.thread_continuation_bonus),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ArchivistError::InvalidConfig(format!(
                    "{name} must be within 0..=1, got {value}"
                )));
            }
        }

        for (name, value) in [
            ("consistency_window", self.consistency_window),
            ("mastery_window", self.mastery_window),
            ("mastery_history_cap", self.mastery_history_cap),
            ("report_milestone", self.report_milestone),
        ] {
            if value == 0 {
                return Err(ArchivistError::InvalidConfig(format!(
                    "{name} must be at least 1"
                )));
            }
        }

        if self.audio.master_volume > 100 {
            return Err(ArchivistError::InvalidConfig(format!(
                "audio.master_volume must be within 0..=100, got {}",
                self.audio.master_volume
            )));
        }

        Ok(())
    }
}

/// Audio levels for the atmosphere. Playback itself happens in JS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    #[serde(default = "default_master_volume")]
    pub master_volume: u8,
    #[serde(default = "default_true")]
    pub music: bool,
}

fn default_master_volume() -> u8 {
    100
}

fn default_true() -> bool {
    true
}

impl Default for AudioSettings {
    fn default() -> Self {
        AudioSettings {
            master_volume: default_master_volume(),
            music: true,
        }
    }
}

impl AudioSettings {
    /// Master volume as a 0.0-1.0 gain factor.
    pub fn master_gain(&self) -> f32 {
        f32::from(self.master_volume.min(100)) / 100.0
    }
}
