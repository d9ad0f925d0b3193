// Atmosphere: ambience and ink-scratch sound parameters driven by the prompt's vibe.
// The controller decides what should sound; an injected sink performs it.

use serde::{Deserialize, Serialize};

use crate::config::AudioSettings;
use crate::types::VibeTier;

/// Fixed headroom applied on top of the user's master volume.
const MASTER_HEADROOM: f32 = 0.3;

/// Ambience moods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ambience {
    Bureaucratic,
    Eldritch,
    Majestic,
}

impl From<VibeTier> for Ambience {
    fn from(tier: VibeTier) -> Self {
        match tier {
            VibeTier::Methodical => Ambience::Bureaucratic,
            VibeTier::Raw => Ambience::Eldritch,
            VibeTier::Aspirational => Ambience::Majestic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Triangle,
}

/// Frequency modulation applied to an ambience oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lfo {
    pub frequency_hz: f32,
    pub depth_hz: f32,
}

/// One synthesized drone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbienceVoice {
    pub ambience: Ambience,
    pub waveform: Waveform,
    pub frequency_hz: f32,
    pub gain: f32,
    pub lfo: Option<Lfo>,
}

impl Ambience {
    pub fn voice(&self) -> AmbienceVoice {
        match self {
            Ambience::Bureaucratic => AmbienceVoice {
                ambience: *self,
                waveform: Waveform::Sine,
                frequency_hz: 60.0,
                gain: 0.05,
                lfo: None,
            },
            Ambience::Eldritch => AmbienceVoice {
                ambience: *self,
                waveform: Waveform::Triangle,
                frequency_hz: 40.0,
                gain: 0.08,
                lfo: Some(Lfo {
                    frequency_hz: 0.5,
                    depth_hz: 10.0,
                }),
            },
            Ambience::Majestic => AmbienceVoice {
                ambience: *self,
                waveform: Waveform::Sine,
                frequency_hz: 100.0,
                gain: 0.05,
                lfo: None,
            },
        }
    }
}

/// A short band-passed noise burst for one pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkSound {
    pub playback_rate: f32,
    pub filter_frequency_hz: f32,
    pub gain: f32,
    /// Gain reached at the end of the ramp.
    pub release_gain: f32,
    pub ramp_seconds: f32,
    pub duration_seconds: f32,
}

impl InkSound {
    /// Faster strokes scratch higher and brighter.
    pub fn for_speed(speed: f32) -> Self {
        let speed = speed.max(0.0);
        let playback_rate = if speed > 5.0 {
            1.2
        } else if speed < 1.0 {
            0.6 + speed * 0.3
        } else {
            0.8 + speed * 0.05
        };
        InkSound {
            playback_rate,
            filter_frequency_hz: 800.0 + speed * 100.0,
            gain: 0.1,
            release_gain: 0.01,
            ramp_seconds: 0.1,
            duration_seconds: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AtmosphereCommand {
    SetMasterGain { gain: f32 },
    StartAmbience { voice: AmbienceVoice },
    StopAmbience,
    PlayInk { sound: InkSound },
}

/// Receives commands from the controller.
pub trait AmbienceSink {
    fn apply(&mut self, command: AtmosphereCommand);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl AmbienceSink for NullSink {
    fn apply(&mut self, _command: AtmosphereCommand) {}
}

/// Queues commands for the host to drain and perform.
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Vec<AtmosphereCommand>,
}

impl RecordingSink {
    pub fn commands(&self) -> &[AtmosphereCommand] {
        &self.commands
    }

    pub fn drain(&mut self) -> Vec<AtmosphereCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl AmbienceSink for RecordingSink {
    fn apply(&mut self, command: AtmosphereCommand) {
        self.commands.push(command);
    }
}

/// Owns the atmosphere lifecycle. Construct one per session.
#[derive(Debug)]
pub struct AtmosphereController<S: AmbienceSink> {
    sink: S,
    audio: AudioSettings,
    current: Ambience,
    initialized: bool,
    ambience_playing: bool,
}

impl<S: AmbienceSink> AtmosphereController<S> {
    pub fn new(sink: S, audio: AudioSettings) -> Self {
        AtmosphereController {
            sink,
            audio,
            current: Ambience::Bureaucratic,
            initialized: false,
            ambience_playing: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn current_ambience(&self) -> Ambience {
        self.current
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn master_gain(&self) -> f32 {
        MASTER_HEADROOM * self.audio.master_gain()
    }

    /// Idempotent.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.sink.apply(AtmosphereCommand::SetMasterGain {
            gain: self.master_gain(),
        });
        self.start_ambience();
    }

    pub fn teardown(&mut self) {
        if !self.initialized {
            return;
        }
        self.stop_ambience();
        self.initialized = false;
    }

    pub fn set_audio(&mut self, audio: AudioSettings) {
        self.audio = audio;
        if self.initialized {
            self.sink.apply(AtmosphereCommand::SetMasterGain {
                gain: self.master_gain(),
            });
            self.stop_ambience();
            self.start_ambience();
        }
    }

    /// Switch ambience when the vibe changes. No-op for the same ambience.
    pub fn set_vibe_tier(&mut self, tier: VibeTier) {
        let ambience = Ambience::from(tier);
        if ambience == self.current {
            return;
        }
        self.current = ambience;
        if self.initialized {
            self.stop_ambience();
            self.start_ambience();
        }
    }

    /// Scratch sound for a pointer move of `speed` pixels. Initializes lazily.
    pub fn ink_stroke(&mut self, speed: f32) {
        self.init();
        self.sink.apply(AtmosphereCommand::PlayInk {
            sound: InkSound::for_speed(speed),
        });
    }

    fn start_ambience(&mut self) {
        if !self.audio.music {
            return;
        }
        self.sink.apply(AtmosphereCommand::StartAmbience {
            voice: self.current.voice(),
        });
        self.ambience_playing = true;
    }

    fn stop_ambience(&mut self) {
        if self.ambience_playing {
            self.sink.apply(AtmosphereCommand::StopAmbience);
            self.ambience_playing = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> AtmosphereController<RecordingSink> {
        AtmosphereController::new(RecordingSink::default(), AudioSettings::default())
    }

    #[test]
    fn init_sets_gain_and_starts_ambience_once() {
        let mut atmo = controller();
        atmo.init();
        atmo.init();
        let commands = atmo.sink_mut().drain();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], AtmosphereCommand::SetMasterGain { gain } if (gain - 0.3).abs() < 1e-6));
        match commands[1] {
            AtmosphereCommand::StartAmbience { voice } => {
                assert_eq!(voice.ambience, Ambience::Bureaucratic);
                assert_eq!(voice.frequency_hz, 60.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn vibe_change_crossfades() {
        let mut atmo = controller();
        atmo.init();
        atmo.sink_mut().drain();

        atmo.set_vibe_tier(VibeTier::Methodical);
        assert!(atmo.sink().commands().is_empty());

        atmo.set_vibe_tier(VibeTier::Raw);
        let commands = atmo.sink_mut().drain();
        assert_eq!(commands[0], AtmosphereCommand::StopAmbience);
        match commands[1] {
            AtmosphereCommand::StartAmbience { voice } => {
                assert_eq!(voice.waveform, Waveform::Triangle);
                assert_eq!(
                    voice.lfo,
                    Some(Lfo {
                        frequency_hz: 0.5,
                        depth_hz: 10.0
                    })
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn vibe_before_init_is_remembered() {
        let mut atmo = controller();
        atmo.set_vibe_tier(VibeTier::Aspirational);
        assert!(atmo.sink().commands().is_empty());
        atmo.init();
        let started = atmo.sink().commands().iter().any(|c| {
            matches!(c, AtmosphereCommand::StartAmbience { voice } if voice.ambience == Ambience::Majestic)
        });
        assert!(started);
    }

    #[test]
    fn ink_sound_tracks_speed() {
        assert!((InkSound::for_speed(0.0).playback_rate - 0.6).abs() < 1e-6);
        assert!((InkSound::for_speed(2.0).playback_rate - 0.9).abs() < 1e-6);
        assert_eq!(InkSound::for_speed(10.0).playback_rate, 1.2);
        assert_eq!(InkSound::for_speed(2.0).filter_frequency_hz, 1000.0);
    }

    #[test]
    fn ink_stroke_initializes_lazily_and_teardown_stops() {
        let mut atmo = controller();
        atmo.ink_stroke(3.0);
        assert!(atmo.is_initialized());
        assert!(matches!(
            atmo.sink().commands().last(),
            Some(AtmosphereCommand::PlayInk { .. })
        ));
        atmo.sink_mut().drain();
        atmo.teardown();
        assert_eq!(atmo.sink().commands(), &[AtmosphereCommand::StopAmbience]);
        assert!(!atmo.is_initialized());
    }

    #[test]
    fn muted_music_skips_ambience() {
        let audio = AudioSettings {
            master_volume: 50,
            music: false,
        };
        let mut atmo = AtmosphereController::new(RecordingSink::default(), audio);
        atmo.init();
        assert_eq!(atmo.sink().commands().len(), 1);
        assert!((atmo.master_gain() - 0.15).abs() < 1e-6);
        atmo.teardown();
        assert_eq!(atmo.sink().commands().len(), 1);
    }

    #[test]
    fn null_sink_accepts_everything() {
        let mut atmo = AtmosphereController::new(NullSink, AudioSettings::default());
        atmo.init();
        atmo.ink_stroke(1.0);
        atmo.teardown();
        assert!(!atmo.is_initialized());
    }
}
