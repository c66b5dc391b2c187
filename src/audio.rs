//! Note playback using the Web Audio API
//!
//! Two interchangeable engines behind a small capability trait:
//! - `SampleEngine` plays preloaded per-note audio files
//! - `SynthEngine` generates tones procedurally; its timbre follows the
//!   current level
//!
//! The `AudioRouter` owns both and switches explicitly. Playback is
//! fire-and-forget: failures are logged and swallowed, never surfaced to
//! the game.

use std::collections::HashMap;

use web_sys::{
    AudioContext, AudioContextState, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType,
};

use crate::engine::melody::{self, note_frequency};
use crate::settings::AudioEngineKind;

/// Capability interface for a note-playback backend
pub trait NoteEngine {
    fn play_note(&mut self, note: &str);
    fn set_enabled(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;
    /// Optional capability: engines that voice levels differently
    fn set_level(&mut self, _level: u8) {}
}

/// Plays preloaded audio files, one per note name
pub struct SampleEngine {
    cache: HashMap<&'static str, HtmlAudioElement>,
    enabled: bool,
}

impl Default for SampleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleEngine {
    pub fn new() -> Self {
        let mut cache = HashMap::new();
        // The seven naturals cover both the melody and the fallback cycle
        for note in melody::FALLBACK_NOTES {
            match HtmlAudioElement::new_with_src(&format!("/audio/{note}.mp3")) {
                Ok(audio) => {
                    audio.set_preload("auto");
                    cache.insert(note, audio);
                }
                Err(err) => log::warn!("Failed to preload audio for {note}: {err:?}"),
            }
        }
        Self {
            cache,
            enabled: true,
        }
    }
}

impl NoteEngine for SampleEngine {
    fn play_note(&mut self, note: &str) {
        if !self.enabled {
            return;
        }
        let Some(audio) = self.cache.get(note) else {
            log::warn!("No sample loaded for note {note}");
            return;
        };
        // Rewind in case the previous playback is still running
        audio.set_current_time(0.0);
        if let Err(err) = audio.play() {
            log::warn!("Failed to play {note}: {err:?}");
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Procedural synth; timbre tier matches the game level:
/// level 1 a plain piano-ish sine, level 2 a detuned electric square,
/// level 3 an octave up with a long tail
pub struct SynthEngine {
    ctx: Option<AudioContext>,
    enabled: bool,
    level: u8,
    volume: f32,
}

impl Default for SynthEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthEngine {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - synth disabled");
        }
        Self {
            ctx,
            enabled: true,
            level: 1,
            volume: 0.8,
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Level 1 - plain piano tone
    fn play_piano(&self, ctx: &AudioContext, freq: f32, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.4, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.45)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.5).ok();
    }

    /// Level 2 - electric piano: square carrier plus a detuned shadow
    fn play_electric(&self, ctx: &AudioContext, freq: f32, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.55).ok();
        }

        // Slight detune gives the chorus shimmer
        if let Some((osc, gain)) = self.create_osc(ctx, freq * 1.01, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.12, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.45).ok();
        }
    }

    /// Level 3 - an octave up with a long reverb-ish tail
    fn play_bright(&self, ctx: &AudioContext, freq: f32, vol: f32) {
        let t = ctx.current_time();
        let freq = freq * 2.0;

        if let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.35, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 1.2)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 1.3).ok();
        }

        if let Some((osc, gain)) = self.create_osc(ctx, freq * 1.005, OscillatorType::Triangle) {
            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.9)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 1.0).ok();
        }
    }
}

impl NoteEngine for SynthEngine {
    fn play_note(&mut self, note: &str) {
        if !self.enabled || self.volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers suspend the context until a user gesture
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let Some(freq) = note_frequency(note) else {
            log::warn!("Unplayable note name {note}");
            return;
        };

        match self.level {
            1 => self.play_piano(ctx, freq, self.volume),
            2 => self.play_electric(ctx, freq, self.volume),
            _ => self.play_bright(ctx, freq, self.volume),
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_level(&mut self, level: u8) {
        self.level = level.clamp(1, melody::MAX_LEVEL);
    }
}

/// Owns both engines and routes to the active one
pub struct AudioRouter {
    sample: SampleEngine,
    synth: SynthEngine,
    active: AudioEngineKind,
}

impl AudioRouter {
    pub fn new(active: AudioEngineKind) -> Self {
        Self {
            sample: SampleEngine::new(),
            synth: SynthEngine::new(),
            active,
        }
    }

    pub fn switch_engine(&mut self, kind: AudioEngineKind) {
        if self.active != kind {
            log::info!("Audio engine -> {}", kind.as_str());
            self.active = kind;
        }
    }

    pub fn active_kind(&self) -> AudioEngineKind {
        self.active
    }

    pub fn play_note(&mut self, note: &str) {
        match self.active {
            AudioEngineKind::Sample => self.sample.play_note(note),
            AudioEngineKind::Synth => self.synth.play_note(note),
        }
    }

    /// Forward a level change to every engine that voices levels
    pub fn set_level(&mut self, level: u8) {
        self.sample.set_level(level);
        self.synth.set_level(level);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.sample.set_enabled(enabled);
        self.synth.set_enabled(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        match self.active {
            AudioEngineKind::Sample => self.sample.is_enabled(),
            AudioEngineKind::Synth => self.synth.is_enabled(),
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.synth.set_volume(volume);
    }
}
