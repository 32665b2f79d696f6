//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::SoundKind;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: 0.8,
        }
    }

    /// Play a sound cue. Muting is handled upstream by the sound setting.
    pub fn play(&self, kind: SoundKind) {
        let vol = self.volume;
        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match kind {
            SoundKind::Hit => self.play_hit(ctx, vol),
            SoundKind::Hazard => self.play_bomb(ctx, vol),
            SoundKind::LevelUp => self.play_level_up(ctx, vol),
            SoundKind::TimeUp => self.play_time_up(ctx, vol),
            SoundKind::HighScore => self.play_high_score(ctx, vol),
        }
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

    /// Single decaying tone starting at `start` seconds from now
    fn blip(&self, ctx: &AudioContext, freq: f32, osc_type: OscillatorType, peak: f32, start: f64, len: f64) {
        let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
            return;
        };
        let t = ctx.current_time() + start;

        gain.gain().set_value_at_time(0.0, ctx.current_time()).ok();
        gain.gain().set_value_at_time(peak, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, t + len).ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + len + 0.02).ok();
    }

    /// Whack - short bonk with a falling pitch
    fn play_hit(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 520.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.5, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.12).ok();
        osc.frequency().set_value_at_time(520.0, t).ok();
        osc.frequency().exponential_ramp_to_value_at_time(180.0, t + 0.1).ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Bomb - low rumble plus noisy crackle
    fn play_bomb(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 90.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.7, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.6).ok();
            osc.frequency().set_value_at_time(90.0, t).ok();
            osc.frequency().exponential_ramp_to_value_at_time(30.0, t + 0.5).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.65).ok();
        }

        if let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.3).ok();
            osc.frequency().set_value_at_time(200.0, t).ok();
            osc.frequency().set_value_at_time(1200.0, t + 0.02).ok();
            osc.frequency().set_value_at_time(150.0, t + 0.05).ok();
            osc.frequency().set_value_at_time(900.0, t + 0.08).ok();
            osc.frequency().set_value_at_time(100.0, t + 0.12).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.35).ok();
        }
    }

    /// Level up - rising arpeggio
    fn play_level_up(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [523.25, 659.25, 783.99].into_iter().enumerate() {
            self.blip(ctx, freq, OscillatorType::Square, vol * 0.2, i as f64 * 0.08, 0.12);
        }
    }

    /// Time up - two falling tones
    fn play_time_up(&self, ctx: &AudioContext, vol: f32) {
        self.blip(ctx, 440.0, OscillatorType::Triangle, vol * 0.4, 0.0, 0.25);
        self.blip(ctx, 330.0, OscillatorType::Triangle, vol * 0.4, 0.25, 0.4);
    }

    /// High score - fanfare
    fn play_high_score(&self, ctx: &AudioContext, vol: f32) {
        let notes = [523.25, 659.25, 783.99, 1046.5];
        for (i, freq) in notes.into_iter().enumerate() {
            self.blip(ctx, freq, OscillatorType::Square, vol * 0.2, 0.4 + i as f64 * 0.1, 0.2);
        }
    }
}
