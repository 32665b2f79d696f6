//! Per-frame driver
//!
//! Hosts collect input between frames into a `TickInput` and hand it to
//! `tick` together with the elapsed time.

use super::engine::RoundEngine;
use super::state::{RoundStatus, TargetKind};
use crate::consts::AUTOPLAY_REACTION_MS;
use crate::persistence::Storage;

/// Input gathered since the previous frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Slots clicked, in click order
    pub clicks: Vec<usize>,
    /// Pause toggle
    pub pause: bool,
    /// Wall clock (Unix ms) for stamping results
    pub wall_clock_ms: Option<f64>,
    /// Demo mode - a bot whacks capybaras and leaves bombs alone
    pub autoplay: bool,
}

impl TickInput {
    /// Clear one-shot inputs after they were applied
    pub fn clear_one_shots(&mut self) {
        self.clicks.clear();
        self.pause = false;
    }
}

/// Apply `input`, then advance the engine by `dt_ms`
pub fn tick<S: Storage>(engine: &mut RoundEngine<S>, input: &TickInput, dt_ms: u64) {
    if let Some(now) = input.wall_clock_ms {
        engine.set_wall_clock(now);
    }

    if input.pause {
        engine.toggle_pause();
    }

    for &slot in &input.clicks {
        engine.on_slot_clicked(slot);
    }

    if input.autoplay && engine.status() == RoundStatus::Running {
        let now = engine.now_ms();
        let ripe: Vec<usize> = engine
            .visible_targets()
            .filter(|(_, t)| t.kind == TargetKind::Collectible)
            .filter(|(_, t)| now.saturating_sub(t.shown_at_ms) >= AUTOPLAY_REACTION_MS)
            .map(|(slot, _)| slot)
            .collect();
        for slot in ripe {
            engine.on_slot_clicked(slot);
        }
    }

    engine.advance(dt_ms);
}
