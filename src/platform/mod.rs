//! Platform abstraction layer
//!
//! The engine never touches the page. It queues `RoundEvent`s; a host drains
//! them and forwards them to a `Presenter`:
//! - DOM grid, HUD and summary popup on web (see the binary)
//! - Log output for the native demo

use crate::sim::{Outcome, RoundEvent, RoundSummary, SoundKind, TargetKind};

/// Display side of the game
pub trait Presenter {
    /// Show or hide a slot's target
    fn render_slot_state(&mut self, slot: usize, visible: bool, kind: Option<TargetKind>);

    fn update_scoreboard(&mut self, score: u32, level: u32, time_remaining: u32);

    /// Level progress bar (0.0 - 1.0)
    fn update_level_progress(&mut self, _fraction: f32) {}

    fn set_paused(&mut self, _paused: bool) {}

    fn show_session_summary(&mut self, summary: &RoundSummary);

    fn play_sound(&mut self, kind: SoundKind);
}

/// Forward queued events. Sounds are dropped when `sound_enabled` is false.
pub fn present<P: Presenter + ?Sized>(
    events: impl IntoIterator<Item = RoundEvent>,
    presenter: &mut P,
    sound_enabled: bool,
) {
    for event in events {
        match event {
            RoundEvent::SlotChanged {
                slot,
                visible,
                kind,
            } => presenter.render_slot_state(slot, visible, kind),
            RoundEvent::Scoreboard {
                score,
                level,
                time_remaining,
            } => presenter.update_scoreboard(score, level, time_remaining),
            RoundEvent::LevelProgress(fraction) => presenter.update_level_progress(fraction),
            RoundEvent::LevelUp { .. } => {}
            RoundEvent::Paused(paused) => presenter.set_paused(paused),
            RoundEvent::Sound(kind) => {
                if sound_enabled {
                    presenter.play_sound(kind);
                }
            }
            RoundEvent::Ended(summary) => presenter.show_session_summary(&summary),
        }
    }
}

/// Summary popup text
pub fn summary_message(summary: &RoundSummary) -> String {
    let mut message = match summary.outcome {
        Outcome::Hazard => format!("💥 Bomb! Score: {}", summary.score),
        Outcome::Timeout => format!(
            "⏰ Time's up! Score: {} | Level: {}",
            summary.score, summary.level
        ),
    };
    if let Some(rank) = summary.rank {
        message.push_str(&format!(" | Rank #{}", rank));
    }
    message
}

/// Presenter that writes everything to the log
#[derive(Debug, Default)]
pub struct LogPresenter {
    pub summaries: Vec<RoundSummary>,
}

impl Presenter for LogPresenter {
    fn render_slot_state(&mut self, slot: usize, visible: bool, kind: Option<TargetKind>) {
        log::debug!("slot {} visible={} kind={:?}", slot, visible, kind);
    }

    fn update_scoreboard(&mut self, score: u32, level: u32, time_remaining: u32) {
        log::debug!("score {} level {} time {}s", score, level, time_remaining);
    }

    fn show_session_summary(&mut self, summary: &RoundSummary) {
        log::info!("{}", summary_message(summary));
        self.summaries.push(*summary);
    }

    fn play_sound(&mut self, kind: SoundKind) {
        log::trace!("sound {:?}", kind);
    }
}
