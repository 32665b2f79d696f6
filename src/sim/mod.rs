//! Deterministic round simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Simulated millisecond clock only
//! - Seeded RNG only
//! - No rendering or platform dependencies (display updates leave as events)

pub mod engine;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timers;

pub use engine::RoundEngine;
pub use spawn::SpawnScheduler;
pub use state::{
    Outcome, RoundEvent, RoundState, RoundStatus, RoundSummary, Slot, SoundKind, Target,
    TargetKind,
};
pub use tick::{TickInput, tick};
pub use timers::{Task, TaskId, TimerQueue};
