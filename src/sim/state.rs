//! Round state and core simulation types

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::timers::TaskId;

/// Lifecycle of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundStatus {
    /// No round started yet (or reset)
    #[default]
    Idle,
    /// Active gameplay
    Running,
    /// Spawning suspended, countdown frozen
    Paused,
    /// Round finished; summary available
    Ended,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Countdown reached zero
    Timeout,
    /// Player hit a bomb
    Hazard,
}

/// What a spawned target is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Capybara: worth points
    Collectible,
    /// Bomb: ends the round
    Hazard,
}

/// A target currently shown in a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub kind: TargetKind,
    /// Spawn sequence number; hide timers only remove the target they were
    /// scheduled for
    pub serial: u64,
    pub shown_at_ms: u64,
    pub visible_until_ms: u64,
}

/// One grid position
#[derive(Debug, Clone, Default)]
pub struct Slot {
    pub target: Option<Target>,
    /// Pending auto-hide
    pub hide_task: Option<TaskId>,
    /// Remaining lifetime of a target whose hide timer is frozen by pause
    pub frozen_remaining_ms: Option<u64>,
}

impl Slot {
    pub fn is_visible(&self) -> bool {
        self.target.is_some()
    }

    pub fn kind(&self) -> Option<TargetKind> {
        self.target.map(|t| t.kind)
    }
}

/// Score and progress of the current round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    pub score: u32,
    /// 1-based, capped at the configured max level
    pub level: u32,
    /// Seconds left on the countdown
    pub time_remaining: u32,
    /// Collectibles hit this round
    pub hit_count: u32,
    pub status: RoundStatus,
    /// Set once the round ends
    pub outcome: Option<Outcome>,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            score: 0,
            level: 1,
            time_remaining: 0,
            hit_count: 0,
            status: RoundStatus::Idle,
            outcome: None,
        }
    }
}

impl RoundState {
    /// Fresh running round
    pub fn new(round_seconds: u32) -> Self {
        Self {
            score: 0,
            level: 1,
            time_remaining: round_seconds,
            hit_count: 0,
            status: RoundStatus::Running,
            outcome: None,
        }
    }

    /// Running or paused
    pub fn is_active(&self) -> bool {
        matches!(self.status, RoundStatus::Running | RoundStatus::Paused)
    }
}

/// Final numbers handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub outcome: Outcome,
    pub score: u32,
    pub level: u32,
    pub hit_count: u32,
    /// Leaderboard rank achieved (1-indexed)
    pub rank: Option<usize>,
}

/// Sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    /// Capybara whacked
    Hit,
    /// Bomb clicked
    Hazard,
    LevelUp,
    /// Countdown ran out
    TimeUp,
    /// New best score
    HighScore,
}

/// Display updates produced by the engine, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundEvent {
    SlotChanged {
        slot: usize,
        visible: bool,
        kind: Option<TargetKind>,
    },
    Scoreboard {
        score: u32,
        level: u32,
        time_remaining: u32,
    },
    /// Fraction (0.0 - 1.0) of the way to the next level
    LevelProgress(f32),
    LevelUp {
        level: u32,
    },
    Paused(bool),
    Sound(SoundKind),
    Ended(RoundSummary),
}

/// Seed a round RNG is built from
#[derive(Debug, Clone)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}
