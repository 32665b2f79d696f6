//! Capy Whack - A capybara whack-a-mole game
//!
//! Core modules:
//! - `sim`: Round engine (timers, spawning, scoring, leveling)
//! - `platform`: Presentation boundary the engine reports to
//! - `persistence`: Key-value storage (LocalStorage on web)
//! - `settings`: Player preferences
//! - `highscores`: Leaderboard and match history
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use highscores::{ScoreEntry, ScoreLedger};
pub use settings::{Avatar, Difficulty, Settings};
pub use tuning::{LevelingRule, RoundConfig, TargetsOnPause};

/// Game configuration constants
pub mod consts {
    /// Slots in the grid (3x3)
    pub const SLOT_COUNT: usize = 9;
    /// Default round length
    pub const DEFAULT_ROUND_SECONDS: u32 = 30;

    /// Points per collectible hit
    pub const HIT_POINTS: u32 = 10;
    /// Chance that a spawn is a bomb
    pub const HAZARD_CHANCE: f64 = 0.2;

    /// Level cap
    pub const MAX_LEVEL: u32 = 5;
    /// Points per level (score leveling)
    pub const SCORE_PER_LEVEL: u32 = 50;
    /// Hits per level (hit-count leveling)
    pub const HITS_PER_LEVEL: u32 = 5;

    /// Spawn cadence never drops below this, so targets stay hittable
    pub const MIN_CADENCE_MS: u64 = 400;
    /// A target outlives one cadence period by this much
    pub const HIDE_MARGIN_MS: u64 = 500;
    /// Countdown period
    pub const COUNTDOWN_MS: u64 = 1000;

    /// Largest frame step the hosts feed the engine (a backgrounded tab
    /// must not fast-forward a whole round)
    pub const MAX_FRAME_MS: u64 = 100;
    /// Native demo loop step (~60 Hz)
    pub const FRAME_MS: u64 = 16;
    /// Autoplay waits this long before hitting a target
    pub const AUTOPLAY_REACTION_MS: u64 = 250;
}
