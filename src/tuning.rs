//! Data-driven game balance
//!
//! Everything a round needs to know about pacing and progression, gathered
//! into one `RoundConfig` so variants differ by data instead of code.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::{Difficulty, Settings};

/// When a level-up is earned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LevelingRule {
    /// Every `SCORE_PER_LEVEL` points
    #[default]
    Score,
    /// Every `HITS_PER_LEVEL` collectible hits
    Hits,
}

impl LevelingRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelingRule::Score => "score",
            LevelingRule::Hits => "hits",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "score" | "points" => Some(LevelingRule::Score),
            "hits" | "hitcount" => Some(LevelingRule::Hits),
            _ => None,
        }
    }

    /// True when going from `before` to `after` crosses a level threshold.
    /// `before`/`after` are points for `Score` and hit counts for `Hits`.
    pub fn crossed(&self, before: u32, after: u32) -> bool {
        let step = self.step();
        after > before && after / step > before / step
    }

    /// Fraction (0.0 - 1.0) of the way to the next threshold
    pub fn progress(&self, value: u32) -> f32 {
        let step = self.step();
        (value % step) as f32 / step as f32
    }

    fn step(&self) -> u32 {
        match self {
            LevelingRule::Score => SCORE_PER_LEVEL,
            LevelingRule::Hits => HITS_PER_LEVEL,
        }
    }
}

/// What happens to visible targets while the round is paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetsOnPause {
    /// Hide timers keep running, so a target can vanish mid-pause
    #[default]
    KeepRunning,
    /// Hide timers are suspended and resume with their remaining time
    Freeze,
}

/// Spawn cadence per difficulty and level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadenceTable {
    pub easy_ms: u64,
    pub medium_ms: u64,
    pub hard_ms: u64,
    /// Reduction per level above 1
    pub step_ms: u64,
    /// Number of defined steps; higher levels clamp to the last one
    pub max_steps: u32,
    /// Cadence never drops below this
    pub floor_ms: u64,
}

impl Default for CadenceTable {
    fn default() -> Self {
        Self {
            easy_ms: 2000,
            medium_ms: 1500,
            hard_ms: 1000,
            step_ms: 200,
            max_steps: MAX_LEVEL - 1,
            floor_ms: MIN_CADENCE_MS,
        }
    }
}

impl CadenceTable {
    pub fn base_ms(&self, difficulty: Difficulty) -> u64 {
        match difficulty {
            Difficulty::Easy => self.easy_ms,
            Difficulty::Medium => self.medium_ms,
            Difficulty::Hard => self.hard_ms,
        }
    }

    /// Interval between spawns at `level` (levels below 1 count as 1)
    pub fn cadence_ms(&self, level: u32, difficulty: Difficulty) -> u64 {
        let steps = level.saturating_sub(1).min(self.max_steps) as u64;
        self.base_ms(difficulty)
            .saturating_sub(self.step_ms * steps)
            .max(self.floor_ms)
    }
}

/// Interval between spawns with the default table
pub fn cadence(level: u32, difficulty: Difficulty) -> u64 {
    CadenceTable::default().cadence_ms(level, difficulty)
}

/// Everything that shapes one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub slot_count: usize,
    pub round_seconds: u32,
    pub difficulty: Difficulty,
    pub hit_points: u32,
    /// Probability that a spawn is a hazard
    pub hazard_chance: f64,
    pub max_level: u32,
    pub leveling: LevelingRule,
    pub cadence: CadenceTable,
    /// Extra lifetime a target gets on top of one cadence period
    pub hide_margin_ms: u64,
    /// Only one target visible at a time across all slots
    pub exclusive_targets: bool,
    pub targets_on_pause: TargetsOnPause,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            slot_count: SLOT_COUNT,
            round_seconds: DEFAULT_ROUND_SECONDS,
            difficulty: Difficulty::default(),
            hit_points: HIT_POINTS,
            hazard_chance: HAZARD_CHANCE,
            max_level: MAX_LEVEL,
            leveling: LevelingRule::default(),
            cadence: CadenceTable::default(),
            hide_margin_ms: HIDE_MARGIN_MS,
            exclusive_targets: true,
            targets_on_pause: TargetsOnPause::default(),
        }
    }
}

impl RoundConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            round_seconds: settings.game_duration,
            difficulty: settings.difficulty,
            leveling: settings.leveling_rule,
            ..Self::default()
        }
    }

    pub fn cadence_ms(&self, level: u32) -> u64 {
        self.cadence.cadence_ms(level, self.difficulty)
    }

    /// How long a target spawned at `level` stays up
    pub fn target_lifetime_ms(&self, level: u32) -> u64 {
        self.cadence_ms(level) + self.hide_margin_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[test]
    fn test_cadence_table_values() {
        assert_eq!(cadence(1, Difficulty::Easy), 2000);
        assert_eq!(cadence(1, Difficulty::Medium), 1500);
        assert_eq!(cadence(2, Difficulty::Medium), 1300);
        assert_eq!(cadence(5, Difficulty::Medium), 700);
        // Hard bottoms out at the floor
        assert_eq!(cadence(4, Difficulty::Hard), 400);
        assert_eq!(cadence(5, Difficulty::Hard), 400);
    }

    #[test]
    fn test_cadence_clamps_beyond_table() {
        assert_eq!(cadence(9, Difficulty::Easy), cadence(5, Difficulty::Easy));
        assert_eq!(cadence(0, Difficulty::Easy), cadence(1, Difficulty::Easy));
    }

    #[test]
    fn test_leveling_crossed() {
        let rule = LevelingRule::Score;
        assert!(!rule.crossed(30, 40));
        assert!(rule.crossed(40, 50));
        assert!(rule.crossed(90, 100));
        assert!(!rule.crossed(50, 50));

        let rule = LevelingRule::Hits;
        assert!(rule.crossed(4, 5));
        assert!(!rule.crossed(5, 6));
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(LevelingRule::Score.progress(0), 0.0);
        assert_eq!(LevelingRule::Score.progress(25), 0.5);
        assert_eq!(LevelingRule::Hits.progress(6), 0.2);
    }

    #[test]
    fn test_config_from_settings() {
        let settings = Settings {
            game_duration: 45,
            difficulty: Difficulty::Hard,
            leveling_rule: LevelingRule::Hits,
            ..Settings::default()
        };
        let config = RoundConfig::from_settings(&settings);
        assert_eq!(config.round_seconds, 45);
        assert_eq!(config.cadence_ms(1), 1000);
        assert_eq!(config.target_lifetime_ms(1), 1500);
        assert_eq!(config.leveling, LevelingRule::Hits);
    }

    proptest! {
        #[test]
        fn prop_cadence_floored_and_non_increasing(level in 1u32..=5, d in 0usize..3) {
            let difficulty = ALL[d];
            let here = cadence(level, difficulty);
            prop_assert!(here >= MIN_CADENCE_MS);
            prop_assert!(cadence(level + 1, difficulty) <= here);
        }
    }
}
