//! Round engine
//!
//! Owns one play session: countdown, spawning, click handling, leveling and
//! the hand-off of the result to the leaderboard. All timers live in one
//! `TimerQueue` driven by `advance`, so the engine is deterministic for a
//! given seed and input sequence.

use rand_pcg::Pcg32;

use super::spawn::{SpawnScheduler, hide_slot};
use super::state::{
    Outcome, RngState, RoundEvent, RoundState, RoundStatus, RoundSummary, Slot, SoundKind,
    Target, TargetKind,
};
use super::timers::{Task, TaskId, TimerQueue};
use crate::consts::COUNTDOWN_MS;
use crate::highscores::{ScoreEntry, ScoreLedger};
use crate::persistence::{Storage, StorageError};
use crate::settings::Settings;
use crate::tuning::{LevelingRule, RoundConfig, TargetsOnPause};

/// A whack-a-mole session bound to a storage backend
pub struct RoundEngine<S: Storage> {
    settings: Settings,
    config: RoundConfig,
    state: RoundState,
    slots: Vec<Slot>,
    timers: TimerQueue,
    spawner: SpawnScheduler,
    countdown: Option<TaskId>,
    rng_state: RngState,
    rng: Pcg32,
    ledger: ScoreLedger,
    last_summary: Option<RoundSummary>,
    storage: S,
    events: Vec<RoundEvent>,
    /// Wall clock (Unix ms) stamped on recorded results
    wall_clock_ms: f64,
}

impl<S: Storage> RoundEngine<S> {
    /// Create an idle engine, loading settings and scores from `storage`
    pub fn new(storage: S, seed: u64) -> Self {
        let settings = Settings::load(&storage);
        Self::with_settings(settings, storage, seed)
    }

    /// Create an idle engine with explicit settings (scores still load from `storage`)
    pub fn with_settings(settings: Settings, storage: S, seed: u64) -> Self {
        let config = settings.round_config();
        let ledger = ScoreLedger::load(&storage);
        let rng_state = RngState::new(seed);
        Self {
            slots: vec![Slot::default(); config.slot_count],
            settings,
            config,
            state: RoundState::default(),
            timers: TimerQueue::new(),
            spawner: SpawnScheduler::new(),
            countdown: None,
            rng: rng_state.to_rng(),
            rng_state,
            ledger,
            last_summary: None,
            storage,
            events: Vec::new(),
            wall_clock_ms: 0.0,
        }
    }

    // === Accessors ===

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn status(&self) -> RoundStatus {
        self.state.status
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn spawner(&self) -> &SpawnScheduler {
        &self.spawner
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    /// Summary of the most recent finished round
    pub fn last_summary(&self) -> Option<&RoundSummary> {
        self.last_summary.as_ref()
    }

    /// Simulated time since the engine was created
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Cadence the next spawn tick will use
    pub fn current_cadence_ms(&self) -> u64 {
        self.config.cadence_ms(self.state.level)
    }

    /// Slots holding a target, with the target
    pub fn visible_targets(&self) -> impl Iterator<Item = (usize, Target)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.target.map(|t| (i, t)))
    }

    /// Fraction of the way to the next level
    pub fn level_progress(&self) -> f32 {
        if self.state.level >= self.config.max_level {
            return 1.0;
        }
        match self.config.leveling {
            LevelingRule::Score => self.config.leveling.progress(self.state.score),
            LevelingRule::Hits => self.config.leveling.progress(self.state.hit_count),
        }
    }

    /// Take the display updates produced since the last call
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_wall_clock(&mut self, unix_ms: f64) {
        self.wall_clock_ms = unix_ms;
    }

    // === Settings & leaderboard ===

    /// Replace settings. Refused while a round is running or paused.
    pub fn apply_settings(&mut self, settings: Settings) -> bool {
        if self.state.is_active() {
            log::warn!("Settings change ignored during a round");
            return false;
        }
        let derived = settings.round_config();
        self.config = RoundConfig {
            exclusive_targets: self.config.exclusive_targets,
            targets_on_pause: self.config.targets_on_pause,
            ..derived
        };
        self.settings = settings;
        true
    }

    /// Replace the round config directly. Refused while a round is active.
    pub fn set_config(&mut self, config: RoundConfig) -> bool {
        if self.state.is_active() {
            return false;
        }
        self.config = config;
        true
    }

    /// Apply and persist settings. During a round nothing is written and
    /// `Ok(false)` is returned, so storage and memory never disagree.
    pub fn save_settings(&mut self, settings: Settings) -> Result<bool, StorageError> {
        if self.state.is_active() {
            log::warn!("Settings save ignored during a round");
            return Ok(false);
        }
        settings.save(&mut self.storage)?;
        Ok(self.apply_settings(settings))
    }

    /// Restore and persist default settings. Refused during a round.
    pub fn reset_settings(&mut self) -> bool {
        if self.state.is_active() {
            log::warn!("Settings reset ignored during a round");
            return false;
        }
        let settings = Settings::reset(&mut self.storage);
        self.apply_settings(settings)
    }

    /// Wipe top scores and history
    pub fn clear_leaderboard(&mut self) {
        self.ledger.clear(&mut self.storage);
    }

    // === Round lifecycle ===

    /// Reseed, then start
    pub fn start_with_seed(&mut self, seed: u64) {
        self.rng_state = RngState::new(seed);
        self.rng = self.rng_state.to_rng();
        self.start();
    }

    /// Start a fresh round (restarts one in progress without recording it)
    pub fn start(&mut self) {
        self.stop_all_timers();
        self.clear_slots();
        self.slots = vec![Slot::default(); self.config.slot_count];

        self.state = RoundState::new(self.config.round_seconds);
        self.last_summary = None;
        self.countdown = Some(self.timers.schedule_repeating(COUNTDOWN_MS, Task::Countdown));
        self.spawner
            .start(&mut self.timers, self.config.cadence_ms(self.state.level));

        self.push_scoreboard();
        log::info!(
            "Round started: {}s on {} for {}",
            self.config.round_seconds,
            self.config.difficulty.as_str(),
            self.settings.player_name
        );
    }

    /// Back to idle without recording anything
    pub fn reset(&mut self) {
        self.stop_all_timers();
        self.clear_slots();
        self.state = RoundState::default();
    }

    /// Suspend spawning. Returns false unless the round was running.
    pub fn pause(&mut self) -> bool {
        if self.state.status != RoundStatus::Running {
            return false;
        }
        self.state.status = RoundStatus::Paused;
        self.spawner.stop(&mut self.timers);

        if self.config.targets_on_pause == TargetsOnPause::Freeze {
            for slot in &mut self.slots {
                if let Some(id) = slot.hide_task.take() {
                    slot.frozen_remaining_ms = self.timers.remaining_ms(id);
                    self.timers.cancel(id);
                }
            }
        }

        self.events.push(RoundEvent::Paused(true));
        log::info!("Round paused");
        true
    }

    /// Resume spawning. Returns false unless the round was paused.
    pub fn resume(&mut self) -> bool {
        if self.state.status != RoundStatus::Paused {
            return false;
        }
        self.state.status = RoundStatus::Running;

        for (i, slot) in self.slots.iter_mut().enumerate() {
            if let (Some(remaining), Some(target)) = (slot.frozen_remaining_ms.take(), slot.target) {
                let task = Task::Hide {
                    slot: i,
                    serial: target.serial,
                };
                slot.hide_task = Some(self.timers.schedule_once(remaining, task));
            }
        }

        let cadence = self.current_cadence_ms();
        self.spawner.start(&mut self.timers, cadence);

        self.events.push(RoundEvent::Paused(false));
        log::info!("Round resumed");
        true
    }

    /// Pause if running, resume if paused
    pub fn toggle_pause(&mut self) -> bool {
        match self.state.status {
            RoundStatus::Running => self.pause(),
            RoundStatus::Paused => self.resume(),
            _ => false,
        }
    }

    /// Handle a click on `slot`. Returns the kind of target hit, if any.
    /// Clicks on empty or out-of-range slots, or outside a running round,
    /// are ignored.
    pub fn on_slot_clicked(&mut self, slot: usize) -> Option<TargetKind> {
        if self.state.status != RoundStatus::Running {
            return None;
        }
        let target = self.slots.get(slot).and_then(|s| s.target)?;

        match target.kind {
            TargetKind::Collectible => {
                hide_slot(&mut self.slots, slot, &mut self.timers, &mut self.events);
                self.score_hit();
            }
            TargetKind::Hazard => {
                self.events.push(RoundEvent::Sound(SoundKind::Hazard));
                self.end(Outcome::Hazard);
            }
        }
        Some(target.kind)
    }

    /// Finish the round and record it. Returns None if no round was active.
    pub fn end(&mut self, outcome: Outcome) -> Option<RoundSummary> {
        if !self.state.is_active() {
            return None;
        }
        self.state.status = RoundStatus::Ended;
        self.state.outcome = Some(outcome);
        self.stop_all_timers();
        self.clear_slots();

        let entry = ScoreEntry::new(
            &self.settings.player_name,
            self.state.score,
            self.state.level,
            self.config.difficulty,
            self.wall_clock_ms,
        );
        let rank = self.ledger.record_result(entry, &mut self.storage);

        if outcome == Outcome::Timeout {
            self.events.push(RoundEvent::Sound(SoundKind::TimeUp));
        }
        if rank == Some(1) && self.state.score > 0 {
            self.events.push(RoundEvent::Sound(SoundKind::HighScore));
        }

        let summary = RoundSummary {
            outcome,
            score: self.state.score,
            level: self.state.level,
            hit_count: self.state.hit_count,
            rank,
        };
        self.push_scoreboard();
        self.events.push(RoundEvent::Ended(summary));
        self.last_summary = Some(summary);
        log::info!(
            "Round ended ({:?}): score {} level {} rank {:?}",
            outcome,
            summary.score,
            summary.level,
            rank
        );
        Some(summary)
    }

    /// Run every timer due within the next `dt_ms`
    pub fn advance(&mut self, dt_ms: u64) {
        let until = self.timers.now_ms() + dt_ms;
        while let Some((_, task)) = self.timers.pop_due(until) {
            self.run_task(task);
        }
        self.timers.advance_clock(until);
    }

    // === Internals ===

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Countdown => self.on_countdown(),
            Task::Spawn => {
                if self.state.status == RoundStatus::Running {
                    self.spawner.on_tick(
                        &mut self.slots,
                        &mut self.timers,
                        &mut self.rng,
                        &self.config,
                        self.state.level,
                        &mut self.events,
                    );
                }
            }
            Task::Hide { slot, serial } => {
                let current = self.slots.get(slot).and_then(|s| s.target).map(|t| t.serial);
                if current == Some(serial) {
                    if let Some(entry) = self.slots.get_mut(slot) {
                        entry.hide_task = None;
                    }
                    hide_slot(&mut self.slots, slot, &mut self.timers, &mut self.events);
                }
            }
        }
    }

    fn on_countdown(&mut self) {
        // Paused rounds keep the countdown phase but do not lose time
        if self.state.status != RoundStatus::Running {
            return;
        }
        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        self.push_scoreboard();
        if self.state.time_remaining == 0 {
            self.end(Outcome::Timeout);
        }
    }

    fn score_hit(&mut self) {
        let (score_before, hits_before) = (self.state.score, self.state.hit_count);
        self.state.score += self.config.hit_points;
        self.state.hit_count += 1;
        self.events.push(RoundEvent::Sound(SoundKind::Hit));

        let crossed = match self.config.leveling {
            LevelingRule::Score => self.config.leveling.crossed(score_before, self.state.score),
            LevelingRule::Hits => self.config.leveling.crossed(hits_before, self.state.hit_count),
        };
        if crossed && self.state.level < self.config.max_level {
            self.state.level += 1;
            self.events.push(RoundEvent::LevelUp {
                level: self.state.level,
            });
            self.events.push(RoundEvent::Sound(SoundKind::LevelUp));
            log::info!(
                "Level {} reached, next cadence {}ms",
                self.state.level,
                self.current_cadence_ms()
            );
        }
        self.push_scoreboard();
    }

    fn push_scoreboard(&mut self) {
        self.events.push(RoundEvent::Scoreboard {
            score: self.state.score,
            level: self.state.level,
            time_remaining: self.state.time_remaining,
        });
        self.events.push(RoundEvent::LevelProgress(self.level_progress()));
    }

    fn stop_all_timers(&mut self) {
        self.spawner.stop(&mut self.timers);
        if let Some(id) = self.countdown.take() {
            self.timers.cancel(id);
        }
        self.timers.clear();
    }

    fn clear_slots(&mut self) {
        for slot in 0..self.slots.len() {
            hide_slot(&mut self.slots, slot, &mut self.timers, &mut self.events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::settings::Difficulty;

    fn engine() -> RoundEngine<MemoryStorage> {
        let settings = Settings {
            game_duration: 30,
            difficulty: Difficulty::Medium,
            ..Settings::default()
        };
        RoundEngine::with_settings(settings, MemoryStorage::new(), 12345)
    }

    /// Put a target straight into a slot
    fn plant(engine: &mut RoundEngine<MemoryStorage>, slot: usize, kind: TargetKind) {
        let now = engine.now_ms();
        engine.slots[slot].target = Some(Target {
            kind,
            serial: 10_000 + slot as u64,
            shown_at_ms: now,
            visible_until_ms: now + 2000,
        });
    }

    #[test]
    fn test_start_resets_round() {
        let mut engine = engine();
        assert_eq!(engine.status(), RoundStatus::Idle);

        engine.start();
        let state = engine.state();
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.time_remaining, 30);
        assert_eq!(state.hit_count, 0);
        assert_eq!(state.status, RoundStatus::Running);
        assert_eq!(engine.timers().count(|t| *t == Task::Countdown), 1);
        assert_eq!(engine.timers().count(|t| *t == Task::Spawn), 1);
    }

    #[test]
    fn test_collectible_click_scores() {
        let mut engine = engine();
        engine.start();
        plant(&mut engine, 4, TargetKind::Collectible);

        assert_eq!(engine.on_slot_clicked(4), Some(TargetKind::Collectible));
        assert_eq!(engine.state().score, 10);
        assert_eq!(engine.state().hit_count, 1);
        assert!(!engine.slots()[4].is_visible());

        // Second click on the now-empty slot is ignored
        assert_eq!(engine.on_slot_clicked(4), None);
        assert_eq!(engine.state().score, 10);
    }

    #[test]
    fn test_hazard_click_ends_round() {
        let mut engine = engine();
        engine.start();
        plant(&mut engine, 0, TargetKind::Hazard);

        assert_eq!(engine.on_slot_clicked(0), Some(TargetKind::Hazard));
        assert_eq!(engine.status(), RoundStatus::Ended);
        assert_eq!(engine.state().outcome, Some(Outcome::Hazard));
        assert_eq!(engine.state().time_remaining, 30);
        assert!(engine.timers().is_empty());
        assert_eq!(engine.ledger().list_history(10).len(), 1);
    }

    #[test]
    fn test_clicks_ignored_unless_running() {
        let mut engine = engine();
        plant(&mut engine, 1, TargetKind::Collectible);
        assert_eq!(engine.on_slot_clicked(1), None);

        engine.start();
        plant(&mut engine, 1, TargetKind::Collectible);
        engine.pause();
        assert_eq!(engine.on_slot_clicked(1), None);
        assert_eq!(engine.on_slot_clicked(99), None);
    }

    #[test]
    fn test_level_up_by_score() {
        let mut engine = engine();
        engine.start();
        for i in 0..5 {
            plant(&mut engine, i, TargetKind::Collectible);
            engine.on_slot_clicked(i);
        }
        assert_eq!(engine.state().score, 50);
        assert_eq!(engine.state().level, 2);
        assert_eq!(engine.current_cadence_ms(), 1300);
    }

    #[test]
    fn test_level_up_by_hits() {
        let settings = Settings {
            leveling_rule: LevelingRule::Hits,
            ..Settings::default()
        };
        let mut engine = RoundEngine::with_settings(settings, MemoryStorage::new(), 1);
        engine.start();
        for i in 0..4 {
            plant(&mut engine, i, TargetKind::Collectible);
            engine.on_slot_clicked(i);
        }
        assert_eq!(engine.state().level, 1);
        plant(&mut engine, 4, TargetKind::Collectible);
        engine.on_slot_clicked(4);
        assert_eq!(engine.state().level, 2);
    }

    #[test]
    fn test_level_capped() {
        let mut engine = engine();
        engine.start();
        for _ in 0..40 {
            plant(&mut engine, 0, TargetKind::Collectible);
            engine.on_slot_clicked(0);
        }
        assert_eq!(engine.state().score, 400);
        assert_eq!(engine.state().level, 5);
        assert_eq!(engine.level_progress(), 1.0);
    }

    #[test]
    fn test_countdown_timeout() {
        let mut engine = engine();
        engine.start();
        engine.advance(29_000);
        assert_eq!(engine.state().time_remaining, 1);
        assert_eq!(engine.status(), RoundStatus::Running);

        engine.advance(1_000);
        assert_eq!(engine.state().time_remaining, 0);
        assert_eq!(engine.state().outcome, Some(Outcome::Timeout));
        assert!(engine.visible_targets().next().is_none());
        assert_eq!(engine.last_summary().map(|s| s.outcome), Some(Outcome::Timeout));
    }

    #[test]
    fn test_pause_stops_spawning_and_countdown() {
        let mut engine = engine();
        engine.start();
        engine.advance(2000);
        assert!(engine.pause());
        let spawns = engine.spawner().spawn_count();
        let time = engine.state().time_remaining;

        engine.advance(10_000);
        assert_eq!(engine.spawner().spawn_count(), spawns);
        assert_eq!(engine.state().time_remaining, time);
        assert_eq!(engine.timers().count(|t| *t == Task::Spawn), 0);
    }

    #[test]
    fn test_pause_resume_single_spawn_timer() {
        let mut engine = engine();
        engine.start();
        for _ in 0..3 {
            engine.pause();
            engine.resume();
        }
        assert_eq!(engine.timers().count(|t| *t == Task::Spawn), 1);

        let before = engine.spawner().spawn_count();
        engine.advance(1500);
        assert_eq!(engine.spawner().spawn_count(), before + 1);
    }

    #[test]
    fn test_targets_keep_running_during_pause() {
        let mut engine = engine();
        engine.start();
        engine.advance(1500);
        assert_eq!(engine.visible_targets().count(), 1);

        engine.pause();
        engine.advance(2000);
        assert_eq!(engine.visible_targets().count(), 0);
    }

    #[test]
    fn test_targets_frozen_during_pause() {
        let mut engine = engine();
        let config = RoundConfig {
            targets_on_pause: TargetsOnPause::Freeze,
            ..engine.config().clone()
        };
        assert!(engine.set_config(config));
        engine.start();
        engine.advance(1500);
        engine.advance(500);
        let (_, frozen) = engine.visible_targets().next().unwrap();
        engine.pause();
        engine.advance(60_000);
        assert_eq!(engine.visible_targets().count(), 1);

        // 1500ms of the 2000ms lifetime remain
        engine.resume();
        engine.advance(1499);
        assert!(engine.visible_targets().any(|(_, t)| t.serial == frozen.serial));
        engine.advance(1);
        assert!(engine.visible_targets().all(|(_, t)| t.serial != frozen.serial));
    }

    #[test]
    fn test_stale_hide_does_not_hide_newer_target() {
        let mut engine = engine();
        engine.start();
        plant(&mut engine, 2, TargetKind::Collectible);
        engine.run_task(Task::Hide { slot: 2, serial: 1 });
        assert!(engine.slots()[2].is_visible());
        engine.run_task(Task::Hide { slot: 2, serial: 10_002 });
        assert!(!engine.slots()[2].is_visible());
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut engine = engine();
        assert!(engine.end(Outcome::Timeout).is_none());
        engine.start();
        assert!(engine.end(Outcome::Timeout).is_some());
        assert!(engine.end(Outcome::Hazard).is_none());
        assert_eq!(engine.ledger().list_history(10).len(), 1);
    }

    #[test]
    fn test_end_survives_storage_failure() {
        let mut engine = RoundEngine::with_settings(Settings::default(), MemoryStorage::unavailable(), 3);
        engine.start();
        let summary = engine.end(Outcome::Timeout).unwrap();
        assert_eq!(summary.rank, Some(1));
        assert_eq!(engine.status(), RoundStatus::Ended);
    }

    #[test]
    fn test_settings_locked_during_round() {
        let mut engine = engine();
        engine.start();
        let hard = Settings {
            difficulty: Difficulty::Hard,
            ..Settings::default()
        };
        assert!(!engine.apply_settings(hard.clone()));
        engine.reset();
        assert_eq!(engine.status(), RoundStatus::Idle);
        assert!(engine.apply_settings(hard));
        assert_eq!(engine.current_cadence_ms(), 1000);
    }

    #[test]
    fn test_events_reported() {
        let mut engine = engine();
        engine.start();
        engine.drain_events();
        plant(&mut engine, 3, TargetKind::Collectible);
        engine.on_slot_clicked(3);

        let events = engine.drain_events();
        assert!(events.contains(&RoundEvent::SlotChanged {
            slot: 3,
            visible: false,
            kind: None
        }));
        assert!(events.contains(&RoundEvent::Sound(SoundKind::Hit)));
        assert!(events.contains(&RoundEvent::Scoreboard {
            score: 10,
            level: 1,
            time_remaining: 30
        }));
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_reset_records_nothing() {
        let mut engine = engine();
        engine.start();
        engine.advance(5_000);
        engine.reset();
        assert_eq!(engine.status(), RoundStatus::Idle);
        assert!(engine.timers().is_empty());
        assert!(engine.ledger().is_empty());
        assert!(engine.visible_targets().next().is_none());
    }

    #[test]
    fn test_spawn_period_follows_level() {
        let mut engine = engine();
        engine.start();
        for i in 0..5 {
            plant(&mut engine, i, TargetKind::Collectible);
            engine.on_slot_clicked(i);
        }
        assert_eq!(engine.spawner().period_ms(), 1500);

        // The next tick re-arms at the level 2 cadence
        engine.advance(1500);
        assert_eq!(engine.spawner().period_ms(), 1300);
        let before = engine.spawner().spawn_count();
        engine.advance(1300);
        assert_eq!(engine.spawner().spawn_count(), before + 1);
    }

    #[test]
    fn test_settings_and_scores_survive_restart() {
        let mut engine = engine();
        let ana = Settings {
            player_name: "Ana".into(),
            game_duration: 45,
            difficulty: Difficulty::Hard,
            ..Settings::default()
        };
        assert_eq!(engine.save_settings(ana.clone()).ok(), Some(true));
        engine.start();
        engine.end(Outcome::Timeout);

        let storage = std::mem::take(engine.storage_mut());
        let reloaded = RoundEngine::new(storage, 7);
        assert_eq!(reloaded.settings(), &ana);
        assert_eq!(reloaded.config().round_seconds, 45);
        assert_eq!(reloaded.ledger().list_history(10)[0].player, "Ana");
    }

    #[test]
    fn test_clear_leaderboard() {
        let mut engine = engine();
        engine.start();
        engine.end(Outcome::Timeout);
        engine.clear_leaderboard();
        assert!(engine.ledger().list_top_scores(10).is_empty());
        assert!(engine.ledger().list_history(10).is_empty());

        let reloaded = RoundEngine::new(std::mem::take(engine.storage_mut()), 1);
        assert!(reloaded.ledger().is_empty());
    }

    #[test]
    fn test_save_settings_refused_mid_round_writes_nothing() {
        let mut engine = engine();
        engine.start();
        let hard = Settings {
            difficulty: Difficulty::Hard,
            ..Settings::default()
        };
        assert_eq!(engine.save_settings(hard).ok(), Some(false));
        assert!(!engine.reset_settings());
        assert_eq!(&Settings::load(engine.storage()), engine.settings());
        assert!(!engine.storage().contains_key(crate::persistence::SETTINGS_KEY));

        engine.reset();
        engine.start();
        assert_eq!(engine.current_cadence_ms(), 1500);
    }
}
