//! Spawn scheduling
//!
//! One recurring task picks a random slot each cadence period and shows a
//! capybara or a bomb there for one period plus a margin.

use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{RoundEvent, Slot, Target, TargetKind};
use super::timers::{Task, TaskId, TimerQueue};
use crate::tuning::RoundConfig;

/// Owns the recurring spawn task
#[derive(Debug, Clone, Default)]
pub struct SpawnScheduler {
    task: Option<TaskId>,
    period_ms: u64,
    next_serial: u64,
    spawns: u64,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start spawning every `period_ms`. Any previous task is cancelled first,
    /// so at most one spawn task exists.
    pub fn start(&mut self, timers: &mut TimerQueue, period_ms: u64) {
        self.stop(timers);
        self.task = Some(timers.schedule_repeating(period_ms, Task::Spawn));
        self.period_ms = period_ms;
    }

    /// Stop spawning. Targets already shown keep their hide timers.
    pub fn stop(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.task.take() {
            timers.cancel(id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Period of the current (or last) spawn task
    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Targets spawned since creation
    pub fn spawn_count(&self) -> u64 {
        self.spawns
    }

    /// Handle one spawn tick at `level`: show a new target and re-arm the
    /// recurring task if the cadence changed since it was scheduled.
    pub fn on_tick(
        &mut self,
        slots: &mut [Slot],
        timers: &mut TimerQueue,
        rng: &mut Pcg32,
        config: &RoundConfig,
        level: u32,
        events: &mut Vec<RoundEvent>,
    ) {
        if slots.is_empty() {
            return;
        }
        let cadence_ms = config.cadence_ms(level);

        if config.exclusive_targets {
            for slot in 0..slots.len() {
                hide_slot(slots, slot, timers, events);
            }
        }

        let slot = rng.random_range(0..slots.len());
        hide_slot(slots, slot, timers, events);

        let kind = if rng.random_bool(config.hazard_chance.clamp(0.0, 1.0)) {
            TargetKind::Hazard
        } else {
            TargetKind::Collectible
        };

        self.next_serial += 1;
        self.spawns += 1;
        let serial = self.next_serial;
        let lifetime_ms = config.target_lifetime_ms(level);
        let now = timers.now_ms();

        slots[slot].target = Some(Target {
            kind,
            serial,
            shown_at_ms: now,
            visible_until_ms: now + lifetime_ms,
        });
        slots[slot].hide_task = Some(timers.schedule_once(lifetime_ms, Task::Hide { slot, serial }));
        events.push(RoundEvent::SlotChanged {
            slot,
            visible: true,
            kind: Some(kind),
        });
        log::debug!("Spawned {:?} in slot {} for {}ms", kind, slot, lifetime_ms);

        if cadence_ms != self.period_ms {
            log::debug!("Spawn cadence {}ms -> {}ms", self.period_ms, cadence_ms);
            self.start(timers, cadence_ms);
        }
    }
}

/// Remove whatever target `slot` holds. Hiding an empty slot does nothing.
pub fn hide_slot(
    slots: &mut [Slot],
    slot: usize,
    timers: &mut TimerQueue,
    events: &mut Vec<RoundEvent>,
) -> Option<Target> {
    let entry = slots.get_mut(slot)?;
    let target = entry.target.take()?;
    if let Some(id) = entry.hide_task.take() {
        timers.cancel(id);
    }
    entry.frozen_remaining_ms = None;
    events.push(RoundEvent::SlotChanged {
        slot,
        visible: false,
        kind: None,
    });
    Some(target)
}
