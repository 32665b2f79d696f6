//! Scheduled tasks on a simulated millisecond clock
//!
//! Replaces ad-hoc interval handles: every timer is an entry keyed by a
//! `TaskId` that doubles as its cancellation token. Tasks fire in due order;
//! ties fire in scheduling order.

/// Cancellation token for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Work a timer performs when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// One second of round time elapsed
    Countdown,
    /// Spawn a new target
    Spawn,
    /// Hide the target with `serial` in `slot`, if it is still there
    Hide { slot: usize, serial: u64 },
}

#[derive(Debug, Clone)]
struct Scheduled {
    id: TaskId,
    due_ms: u64,
    /// Repeating tasks are re-armed instead of removed
    period_ms: Option<u64>,
    task: Task,
}

/// Pending timers
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now_ms: u64,
    entries: Vec<Scheduled>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn allocate_id(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Run `task` once, `delay_ms` from now
    pub fn schedule_once(&mut self, delay_ms: u64, task: Task) -> TaskId {
        let id = self.allocate_id();
        self.entries.push(Scheduled {
            id,
            due_ms: self.now_ms + delay_ms,
            period_ms: None,
            task,
        });
        id
    }

    /// Run `task` every `period_ms`, first one period from now
    pub fn schedule_repeating(&mut self, period_ms: u64, task: Task) -> TaskId {
        let period_ms = period_ms.max(1);
        let id = self.allocate_id();
        self.entries.push(Scheduled {
            id,
            due_ms: self.now_ms + period_ms,
            period_ms: Some(period_ms),
            task,
        });
        id
    }

    /// Cancel a task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Time until a task fires
    pub fn remaining_ms(&self, id: TaskId) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.due_ms.saturating_sub(self.now_ms))
    }

    /// Number of pending tasks matching `pred`
    pub fn count(&self, pred: impl Fn(&Task) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.task)).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every pending task (the clock keeps its time)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Take the earliest task due at or before `until_ms`, moving the clock
    /// to its due time. Repeating tasks are re-armed one period later.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TaskId, Task)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= until_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.id))
            .map(|(i, _)| i)?;

        let entry = &self.entries[idx];
        let (id, task, due_ms, period_ms) = (entry.id, entry.task, entry.due_ms, entry.period_ms);
        self.now_ms = self.now_ms.max(due_ms);

        match period_ms {
            Some(period) => self.entries[idx].due_ms += period,
            None => {
                self.entries.swap_remove(idx);
            }
        }
        Some((id, task))
    }

    /// Move the clock forward after all due tasks ran
    pub fn advance_clock(&mut self, to_ms: u64) {
        self.now_ms = self.now_ms.max(to_ms);
    }
}
