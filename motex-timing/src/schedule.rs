//! Cancellable one-shot timers.
//!
//! Nothing here sleeps or spawns. A timer is a due time plus a kind; the owner
//! polls with the current time and acts on whatever has come due. Cancelling
//! removes the entry, so a late `take` with a cancelled id returns `None` and
//! the stale callback becomes a no-op.

use std::fmt::Debug;
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTimer<K> {
    pub id: TimerId,
    pub kind: K,
    pub due_ns: u64,
}

#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    next_id: u64,
    armed: Vec<ScheduledTimer<K>>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            armed: Vec::new(),
        }
    }
}

impl<K: Copy + Debug> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, kind: K, now_ns: u64, delay: Duration) -> TimerId {
        self.schedule_at(kind, now_ns.saturating_add(delay.as_nanos() as u64))
    }

    pub fn schedule_at(&mut self, kind: K, due_ns: u64) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.armed.push(ScheduledTimer { id, kind, due_ns });
        trace!(?kind, id = id.0, due_ns, "timer armed");
        id
    }

    /// Returns false when the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.armed.iter().position(|t| t.id == id) {
            Some(idx) => {
                let timer = self.armed.swap_remove(idx);
                trace!(kind = ?timer.kind, id = id.0, "timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.armed.iter().any(|t| t.id == id)
    }

    pub fn get(&self, id: TimerId) -> Option<&ScheduledTimer<K>> {
        self.armed.iter().find(|t| t.id == id)
    }

    /// Removes and returns the timer if it is still armed.
    pub fn take(&mut self, id: TimerId) -> Option<ScheduledTimer<K>> {
        let idx = self.armed.iter().position(|t| t.id == id)?;
        Some(self.armed.swap_remove(idx))
    }

    /// Removes and returns the earliest timer due at or before `now_ns`.
    /// Timers due at the same instant come out in arming order.
    pub fn pop_due(&mut self, now_ns: u64) -> Option<ScheduledTimer<K>> {
        let idx = self
            .armed
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ns <= now_ns)
            .min_by_key(|(_, t)| (t.due_ns, t.id))
            .map(|(idx, _)| idx)?;
        Some(self.armed.swap_remove(idx))
    }

    pub fn next_due_ns(&self) -> Option<u64> {
        self.armed.iter().map(|t| t.due_ns).min()
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    pub fn armed(&self) -> impl Iterator<Item = &ScheduledTimer<K>> {
        self.armed.iter()
    }
}
