//! One-shot timers behind a scheduler trait.
//!
//! The playback controller only ever talks to [`TickScheduler`]. Hosts pick
//! the backend: [`ManualTimers`] runs on a virtual clock and is fully
//! deterministic, the command-line viewer drives real tokio timers.
//!
//! Expired timers are reported by id. A consumer must compare the id with the
//! one it is waiting for, because an expiration can already be on its way
//! when the timer is cancelled.

use std::time::Duration;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

pub trait TickScheduler {
    /// Arms a one-shot timer that expires after `delay`.
    fn schedule(&mut self, delay: Duration) -> TimerId;

    /// Disarms `id`.
    ///
    /// Returns `true` if the timer was still pending.
    fn cancel(&mut self, id: TimerId) -> bool;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Pending {
    id: TimerId,
    due: Duration,
    canceled: bool,
}

/// Virtual-clock timer queue.
///
/// Ordering contract: timers expire in `(due, id)` order, so two timers
/// armed for the same instant fire in the order they were armed.
#[derive(Debug, Default)]
pub struct ManualTimers {
    now: Duration,
    next_id: u64,
    pending: Vec<Pending>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.iter().filter(|p| !p.canceled).count()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id && !p.canceled)
    }

    /// Moves the clock forward and returns every timer that expired.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerId> {
        self.now += by;
        let now = self.now;

        let mut fired: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.canceled {
                return false;
            }
            if p.due <= now {
                fired.push(*p);
                return false;
            }
            true
        });

        fired.sort_by(|a, b| a.due.cmp(&b.due).then_with(|| a.id.cmp(&b.id)));
        fired.into_iter().map(|p| p.id).collect()
    }
}

impl TickScheduler for ManualTimers {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.push(Pending {
            id,
            due: self.now + delay,
            canceled: false,
        });
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        if let Some(p) = self.pending.iter_mut().find(|p| p.id == id && !p.canceled) {
            p.canceled = true;
            return true;
        }
        false
    }
}
