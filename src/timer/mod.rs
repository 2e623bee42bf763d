//! Deferred callbacks on a virtual clock.
//!
//! Every timer is identified by its owner and purpose. Scheduling a key that is
//! already pending replaces it, so a purpose never has two live instances.
//! The host advances the clock and dispatches due keys one at a time, in
//! deadline order, ties broken by scheduling order.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::bus::Subscriber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    /// Debounce after pointer activity, before the hide delay is armed.
    Settle,
    /// The auto-hide delay itself.
    Dwell,
    /// Widget-owned timer, named by the widget.
    Widget(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerKey {
    pub owner: Subscriber,
    pub purpose: TimerPurpose,
}

impl TimerKey {
    pub const fn panel(purpose: TimerPurpose) -> Self {
        Self {
            owner: Subscriber::Panel,
            purpose,
        }
    }
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    seq: u64,
    pending: BTreeMap<(Duration, u64), TimerKey>,
    index: HashMap<TimerKey, (Duration, u64)>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Arm `key` to fire `delay` from now, cancelling any pending instance.
    pub fn schedule(&mut self, key: TimerKey, delay: Duration) -> Duration {
        self.cancel(&key);
        let deadline = self.now + delay;
        let slot = (deadline, self.seq);
        self.seq += 1;
        self.pending.insert(slot, key);
        self.index.insert(key, slot);
        deadline
    }

    pub fn cancel(&mut self, key: &TimerKey) -> bool {
        match self.index.remove(key) {
            Some(slot) => {
                self.pending.remove(&slot);
                true
            }
            None => false,
        }
    }

    /// Cancel every timer held by `owner`.
    pub fn cancel_owner(&mut self, owner: Subscriber) -> usize {
        let keys: Vec<TimerKey> = self
            .index
            .keys()
            .filter(|key| key.owner == owner)
            .copied()
            .collect();
        for key in &keys {
            self.cancel(key);
        }
        keys.len()
    }

    pub fn is_pending(&self, key: &TimerKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn deadline(&self, key: &TimerKey) -> Option<Duration> {
        self.index.get(key).map(|(deadline, _)| *deadline)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerKey> {
        let (&slot, _) = self.pending.iter().next()?;
        if slot.0 > until {
            return None;
        }
        let key = self.pending.remove(&slot)?;
        self.index.remove(&key);
        self.now = self.now.max(slot.0);
        Some(key)
    }

    /// Move the clock forward without firing anything.
    pub fn settle_clock(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.index.clear();
    }
}
