//! `TimerQueue`: deadline-ordered queue of pending controller events.
//!
//! The controller never sleeps.  Anything that should happen "later" (the
//! reward label, input reactivation, the end-of-round steps) is pushed here
//! with an absolute deadline, and [`TaskController::advance`] drains every
//! entry whose deadline has passed.
//!
//! `BTreeMap` keeps deadlines sorted; entries sharing a deadline fire in
//! insertion order.  Every entry carries the trial generation it was
//! scheduled under, so a timer can be recognised as stale after `init`.
//!
//! [`TaskController::advance`]: crate::TaskController::advance

use std::collections::{BTreeMap, VecDeque};

use gw_core::{Coord, Millis};

use crate::renderer::TextStyle;

/// Something the controller has scheduled for later.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    /// Float a reward label over `at` once the move animation has finished.
    ShowReward {
        at:    Coord,
        text:  String,
        style: TextStyle,
    },
    /// The reactivation delay after move `id` has elapsed.
    Reactivate { id: u64 },
    /// End of round: hide the avatar.
    HideAvatar,
    /// End of round: notify the observer.
    EndTrial,
}

/// A scheduled event tagged with its trial generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    pub generation: u64,
    pub event:      TimerEvent,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    inner: BTreeMap<Millis, VecDeque<Timer>>,
    /// Cached total entry count for O(1) `len()`.
    total: usize,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` at `deadline`.
    pub fn push(&mut self, deadline: Millis, generation: u64, event: TimerEvent) {
        self.inner
            .entry(deadline)
            .or_default()
            .push_back(Timer { generation, event });
        self.total += 1;
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, Timer)> {
        let mut entry = self.inner.first_entry()?;
        let deadline = *entry.key();
        if deadline > now {
            return None;
        }
        let timer = entry.get_mut().pop_front()?;
        if entry.get().is_empty() {
            entry.remove();
        }
        self.total -= 1;
        Some((deadline, timer))
    }

    /// The earliest pending deadline, or `None` if empty.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.inner.keys().next().copied()
    }

    /// Keep only the timers for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&Timer) -> bool) {
        self.inner.retain(|_, timers| {
            timers.retain(|t| keep(t));
            !timers.is_empty()
        });
        self.total = self.inner.values().map(VecDeque::len).sum();
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.total = 0;
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Iterate pending timers in firing order.
    pub fn iter(&self) -> impl Iterator<Item = (Millis, &Timer)> + '_ {
        self.inner
            .iter()
            .flat_map(|(&deadline, timers)| timers.iter().map(move |t| (deadline, t)))
    }
}
