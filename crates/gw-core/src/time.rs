//! Time model for the task controller.
//!
//! # Design
//!
//! All timestamps are `Millis`: integer milliseconds since the Unix epoch.
//! Step records carry them verbatim, and timer deadlines are `Millis` values
//! compared with plain integer ordering, so no floating-point drift creeps
//! into the reactivation arithmetic.
//!
//! Where "now" comes from is abstracted behind [`Clock`].  Production shells
//! use [`SystemClock`]; tests and replays use [`ManualClock`] and move
//! virtual time forward explicitly instead of sleeping.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

// ── Millis ───────────────────────────────────────────────────────────────────

/// An absolute timestamp (or duration) in milliseconds.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    /// Milliseconds elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Scale a duration in milliseconds by `factor`, rounding to the nearest
    /// millisecond.  Negative products clamp to zero.
    #[inline]
    pub fn scale(ms: u64, factor: f64) -> u64 {
        (ms as f64 * factor).round().max(0.0) as u64
    }
}

impl std::ops::Add<u64> for Millis {
    type Output = Millis;
    #[inline]
    fn add(self, rhs: u64) -> Millis {
        Millis(self.0 + rhs)
    }
}

impl std::ops::Sub for Millis {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Millis) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ── Clock ────────────────────────────────────────────────────────────────────

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Millis;
}

/// Wall-clock time from the operating system.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        // A clock set before 1970 reads as the epoch.
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Millis(ms)
    }
}

/// Virtual time advanced by hand.
///
/// Clones share the same underlying counter, so a test can keep one handle
/// and give another to the controller.  Not `Send`; the controller is
/// single-threaded.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        ManualClock(Rc::new(Cell::new(start.0)))
    }

    /// Jump to an absolute time.  Moving backwards is allowed but timers that
    /// already fired stay fired.
    pub fn set(&self, t: Millis) {
        self.0.set(t.0);
    }

    /// Move forward by `ms` and return the new time.
    pub fn advance(&self, ms: u64) -> Millis {
        let next = self.0.get() + ms;
        self.0.set(next);
        Millis(next)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        Millis(self.0.get())
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Millis {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> Millis {
        (**self).now()
    }
}
