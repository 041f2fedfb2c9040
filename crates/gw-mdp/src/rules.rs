//! Transition rules and the per-grid rule table.
//!
//! # Pluggability
//!
//! The grid model applies movement through the [`TransitionRule`] trait,
//! looked up by name in a [`RuleTable`].  Each grid carries its own table
//! seeded with the two built-in rules; trial authors can register more rules
//! with the same signature and reference them by name from
//! `feature_transitions`.
//!
//! | Name       | Rule            | Effect                                   |
//! |------------|-----------------|------------------------------------------|
//! | `forward`  | [`Forward`]     | one clamped step, blocked by walls       |
//! | `2forward` | [`TwoForward`]  | two clamped steps, stops before walls    |

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use gw_core::Coord;

use crate::grid::Grid;

/// Name of the default single-step rule.
pub const FORWARD: &str = "forward";

/// Name of the two-step rule.
pub const TWO_FORWARD: &str = "2forward";

// ── Trait ─────────────────────────────────────────────────────────────────────

/// A deterministic movement rule.
///
/// # Contract
///
/// - Must return an in-bounds coordinate for any in-bounds `state`.
/// - Must be pure: no RNG, no I/O.  Stochasticity comes from choosing
///   *which* rule to apply, not from inside a rule.
pub trait TransitionRule: Send + Sync {
    fn apply(&self, grid: &Grid, state: Coord, dir: (i32, i32)) -> Coord;
}

impl<F> TransitionRule for F
where
    F: Fn(&Grid, Coord, (i32, i32)) -> Coord + Send + Sync,
{
    fn apply(&self, grid: &Grid, state: Coord, dir: (i32, i32)) -> Coord {
        self(grid, state, dir)
    }
}

// ── Built-in rules ────────────────────────────────────────────────────────────

/// Move one cell; stay put if the (clamped) target is a wall.
pub struct Forward;

impl TransitionRule for Forward {
    fn apply(&self, grid: &Grid, state: Coord, dir: (i32, i32)) -> Coord {
        let next = grid.on_grid(state.step(dir, 1));
        if grid.is_wall(next) { state } else { next }
    }
}

/// Move two cells, stopping early at walls.
///
/// A wall one cell ahead blocks the move entirely; a wall two cells ahead
/// leaves the agent on the first cell.  Both candidates are clamped
/// independently, so at an edge the two-step target collapses onto the
/// one-step target.
pub struct TwoForward;

impl TransitionRule for TwoForward {
    fn apply(&self, grid: &Grid, state: Coord, dir: (i32, i32)) -> Coord {
        let mid = grid.on_grid(state.step(dir, 1));
        if grid.is_wall(mid) {
            return state;
        }
        let far = grid.on_grid(state.step(dir, 2));
        if grid.is_wall(far) { mid } else { far }
    }
}

// ── RuleTable ─────────────────────────────────────────────────────────────────

/// Name → rule lookup.  Cheap to clone (rules are reference-counted).
#[derive(Clone)]
pub struct RuleTable {
    rules: HashMap<String, Arc<dyn TransitionRule>>,
}

impl RuleTable {
    /// A table with no rules at all.  Transitions fail until rules are added.
    pub fn empty() -> Self {
        RuleTable { rules: HashMap::new() }
    }

    /// Register (or replace) a rule under `name`.
    pub fn insert<R>(&mut self, name: impl Into<String>, rule: R)
    where
        R: TransitionRule + 'static,
    {
        self.rules.insert(name.into(), Arc::new(rule));
    }

    /// Remove a rule, returning whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.rules.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&dyn TransitionRule> {
        self.rules.get(name).map(|r| r.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered rule names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleTable {
    /// The built-in `forward` and `2forward` rules.
    fn default() -> Self {
        let mut table = RuleTable::empty();
        table.insert(FORWARD, Forward);
        table.insert(TWO_FORWARD, TwoForward);
        table
    }
}

impl fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
