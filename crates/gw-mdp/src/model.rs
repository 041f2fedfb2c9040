//! `GridModel`: the validated, precomputed MDP for one trial.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use gw_core::{choose_by_draw, probability_sum, Action, Coord, TaskRng, PROB_SUM_TOLERANCE};

use crate::grid::{CoordSet, Grid};
use crate::rules::{RuleTable, TransitionRule, FORWARD};
use crate::spec::{GridSpec, RuleWeights};
use crate::{MdpError, MdpResult};

/// The grid-world MDP.
///
/// Read-only after construction.  Every method except
/// [`transition`][Self::transition] is a pure function of its arguments;
/// `transition` additionally consumes one uniform draw from the caller's RNG
/// when the source cell's feature has a stochastic rule table.
///
/// # Reward model
///
/// Rewards depend only on the **destination** feature plus the step cost.
/// Walking into a wall and waiting on the same cell therefore earn the same
/// reward.  Experiment analyses rely on this, so it must not be "fixed".
#[derive(Debug, Clone)]
pub struct GridModel {
    grid:                Grid,
    absorbing:           CoordSet,
    absorbing_features:  HashSet<char>,
    feature_rewards:     HashMap<char, f64>,
    feature_transitions: HashMap<char, RuleWeights>,
    rules:               RuleTable,
    step_cost:           f64,
    include_wait:        bool,
    init_state:          Option<Coord>,
}

impl GridModel {
    /// Validate the grid parameters and precompute wall and absorbing sets.
    ///
    /// # Errors
    ///
    /// - [`MdpError::EmptyGrid`] / [`MdpError::RaggedRow`] for malformed rows.
    /// - [`MdpError::UnknownRule`] if a feature names a rule missing from the
    ///   rule table.
    /// - [`MdpError::OutOfBounds`] for an off-grid init or absorbing state.
    ///
    /// Rule tables whose probabilities do not sum to 1 (within
    /// [`PROB_SUM_TOLERANCE`]) are accepted with a warning.
    pub fn new(spec: GridSpec) -> MdpResult<Self> {
        let wall_features: HashSet<char> = spec.wall_features.iter().copied().collect();
        let grid = Grid::from_rows(&spec.feature_rows, &wall_features)?;

        if let Some(init) = spec.init_state {
            grid.check_in_bounds("init state", init)?;
        }

        // The caller's list is copied, never extended in place.
        let mut absorbing = CoordSet::default();
        for &s in &spec.absorbing_states {
            grid.check_in_bounds("absorbing state", s)?;
            absorbing.insert(s);
        }
        let absorbing_features: HashSet<char> = spec.absorbing_features.iter().copied().collect();
        absorbing.extend(
            grid.states()
                .into_iter()
                .filter(|&s| grid.feature_of(s).is_some_and(|f| absorbing_features.contains(&f))),
        );

        let mut feature_transitions = HashMap::with_capacity(spec.feature_transitions.len());
        for (feature, weights) in spec.feature_transitions {
            if let Some((rule, _)) = weights.iter().find(|(name, _)| !spec.rules.contains(name)) {
                return Err(MdpError::UnknownRule { feature, rule: rule.clone() });
            }
            let total = probability_sum(&weights);
            if (total - 1.0).abs() > PROB_SUM_TOLERANCE {
                warn!(
                    feature = %feature,
                    total,
                    "transition probabilities do not sum to 1; sampling falls back to the last rule"
                );
            }
            feature_transitions.insert(feature, weights);
        }

        Ok(GridModel {
            grid,
            absorbing,
            absorbing_features,
            feature_rewards: spec.feature_rewards.into_iter().collect(),
            feature_transitions,
            rules: spec.rules,
            step_cost: spec.step_cost,
            include_wait: spec.include_wait,
            init_state: spec.init_state,
        })
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    pub fn init_state(&self) -> Option<Coord> {
        self.init_state
    }

    pub fn feature_of(&self, s: Coord) -> Option<char> {
        self.grid.feature_of(s)
    }

    pub fn on_grid(&self, s: Coord) -> Coord {
        self.grid.on_grid(s)
    }

    pub fn in_bounds(&self, s: Coord) -> bool {
        self.grid.in_bounds(s)
    }

    /// Every in-bounds coordinate.
    pub fn states(&self) -> Vec<Coord> {
        self.grid.states()
    }

    /// Legal actions: the four directions, plus `Wait` if enabled.
    pub fn actions(&self) -> &'static [Action] {
        if self.include_wait { &Action::ALL } else { &Action::DIRECTIONS }
    }

    pub fn includes_wait(&self) -> bool {
        self.include_wait
    }

    pub fn is_legal(&self, a: Action) -> bool {
        !a.is_wait() || self.include_wait
    }

    // ── MDP ───────────────────────────────────────────────────────────────

    #[inline]
    pub fn is_wall(&self, s: Coord) -> bool {
        self.grid.is_wall(s)
    }

    #[inline]
    pub fn is_absorbing(&self, s: Coord) -> bool {
        self.absorbing.contains(&s)
    }

    /// The full terminal set (listed states plus absorbing-feature cells).
    pub fn absorbing_states(&self) -> impl Iterator<Item = Coord> + '_ {
        self.absorbing.iter().copied()
    }

    pub fn is_absorbing_feature(&self, f: char) -> bool {
        self.absorbing_features.contains(&f)
    }

    /// Sample the next state for `action` taken in `state`.
    pub fn transition(&self, state: Coord, action: Action, rng: &mut TaskRng) -> MdpResult<Coord> {
        let draw = if self.stochastic_at(state) { rng.unit() } else { 0.0 };
        self.transition_with_draw(state, action, draw)
    }

    /// Like [`transition`][Self::transition] with the uniform draw supplied
    /// by the caller.  `draw` is ignored for cells without a rule table.
    pub fn transition_with_draw(&self, state: Coord, action: Action, draw: f64) -> MdpResult<Coord> {
        if !self.is_legal(action) {
            return Err(MdpError::IllegalAction(action));
        }
        self.grid.check_in_bounds("state", state)?;
        let name = self.rule_name_at(state, draw);
        let rule = self.lookup_rule(state, name)?;
        Ok(rule.apply(&self.grid, state, action.vector()))
    }

    /// Reward for arriving in `next_state`:
    /// `feature_rewards[feature_of(next_state)] (default 0) + step_cost`.
    ///
    /// `state` and `action` do not affect the result.
    pub fn reward(&self, _state: Coord, _action: Action, next_state: Coord) -> f64 {
        let r = self
            .grid
            .feature_of(next_state)
            .and_then(|f| self.feature_rewards.get(&f))
            .copied()
            .unwrap_or(0.0);
        r + self.step_cost
    }

    /// The ordered rule table for `feature`, if it has one.
    pub fn rule_weights(&self, feature: char) -> Option<&[(String, f64)]> {
        self.feature_transitions.get(&feature).map(Vec::as_slice)
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn stochastic_at(&self, state: Coord) -> bool {
        self.grid
            .feature_of(state)
            .and_then(|f| self.feature_transitions.get(&f))
            .is_some_and(|w| w.len() > 1)
    }

    fn rule_name_at(&self, state: Coord, draw: f64) -> &str {
        self.grid
            .feature_of(state)
            .and_then(|f| self.feature_transitions.get(&f))
            .and_then(|weights| choose_by_draw(weights, draw))
            .map(String::as_str)
            .unwrap_or(FORWARD)
    }

    fn lookup_rule(&self, state: Coord, name: &str) -> MdpResult<&dyn TransitionRule> {
        self.rules.get(name).ok_or_else(|| MdpError::UnknownRule {
            feature: self.grid.feature_of(state).unwrap_or(' '),
            rule:    name.to_string(),
        })
    }
}
