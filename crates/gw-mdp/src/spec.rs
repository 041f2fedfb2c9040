//! `GridSpec`: the authored description of one trial's grid world.
//!
//! A `GridSpec` is plain configuration: nothing is validated or precomputed
//! until it is handed to [`GridModel::new`][crate::GridModel::new].  Build one
//! with [`GridSpecBuilder`] or load it from a trial file with
//! [`crate::loader`].

use gw_core::Coord;

use crate::rules::{RuleTable, TransitionRule, TWO_FORWARD};

/// Feature symbol that blocks movement unless configured otherwise.
pub const DEFAULT_WALL_FEATURE: char = '#';

/// Feature symbol that carries the two-step rule unless configured
/// otherwise.
pub const DEFAULT_JUMP_FEATURE: char = 'j';

/// Ordered `(rule name, probability)` table for one feature.
pub type RuleWeights = Vec<(String, f64)>;

/// Authored grid-world parameters for one trial.
#[derive(Debug, Clone)]
pub struct GridSpec {
    /// Feature rows, **top row first**, one character per cell.
    pub feature_rows: Vec<String>,

    /// Where the avatar starts.  `None` leaves the controller without a
    /// position; starting such a trial is a caller error.
    pub init_state: Option<Coord>,

    /// Explicitly listed terminal cells.
    pub absorbing_states: Vec<Coord>,

    /// Features whose cells are all terminal.
    pub absorbing_features: Vec<char>,

    /// Features that block entry.
    pub wall_features: Vec<char>,

    /// Reward for *entering* a cell with the given feature.  Missing ⇒ 0.
    pub feature_rewards: Vec<(char, f64)>,

    /// Non-default movement per feature, in authored order.
    pub feature_transitions: Vec<(char, RuleWeights)>,

    /// Added to every reward, whatever the destination.
    pub step_cost: f64,

    /// Whether the wait action is legal.
    pub include_wait: bool,

    /// Named rules available to `feature_transitions`.
    pub rules: RuleTable,
}

impl GridSpec {
    /// Start a builder from top-first feature rows.
    pub fn builder<S: Into<String>>(rows: impl IntoIterator<Item = S>) -> GridSpecBuilder {
        GridSpecBuilder::new(rows)
    }

    /// The transition table used when none is configured: `'j'` cells move
    /// two cells at a time.
    pub fn default_feature_transitions() -> Vec<(char, RuleWeights)> {
        vec![(DEFAULT_JUMP_FEATURE, vec![(TWO_FORWARD.to_string(), 1.0)])]
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Fluent builder for [`GridSpec`].
///
/// # Defaults
///
/// | Method                       | Default                          |
/// |------------------------------|----------------------------------|
/// | `.init_state(c)`             | none                             |
/// | `.wall_features(v)`          | `['#']`                          |
/// | `.feature_transition(f, t)`  | `{'j': [("2forward", 1.0)]}`     |
/// | `.step_cost(c)`              | `0.0`                            |
/// | `.include_wait(b)`           | `false`                          |
/// | `.rule(name, r)`             | `forward`, `2forward` only       |
///
/// Calling `.feature_transition` (or `.no_feature_transitions`) replaces the
/// default `'j'` table rather than extending it.
///
/// # Example
///
/// ```rust,ignore
/// let spec = GridSpec::builder(["...", ".#.", "..G"])
///     .init_state(Coord::new(0, 0))
///     .absorbing_feature('G')
///     .feature_reward('G', 10.0)
///     .step_cost(-1.0)
///     .build();
/// let model = GridModel::new(spec)?;
/// ```
pub struct GridSpecBuilder {
    spec:               GridSpec,
    custom_transitions: bool,
}

impl GridSpecBuilder {
    pub fn new<S: Into<String>>(rows: impl IntoIterator<Item = S>) -> Self {
        Self {
            spec: GridSpec {
                feature_rows:        rows.into_iter().map(Into::into).collect(),
                init_state:          None,
                absorbing_states:    Vec::new(),
                absorbing_features:  Vec::new(),
                wall_features:       vec![DEFAULT_WALL_FEATURE],
                feature_rewards:     Vec::new(),
                feature_transitions: GridSpec::default_feature_transitions(),
                step_cost:           0.0,
                include_wait:        false,
                rules:               RuleTable::default(),
            },
            custom_transitions: false,
        }
    }

    pub fn init_state(mut self, s: Coord) -> Self {
        self.spec.init_state = Some(s);
        self
    }

    pub fn absorbing_state(mut self, s: Coord) -> Self {
        self.spec.absorbing_states.push(s);
        self
    }

    pub fn absorbing_states(mut self, states: impl IntoIterator<Item = Coord>) -> Self {
        self.spec.absorbing_states.extend(states);
        self
    }

    pub fn absorbing_feature(mut self, f: char) -> Self {
        self.spec.absorbing_features.push(f);
        self
    }

    /// Replace the wall feature set.
    pub fn wall_features(mut self, features: impl IntoIterator<Item = char>) -> Self {
        self.spec.wall_features = features.into_iter().collect();
        self
    }

    pub fn feature_reward(mut self, f: char, reward: f64) -> Self {
        self.spec.feature_rewards.retain(|(g, _)| *g != f);
        self.spec.feature_rewards.push((f, reward));
        self
    }

    /// Set the rule table for `f`.  The first call drops the default `'j'`
    /// entry.
    pub fn feature_transition<S: Into<String>>(
        mut self,
        f: char,
        weights: impl IntoIterator<Item = (S, f64)>,
    ) -> Self {
        if !self.custom_transitions {
            self.spec.feature_transitions.clear();
            self.custom_transitions = true;
        }
        let weights: RuleWeights = weights.into_iter().map(|(n, p)| (n.into(), p)).collect();
        self.spec.feature_transitions.retain(|(g, _)| *g != f);
        self.spec.feature_transitions.push((f, weights));
        self
    }

    /// Every feature moves with `forward`.
    pub fn no_feature_transitions(mut self) -> Self {
        self.spec.feature_transitions.clear();
        self.custom_transitions = true;
        self
    }

    pub fn step_cost(mut self, cost: f64) -> Self {
        self.spec.step_cost = cost;
        self
    }

    pub fn include_wait(mut self, include: bool) -> Self {
        self.spec.include_wait = include;
        self
    }

    /// Register an extra named rule.
    pub fn rule<R: TransitionRule + 'static>(mut self, name: impl Into<String>, rule: R) -> Self {
        self.spec.rules.insert(name, rule);
        self
    }

    pub fn build(self) -> GridSpec {
        self.spec
    }
}
