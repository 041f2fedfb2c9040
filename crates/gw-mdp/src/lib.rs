//! `gw-mdp`: the grid-world Markov decision process.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`grid`]   | `Grid` (feature cells, bounds, wall set)                   |
//! | [`rules`]  | `TransitionRule` trait, `Forward`, `TwoForward`, `RuleTable` |
//! | [`spec`]   | `GridSpec`, `GridSpecBuilder`                              |
//! | [`model`]  | `GridModel` (transition, reward, absorbing test)           |
//! | [`trial`]  | `TrialSpec`, `WallSegment`, feature colours                |
//! | [`loader`] | `load_spec_json`, `load_spec_reader`, `load_trials_reader` |
//! | [`error`]  | `MdpError`, `MdpResult<T>`                                 |
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                      |
//! |-----------|-------------------------------------------------------------|
//! | `fx-hash` | FxHash instead of SipHash for the per-cell lookup sets.     |
//!
//! # Transition model (summary)
//!
//! ```text
//! f     = feature_of(state)
//! rule  = weighted_choice(feature_transitions[f])   if f has a table
//!       = "forward"                                 otherwise
//! next  = rules[rule](grid, state, action.vector())
//! r     = feature_rewards[feature_of(next)] + step_cost
//! ```

pub mod error;
pub mod grid;
pub mod loader;
pub mod model;
pub mod rules;
pub mod spec;
pub mod trial;


pub use error::{MdpError, MdpResult};
pub use grid::{CoordSet, Grid};
pub use loader::{load_spec_json, load_spec_reader, load_spec_str, load_trials_reader};
pub use model::GridModel;
pub use rules::{Forward, RuleTable, TransitionRule, TwoForward, FORWARD, TWO_FORWARD};
pub use spec::{GridSpec, GridSpecBuilder, RuleWeights};
pub use trial::{TrialSpec, WallSegment};
