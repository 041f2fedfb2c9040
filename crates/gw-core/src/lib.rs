//! `gw-core`: foundational types for the `gridtask` experiment core.
//!
//! This crate is a dependency of every other `gw-*` crate.  It has no `gw-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                             |
//! |-------------|------------------------------------------------------|
//! | [`coord`]   | `Coord` grid coordinate                              |
//! | [`action`]  | `Action` enum and its direction vectors              |
//! | [`time`]    | `Millis`, `Clock`, `SystemClock`, `ManualClock`      |
//! | [`rng`]     | `TaskRng` (seeded sampling for transition rules)     |
//! | [`util`]    | Cartesian product, weighted choice                   |
//! | [`error`]   | `GwError`, `GwResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod action;
pub mod coord;
pub mod error;
pub mod rng;
pub mod time;
pub mod util;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use action::Action;
pub use coord::Coord;
pub use error::{GwError, GwResult};
pub use rng::TaskRng;
pub use time::{Clock, ManualClock, Millis, SystemClock};
pub use util::{choose_by_draw, probability_sum, product, weighted_choice, PROB_SUM_TOLERANCE};
