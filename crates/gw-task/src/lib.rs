//! `gw-task`: the task controller that wraps a grid model for a human
//! participant.
//!
//! # Processing one key press
//!
//! ```text
//! key_down(key):
//!   ⓪ Timers   : fire everything already due on the clock.
//!   ① Gate     : ignore the key unless input is enabled and it maps to a
//!                legal action.
//!   ② Pause    : if pause_next() was armed, emit an empty step record,
//!                leave input off and stop here.
//!   ③ Model    : next = transition(position, action); r = reward(...)
//!   ④ Render   : animate the avatar; schedule the reward label for when
//!                the animation ends.
//!   ⑤ Record   : position = next; deliver the StepRecord to the observer.
//!   ⑥ Schedule : absorbing(next) or end_task() armed:
//!                  hide avatar at  anim·(m−1), on_end at anim·m
//!                otherwise:
//!                  re-enable input at anim·frac AND after key release
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use gw_core::SystemClock;
//! use gw_mdp::load_spec_json;
//! use gw_task::{Key, NoopObserver, NoopRenderer, TaskControllerBuilder};
//!
//! let mut task = TaskControllerBuilder::new(NoopRenderer, NoopObserver, SystemClock)
//!     .build()?;
//! task.init(load_spec_json("trial.json".as_ref())?)?;
//! task.start()?;
//! task.key_down(Key::ArrowRight)?;
//! ```

pub mod builder;
pub mod config;
pub mod controller;
pub mod error;
pub mod key;
pub mod observer;
pub mod record;
pub mod renderer;
pub mod timer;

#[cfg(test)]
mod tests;

pub use builder::TaskControllerBuilder;
pub use config::TaskConfig;
pub use controller::{TaskController, TaskPhase};
pub use error::{TaskError, TaskResult};
pub use key::Key;
pub use observer::{FnObserver, NoopObserver, TaskObserver};
pub use record::StepRecord;
pub use renderer::{reward_label, NoopRenderer, Renderer, TextStyle, TileStyle};
pub use timer::{Timer, TimerEvent, TimerQueue};
