//! Fluent builder for constructing a [`TaskController`].

use gw_core::Clock;

use crate::{Renderer, TaskConfig, TaskController, TaskError, TaskObserver, TaskResult};

/// Fluent builder for [`TaskController<R, O, C>`].
///
/// # Required inputs
///
/// - `R: Renderer`: where visual intents go ([`NoopRenderer`][crate::NoopRenderer] for headless runs)
/// - `O: TaskObserver`: receives step records and the end signal
/// - `C: Clock`: [`SystemClock`][gw_core::SystemClock] live,
///   [`ManualClock`][gw_core::ManualClock] in tests and replays
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                 |
/// |-----------------------|-------------------------|
/// | `.config(c)`          | `TaskConfig::default()` |
/// | `.seed(s)`            | `config.seed`, else OS entropy |
/// | `.animation_ms(ms)`   | 200                     |
///
/// # Example
///
/// ```rust,ignore
/// let mut task = TaskControllerBuilder::new(NoopRenderer, NoopObserver, SystemClock)
///     .seed(42)
///     .build()?;
/// task.init(spec)?;
/// task.start()?;
/// ```
pub struct TaskControllerBuilder<R: Renderer, O: TaskObserver, C: Clock> {
    config:   TaskConfig,
    renderer: R,
    observer: O,
    clock:    C,
}

impl<R: Renderer, O: TaskObserver, C: Clock> TaskControllerBuilder<R, O, C> {
    /// Create a builder with all required inputs.
    pub fn new(renderer: R, observer: O, clock: C) -> Self {
        Self { config: TaskConfig::default(), renderer, observer, clock }
    }

    /// Replace the whole timing configuration.
    pub fn config(mut self, config: TaskConfig) -> Self {
        self.config = config;
        self
    }

    /// Fix the base seed for transition sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn animation_ms(mut self, ms: u64) -> Self {
        self.config.animation_ms = ms;
        self
    }

    /// Validate the configuration and return a controller in the
    /// `Uninitialized` phase.
    pub fn build(self) -> TaskResult<TaskController<R, O, C>> {
        self.config.validate().map_err(TaskError::Config)?;
        if !self.config.disable_during_movement && self.config.disable_hold_key {
            tracing::debug!("disable_hold_key has no effect without disable_during_movement");
        }
        Ok(TaskController::from_parts(self.config, self.renderer, self.observer, self.clock))
    }
}
