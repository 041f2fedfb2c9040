//! Task observer trait: the controller's outbound data contract.

use crate::StepRecord;

/// Callbacks invoked by the [`TaskController`][crate::TaskController] as the
/// trial progresses.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: collecting records
///
/// ```rust,ignore
/// struct Collect(Vec<StepRecord>);
///
/// impl TaskObserver for Collect {
///     fn on_step(&mut self, record: &StepRecord) {
///         self.0.push(record.clone());
///     }
/// }
/// ```
pub trait TaskObserver {
    /// Called once per processed action, including absorbed (paused) ones.
    fn on_step(&mut self, _record: &StepRecord) {}

    /// Called once when the end-of-round sequence completes.
    fn on_end(&mut self) {}
}

/// A [`TaskObserver`] that does nothing.
pub struct NoopObserver;

impl TaskObserver for NoopObserver {}

/// A [`TaskObserver`] built from two closures, for shells that think in
/// callbacks rather than trait impls.
pub struct FnObserver<S, E>
where
    S: FnMut(&StepRecord),
    E: FnMut(),
{
    on_step: S,
    on_end:  E,
}

impl<S, E> FnObserver<S, E>
where
    S: FnMut(&StepRecord),
    E: FnMut(),
{
    pub fn new(on_step: S, on_end: E) -> Self {
        Self { on_step, on_end }
    }
}

impl<S, E> TaskObserver for FnObserver<S, E>
where
    S: FnMut(&StepRecord),
    E: FnMut(),
{
    fn on_step(&mut self, record: &StepRecord) {
        (self.on_step)(record)
    }

    fn on_end(&mut self) {
        (self.on_end)()
    }
}

impl<O: TaskObserver + ?Sized> TaskObserver for Box<O> {
    fn on_step(&mut self, record: &StepRecord) {
        (**self).on_step(record)
    }

    fn on_end(&mut self) {
        (**self).on_end()
    }
}
