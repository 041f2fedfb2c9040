//! `TaskController`: the per-trial state machine.
//!
//! # Phases
//!
//! ```text
//! Uninitialized ─init─▶ Ready ─start─▶ Running ─key─▶ AwaitingReactivation ─┐
//!                                       ▲  │                                 │
//!                                       │  └─key (pause armed)─▶ Paused      │
//!                                       ├──────────resume─────────┘          │
//!                                       └────────delay + key release─────────┘
//!                     any move onto an absorbing cell, or after end_task ─▶ Ended
//! ```
//!
//! # Time
//!
//! The controller never sleeps.  Delayed work goes into a [`TimerQueue`] with
//! absolute deadlines read from the injected [`Clock`].  Every public entry
//! point that acts on the trial first fires timers that are already due, so a
//! timer due at the same instant as a key event is handled before the key.
//!
//! Each move that waits for reactivation gets a fresh id, and its `Reactivate`
//! timer only counts for that move.  Shells driving real
//! time call [`advance`](TaskController::advance) from their event loop; tests
//! move a [`ManualClock`][gw_core::ManualClock] and call it explicitly.

use gw_core::{Action, Clock, Coord, Millis, TaskRng};
use gw_mdp::{GridModel, TrialSpec, WallSegment};
use tracing::{debug, trace};

use crate::renderer::{reward_label, Renderer, TextStyle, TileStyle};
use crate::timer::{TimerEvent, TimerQueue};
use crate::{Key, StepRecord, TaskConfig, TaskError, TaskObserver, TaskResult};

/// Where the controller is in its lifecycle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TaskPhase {
    /// No trial loaded yet.
    Uninitialized,
    /// Trial loaded, input not yet enabled.
    Ready,
    /// Accepting input.
    Running,
    /// A move was processed; waiting for the reactivation delay and/or the
    /// key release.
    AwaitingReactivation,
    /// An action was absorbed by `pause_next`; waiting for `resume`.
    Paused,
    /// The end-of-round sequence has been scheduled.  Terminal until the next
    /// `init`.
    Ended,
}

/// Per-trial data that comes from the [`TrialSpec`].
struct Trial {
    name:         Option<String>,
    model:        GridModel,
    show_rewards: bool,
    walls:        Vec<WallSegment>,
    tiles:        Vec<(Coord, TileStyle)>,
}

/// Outstanding conditions before input comes back after a move.
#[derive(Copy, Clone, Debug)]
struct Reactivation {
    id:            u64,
    delay_elapsed: bool,
    key_released:  bool,
}

impl Reactivation {
    fn ready(&self) -> bool {
        self.delay_elapsed && self.key_released
    }
}

/// Drives one grid-world trial at a time.
///
/// - `R: Renderer` receives all visual intents.
/// - `O: TaskObserver` receives step records and the end-of-round signal.
/// - `C: Clock` supplies timestamps and timer deadlines.
///
/// Construct with [`TaskControllerBuilder`][crate::TaskControllerBuilder] or
/// [`TaskController::new`] for default timing.
pub struct TaskController<R: Renderer, O: TaskObserver, C: Clock> {
    pub(crate) config:   TaskConfig,
    pub(crate) renderer: R,
    pub(crate) observer: O,
    pub(crate) clock:    C,

    base_seed:    u64,
    rng:          TaskRng,
    trial:        Option<Trial>,
    generation:   u64,
    timers:       TimerQueue,

    phase:        TaskPhase,
    position:     Option<Coord>,
    paused:       bool,
    ended:        bool,
    complete:     bool,
    last_key:     Option<Key>,
    trial_start:  Millis,
    reactivation: Option<Reactivation>,
    next_reactivation_id: u64,
}

impl<R: Renderer, O: TaskObserver, C: Clock> TaskController<R, O, C> {
    /// Controller with [`TaskConfig::default`] timing and an entropy seed.
    pub fn new(renderer: R, observer: O, clock: C) -> Self {
        Self::from_parts(TaskConfig::default(), renderer, observer, clock)
    }

    pub(crate) fn from_parts(config: TaskConfig, renderer: R, observer: O, clock: C) -> Self {
        let base_seed = config.seed.unwrap_or_else(TaskRng::entropy_seed);
        Self {
            config,
            renderer,
            observer,
            clock,
            base_seed,
            rng:          TaskRng::new(base_seed),
            trial:        None,
            generation:   0,
            timers:       TimerQueue::new(),
            phase:        TaskPhase::Uninitialized,
            position:     None,
            paused:       false,
            ended:        false,
            complete:     false,
            last_key:     None,
            trial_start:  Millis::ZERO,
            reactivation: None,
            next_reactivation_id: 0,
        }
    }

    // ── Trial lifecycle ───────────────────────────────────────────────────

    /// Load a trial: build the grid model, discard all runtime state and
    /// pending timers, draw the board and place the avatar at the initial
    /// state (if the trial has one).
    ///
    /// Callable any number of times on the same controller.  On error the
    /// previous trial is left untouched.
    pub fn init(&mut self, spec: impl Into<TrialSpec>) -> TaskResult<()> {
        let TrialSpec { name, grid, walls, show_rewards, feature_colors } = spec.into();
        let model = GridModel::new(grid)?;

        let tiles: Vec<(Coord, TileStyle)> = model
            .states()
            .into_iter()
            .map(|s| {
                let fill = model.feature_of(s).and_then(|f| feature_colors.get(&f).cloned());
                (s, TileStyle { fill })
            })
            .collect();

        self.generation += 1;
        self.timers.clear();
        self.rng = TaskRng::for_trial(self.base_seed, self.generation);

        self.renderer.clear_objects();
        self.renderer.draw_tiles(&tiles);
        self.renderer.draw_walls(&walls);
        if let Some(s) = model.init_state() {
            self.renderer.place_avatar(s);
        }

        debug!(
            name = name.as_deref().unwrap_or("<unnamed>"),
            width = model.width(),
            height = model.height(),
            generation = self.generation,
            "trial initialised"
        );

        self.position = model.init_state();
        self.trial = Some(Trial { name, model, show_rewards, walls, tiles });
        self.phase = TaskPhase::Ready;
        self.paused = false;
        self.ended = false;
        self.complete = false;
        self.last_key = None;
        self.trial_start = Millis::ZERO;
        self.reactivation = None;
        Ok(())
    }

    /// Record the trial start time and enable input.
    pub fn start(&mut self) -> TaskResult<()> {
        self.require_trial()?;
        self.advance();
        self.cancel_reactivation();
        self.trial_start = self.clock.now();
        self.enable_input();
        Ok(())
    }

    /// Absorb the next action instead of executing it.
    pub fn pause_next(&mut self) {
        self.advance();
        self.paused = true;
    }

    /// Clear the pause, restart the response timer and enable input.
    pub fn resume(&mut self) -> TaskResult<()> {
        self.require_trial()?;
        self.advance();
        self.cancel_reactivation();
        self.paused = false;
        self.trial_start = self.clock.now();
        self.enable_input();
        Ok(())
    }

    /// End the round after the next completed action.
    pub fn end_task(&mut self) {
        self.advance();
        self.ended = true;
    }

    /// Disable input, clear drawn objects and redraw the tiles.  The trial
    /// itself continues; a pending reactivation is dropped, so the shell
    /// re-enables input with `start` or `resume`.
    pub fn reset(&mut self) {
        self.advance();
        self.disable_input();
        self.cancel_reactivation();
        self.renderer.clear_objects();
        if let Some(trial) = &self.trial {
            self.renderer.draw_tiles(&trial.tiles);
        }
    }

    /// [`reset`](Self::reset), and additionally hand the task keys back to
    /// their default handling.
    pub fn clear(&mut self) {
        self.reset();
        self.renderer.release_keys();
    }

    /// Teleport the avatar without an action, reward or step record.
    pub fn move_agent_to(&mut self, to: Coord) -> TaskResult<()> {
        self.advance();
        let trial = self.require_trial()?;
        if !trial.model.in_bounds(to) {
            return Err(TaskError::OffGrid(to));
        }
        self.position = Some(to);
        self.renderer.hide_avatar();
        self.renderer.place_avatar(to);
        self.renderer.show_avatar();
        Ok(())
    }

    // ── Input ─────────────────────────────────────────────────────────────

    /// Handle a key press.
    ///
    /// Returns the step record if the press was processed (it has already
    /// been delivered to the observer), `None` if it was ignored because
    /// input is disabled or the key means nothing.
    pub fn key_down(&mut self, key: Key) -> TaskResult<Option<StepRecord>> {
        self.advance();
        let now = self.clock.now();

        let trial = self.require_trial()?;
        if self.phase != TaskPhase::Running {
            trace!(?key, phase = ?self.phase, "key ignored; input disabled");
            return Ok(None);
        }
        let Some(action) = key.action(trial.model.includes_wait()) else {
            trace!(?key, "unrecognised key ignored");
            return Ok(None);
        };

        if self.paused {
            return Ok(Some(self.absorb(key, action, now)));
        }
        self.execute(key, action, now).map(Some)
    }

    /// Handle a key release.  Completes a pending reactivation that was
    /// waiting for the key that caused the last move.
    pub fn key_up(&mut self, key: Key) {
        self.advance();
        if self.last_key != Some(key) {
            return;
        }
        if let Some(r) = self.reactivation.as_mut() {
            r.key_released = true;
            self.try_reactivate();
        }
    }

    /// Fire every timer due at or before the clock's current time.  Returns
    /// the number of timers fired.
    pub fn advance(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        while let Some((deadline, timer)) = self.timers.pop_due(now) {
            if timer.generation != self.generation {
                trace!(generation = timer.generation, "stale timer dropped");
                continue;
            }
            trace!(%deadline, event = ?timer.event, "timer fired");
            self.fire(deadline, timer.event);
            fired += 1;
        }
        fired
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn phase(&self) -> TaskPhase {
        self.phase
    }

    /// The avatar's current cell, if the trial placed one.
    pub fn position(&self) -> Option<Coord> {
        self.position
    }

    pub fn input_enabled(&self) -> bool {
        self.phase == TaskPhase::Running
    }

    /// `true` while the next action is armed to be absorbed.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// `true` once `end_task` was called or the end sequence started.
    pub fn is_ended(&self) -> bool {
        self.ended || self.phase == TaskPhase::Ended
    }

    /// `true` once the end callback has fired.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn last_key(&self) -> Option<Key> {
        self.last_key
    }

    pub fn trial_start(&self) -> Millis {
        self.trial_start
    }

    pub fn trial_name(&self) -> Option<&str> {
        self.trial.as_ref().and_then(|t| t.name.as_deref())
    }

    pub fn model(&self) -> Option<&GridModel> {
        self.trial.as_ref().map(|t| &t.model)
    }

    pub fn walls(&self) -> &[WallSegment] {
        self.trial.as_ref().map_or(&[], |t| t.walls.as_slice())
    }

    /// Number of `init` calls so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The base seed transition sampling derives from.
    pub fn seed(&self) -> u64 {
        self.base_seed
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Dismantle the controller, returning its collaborators.
    pub fn into_parts(self) -> (R, O, C) {
        (self.renderer, self.observer, self.clock)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn require_trial(&self) -> TaskResult<&Trial> {
        self.trial.as_ref().ok_or(TaskError::NotInitialized)
    }

    fn enable_input(&mut self) {
        if self.phase == TaskPhase::Ended {
            return;
        }
        self.phase = TaskPhase::Running;
    }

    fn disable_input(&mut self) {
        if matches!(self.phase, TaskPhase::Running | TaskPhase::AwaitingReactivation) {
            self.phase = TaskPhase::Ready;
        }
    }

    /// The paused path: no movement, no animation, input off until `resume`.
    fn absorb(&mut self, key: Key, action: Action, now: Millis) -> StepRecord {
        self.last_key = Some(key);
        self.phase = TaskPhase::Paused;
        let record = StepRecord::paused(action, self.trial_start, now);
        debug!(?action, "action absorbed while paused");
        self.observer.on_step(&record);
        record
    }

    fn execute(&mut self, key: Key, action: Action, now: Millis) -> TaskResult<StepRecord> {
        let Some(trial) = self.trial.as_ref() else {
            return Err(TaskError::NotInitialized);
        };
        let state = self.position.ok_or(TaskError::NoPosition)?;
        let model = &trial.model;

        let next = model.transition(state, action, &mut self.rng)?;
        let reward = model.reward(state, action, next);

        self.last_key = Some(key);
        if self.config.disable_during_movement {
            self.phase = TaskPhase::AwaitingReactivation;
        }

        let anim_ms = self
            .renderer
            .animate_avatar_to(next, action)
            .unwrap_or(self.config.animation_ms);
        if trial.show_rewards && reward != 0.0 {
            self.timers.push(
                now + anim_ms,
                self.generation,
                TimerEvent::ShowReward {
                    at:    next,
                    text:  reward_label(reward),
                    style: TextStyle::for_reward(reward),
                },
            );
        }

        self.position = Some(next);
        let record = StepRecord {
            state:              Some(state),
            state_feature:      model.feature_of(state),
            action,
            next_state:         Some(next),
            next_state_feature: model.feature_of(next),
            reward:             Some(reward),
            start_ms:           self.trial_start,
            response_ms:        now,
        };
        let finishes = model.is_absorbing(next) || self.ended;

        debug!(%state, %next, %action, reward, "step");
        self.observer.on_step(&record);

        if finishes {
            self.schedule_end(now, anim_ms);
        } else {
            self.schedule_reactivation(now, anim_ms);
        }
        Ok(record)
    }

    fn schedule_end(&mut self, now: Millis, anim_ms: u64) {
        self.phase = TaskPhase::Ended;
        self.cancel_reactivation();
        let hide_at = now + self.config.hide_delay_ms(anim_ms);
        let end_at = now + self.config.end_delay_ms(anim_ms);
        self.timers.push(hide_at, self.generation, TimerEvent::HideAvatar);
        self.timers.push(end_at, self.generation, TimerEvent::EndTrial);
        debug!(%hide_at, %end_at, "end of round scheduled");
    }

    fn schedule_reactivation(&mut self, now: Millis, anim_ms: u64) {
        if !self.config.disable_during_movement {
            debug!("input left enabled during movement; nothing to reactivate");
            return;
        }
        self.cancel_reactivation();
        let id = self.next_reactivation_id;
        self.next_reactivation_id += 1;
        let at = now + self.config.reactivate_delay_ms(anim_ms);
        self.timers.push(at, self.generation, TimerEvent::Reactivate { id });
        self.reactivation = Some(Reactivation {
            id,
            delay_elapsed: false,
            key_released:  !self.config.disable_hold_key,
        });
    }

    /// Forget the pending reactivation and drop its timer.
    fn cancel_reactivation(&mut self) {
        if self.reactivation.take().is_some() {
            self.timers
                .retain(|t| !matches!(t.event, TimerEvent::Reactivate { .. }));
        }
    }

    fn try_reactivate(&mut self) {
        if self.reactivation.is_some_and(|r| r.ready()) {
            self.reactivation = None;
            self.enable_input();
            debug!(trial_start = %self.trial_start, "input reactivated");
        }
    }

    fn fire(&mut self, deadline: Millis, event: TimerEvent) {
        match event {
            TimerEvent::ShowReward { at, text, style } => {
                self.renderer
                    .show_floating_text(at, &text, &style, self.config.reward_anim_ms);
            }
            TimerEvent::Reactivate { id } => {
                let Some(r) = self.reactivation.as_mut() else { return };
                if r.id != id {
                    trace!(id, pending = r.id, "reactivation timer for an earlier move dropped");
                    return;
                }
                r.delay_elapsed = true;
                self.trial_start = deadline;
                self.try_reactivate();
            }
            TimerEvent::HideAvatar => self.renderer.hide_avatar(),
            TimerEvent::EndTrial => {
                self.complete = true;
                debug!("trial complete");
                self.observer.on_end();
            }
        }
    }
}
