//! Unit tests for gw-task.
//!
//! Every controller here runs on a `ManualClock` starting at t = 1000 ms with
//! default timing: animation 200 ms, reactivation after 160 ms, avatar hidden
//! 600 ms and end callback 800 ms after the final move.

use gw_core::{Action, Coord, ManualClock, Millis};
use gw_mdp::{GridSpec, TrialSpec, WallSegment};

use crate::{
    Key, Renderer, StepRecord, TaskConfig, TaskController, TaskControllerBuilder, TaskObserver,
    TaskPhase, TextStyle, TileStyle,
};

// ── Test doubles ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Tiles(Vec<(Coord, TileStyle)>),
    Walls(usize),
    Place(Coord),
    Animate(Coord, Action),
    Text(Coord, String, TextStyle, u64),
    Hide,
    Show,
    Clear,
    Release,
}

#[derive(Default)]
struct RecRenderer {
    calls:        Vec<Call>,
    anim_override: Option<u64>,
}

impl RecRenderer {
    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn texts(&self) -> Vec<&Call> {
        self.calls.iter().filter(|c| matches!(c, Call::Text(..))).collect()
    }
}

impl Renderer for RecRenderer {
    fn draw_tiles(&mut self, tiles: &[(Coord, TileStyle)]) {
        self.calls.push(Call::Tiles(tiles.to_vec()));
    }
    fn draw_walls(&mut self, walls: &[WallSegment]) {
        self.calls.push(Call::Walls(walls.len()));
    }
    fn place_avatar(&mut self, at: Coord) {
        self.calls.push(Call::Place(at));
    }
    fn animate_avatar_to(&mut self, to: Coord, action: Action) -> Option<u64> {
        self.calls.push(Call::Animate(to, action));
        self.anim_override
    }
    fn show_floating_text(&mut self, at: Coord, text: &str, style: &TextStyle, anim_ms: u64) {
        self.calls.push(Call::Text(at, text.to_string(), style.clone(), anim_ms));
    }
    fn hide_avatar(&mut self) {
        self.calls.push(Call::Hide);
    }
    fn show_avatar(&mut self) {
        self.calls.push(Call::Show);
    }
    fn clear_objects(&mut self) {
        self.calls.push(Call::Clear);
    }
    fn release_keys(&mut self) {
        self.calls.push(Call::Release);
    }
}

#[derive(Default)]
struct RecObserver {
    steps: Vec<StepRecord>,
    ends:  usize,
}

impl TaskObserver for RecObserver {
    fn on_step(&mut self, record: &StepRecord) {
        self.steps.push(record.clone());
    }
    fn on_end(&mut self) {
        self.ends += 1;
    }
}

type Ctl = TaskController<RecRenderer, RecObserver, ManualClock>;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn c(x: i32, y: i32) -> Coord {
    Coord::new(x, y)
}

fn controller_with(config: TaskConfig) -> (Ctl, ManualClock) {
    let clock = ManualClock::new(Millis(1_000));
    let ctl = TaskControllerBuilder::new(RecRenderer::default(), RecObserver::default(), clock.clone())
        .config(config)
        .seed(7)
        .build()
        .unwrap();
    (ctl, clock)
}

fn controller() -> (Ctl, ManualClock) {
    controller_with(TaskConfig::default())
}

/// 3×3 open grid, step cost −1, no special features, start at (0,0).
fn open_3x3() -> GridSpec {
    GridSpec::builder(["...", "...", "..."])
        .init_state(c(0, 0))
        .step_cost(-1.0)
        .no_feature_transitions()
        .build()
}

/// Initialised and started controller for the given trial.
fn running(spec: impl Into<TrialSpec>) -> (Ctl, ManualClock) {
    let (mut ctl, clock) = controller();
    ctl.init(spec).unwrap();
    ctl.start().unwrap();
    (ctl, clock)
}

/// Press and release `key`, then let the reactivation delay run out.
fn step(ctl: &mut Ctl, clock: &ManualClock, key: Key) -> StepRecord {
    let rec = ctl.key_down(key).unwrap().expect("key should be processed");
    ctl.key_up(key);
    clock.advance(160);
    ctl.advance();
    rec
}

// ── Keys ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod keys {
    use super::*;

    #[test]
    fn key_codes() {
        assert_eq!(Key::from_key_code(37), Key::ArrowLeft);
        assert_eq!(Key::from_key_code(38), Key::ArrowUp);
        assert_eq!(Key::from_key_code(39), Key::ArrowRight);
        assert_eq!(Key::from_key_code(40), Key::ArrowDown);
        assert_eq!(Key::from_key_code(32), Key::Space);
        assert_eq!(Key::from_key_code(65), Key::Other(65));
    }

    #[test]
    fn space_is_wait_only_when_legal() {
        assert_eq!(Key::Space.action(false), None);
        assert_eq!(Key::Space.action(true), Some(Action::Wait));
        assert_eq!(Key::ArrowUp.action(false), Some(Action::Up));
        assert_eq!(Key::Other(13).action(true), None);
    }

    #[test]
    fn for_action_inverts_action() {
        for &a in Action::ALL.iter() {
            assert_eq!(Key::for_action(a).action(true), Some(a));
        }
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use super::*;
    use crate::TaskError;

    #[test]
    fn default_delays() {
        let cfg = TaskConfig::default();
        assert_eq!(cfg.reactivate_delay_ms(200), 160);
        assert_eq!(cfg.hide_delay_ms(200), 600);
        assert_eq!(cfg.end_delay_ms(200), 800);
    }

    #[test]
    fn builder_rejects_negative_fraction() {
        let cfg = TaskConfig { reactivate_delay_frac: -0.1, ..TaskConfig::default() };
        let err = TaskControllerBuilder::new(RecRenderer::default(), RecObserver::default(), ManualClock::default())
            .config(cfg)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, TaskError::Config(_)));
    }

    #[test]
    fn builder_rejects_multiplier_below_one() {
        let cfg = TaskConfig { end_delay_multiplier: 0.5, ..TaskConfig::default() };
        let result = TaskControllerBuilder::new(RecRenderer::default(), RecObserver::default(), ManualClock::default())
            .config(cfg)
            .build();
        assert!(matches!(result, Err(TaskError::Config(_))));
    }

    #[test]
    fn seed_is_recorded() {
        let (ctl, _) = controller();
        assert_eq!(ctl.seed(), 7);
        assert_eq!(ctl.config().seed, Some(7));
    }
}

// ── Timer queue ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod timers {
    use crate::{TimerEvent, TimerQueue};
    use gw_core::Millis;

    #[test]
    fn pops_in_deadline_order_fifo_on_ties() {
        let mut q = TimerQueue::new();
        q.push(Millis(20), 1, TimerEvent::EndTrial);
        q.push(Millis(10), 1, TimerEvent::Reactivate { id: 0 });
        q.push(Millis(10), 1, TimerEvent::HideAvatar);
        assert_eq!(q.len(), 3);
        assert_eq!(q.next_deadline(), Some(Millis(10)));

        let (t, first) = q.pop_due(Millis(100)).unwrap();
        assert_eq!((t, first.event), (Millis(10), TimerEvent::Reactivate { id: 0 }));
        let (_, second) = q.pop_due(Millis(100)).unwrap();
        assert_eq!(second.event, TimerEvent::HideAvatar);
        let (t, third) = q.pop_due(Millis(100)).unwrap();
        assert_eq!((t, third.event), (Millis(20), TimerEvent::EndTrial));
        assert!(q.is_empty());
    }

    #[test]
    fn nothing_due_before_deadline() {
        let mut q = TimerQueue::new();
        q.push(Millis(50), 1, TimerEvent::Reactivate { id: 0 });
        assert!(q.pop_due(Millis(49)).is_none());
        assert!(q.pop_due(Millis(50)).is_some());
    }

    #[test]
    fn retain_drops_matching_and_keeps_order() {
        let mut q = TimerQueue::new();
        q.push(Millis(10), 1, TimerEvent::Reactivate { id: 3 });
        q.push(Millis(10), 1, TimerEvent::HideAvatar);
        q.push(Millis(30), 1, TimerEvent::Reactivate { id: 4 });
        q.retain(|t| !matches!(t.event, TimerEvent::Reactivate { .. }));
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_deadline(), Some(Millis(10)));
        assert_eq!(q.pop_due(Millis(100)).unwrap().1.event, TimerEvent::HideAvatar);
        assert!(q.is_empty());
    }

    #[test]
    fn clear_empties() {
        let mut q = TimerQueue::new();
        q.push(Millis(1), 1, TimerEvent::Reactivate { id: 0 });
        q.push(Millis(2), 1, TimerEvent::EndTrial);
        q.clear();
        assert_eq!(q.len(), 0);
        assert_eq!(q.next_deadline(), None);
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;
    use crate::TaskError;

    #[test]
    fn uninitialized_fails_fast() {
        let (mut ctl, _) = controller();
        assert_eq!(ctl.phase(), TaskPhase::Uninitialized);
        assert!(matches!(ctl.key_down(Key::ArrowUp), Err(TaskError::NotInitialized)));
        assert!(matches!(ctl.start(), Err(TaskError::NotInitialized)));
        assert!(matches!(ctl.resume(), Err(TaskError::NotInitialized)));
        assert!(matches!(ctl.move_agent_to(c(0, 0)), Err(TaskError::NotInitialized)));
    }

    #[test]
    fn init_draws_board_and_places_avatar() {
        let (mut ctl, _) = controller();
        let spec = TrialSpec::new(
            GridSpec::builder(["#g", ".b"]).init_state(c(0, 0)).build(),
        )
        .with_walls(vec![WallSegment { at: c(0, 0), side: Some(Action::Left) }]);
        ctl.init(spec).unwrap();

        let calls = &ctl.renderer().calls;
        assert_eq!(calls[0], Call::Clear);
        let Call::Tiles(tiles) = &calls[1] else { panic!("expected tiles, got {:?}", calls[1]) };
        assert_eq!(tiles.len(), 4);
        let fill_at = |s: Coord| tiles.iter().find(|(t, _)| *t == s).and_then(|(_, st)| st.fill.clone());
        assert_eq!(fill_at(c(0, 1)).as_deref(), Some("black"));
        assert_eq!(fill_at(c(1, 1)).as_deref(), Some("lightgreen"));
        assert_eq!(fill_at(c(0, 0)).as_deref(), Some("white"));
        assert_eq!(fill_at(c(1, 0)).as_deref(), Some("lightblue"));
        assert_eq!(calls[2], Call::Walls(1));
        assert_eq!(calls[3], Call::Place(c(0, 0)));

        assert_eq!(ctl.phase(), TaskPhase::Ready);
        assert_eq!(ctl.position(), Some(c(0, 0)));
        assert!(!ctl.input_enabled());
        assert_eq!(ctl.generation(), 1);
    }

    #[test]
    fn unknown_feature_colour_uses_renderer_default() {
        let (mut ctl, _) = controller();
        ctl.init(GridSpec::builder(["z"]).build()).unwrap();
        let Call::Tiles(tiles) = &ctl.renderer().calls[1] else { panic!() };
        assert_eq!(tiles[0].1, TileStyle { fill: None });
    }

    #[test]
    fn keys_ignored_before_start() {
        let (mut ctl, _) = controller();
        ctl.init(open_3x3()).unwrap();
        assert_eq!(ctl.key_down(Key::ArrowRight).unwrap(), None);
        assert!(ctl.observer().steps.is_empty());
    }

    #[test]
    fn start_enables_and_stamps() {
        let (mut ctl, clock) = controller();
        ctl.init(open_3x3()).unwrap();
        clock.advance(250);
        ctl.start().unwrap();
        assert_eq!(ctl.phase(), TaskPhase::Running);
        assert!(ctl.input_enabled());
        assert_eq!(ctl.trial_start(), Millis(1_250));
    }

    #[test]
    fn missing_init_state_leaves_no_position() {
        let (mut ctl, _) = controller();
        ctl.init(GridSpec::builder(["..."]).build()).unwrap();
        assert_eq!(ctl.position(), None);
        assert!(!ctl.renderer().calls.iter().any(|c| matches!(c, Call::Place(_))));
        ctl.start().unwrap();
        assert!(matches!(ctl.key_down(Key::ArrowRight), Err(TaskError::NoPosition)));
        assert!(ctl.observer().steps.is_empty());
        // Teleporting fixes it.
        ctl.move_agent_to(c(1, 0)).unwrap();
        assert!(ctl.key_down(Key::ArrowRight).unwrap().is_some());
    }

    #[test]
    fn failed_init_keeps_previous_trial() {
        let (mut ctl, _) = running(open_3x3());
        let bad = GridSpec::builder(["j.."]).feature_transition('j', [("teleport", 1.0)]).build();
        assert!(matches!(ctl.init(bad), Err(TaskError::Mdp(_))));
        assert_eq!(ctl.generation(), 1);
        assert_eq!(ctl.phase(), TaskPhase::Running);
        assert_eq!(ctl.model().unwrap().width(), 3);
    }

    #[test]
    fn trial_name_is_kept() {
        let (mut ctl, _) = controller();
        ctl.init(TrialSpec::new(open_3x3()).named("practice-1")).unwrap();
        assert_eq!(ctl.trial_name(), Some("practice-1"));
    }
}

// ── Input gating ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod gating {
    use super::*;

    #[test]
    fn press_disables_input_synchronously() {
        let (mut ctl, _) = running(open_3x3());
        assert!(ctl.key_down(Key::ArrowRight).unwrap().is_some());
        assert!(!ctl.input_enabled());
        assert_eq!(ctl.phase(), TaskPhase::AwaitingReactivation);
        // Second press in the same tick does nothing.
        assert_eq!(ctl.key_down(Key::ArrowUp).unwrap(), None);
        assert_eq!(ctl.observer().steps.len(), 1);
        assert_eq!(ctl.position(), Some(c(1, 0)));
    }

    #[test]
    fn delay_first_then_release() {
        let (mut ctl, clock) = running(open_3x3());
        ctl.key_down(Key::ArrowRight).unwrap();

        clock.advance(159);
        ctl.advance();
        assert!(!ctl.input_enabled());

        clock.advance(1);
        ctl.advance();
        // Delay elapsed, key still held.
        assert!(!ctl.input_enabled());
        assert_eq!(ctl.trial_start(), Millis(1_160));

        clock.advance(500);
        ctl.key_up(Key::ArrowRight);
        assert!(ctl.input_enabled());
        assert_eq!(ctl.phase(), TaskPhase::Running);
    }

    #[test]
    fn release_first_then_delay() {
        let (mut ctl, clock) = running(open_3x3());
        ctl.key_down(Key::ArrowRight).unwrap();
        clock.advance(50);
        ctl.key_up(Key::ArrowRight);
        assert!(!ctl.input_enabled());

        clock.advance(110);
        ctl.advance();
        assert!(ctl.input_enabled());
    }

    #[test]
    fn releasing_another_key_does_not_count() {
        let (mut ctl, clock) = running(open_3x3());
        ctl.key_down(Key::ArrowRight).unwrap();
        ctl.key_up(Key::ArrowUp);
        clock.advance(1_000);
        ctl.advance();
        assert!(!ctl.input_enabled());
        ctl.key_up(Key::ArrowRight);
        assert!(ctl.input_enabled());
    }

    #[test]
    fn hold_key_policy_off_reactivates_on_delay() {
        let cfg = TaskConfig { disable_hold_key: false, ..TaskConfig::default() };
        let (mut ctl, clock) = controller_with(cfg);
        ctl.init(open_3x3()).unwrap();
        ctl.start().unwrap();
        ctl.key_down(Key::ArrowRight).unwrap();
        clock.advance(160);
        ctl.advance();
        assert!(ctl.input_enabled());
    }

    #[test]
    fn movement_policy_off_keeps_input() {
        let cfg = TaskConfig { disable_during_movement: false, ..TaskConfig::default() };
        let (mut ctl, _) = controller_with(cfg);
        ctl.init(TrialSpec::new(open_3x3()).show_rewards(false)).unwrap();
        ctl.start().unwrap();
        ctl.key_down(Key::ArrowRight).unwrap();
        assert!(ctl.input_enabled());
        ctl.key_down(Key::ArrowUp).unwrap();
        assert_eq!(ctl.position(), Some(c(1, 1)));
        assert_eq!(ctl.pending_timers(), 0);
    }

    #[test]
    fn timer_due_now_fires_before_key() {
        let (mut ctl, clock) = running(open_3x3());
        ctl.key_down(Key::ArrowRight).unwrap();
        ctl.key_up(Key::ArrowRight);
        clock.advance(160);
        // No explicit advance(): key_down drains the due reactivation first.
        assert!(ctl.key_down(Key::ArrowRight).unwrap().is_some());
        assert_eq!(ctl.position(), Some(c(2, 0)));
    }

    #[test]
    fn unrecognised_keys_are_ignored() {
        let (mut ctl, _) = running(open_3x3());
        assert_eq!(ctl.key_down(Key::Other(65)).unwrap(), None);
        // Wait is not legal on this grid.
        assert_eq!(ctl.key_down(Key::Space).unwrap(), None);
        assert!(ctl.input_enabled());
        assert!(ctl.observer().steps.is_empty());
        assert_eq!(ctl.last_key(), None);
    }

    #[test]
    fn space_waits_when_legal() {
        let spec = GridSpec::builder(["..."]).init_state(c(1, 0)).include_wait(true).build();
        let (mut ctl, _) = running(spec);
        let rec = ctl.key_down(Key::Space).unwrap().unwrap();
        assert_eq!(rec.action, Action::Wait);
        assert_eq!(rec.next_state, Some(c(1, 0)));
    }

    #[test]
    fn renderer_animation_length_drives_delays() {
        let (mut ctl, clock) = controller();
        ctl.renderer_mut().anim_override = Some(500);
        ctl.init(open_3x3()).unwrap();
        ctl.start().unwrap();
        ctl.key_down(Key::ArrowRight).unwrap();
        ctl.key_up(Key::ArrowRight);

        clock.advance(399);
        ctl.advance();
        assert!(!ctl.input_enabled());
        clock.advance(1);
        ctl.advance();
        assert!(ctl.input_enabled());

        // Reward label waits for the full 500 ms animation.
        assert!(ctl.renderer().texts().is_empty());
        clock.advance(100);
        ctl.advance();
        assert_eq!(ctl.renderer().texts().len(), 1);
    }
}

// ── Step records ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod records {
    use super::*;

    #[test]
    fn record_fields() {
        let spec = GridSpec::builder(["..g"])
            .init_state(c(0, 0))
            .feature_reward('g', 5.0)
            .step_cost(-1.0)
            .build();
        let (mut ctl, clock) = running(spec);
        clock.advance(300);
        let rec = step(&mut ctl, &clock, Key::ArrowRight);

        assert_eq!(rec.state, Some(c(0, 0)));
        assert_eq!(rec.state_feature, Some('.'));
        assert_eq!(rec.action, Action::Right);
        assert_eq!(rec.next_state, Some(c(1, 0)));
        assert_eq!(rec.next_state_feature, Some('.'));
        assert_eq!(rec.reward, Some(-1.0));
        assert_eq!(rec.start_ms, Millis(1_000));
        assert_eq!(rec.response_ms, Millis(1_300));
        assert_eq!(rec.response_time_ms(), 300);
        assert!(!rec.is_paused_step());

        // Next start is the reactivation instant.
        let rec = ctl.key_down(Key::ArrowRight).unwrap().unwrap();
        assert_eq!(rec.start_ms, Millis(1_460));
        assert_eq!(rec.next_state_feature, Some('g'));
        assert_eq!(rec.reward, Some(4.0));
        assert_eq!(ctl.observer().steps.len(), 2);
    }

    #[test]
    fn three_rights_on_open_grid() {
        let (mut ctl, clock) = running(open_3x3());
        let recs: Vec<StepRecord> =
            (0..3).map(|_| step(&mut ctl, &clock, Key::ArrowRight)).collect();

        let next: Vec<Coord> = recs.iter().map(|r| r.next_state.unwrap()).collect();
        assert_eq!(next, vec![c(1, 0), c(2, 0), c(2, 0)]);
        assert!(recs.iter().all(|r| r.reward == Some(-1.0)));
        // Clamped move: next equals the state before it.
        assert_eq!(recs[2].state, recs[1].next_state);
        assert_eq!(ctl.position(), Some(c(2, 0)));
    }

    #[test]
    fn jump_cell_stops_before_adjacent_wall() {
        // . j # .
        let spec = GridSpec::builder([".j#."])
            .init_state(c(0, 0))
            .feature_transition('j', [("2forward", 1.0)])
            .build();
        let (mut ctl, clock) = running(spec);
        let onto = step(&mut ctl, &clock, Key::ArrowRight);
        assert_eq!(onto.next_state, Some(c(1, 0)));
        let jump = step(&mut ctl, &clock, Key::ArrowRight);
        assert_eq!(jump.state_feature, Some('j'));
        assert_eq!(jump.next_state, Some(c(1, 0)));
    }

    #[test]
    fn jump_cell_stops_before_distant_wall() {
        // . j . #
        let spec = GridSpec::builder([".j.#"]).init_state(c(0, 0)).build();
        let (mut ctl, clock) = running(spec);
        step(&mut ctl, &clock, Key::ArrowRight);
        let jump = step(&mut ctl, &clock, Key::ArrowRight);
        assert_eq!(jump.next_state, Some(c(2, 0)));
    }

    #[test]
    fn fn_observer_receives_callbacks() {
        use crate::FnObserver;
        use std::cell::RefCell;
        use std::rc::Rc;

        let steps = Rc::new(RefCell::new(Vec::new()));
        let ends = Rc::new(RefCell::new(0));
        let (s, e) = (steps.clone(), ends.clone());
        let observer = FnObserver::new(
            move |r: &StepRecord| s.borrow_mut().push(r.next_state),
            move || *e.borrow_mut() += 1,
        );
        let clock = ManualClock::new(Millis(0));
        let mut ctl = TaskControllerBuilder::new(crate::NoopRenderer, observer, clock.clone())
            .seed(1)
            .build()
            .unwrap();
        ctl.init(GridSpec::builder([".."]).init_state(c(0, 0)).absorbing_state(c(1, 0)).build())
            .unwrap();
        ctl.start().unwrap();
        ctl.key_down(Key::ArrowRight).unwrap();
        clock.advance(800);
        ctl.advance();

        assert_eq!(*steps.borrow(), vec![Some(c(1, 0))]);
        assert_eq!(*ends.borrow(), 1);
    }

    #[test]
    fn seeded_controllers_agree() {
        let spec = || {
            GridSpec::builder([".........."])
                .init_state(c(0, 0))
                .feature_transition('.', [("forward", 0.5), ("2forward", 0.5)])
                .build()
        };
        let run = || {
            let cfg = TaskConfig { disable_during_movement: false, ..TaskConfig::default() };
            let (mut ctl, _) = controller_with(cfg);
            ctl.init(spec()).unwrap();
            ctl.start().unwrap();
            (0..60)
                .map(|_| {
                    ctl.move_agent_to(c(0, 0)).unwrap();
                    ctl.key_down(Key::ArrowRight).unwrap().unwrap().next_state.unwrap()
                })
                .collect::<Vec<_>>()
        };
        let a = run();
        assert_eq!(a, run());
        assert!(a.contains(&c(1, 0)));
        assert!(a.contains(&c(2, 0)));
    }
}

// ── Reward labels ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod reward_labels {
    use super::*;

    #[test]
    fn negative_label_after_animation() {
        let (mut ctl, clock) = running(open_3x3());
        ctl.key_down(Key::ArrowUp).unwrap();
        clock.advance(199);
        ctl.advance();
        assert!(ctl.renderer().texts().is_empty());
        clock.advance(1);
        ctl.advance();
        let texts = ctl.renderer().texts();
        assert_eq!(texts.len(), 1);
        let Call::Text(at, text, style, anim) = texts[0] else { unreachable!() };
        assert_eq!(*at, c(0, 1));
        assert_eq!(text, "-1");
        assert_eq!(style.fill, "red");
        assert_eq!(style.stroke, "white");
        assert_eq!(*anim, 800);
    }

    #[test]
    fn positive_label() {
        let spec = GridSpec::builder([".g"]).init_state(c(0, 0)).feature_reward('g', 5.0).build();
        let (mut ctl, clock) = running(spec);
        ctl.key_down(Key::ArrowRight).unwrap();
        clock.advance(200);
        ctl.advance();
        let texts = ctl.renderer().texts();
        let Call::Text(_, text, style, _) = texts[0] else { unreachable!() };
        assert_eq!(text, "+5");
        assert_eq!(style.fill, "yellow");
        assert_eq!(style.stroke, "black");
    }

    #[test]
    fn zero_reward_has_no_label() {
        let spec = GridSpec::builder([".."]).init_state(c(0, 0)).build();
        let (mut ctl, clock) = running(spec);
        step(&mut ctl, &clock, Key::ArrowRight);
        clock.advance(1_000);
        ctl.advance();
        assert!(ctl.renderer().texts().is_empty());
    }

    #[test]
    fn labels_can_be_switched_off() {
        let (mut ctl, clock) = running(TrialSpec::new(open_3x3()).show_rewards(false));
        step(&mut ctl, &clock, Key::ArrowRight);
        clock.advance(1_000);
        ctl.advance();
        assert!(ctl.renderer().texts().is_empty());
    }
}

// ── End of round ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod end_of_round {
    use super::*;

    fn corridor_with_goal() -> TrialSpec {
        TrialSpec::new(
            GridSpec::builder(["..."])
                .init_state(c(0, 0))
                .absorbing_state(c(2, 0))
                .step_cost(-1.0)
                .build(),
        )
        .show_rewards(false)
    }

    #[test]
    fn absorbing_state_runs_end_sequence() {
        let (mut ctl, clock) = running(corridor_with_goal());
        step(&mut ctl, &clock, Key::ArrowRight);
        // t = 1160
        ctl.key_down(Key::ArrowRight).unwrap().unwrap();
        assert_eq!(ctl.phase(), TaskPhase::Ended);
        assert!(!ctl.input_enabled());
        assert!(ctl.is_ended());
        ctl.key_up(Key::ArrowRight);

        let hides = |ctl: &Ctl| ctl.renderer().count(|c| *c == Call::Hide);

        clock.set(Millis(1_759));
        ctl.advance();
        assert_eq!(hides(&ctl), 0);
        clock.set(Millis(1_760));
        ctl.advance();
        assert_eq!(hides(&ctl), 1);
        assert_eq!(ctl.observer().ends, 0);

        clock.set(Millis(1_959));
        ctl.advance();
        assert!(!ctl.is_complete());
        clock.set(Millis(1_960));
        ctl.advance();
        assert_eq!(ctl.observer().ends, 1);
        assert!(ctl.is_complete());

        // Nothing is processed afterwards.
        assert_eq!(ctl.key_down(Key::ArrowLeft).unwrap(), None);
        ctl.resume().unwrap();
        assert_eq!(ctl.key_down(Key::ArrowLeft).unwrap(), None);
        assert_eq!(ctl.observer().steps.len(), 2);
    }

    #[test]
    fn absorbing_feature_ends_round() {
        let spec = GridSpec::builder([".y"]).init_state(c(0, 0)).absorbing_feature('y').build();
        let (mut ctl, clock) = running(spec);
        ctl.key_down(Key::ArrowRight).unwrap();
        assert_eq!(ctl.phase(), TaskPhase::Ended);
        clock.advance(800);
        ctl.advance();
        assert_eq!(ctl.observer().ends, 1);
    }

    #[test]
    fn end_task_ends_after_next_move() {
        let (mut ctl, clock) = running(corridor_with_goal());
        ctl.end_task();
        assert!(ctl.is_ended());
        ctl.key_down(Key::ArrowUp).unwrap().unwrap();
        assert_eq!(ctl.phase(), TaskPhase::Ended);
        clock.advance(800);
        ctl.advance();
        assert_eq!(ctl.observer().ends, 1);
    }

    #[test]
    fn end_task_during_reactivation_wait() {
        let (mut ctl, clock) = running(corridor_with_goal());
        ctl.key_down(Key::ArrowUp).unwrap();
        ctl.end_task();
        ctl.key_up(Key::ArrowUp);
        clock.advance(160);
        ctl.advance();
        // Input still comes back; the next move finishes the round.
        assert!(ctl.input_enabled());
        ctl.key_down(Key::ArrowUp).unwrap();
        assert_eq!(ctl.phase(), TaskPhase::Ended);
    }

    #[test]
    fn end_multiplier_scales_delays() {
        let cfg = TaskConfig { end_delay_multiplier: 2.0, ..TaskConfig::default() };
        let (mut ctl, clock) = controller_with(cfg);
        ctl.init(TrialSpec::new(GridSpec::builder([".."]).init_state(c(0, 0)).absorbing_state(c(1, 0)).build()))
            .unwrap();
        ctl.start().unwrap();
        ctl.key_down(Key::ArrowRight).unwrap();
        clock.advance(200);
        ctl.advance();
        assert_eq!(ctl.renderer().count(|c| *c == Call::Hide), 1);
        clock.advance(200);
        ctl.advance();
        assert_eq!(ctl.observer().ends, 1);
    }
}

// ── Pause / resume ────────────────────────────────────────────────────────────

#[cfg(test)]
mod pause {
    use super::*;

    #[test]
    fn paused_action_is_absorbed() {
        let (mut ctl, clock) = running(open_3x3());
        clock.advance(120);
        ctl.pause_next();
        let rec = ctl.key_down(Key::ArrowRight).unwrap().unwrap();

        assert!(rec.is_paused_step());
        assert_eq!(rec.state, None);
        assert_eq!(rec.next_state, None);
        assert_eq!(rec.reward, None);
        assert_eq!(rec.action, Action::Right);
        assert_eq!(rec.response_ms, Millis(1_120));
        assert_eq!(ctl.observer().steps.len(), 1);

        assert_eq!(ctl.position(), Some(c(0, 0)));
        assert_eq!(ctl.renderer().count(|c| matches!(c, Call::Animate(..))), 0);
        assert_eq!(ctl.phase(), TaskPhase::Paused);
        assert_eq!(ctl.pending_timers(), 0);

        ctl.key_up(Key::ArrowRight);
        clock.advance(10_000);
        ctl.advance();
        assert!(!ctl.input_enabled());
    }

    #[test]
    fn resume_restarts_timing() {
        let (mut ctl, clock) = running(open_3x3());
        ctl.pause_next();
        ctl.key_down(Key::ArrowRight).unwrap();
        clock.advance(2_000);
        ctl.resume().unwrap();

        assert!(!ctl.is_paused());
        assert!(ctl.input_enabled());
        assert_eq!(ctl.trial_start(), Millis(3_000));

        let rec = ctl.key_down(Key::ArrowRight).unwrap().unwrap();
        assert_eq!(rec.next_state, Some(c(1, 0)));
        assert_eq!(rec.start_ms, Millis(3_000));
    }

    #[test]
    fn resume_mid_wait_does_not_shorten_next_move() {
        let (mut ctl, clock) = running(open_3x3());
        ctl.key_down(Key::ArrowRight).unwrap();
        ctl.key_up(Key::ArrowRight);

        clock.set(Millis(1_050));
        ctl.resume().unwrap();
        assert!(ctl.input_enabled());
        assert_eq!(ctl.trial_start(), Millis(1_050));

        clock.set(Millis(1_100));
        ctl.key_down(Key::ArrowDown).unwrap().unwrap();
        ctl.key_up(Key::ArrowDown);

        // The first move's delay would have run out here.
        clock.set(Millis(1_160));
        ctl.advance();
        assert!(!ctl.input_enabled());
        assert_eq!(ctl.trial_start(), Millis(1_050));

        clock.set(Millis(1_260));
        ctl.advance();
        assert!(ctl.input_enabled());
        assert_eq!(ctl.trial_start(), Millis(1_260));
    }
}

// ── Re-init, reset, teleport ──────────────────────────────────────────────────

#[cfg(test)]
mod restart {
    use super::*;
    use crate::TaskError;

    #[test]
    fn reinit_cancels_pending_reactivation() {
        let (mut ctl, clock) = running(open_3x3());
        ctl.key_down(Key::ArrowRight).unwrap();
        ctl.key_up(Key::ArrowRight);
        assert!(ctl.pending_timers() > 0);

        ctl.init(open_3x3()).unwrap();
        assert_eq!(ctl.pending_timers(), 0);
        assert_eq!(ctl.generation(), 2);
        clock.advance(1_000);
        assert_eq!(ctl.advance(), 0);
        assert_eq!(ctl.phase(), TaskPhase::Ready);
        assert_eq!(ctl.position(), Some(c(0, 0)));
    }

    #[test]
    fn reinit_cancels_end_sequence() {
        let spec = GridSpec::builder([".."]).init_state(c(0, 0)).absorbing_state(c(1, 0)).build();
        let (mut ctl, clock) = running(spec.clone());
        ctl.key_down(Key::ArrowRight).unwrap();
        ctl.init(spec).unwrap();
        clock.advance(1_000);
        ctl.advance();
        assert_eq!(ctl.observer().ends, 0);
        assert!(!ctl.is_ended());
        assert!(!ctl.is_complete());
    }

    #[test]
    fn reset_redraws_and_disables() {
        let (mut ctl, clock) = running(open_3x3());
        ctl.key_down(Key::ArrowRight).unwrap();
        ctl.key_up(Key::ArrowRight);
        let before = ctl.renderer().calls.len();

        ctl.reset();
        let calls = &ctl.renderer().calls[before..];
        assert_eq!(calls[0], Call::Clear);
        assert!(matches!(calls[1], Call::Tiles(ref t) if t.len() == 9));
        assert!(!calls.contains(&Call::Release));

        // The dropped reactivation does not re-enable input.
        clock.advance(500);
        ctl.advance();
        assert!(!ctl.input_enabled());
        assert_eq!(ctl.position(), Some(c(1, 0)));

        ctl.start().unwrap();
        assert!(ctl.input_enabled());
    }

    #[test]
    fn reset_mid_wait_does_not_shorten_next_move() {
        let (mut ctl, clock) = running(open_3x3());
        ctl.key_down(Key::ArrowRight).unwrap();
        ctl.key_up(Key::ArrowRight);

        clock.set(Millis(1_050));
        ctl.reset();
        assert_ne!(ctl.next_deadline(), Some(Millis(1_160)));
        ctl.start().unwrap();

        clock.set(Millis(1_100));
        ctl.key_down(Key::ArrowDown).unwrap().unwrap();
        ctl.key_up(Key::ArrowDown);

        clock.set(Millis(1_160));
        ctl.advance();
        assert!(!ctl.input_enabled());
        assert_eq!(ctl.trial_start(), Millis(1_050));

        clock.set(Millis(1_260));
        ctl.advance();
        assert!(ctl.input_enabled());
        assert_eq!(ctl.trial_start(), Millis(1_260));
    }

    #[test]
    fn entry_points_fire_due_timers_first() {
        let (mut ctl, clock) = running(open_3x3());
        ctl.key_down(Key::ArrowRight).unwrap();
        ctl.key_up(Key::ArrowRight);
        clock.set(Millis(1_200));

        ctl.move_agent_to(c(0, 2)).unwrap();
        assert!(ctl.input_enabled());
        assert_eq!(ctl.trial_start(), Millis(1_160));

        ctl.key_down(Key::ArrowRight).unwrap();
        ctl.key_up(Key::ArrowRight);
        clock.set(Millis(1_400));
        ctl.end_task();
        assert!(ctl.input_enabled());
        assert_eq!(ctl.trial_start(), Millis(1_360));
    }

    #[test]
    fn clear_releases_keys() {
        let (mut ctl, _) = running(open_3x3());
        ctl.clear();
        assert_eq!(ctl.renderer().calls.last(), Some(&Call::Release));
        assert!(!ctl.input_enabled());
    }

    #[test]
    fn move_agent_teleports_silently() {
        let (mut ctl, _) = running(open_3x3());
        let before = ctl.renderer().calls.len();
        ctl.move_agent_to(c(2, 2)).unwrap();
        assert_eq!(
            ctl.renderer().calls[before..],
            [Call::Hide, Call::Place(c(2, 2)), Call::Show]
        );
        assert_eq!(ctl.position(), Some(c(2, 2)));
        assert!(ctl.observer().steps.is_empty());
        assert!(ctl.input_enabled());
    }

    #[test]
    fn move_agent_rejects_off_grid() {
        let (mut ctl, _) = running(open_3x3());
        assert!(matches!(ctl.move_agent_to(c(3, 0)), Err(TaskError::OffGrid(_))));
        assert_eq!(ctl.position(), Some(c(0, 0)));
    }
}
