//! replay: drive a grid-world trial from a key script in virtual time.
//!
//! Loads a trial file (or the bundled demo trial), presses the scripted keys
//! against a `ManualClock`, and prints every step record as a JSON line on
//! stdout.  Renderer calls are logged through `tracing`; set `RUST_LOG=debug`
//! to see the controller's own decisions too.
//!
//! ```text
//! replay --script '^>>>^^' --csv steps.csv
//! replay trials/demo.json --index 0 --seed 3 --gap-ms 400
//! ```

mod script;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gw_core::{Action, Clock, Coord, ManualClock, Millis};
use gw_mdp::{load_spec_str, load_trials_reader, TrialSpec, WallSegment};
use gw_task::{
    Renderer, StepRecord, TaskConfig, TaskController, TaskControllerBuilder, TaskObserver,
    TaskPhase, TextStyle, TileStyle,
};

use script::Command;

const DEMO_TRIAL: &str = include_str!("../trials/demo.json");

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "replay")]
#[command(about = "Replay a key script against a grid-world trial", long_about = None)]
struct Cli {
    /// Trial JSON (one object, or an array of trials).  Defaults to the
    /// bundled demo trial.
    trial: Option<PathBuf>,

    /// Which trial to run when the file holds an array.
    #[arg(long, default_value = "0")]
    index: usize,

    /// Key script, e.g. "^>>p>r^".
    #[arg(short, long, default_value = "^>>>^^")]
    script: String,

    /// Timing config as JSON (fields of TaskConfig; missing fields default).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for transition sampling (overrides the config).
    #[arg(long)]
    seed: Option<u64>,

    /// How long each key is held down.
    #[arg(long, default_value = "50")]
    hold_ms: u64,

    /// Pause after each key release before the next command.
    #[arg(long, default_value = "300")]
    gap_ms: u64,

    /// Also write the step log as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,
}

// ── Collaborators ─────────────────────────────────────────────────────────────

/// Logs every visual intent instead of drawing it.
struct LogRenderer {
    clock: ManualClock,
}

impl Renderer for LogRenderer {
    fn draw_tiles(&mut self, tiles: &[(Coord, TileStyle)]) {
        info!(t = %self.clock.now(), tiles = tiles.len(), "draw tiles");
    }
    fn draw_walls(&mut self, walls: &[WallSegment]) {
        info!(t = %self.clock.now(), walls = walls.len(), "draw walls");
    }
    fn place_avatar(&mut self, at: Coord) {
        info!(t = %self.clock.now(), %at, "place avatar");
    }
    fn animate_avatar_to(&mut self, to: Coord, action: Action) -> Option<u64> {
        info!(t = %self.clock.now(), %to, %action, "animate avatar");
        None
    }
    fn show_floating_text(&mut self, at: Coord, text: &str, style: &TextStyle, anim_ms: u64) {
        info!(t = %self.clock.now(), %at, text, fill = %style.fill, anim_ms, "float text");
    }
    fn hide_avatar(&mut self) {
        info!(t = %self.clock.now(), "hide avatar");
    }
    fn show_avatar(&mut self) {
        info!(t = %self.clock.now(), "show avatar");
    }
    fn clear_objects(&mut self) {
        info!(t = %self.clock.now(), "clear objects");
    }
    fn release_keys(&mut self) {
        info!(t = %self.clock.now(), "release keys");
    }
}

#[derive(Default)]
struct Recorder {
    steps: Vec<StepRecord>,
    ended: bool,
}

impl TaskObserver for Recorder {
    fn on_step(&mut self, record: &StepRecord) {
        self.steps.push(record.clone());
    }
    fn on_end(&mut self) {
        self.ended = true;
    }
}

type Task = TaskController<LogRenderer, Recorder, ManualClock>;

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let trial = load_trial(cli.trial.as_deref(), cli.index)?;
    let commands = script::parse(&cli.script)?;

    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<TaskConfig>(&text).context("parsing config")?
        }
        None => TaskConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    let clock = ManualClock::new(Millis::ZERO);
    let renderer = LogRenderer { clock: clock.clone() };
    let mut task = TaskControllerBuilder::new(renderer, Recorder::default(), clock.clone())
        .config(config)
        .build()?;
    info!(seed = task.seed(), "controller ready");

    task.init(trial)?;
    task.start()?;

    for cmd in commands {
        if task.is_complete() {
            warn!("trial already complete; ignoring the rest of the script");
            break;
        }
        match cmd {
            Command::Press(key) => {
                settle(&mut task, &clock);
                if task.key_down(key)?.is_none() {
                    warn!(?key, phase = ?task.phase(), "key ignored");
                }
                clock.advance(cli.hold_ms);
                task.key_up(key);
                clock.advance(cli.gap_ms);
                task.advance();
            }
            Command::PauseNext => task.pause_next(),
            Command::Resume => task.resume()?,
            Command::EndTask => task.end_task(),
            Command::Idle => {
                clock.advance(cli.gap_ms);
                task.advance();
            }
        }
    }
    drain(&mut task, &clock);

    let recorder = task.observer();
    for record in &recorder.steps {
        println!("{}", serde_json::to_string(record)?);
    }
    let total: f64 = recorder.steps.iter().filter_map(|r| r.reward).sum();
    info!(
        steps = recorder.steps.len(),
        total_reward = total,
        complete = recorder.ended,
        final_position = ?task.position(),
        "replay finished"
    );

    if let Some(path) = &cli.csv {
        write_csv(path, &recorder.steps)?;
        info!(path = %path.display(), "wrote step log");
    }
    Ok(())
}

fn load_trial(path: Option<&Path>, index: usize) -> Result<TrialSpec> {
    let text = match path {
        Some(p) => fs::read_to_string(p).with_context(|| format!("reading trial {}", p.display()))?,
        None => DEMO_TRIAL.to_string(),
    };
    if text.trim_start().starts_with('[') {
        let mut trials = load_trials_reader(text.as_bytes())?;
        if index >= trials.len() {
            bail!("trial index {index} out of range ({} trials)", trials.len());
        }
        Ok(trials.swap_remove(index))
    } else {
        Ok(load_spec_str(&text)?)
    }
}

/// Run timers until input comes back after the previous move.
fn settle(task: &mut Task, clock: &ManualClock) {
    while task.phase() == TaskPhase::AwaitingReactivation {
        let Some(deadline) = task.next_deadline() else { break };
        clock.set(deadline.max(clock.now()));
        task.advance();
    }
}

/// Run every remaining timer (reward labels, end of round).
fn drain(task: &mut Task, clock: &ManualClock) {
    while let Some(deadline) = task.next_deadline() {
        clock.set(deadline.max(clock.now()));
        task.advance();
    }
}

fn write_csv(path: &Path, steps: &[StepRecord]) -> Result<()> {
    fn opt<T: ToString>(v: Option<T>) -> String {
        v.map(|x| x.to_string()).unwrap_or_default()
    }

    let mut w = csv::Writer::from_path(path)?;
    w.write_record([
        "state",
        "state_feature",
        "action",
        "next_state",
        "next_state_feature",
        "reward",
        "start_ms",
        "response_ms",
        "rt_ms",
    ])?;
    for r in steps {
        w.write_record(&[
            opt(r.state),
            opt(r.state_feature),
            r.action.to_string(),
            opt(r.next_state),
            opt(r.next_state_feature),
            opt(r.reward),
            r.start_ms.0.to_string(),
            r.response_ms.0.to_string(),
            r.response_time_ms().to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
