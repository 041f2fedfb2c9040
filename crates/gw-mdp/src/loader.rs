//! JSON trial-parameter loader.
//!
//! # Format
//!
//! One JSON object per trial, in the shape the experiment's trial generator
//! writes (`taskparams`).  Either the bare parameter object or a wrapper
//! holding it under `"taskparams"` is accepted.
//!
//! ```json
//! {
//!   "name": "grid-07",
//!   "feature_array": ["G..", ".#.", "..."],
//!   "init_state": [0, 0],
//!   "absorbing_features": ["G"],
//!   "feature_rewards": {"G": 10},
//!   "feature_transitions": {"j": {"2forward": 1.0}},
//!   "wall_features": ["#"],
//!   "step_cost": -1,
//!   "include_wait": false,
//!   "walls": [{"x": 1, "y": 1, "side": "^"}],
//!   "show_rewards": true
//! }
//! ```
//!
//! | Field                 | Default                         |
//! |-----------------------|---------------------------------|
//! | `feature_array`       | `gridworld_array`; one required |
//! | `init_state`          | none                            |
//! | `absorbing_states`    | `[]`                            |
//! | `absorbing_features`  | `[]`                            |
//! | `feature_rewards`     | `{}`                            |
//! | `feature_transitions` | `{"j": {"2forward": 1.0}}`      |
//! | `wall_features`       | `["#"]`                         |
//! | `step_cost`           | `0`                             |
//! | `include_wait`        | `false`                         |
//! | `walls`               | `[]`                            |
//! | `show_rewards`        | `true`                          |
//! | `feature_colors`      | built-in palette                |
//!
//! Rule tables keep the order they are written in; unknown fields are
//! ignored.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use gw_core::{Action, Coord};

use crate::rules::RuleTable;
use crate::spec::{GridSpec, RuleWeights, DEFAULT_WALL_FEATURE};
use crate::trial::{default_feature_colors, TrialSpec, WallSegment};
use crate::{MdpError, MdpResult};

// ── JSON records ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TaskParamsRecord {
    #[serde(default)]
    name:                Option<String>,
    #[serde(default)]
    feature_array:       Option<Vec<String>>,
    #[serde(default)]
    gridworld_array:     Option<Vec<String>>,
    #[serde(default)]
    init_state:          Option<[i32; 2]>,
    #[serde(default)]
    absorbing_states:    Vec<[i32; 2]>,
    #[serde(default)]
    absorbing_features:  Vec<String>,
    #[serde(default)]
    feature_rewards:     BTreeMap<String, f64>,
    #[serde(default)]
    feature_transitions: Option<Map<String, Value>>,
    #[serde(default)]
    wall_features:       Option<Vec<String>>,
    #[serde(default)]
    step_cost:           f64,
    #[serde(default)]
    include_wait:        bool,
    #[serde(default)]
    walls:               Vec<WallRecord>,
    #[serde(default)]
    show_rewards:        Option<bool>,
    #[serde(default)]
    feature_colors:      Option<BTreeMap<String, String>>,
}

#[derive(Deserialize)]
struct WallRecord {
    x:    i32,
    y:    i32,
    #[serde(default)]
    side: Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load one trial from a JSON file.
pub fn load_spec_json(path: &Path) -> MdpResult<TrialSpec> {
    let file = std::fs::File::open(path)?;
    load_spec_reader(file)
}

/// Like [`load_spec_json`] but accepts any `Read` source.
pub fn load_spec_reader<R: Read>(reader: R) -> MdpResult<TrialSpec> {
    let value: Value = serde_json::from_reader(reader)?;
    trial_from_value(value)
}

/// Parse one trial from a JSON string.
pub fn load_spec_str(json: &str) -> MdpResult<TrialSpec> {
    let value: Value = serde_json::from_str(json)?;
    trial_from_value(value)
}

/// Load a JSON array of trials (as written by the trial generator).
pub fn load_trials_reader<R: Read>(reader: R) -> MdpResult<Vec<TrialSpec>> {
    let values: Vec<Value> = serde_json::from_reader(reader)?;
    values.into_iter().map(trial_from_value).collect()
}

// ── Conversion ────────────────────────────────────────────────────────────────

fn trial_from_value(mut value: Value) -> MdpResult<TrialSpec> {
    if let Some(inner) = value.get_mut("taskparams").map(Value::take) {
        value = inner;
    }
    let record: TaskParamsRecord = serde_json::from_value(value)?;
    trial_from_record(record)
}

fn trial_from_record(r: TaskParamsRecord) -> MdpResult<TrialSpec> {
    let feature_rows = r
        .feature_array
        .or(r.gridworld_array)
        .ok_or_else(|| MdpError::Params("missing feature_array".to_string()))?;

    let wall_features = match r.wall_features {
        None => vec![DEFAULT_WALL_FEATURE],
        Some(v) => v.iter().map(|s| parse_feature(s, "wall_features")).collect::<MdpResult<_>>()?,
    };

    let feature_transitions = match r.feature_transitions {
        None => GridSpec::default_feature_transitions(),
        Some(table) => table
            .into_iter()
            .map(|(f, rules)| Ok((parse_feature(&f, "feature_transitions")?, parse_weights(&f, rules)?)))
            .collect::<MdpResult<_>>()?,
    };

    let grid = GridSpec {
        feature_rows,
        init_state: r.init_state.map(coord),
        absorbing_states: r.absorbing_states.into_iter().map(coord).collect(),
        absorbing_features: r
            .absorbing_features
            .iter()
            .map(|s| parse_feature(s, "absorbing_features"))
            .collect::<MdpResult<_>>()?,
        wall_features,
        feature_rewards: r
            .feature_rewards
            .iter()
            .map(|(f, &v)| Ok((parse_feature(f, "feature_rewards")?, v)))
            .collect::<MdpResult<_>>()?,
        feature_transitions,
        step_cost: r.step_cost,
        include_wait: r.include_wait,
        rules: RuleTable::default(),
    };

    let walls = r
        .walls
        .into_iter()
        .map(|w| {
            let side = match w.side.as_deref() {
                None => None,
                Some(s) => Some(parse_side(s)?),
            };
            Ok(WallSegment { at: Coord::new(w.x, w.y), side })
        })
        .collect::<MdpResult<_>>()?;

    let mut feature_colors = default_feature_colors();
    if let Some(colors) = r.feature_colors {
        for (f, c) in colors {
            feature_colors.insert(parse_feature(&f, "feature_colors")?, c);
        }
    }

    Ok(TrialSpec {
        name: r.name,
        grid,
        walls,
        show_rewards: r.show_rewards.unwrap_or(true),
        feature_colors,
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn coord([x, y]: [i32; 2]) -> Coord {
    Coord::new(x, y)
}

fn parse_feature(s: &str, field: &str) -> MdpResult<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(MdpError::Params(format!(
            "{field}: feature {s:?} must be exactly one character"
        ))),
    }
}

fn parse_weights(feature: &str, rules: Value) -> MdpResult<RuleWeights> {
    let Value::Object(rules) = rules else {
        return Err(MdpError::Params(format!(
            "feature_transitions[{feature:?}] must map rule names to probabilities"
        )));
    };
    rules
        .into_iter()
        .map(|(name, p)| {
            let p = p.as_f64().ok_or_else(|| {
                MdpError::Params(format!(
                    "feature_transitions[{feature:?}][{name:?}] is not a number"
                ))
            })?;
            Ok((name, p))
        })
        .collect()
}

fn parse_side(s: &str) -> MdpResult<Action> {
    parse_feature(s, "walls.side")
        .and_then(|c| Action::try_from(c).map_err(MdpError::from))
        .and_then(|a| {
            if a.is_wait() {
                Err(MdpError::Params("walls.side must be one of ^ v < >".to_string()))
            } else {
                Ok(a)
            }
        })
}
