//! `TrialSpec`: a `GridSpec` plus the presentation parameters that travel
//! with it in trial files.
//!
//! The grid model ignores everything here except [`TrialSpec::grid`]; the
//! task controller forwards the rest to its renderer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gw_core::{Action, Coord};

use crate::GridSpec;

/// Default tile colours keyed by feature symbol.
pub const DEFAULT_FEATURE_COLORS: [(char, &str); 7] = [
    ('.', "white"),
    ('b', "lightblue"),
    ('g', "lightgreen"),
    ('r', "red"),
    ('y', "yellow"),
    ('c', "chocolate"),
    ('#', "black"),
];

/// A decorative wall drawn on a cell edge (or over the whole cell).
///
/// Purely visual: blocking is decided by wall *features* in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallSegment {
    pub at:   Coord,
    /// Which edge of the cell, as a direction; `None` covers the whole cell.
    pub side: Option<Action>,
}

/// Everything needed to (re)initialise the task controller for one trial.
#[derive(Debug, Clone)]
pub struct TrialSpec {
    /// Optional grid name carried through for logging.
    pub name:           Option<String>,
    pub grid:           GridSpec,
    pub walls:          Vec<WallSegment>,
    /// Whether reward labels float up after each move.
    pub show_rewards:   bool,
    /// Tile fill per feature.  Features missing here are drawn with the
    /// renderer's default fill.
    pub feature_colors: BTreeMap<char, String>,
}

impl TrialSpec {
    pub fn new(grid: GridSpec) -> Self {
        TrialSpec {
            name:           None,
            grid,
            walls:          Vec::new(),
            show_rewards:   true,
            feature_colors: default_feature_colors(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_walls(mut self, walls: Vec<WallSegment>) -> Self {
        self.walls = walls;
        self
    }

    pub fn show_rewards(mut self, show: bool) -> Self {
        self.show_rewards = show;
        self
    }

    pub fn color_of(&self, feature: char) -> Option<&str> {
        self.feature_colors.get(&feature).map(String::as_str)
    }
}

impl From<GridSpec> for TrialSpec {
    fn from(grid: GridSpec) -> Self {
        TrialSpec::new(grid)
    }
}

pub fn default_feature_colors() -> BTreeMap<char, String> {
    DEFAULT_FEATURE_COLORS
        .iter()
        .map(|&(f, c)| (f, c.to_string()))
        .collect()
}
