//! Grid coordinate type.
//!
//! `Coord` is 0-indexed with the origin at the bottom-left cell: `x` grows to
//! the right and `y` grows upwards.  Signed components let callers form
//! off-grid candidates (`state + 2·direction`) before clamping them back onto
//! the grid.
//!
//! The `Display` form `"x,y"` doubles as the stringified map key used by
//! experiment data files; [`FromStr`] parses it back.

use std::fmt;
use std::str::FromStr;

use crate::GwError;

/// A cell position on the grid.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "(i32, i32)", into = "(i32, i32)")
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate `n` unit steps along `dir` from `self`.
    ///
    /// No clamping happens here; the grid model owns bounds.
    #[inline]
    pub fn step(self, dir: (i32, i32), n: i32) -> Coord {
        Coord {
            x: self.x + dir.0 * n,
            y: self.y + dir.1 * n,
        }
    }

    /// Manhattan distance to `other`.
    #[inline]
    pub fn manhattan(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(i32, i32)> for Coord {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Coord { x, y }
    }
}

impl From<Coord> for (i32, i32) {
    #[inline]
    fn from(c: Coord) -> Self {
        (c.x, c.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Coord {
    type Err = GwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| GwError::ParseCoord(s.to_string()))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|_| GwError::ParseCoord(s.to_string()))
        };
        Ok(Coord::new(parse(x)?, parse(y)?))
    }
}
