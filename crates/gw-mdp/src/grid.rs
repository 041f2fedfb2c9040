//! Feature-grid geometry.
//!
//! # Data layout
//!
//! Features are stored row-major with **y = 0 at the bottom**:
//!
//! ```text
//! features[ y * width + x ]
//! ```
//!
//! Trial files list rows top-first (the way they read on screen), so row `r`
//! of the input is grid row `height - r - 1`.  The flip happens once in
//! [`Grid::from_rows`]; everything downstream uses bottom-left coordinates.

use std::collections::HashSet;

use gw_core::{product, Coord};

use crate::{MdpError, MdpResult};

/// Set of cells probed on every transition (walls, absorbing states).
/// The `fx-hash` feature swaps SipHash for FxHash.
#[cfg(feature = "fx-hash")]
pub type CoordSet = rustc_hash::FxHashSet<Coord>;
#[cfg(not(feature = "fx-hash"))]
pub type CoordSet = HashSet<Coord>;

/// Grid dimensions, per-cell features and the precomputed wall set.
#[derive(Debug, Clone)]
pub struct Grid {
    width:    i32,
    height:   i32,
    features: Vec<char>,
    walls:    CoordSet,
}

impl Grid {
    /// Build from top-first rows of one-character features.
    ///
    /// Fails on an empty grid or rows of unequal length.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], wall_features: &HashSet<char>) -> MdpResult<Self> {
        let first = rows.first().ok_or(MdpError::EmptyGrid)?;
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(MdpError::EmptyGrid);
        }
        let height = rows.len();

        let mut features = vec![' '; width * height];
        for (r, row) in rows.iter().enumerate() {
            let cells: Vec<char> = row.as_ref().chars().collect();
            if cells.len() != width {
                return Err(MdpError::RaggedRow { row: r, expected: width, got: cells.len() });
            }
            let y = height - r - 1;
            features[y * width..(y + 1) * width].copy_from_slice(&cells);
        }

        let mut grid = Grid {
            width:    width as i32,
            height:   height as i32,
            features,
            walls:    CoordSet::default(),
        };
        grid.walls = grid
            .states()
            .into_iter()
            .filter(|&s| grid.feature_of(s).is_some_and(|f| wall_features.contains(&f)))
            .collect();
        Ok(grid)
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.features.len()
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn in_bounds(&self, s: Coord) -> bool {
        (0..self.width).contains(&s.x) && (0..self.height).contains(&s.y)
    }

    /// Clamp `s` onto the grid.
    #[inline]
    pub fn on_grid(&self, s: Coord) -> Coord {
        Coord::new(s.x.clamp(0, self.width - 1), s.y.clamp(0, self.height - 1))
    }

    /// The feature symbol at `s`, or `None` off-grid.
    #[inline]
    pub fn feature_of(&self, s: Coord) -> Option<char> {
        if !self.in_bounds(s) {
            return None;
        }
        Some(self.features[(s.y * self.width + s.x) as usize])
    }

    /// `true` if `s` carries a wall feature.  Off-grid cells are not walls;
    /// rules clamp before asking.
    #[inline]
    pub fn is_wall(&self, s: Coord) -> bool {
        self.walls.contains(&s)
    }

    /// All wall cells, in no particular order.
    pub fn walls(&self) -> impl Iterator<Item = Coord> + '_ {
        self.walls.iter().copied()
    }

    /// Every in-bounds coordinate, `x` varying slowest.
    pub fn states(&self) -> Vec<Coord> {
        let xs: Vec<i32> = (0..self.width).collect();
        let ys: Vec<i32> = (0..self.height).collect();
        product(&[xs, ys])
            .into_iter()
            .map(|xy| Coord::new(xy[0], xy[1]))
            .collect()
    }

    pub(crate) fn check_in_bounds(&self, what: &'static str, s: Coord) -> MdpResult<()> {
        if self.in_bounds(s) {
            Ok(())
        } else {
            Err(MdpError::OutOfBounds { what, coord: s, width: self.width, height: self.height })
        }
    }
}
