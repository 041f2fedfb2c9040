//! Small combinatorial and sampling helpers.

use rand::Rng;

/// Allowed deviation of a probability table's sum from 1 before callers
/// should warn about it.
pub const PROB_SUM_TOLERANCE: f64 = 1e-2;

/// Cartesian product of `dims`, first dimension varying slowest.
///
/// `product(&[vec![0, 1], vec![7, 8]])` yields
/// `[[0, 7], [0, 8], [1, 7], [1, 8]]`.  An empty `dims` yields one empty
/// combination; any empty dimension yields no combinations.
pub fn product<T: Clone>(dims: &[Vec<T>]) -> Vec<Vec<T>> {
    let mut out: Vec<Vec<T>> = vec![Vec::with_capacity(dims.len())];
    for dim in dims {
        let mut next = Vec::with_capacity(out.len() * dim.len());
        for prefix in &out {
            for item in dim {
                let mut combo = prefix.clone();
                combo.push(item.clone());
                next.push(combo);
            }
        }
        out = next;
    }
    out
}

/// Sum of the weights in an ordered `(item, weight)` table.
pub fn probability_sum<T>(table: &[(T, f64)]) -> f64 {
    table.iter().map(|(_, p)| p).sum()
}

/// Pick from `table` using a pre-drawn uniform value `draw`.
///
/// Scans the cumulative weights in order and returns the first item whose
/// cumulative weight is `>= draw`.  If rounding leaves the draw unmatched
/// (weights summing to less than `draw`), the last item is returned.
/// Returns `None` only for an empty table.
pub fn choose_by_draw<T>(table: &[(T, f64)], draw: f64) -> Option<&T> {
    let mut cum = 0.0;
    for (item, p) in table {
        cum += p;
        if cum >= draw {
            return Some(item);
        }
    }
    table.last().map(|(item, _)| item)
}

/// Weighted random choice over an ordered `(item, weight)` table.
pub fn weighted_choice<'a, T, R: Rng>(table: &'a [(T, f64)], rng: &mut R) -> Option<&'a T> {
    let draw: f64 = rng.r#gen();
    choose_by_draw(table, draw)
}
