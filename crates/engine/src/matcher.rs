//! Exact LCS word diff over bounded slices.
//!
//! Pure and deterministic. Cost is `O(n·m)` in time and memory, which is why
//! the driver only ever hands it bounded windows.

use crate::types::DiffToken;

/// Compute the word-level diff of two token slices.
///
/// Tokens equal by string comparison become `Unchanged`; the rest are
/// reported as `Removed` (base side) and `Added` (comparison side). On equal
/// DP scores the backtrack takes the insertion branch first, which places
/// removals before insertions at replacement sites; this tie-break is the
/// stability contract for repeated runs.
#[must_use]
pub fn diff(base: &[&str], comparison: &[&str]) -> Vec<DiffToken> {
    if base.is_empty() && comparison.is_empty() {
        return Vec::new();
    }

    let table = LcsTable::build(base, comparison);
    backtrack(&table, base, comparison)
}

/// `(|a|+1) × (|b|+1)` LCS-length table, flat row-major.
///
/// Window lengths fit in `u32`, which halves the footprint of the hot
/// allocation compared to `usize` cells.
struct LcsTable {
    cols: usize,
    cells: Vec<u32>,
}

impl LcsTable {
    fn build(a: &[&str], b: &[&str]) -> Self {
        let rows = a.len() + 1;
        let cols = b.len() + 1;
        let mut cells = vec![0u32; rows * cols];

        for i in 1..rows {
            for j in 1..cols {
                cells[i * cols + j] = if a[i - 1] == b[j - 1] {
                    cells[(i - 1) * cols + (j - 1)] + 1
                } else {
                    cells[i * cols + (j - 1)].max(cells[(i - 1) * cols + j])
                };
            }
        }

        Self { cols, cells }
    }

    fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.cols + j]
    }
}

fn backtrack(table: &LcsTable, a: &[&str], b: &[&str]) -> Vec<DiffToken> {
    let mut tokens = Vec::with_capacity(a.len().max(b.len()));
    let mut i = a.len();
    let mut j = b.len();

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a[i - 1] == b[j - 1] {
            tokens.push(DiffToken::unchanged(a[i - 1]));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table.get(i, j) == table.get(i, j - 1)) {
            tokens.push(DiffToken::added(b[j - 1]));
            j -= 1;
        } else {
            // i > 0 here: the branch above absorbs every i == 0 step
            tokens.push(DiffToken::removed(a[i - 1]));
            i -= 1;
        }
    }

    tokens.reverse();
    tokens
}
