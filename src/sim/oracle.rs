//! Move search: hints and deadlock detection
//!
//! Every candidate swap is applied to one scratch copy of the board,
//! analyzed, and reverted before the next candidate is tried.

use super::analyze::analyze;
use super::cells::Position;
use super::grid::Grid;
use crate::consts::{COLS, ROWS};

/// Swap, analyze, revert. Both cells must be occupied.
fn swap_reveals_match(scratch: &mut Grid, a: Position, b: Position) -> bool {
    if !scratch.is_occupied(a) || !scratch.is_occupied(b) {
        return false;
    }
    scratch.swap(a, b);
    let found = !analyze(scratch).is_empty();
    scratch.swap(a, b);
    found
}

/// Adjacent pairs in search order: row-major, right neighbor before down neighbor
fn candidate_swaps() -> impl Iterator<Item = (Position, Position)> {
    Grid::positions().flat_map(|pos| {
        let right = (pos.col + 1 < COLS).then(|| (pos, Position::new(pos.row, pos.col + 1)));
        let down = (pos.row + 1 < ROWS).then(|| (pos, Position::new(pos.row + 1, pos.col)));
        right.into_iter().chain(down)
    })
}

/// Would swapping `a` and `b` produce any clear, promotion or activation?
pub fn would_swap_create_match(grid: &Grid, a: Position, b: Position) -> bool {
    let mut scratch = *grid;
    swap_reveals_match(&mut scratch, a, b)
}

/// First productive swap, if any
pub fn find_hint(grid: &Grid) -> Option<(Position, Position)> {
    let mut scratch = *grid;
    candidate_swaps().find(|&(a, b)| swap_reveals_match(&mut scratch, a, b))
}

/// True if at least one swap produces a match
pub fn has_possible_moves(grid: &Grid) -> bool {
    find_hint(grid).is_some()
}
