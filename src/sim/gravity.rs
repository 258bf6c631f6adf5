//! Gravity compaction and refill
//!
//! Both passes update the board synchronously and report per-token drop
//! records that the renderer interpolates.

use serde::Serialize;

use super::cells::{CellSet, Position};
use super::grid::Grid;
use super::token::{Token, TokenSource};
use crate::consts::{COLS, ROWS};

/// A token moving down a column. Refilled tokens start above the board
/// (`from_row < 0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fall {
    pub token: Token,
    pub col: usize,
    pub from_row: isize,
    pub to_row: usize,
    pub from_y: f32,
    pub to_y: f32,
}

impl Fall {
    fn new(token: Token, col: usize, from_row: isize, to_row: usize, cell_size: f32) -> Self {
        Self {
            token,
            col,
            from_row,
            to_row,
            from_y: from_row as f32 * cell_size,
            to_y: to_row as f32 * cell_size,
        }
    }
}

/// Empty every cell in `cells`
pub fn clear_cells(grid: &mut Grid, cells: &CellSet) -> usize {
    cells.iter().filter(|p| grid.take(*p).is_some()).count()
}

/// Compact each column downward, keeping the order of surviving tokens
pub fn apply_gravity(grid: &mut Grid, cell_size: f32) -> Vec<Fall> {
    let mut drops = Vec::new();
    for col in 0..COLS {
        let mut empty_row: Option<usize> = None;
        for row in (0..ROWS).rev() {
            let pos = Position::new(row, col);
            match (grid.is_occupied(pos), empty_row) {
                (false, None) => empty_row = Some(row),
                (true, Some(target)) => {
                    if let Some(token) = grid.take(pos) {
                        grid.set(Position::new(target, col), Some(token));
                        drops.push(Fall::new(token, col, row as isize, target, cell_size));
                    }
                    // Everything between `row` and `target` is empty
                    empty_row = Some(target - 1);
                }
                _ => {}
            }
        }
    }
    drops
}

/// Fill every empty cell with a fresh token, bottom-up per column
pub fn refill(grid: &mut Grid, source: &mut TokenSource, cell_size: f32) -> Vec<Fall> {
    let mut drops = Vec::new();
    for col in 0..COLS {
        let mut stacked: isize = 0;
        for row in (0..ROWS).rev() {
            let pos = Position::new(row, col);
            if grid.is_occupied(pos) {
                continue;
            }
            stacked += 1;
            let token = source.spawn(&[]);
            grid.set(pos, Some(token));
            drops.push(Fall::new(token, col, -stacked, row, cell_size));
        }
    }
    drops
}
