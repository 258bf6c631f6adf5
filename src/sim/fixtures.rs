//! Board builders shared by unit tests

use super::cells::Position;
use super::grid::Grid;
use super::token::{Shape, SpecialKind, Token, TokenId};

/// Match-free board using only Circle/Square/Triangle: shape = (col + 2*row) % 3
pub fn background() -> Grid {
    let rows = [
        "01201201", "20120120", "12012012", "01201201", "20120120", "12012012", "01201201",
        "20120120",
    ];
    Grid::from_ascii(&rows).expect("fixture grid")
}

/// Board with no match and no possible move: shape = (col + 3*row) % 6
pub fn deadlocked() -> Grid {
    let rows = [
        "01234501", "34501234", "01234501", "34501234", "01234501", "34501234", "01234501",
        "34501234",
    ];
    Grid::from_ascii(&rows).expect("fixture grid")
}

/// Overwrite cells with fresh tokens of `shape`
pub fn place(grid: &mut Grid, shape: Shape, cells: &[(usize, usize)]) {
    let mut next = grid.max_id().0 + 1;
    for &(row, col) in cells {
        grid.set(Position::new(row, col), Some(Token::new(TokenId(next), shape)));
        next += 1;
    }
}

pub fn place_special(grid: &mut Grid, pos: Position, kind: SpecialKind) {
    assert!(grid.promote(pos, kind), "no token at {pos}");
}
