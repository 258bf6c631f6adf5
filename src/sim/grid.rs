//! Fixed-size board of nullable tokens

use std::fmt;

use serde::{Deserialize, Serialize};

use super::cells::{CellSet, Position};
use super::token::{Shape, SpecialKind, Token, TokenId};
use crate::consts::{COLS, ROWS};
use crate::error::EngineError;

/// The board. `Copy` so speculative analysis can work on a scratch value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: [[Option<Token>; COLS]; ROWS],
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl Grid {
    pub fn empty() -> Self {
        Self {
            cells: [[None; COLS]; ROWS],
        }
    }

    /// Parse a board from rows of shape digits (`0`-`5`) and `.` for empty cells.
    /// Tokens get ids 1.. in row-major order.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, EngineError> {
        if rows.len() != ROWS {
            return Err(EngineError::BadGridRowCount {
                found: rows.len(),
                expected: ROWS,
            });
        }
        let mut grid = Self::empty();
        let mut next_id = 1;
        for (r, line) in rows.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            if chars.len() != COLS {
                return Err(EngineError::BadGridRow {
                    row: r,
                    len: chars.len(),
                    expected: COLS,
                });
            }
            for (c, ch) in chars.into_iter().enumerate() {
                if ch == '.' {
                    continue;
                }
                let shape = ch
                    .to_digit(10)
                    .and_then(|d| Shape::from_index(d as usize))
                    .ok_or(EngineError::BadGridChar(ch))?;
                grid.cells[r][c] = Some(Token::new(TokenId(next_id), shape));
                next_id += 1;
            }
        }
        Ok(grid)
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Option<&Token> {
        self.cells.get(pos.row)?.get(pos.col)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Token> {
        self.cells.get_mut(pos.row)?.get_mut(pos.col)?.as_mut()
    }

    /// Shape at a position, `None` when empty or out of bounds
    #[inline]
    pub fn shape_at(&self, pos: Position) -> Option<Shape> {
        self.get(pos).map(|t| t.shape)
    }

    pub fn special_at(&self, pos: Position) -> Option<SpecialKind> {
        self.get(pos).and_then(|t| t.special)
    }

    pub fn set(&mut self, pos: Position, token: Option<Token>) {
        if pos.in_bounds() {
            self.cells[pos.row][pos.col] = token;
        }
    }

    pub fn take(&mut self, pos: Position) -> Option<Token> {
        if !pos.in_bounds() {
            return None;
        }
        self.cells[pos.row][pos.col].take()
    }

    /// Exchange the contents of two cells
    pub fn swap(&mut self, a: Position, b: Position) {
        if !a.in_bounds() || !b.in_bounds() || a == b {
            return;
        }
        let ta = self.cells[a.row][a.col];
        self.cells[a.row][a.col] = self.cells[b.row][b.col];
        self.cells[b.row][b.col] = ta;
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.get(pos).is_some()
    }

    /// All positions, row-major
    pub fn positions() -> impl Iterator<Item = Position> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| Position::new(row, col)))
    }

    pub fn occupied(&self) -> CellSet {
        Self::positions().filter(|p| self.is_occupied(*p)).collect()
    }

    pub fn count(&self) -> usize {
        self.occupied().len()
    }

    pub fn is_full(&self) -> bool {
        self.count() == ROWS * COLS
    }

    /// Largest token id on the board
    pub fn max_id(&self) -> TokenId {
        Self::positions()
            .filter_map(|p| self.get(p).map(|t| t.id))
            .max()
            .unwrap_or(TokenId(0))
    }

    /// Where the token with this id currently sits
    pub fn find(&self, id: TokenId) -> Option<Position> {
        Self::positions().find(|p| self.get(*p).is_some_and(|t| t.id == id))
    }

    /// Promote the token at `pos` to a special, keeping its identity
    pub fn promote(&mut self, pos: Position, kind: SpecialKind) -> bool {
        match self.get_mut(pos) {
            Some(token) => {
                token.special = Some(kind);
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                match cell {
                    Some(token) => write!(f, "{token}")?,
                    None => write!(f, ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROWS_OK: [&str; 8] = [
        "01234501", "12345012", "23450123", "34501234", "45012345", "50123450", "01234501",
        "1234501.",
    ];

    #[test]
    fn test_from_ascii_round_trips_display() {
        let grid = Grid::from_ascii(&ROWS_OK).unwrap();
        let text = grid.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ROWS_OK.to_vec());
        assert_eq!(grid.count(), 63);
        assert!(!grid.is_full());
    }

    #[test]
    fn test_from_ascii_rejects_bad_input() {
        let mut rows = ROWS_OK;
        rows[3] = "0123";
        assert!(matches!(
            Grid::from_ascii(&rows),
            Err(EngineError::BadGridRow { row: 3, len: 4, .. })
        ));
        rows[3] = "0123456x";
        assert_eq!(Grid::from_ascii(&rows), Err(EngineError::BadGridChar('6')));
    }

    #[test]
    fn test_from_ascii_rejects_wrong_row_count() {
        let err = Grid::from_ascii(&ROWS_OK[..7]).unwrap_err();
        assert_eq!(err, EngineError::BadGridRowCount { found: 7, expected: 8 });
        assert_eq!(err.to_string(), "grid has 7 rows, expected 8");
    }

    #[test]
    fn test_swap_preserves_identity() {
        let mut grid = Grid::from_ascii(&ROWS_OK).unwrap();
        let a = Position::new(0, 0);
        let b = Position::new(0, 1);
        let id_a = grid.get(a).unwrap().id;
        grid.swap(a, b);
        assert_eq!(grid.find(id_a), Some(b));
        assert_eq!(grid.shape_at(a), Some(Shape::Square));
    }

    #[test]
    fn test_promote_keeps_id_and_shape() {
        let mut grid = Grid::from_ascii(&ROWS_OK).unwrap();
        let pos = Position::new(4, 4);
        let before = *grid.get(pos).unwrap();
        assert!(grid.promote(pos, SpecialKind::Bomb));
        let after = grid.get(pos).unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.shape, before.shape);
        assert_eq!(after.special, Some(SpecialKind::Bomb));
        assert!(!grid.promote(Position::new(7, 7), SpecialKind::Bomb));
    }

    #[test]
    fn test_out_of_bounds_access_is_none() {
        let grid = Grid::from_ascii(&ROWS_OK).unwrap();
        assert!(grid.get(Position::new(8, 0)).is_none());
        assert!(grid.get(Position::new(0, 8)).is_none());
    }
}
