//! Board positions and packed position sets

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{CELLS, COLS, ROWS};

/// A cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Checked construction from signed coordinates (neighbor arithmetic)
    pub fn offset(self, dr: isize, dc: isize) -> Option<Self> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        let pos = Self { row, col };
        pos.in_bounds().then_some(pos)
    }

    pub fn in_bounds(self) -> bool {
        self.row < ROWS && self.col < COLS
    }

    /// Packed key `row * COLS + col`
    #[inline]
    pub fn index(self) -> usize {
        self.row * COLS + self.col
    }

    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self {
            row: index / COLS,
            col: index % COLS,
        }
    }

    /// Orthogonal neighbors only
    pub fn is_adjacent(self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// Set of board positions, one bit per cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CellSet(u64);

impl CellSet {
    pub const EMPTY: CellSet = CellSet(0);

    pub fn new() -> Self {
        Self::EMPTY
    }

    #[inline]
    fn bit(pos: Position) -> u64 {
        debug_assert!(pos.in_bounds());
        1u64 << pos.index()
    }

    /// Returns true if the position was not already present
    pub fn insert(&mut self, pos: Position) -> bool {
        let fresh = !self.contains(pos);
        self.0 |= Self::bit(pos);
        fresh
    }

    pub fn remove(&mut self, pos: Position) -> bool {
        let present = self.contains(pos);
        self.0 &= !Self::bit(pos);
        present
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        self.0 & Self::bit(pos) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(&self, other: &CellSet) -> CellSet {
        CellSet(self.0 | other.0)
    }

    pub fn extend_from(&mut self, other: &CellSet) {
        self.0 |= other.0;
    }

    /// Positions in row-major order
    pub fn iter(&self) -> CellIter {
        CellIter(self.0)
    }
}

impl FromIterator<Position> for CellSet {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        let mut set = CellSet::new();
        for pos in iter {
            set.insert(pos);
        }
        set
    }
}

impl Extend<Position> for CellSet {
    fn extend<I: IntoIterator<Item = Position>>(&mut self, iter: I) {
        for pos in iter {
            self.insert(pos);
        }
    }
}

impl<'a> IntoIterator for &'a CellSet {
    type Item = Position;
    type IntoIter = CellIter;

    fn into_iter(self) -> CellIter {
        self.iter()
    }
}

/// Row-major iterator over a [`CellSet`]
pub struct CellIter(u64);

impl Iterator for CellIter {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        debug_assert!(index < CELLS);
        Some(Position::from_index(index))
    }
}

impl Serialize for CellSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for CellSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let positions = Vec::<Position>::deserialize(deserializer)?;
        if let Some(bad) = positions.iter().find(|p| !p.in_bounds()) {
            return Err(serde::de::Error::custom(format!("position {bad} out of bounds")));
        }
        Ok(positions.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_clips_to_board() {
        let corner = Position::new(0, 0);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(0, -1), None);
        assert_eq!(corner.offset(1, 1), Some(Position::new(1, 1)));
        assert_eq!(Position::new(7, 7).offset(1, 0), None);
    }

    #[test]
    fn test_adjacency() {
        let p = Position::new(3, 3);
        assert!(p.is_adjacent(Position::new(3, 4)));
        assert!(p.is_adjacent(Position::new(2, 3)));
        assert!(!p.is_adjacent(Position::new(4, 4)));
        assert!(!p.is_adjacent(p));
    }

    #[test]
    fn test_cellset_iterates_row_major() {
        let set: CellSet = [Position::new(2, 1), Position::new(0, 5), Position::new(2, 0)]
            .into_iter()
            .collect();
        let order: Vec<_> = set.iter().collect();
        assert_eq!(
            order,
            vec![Position::new(0, 5), Position::new(2, 0), Position::new(2, 1)]
        );
    }

    #[test]
    fn test_cellset_insert_remove() {
        let mut set = CellSet::new();
        assert!(set.insert(Position::new(7, 7)));
        assert!(!set.insert(Position::new(7, 7)));
        assert_eq!(set.len(), 1);
        assert!(set.remove(Position::new(7, 7)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_cellset_json_is_position_list() {
        let set: CellSet = [Position::new(1, 2)].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[{"row":1,"col":2}]"#);
        let back: CellSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
