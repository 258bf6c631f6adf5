//! Pattern analysis
//!
//! Scans a board snapshot for clearable groups and special-item promotions.
//! Rules run in a fixed precedence order and share a `processed` set, so a
//! cell claimed by an earlier rule is invisible to every later one:
//!
//! 1. 5-runs (horizontal, then vertical) -> `ScreenClear`
//! 2. plus-shaped crosses -> `CrossClear`
//! 3. L shapes (four corner orientations) -> `CrossClear`
//! 4. 2x2 blocks -> `Bomb`
//! 5. 4-runs -> `LineH` / `LineV`
//! 6. 3-runs -> plain clear
//!
//! Analysis is pure and never touches the board it is given.

use serde::Serialize;

use super::cells::{CellSet, Position};
use super::grid::Grid;
use super::token::{Shape, SpecialKind, Token};
use crate::consts::{BOMB_RADIUS, COLS, ROWS};

/// A special item to be created at `pos` from `original`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpecialSpawn {
    pub pos: Position,
    pub kind: SpecialKind,
    pub original: Token,
}

/// A standing special that goes off, with its blast cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Activation {
    pub pos: Position,
    pub kind: SpecialKind,
    pub effect: CellSet,
    pub original: Token,
}

/// Output of a single [`analyze`] pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub clear: CellSet,
    pub create: Vec<SpecialSpawn>,
    pub activate: Vec<Activation>,
}

impl AnalysisResult {
    /// True when the board holds nothing to resolve
    pub fn is_empty(&self) -> bool {
        self.clear.is_empty() && self.create.is_empty() && self.activate.is_empty()
    }
}

/// Cells hit when a special of `kind` at `pos` goes off
pub fn effect_cells(grid: &Grid, pos: Position, kind: SpecialKind) -> CellSet {
    let row = || (0..COLS).map(move |c| Position::new(pos.row, c));
    let col = || (0..ROWS).map(move |r| Position::new(r, pos.col));
    match kind {
        SpecialKind::LineH => row().collect(),
        SpecialKind::LineV => col().collect(),
        SpecialKind::CrossClear => row().chain(col()).collect(),
        SpecialKind::Bomb => {
            let radius = BOMB_RADIUS as isize;
            (-radius..=radius)
                .flat_map(|dr| (-radius..=radius).filter_map(move |dc| pos.offset(dr, dc)))
                .collect()
        }
        SpecialKind::ScreenClear => grid.occupied(),
    }
}

/// Scan direction for straight runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn step(self, start: Position, k: usize) -> Option<Position> {
        let k = k as isize;
        match self {
            Axis::Horizontal => start.offset(0, k),
            Axis::Vertical => start.offset(k, 0),
        }
    }

    /// Candidate run starts: row-major for horizontal, column-major for vertical
    fn starts(self, len: usize) -> Vec<Position> {
        match self {
            Axis::Horizontal => (0..ROWS)
                .flat_map(|r| (0..=COLS - len).map(move |c| Position::new(r, c)))
                .collect(),
            Axis::Vertical => (0..COLS)
                .flat_map(|c| (0..=ROWS - len).map(move |r| Position::new(r, c)))
                .collect(),
        }
    }

    fn line_kind(self) -> SpecialKind {
        match self {
            Axis::Horizontal => SpecialKind::LineH,
            Axis::Vertical => SpecialKind::LineV,
        }
    }
}

/// L-shape arms as (row, col) offsets from the shared corner, in trial order
const L_SHAPES: [[[(isize, isize); 3]; 2]; 4] = [
    [[(0, 0), (1, 0), (2, 0)], [(0, 0), (0, 1), (0, 2)]],
    [[(0, 0), (1, 0), (2, 0)], [(0, 0), (0, -1), (0, -2)]],
    [[(0, 0), (-1, 0), (-2, 0)], [(0, 0), (0, 1), (0, 2)]],
    [[(0, 0), (-1, 0), (-2, 0)], [(0, 0), (0, -1), (0, -2)]],
];

const CROSS_ARMS: [[(isize, isize); 3]; 2] = [[(0, -1), (0, 0), (0, 1)], [(-1, 0), (0, 0), (1, 0)]];

struct Scan<'a> {
    grid: &'a Grid,
    processed: CellSet,
    result: AnalysisResult,
}

impl<'a> Scan<'a> {
    fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            processed: CellSet::new(),
            result: AnalysisResult::default(),
        }
    }

    fn is_free(&self, cells: &[Position]) -> bool {
        cells.iter().all(|p| !self.processed.contains(*p))
    }

    /// Mark cells processed; all but the special site are cleared
    fn claim(&mut self, cells: &[Position], special_site: Option<Position>) {
        for &pos in cells {
            self.processed.insert(pos);
            if Some(pos) != special_site {
                self.result.clear.insert(pos);
            }
        }
    }

    fn create(&mut self, pos: Position, kind: SpecialKind) {
        if let Some(token) = self.grid.get(pos) {
            self.result.create.push(SpecialSpawn {
                pos,
                kind,
                original: *token,
            });
        }
    }

    /// In-bounds cells at `offsets` from `origin` that carry `shape`
    fn same_shape(&self, origin: Position, offsets: &[(isize, isize)], shape: Shape) -> Vec<Position> {
        offsets
            .iter()
            .filter_map(|&(dr, dc)| origin.offset(dr, dc))
            .filter(|p| self.grid.shape_at(*p) == Some(shape))
            .collect()
    }

    /// Run of exactly `len` same-shape cells beginning at `start`
    fn run_at(&self, start: Position, axis: Axis, len: usize) -> Option<Vec<Position>> {
        let shape = self.grid.shape_at(start)?;
        let cells: Vec<Position> = (0..len)
            .map_while(|k| axis.step(start, k).filter(|p| self.grid.shape_at(*p) == Some(shape)))
            .collect();
        (cells.len() == len).then_some(cells)
    }

    fn straight_runs(&mut self, len: usize, axis: Axis) {
        for start in axis.starts(len) {
            if self.processed.contains(start) {
                continue;
            }
            let Some(cells) = self.run_at(start, axis, len) else {
                continue;
            };
            if !self.is_free(&cells) {
                continue;
            }
            let special = match len {
                5 => Some((cells[2], SpecialKind::ScreenClear)),
                4 => {
                    let site = cells
                        .iter()
                        .copied()
                        .find(|p| !self.grid.get(*p).is_some_and(Token::is_special))
                        .unwrap_or(cells[0]);
                    Some((site, axis.line_kind()))
                }
                _ => None,
            };
            if let Some((site, kind)) = special {
                self.create(site, kind);
            }
            self.claim(&cells, special.map(|(site, _)| site));
        }
    }

    /// Plus shapes, then L shapes, sharing one row-major pass
    fn crosses_and_corners(&mut self) {
        for pos in Grid::positions() {
            if self.processed.contains(pos) {
                continue;
            }
            let Some(shape) = self.grid.shape_at(pos) else {
                continue;
            };

            let h = self.same_shape(pos, &CROSS_ARMS[0], shape);
            let v = self.same_shape(pos, &CROSS_ARMS[1], shape);
            if h.len() == 3 && v.len() == 3 {
                let cells: Vec<Position> = CellSet::from_iter(h.into_iter().chain(v)).iter().collect();
                if cells.len() == 5 && self.is_free(&cells) {
                    self.create(pos, SpecialKind::CrossClear);
                    self.claim(&cells, Some(pos));
                    continue;
                }
            }

            for [arm_a, arm_b] in &L_SHAPES {
                let a = self.same_shape(pos, arm_a, shape);
                let b = self.same_shape(pos, arm_b, shape);
                if a.len() != 3 || b.len() != 3 {
                    continue;
                }
                let cells: Vec<Position> = CellSet::from_iter(a.into_iter().chain(b)).iter().collect();
                if cells.len() == 5 && self.is_free(&cells) {
                    self.create(pos, SpecialKind::CrossClear);
                    self.claim(&cells, Some(pos));
                    break;
                }
            }
        }
    }

    fn blocks(&mut self) {
        for r in 0..ROWS - 1 {
            for c in 0..COLS - 1 {
                let corner = Position::new(r, c);
                if self.processed.contains(corner) {
                    continue;
                }
                let Some(shape) = self.grid.shape_at(corner) else {
                    continue;
                };
                let cells = [
                    corner,
                    Position::new(r, c + 1),
                    Position::new(r + 1, c),
                    Position::new(r + 1, c + 1),
                ];
                if cells.iter().all(|p| self.grid.shape_at(*p) == Some(shape)) && self.is_free(&cells) {
                    self.create(corner, SpecialKind::Bomb);
                    self.claim(&cells, Some(corner));
                }
            }
        }
    }

    /// Cleared cells that already hold a special go off
    fn touched_specials(&mut self) {
        for pos in self.result.clear.iter() {
            let Some(token) = self.grid.get(pos) else {
                continue;
            };
            let Some(kind) = token.special else {
                continue;
            };
            let created_here = self.result.create.iter().any(|s| s.pos == pos);
            let queued = self.result.activate.iter().any(|a| a.pos == pos);
            if created_here || queued {
                continue;
            }
            self.result.activate.push(Activation {
                pos,
                kind,
                effect: effect_cells(self.grid, pos, kind),
                original: *token,
            });
        }
    }
}

/// Scan the board for every clear, promotion and touched special
pub fn analyze(grid: &Grid) -> AnalysisResult {
    let mut scan = Scan::new(grid);
    scan.straight_runs(5, Axis::Horizontal);
    scan.straight_runs(5, Axis::Vertical);
    scan.crosses_and_corners();
    scan.blocks();
    scan.straight_runs(4, Axis::Horizontal);
    scan.straight_runs(4, Axis::Vertical);
    scan.straight_runs(3, Axis::Horizontal);
    scan.straight_runs(3, Axis::Vertical);
    scan.touched_specials();
    scan.result
}
