//! Game state and animation phases
//!
//! The engine owns the board exclusively. Front ends read the grid and the
//! current [`Phase`] to drive visuals and report back when a phase's
//! animation has finished.

use glam::Vec2;
use serde::Serialize;

use super::analyze::{Activation, analyze};
use super::cells::{CellSet, Position};
use super::gravity::Fall;
use super::grid::Grid;
use super::token::TokenSource;
use crate::cell_center;
use crate::settings::Settings;

/// Current animation phase. Engine mutation only happens from `Idle`
/// or when the front end completes a phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for player input
    Idle,
    /// Two tokens sliding toward each other
    AttemptingSwap { a: Position, b: Position },
    /// A swap that matched nothing, sliding back
    InvalidSwap { a: Position, b: Position },
    /// Specials going off; `clear` is removed afterwards
    SpecialActivating {
        activations: Vec<Activation>,
        clear: CellSet,
    },
    /// Matched cells fading out
    Matching { cells: CellSet },
    /// Survivors dropping into gaps
    Falling { falls: Vec<Fall> },
    /// New tokens dropping in from above
    Refilling { falls: Vec<Fall> },
    /// Deadlock detected; the board is shuffled when the delay runs out
    Shuffling { remaining_ms: u32 },
    /// No moves even after a shuffle
    GameOver,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::AttemptingSwap { .. } => "attempting_swap",
            Phase::InvalidSwap { .. } => "invalid_swap",
            Phase::SpecialActivating { .. } => "special_activating",
            Phase::Matching { .. } => "matching",
            Phase::Falling { .. } => "falling",
            Phase::Refilling { .. } => "refilling",
            Phase::Shuffling { .. } => "shuffling",
            Phase::GameOver => "game_over",
        }
    }

    /// Phases that end when the front end reports the animation done
    pub fn is_animating(&self) -> bool {
        matches!(
            self,
            Phase::AttemptingSwap { .. }
                | Phase::InvalidSwap { .. }
                | Phase::SpecialActivating { .. }
                | Phase::Matching { .. }
                | Phase::Falling { .. }
                | Phase::Refilling { .. }
        )
    }
}

/// Floating "Combo xN" label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboText {
    pub combo: u32,
    pub text: String,
    /// Pixel centroid of the cleared cells
    pub pos: Vec2,
}

/// Points for clearing `cleared` cells at combo step `combo`.
///
/// Multiplier is `1 + 0.5 * (combo - 1)` past the first step; the product is
/// rounded half up so it stays integral.
pub fn combo_points(cleared: usize, combo: u32, per_item: u64) -> u64 {
    let base = cleared as u64 * per_item;
    if combo <= 1 {
        base
    } else {
        (base * (combo as u64 + 1)).div_ceil(2)
    }
}

/// Complete engine state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub(crate) grid: Grid,
    pub(crate) source: TokenSource,
    pub(crate) phase: Phase,
    pub(crate) score: u64,
    pub(crate) combo: u32,
    pub(crate) max_combo: u32,
    /// Milliseconds until the hint is revealed
    pub(crate) hint_timer_ms: Option<u32>,
    pub(crate) hint: Option<(Position, Position)>,
    /// A shuffle happened and nothing has matched since
    pub(crate) shuffled_recently: bool,
    pub(crate) combo_text: Option<ComboText>,
}

impl GameState {
    /// New game with default settings
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, Settings::default())
    }

    /// New game on a freshly generated, match-free board
    pub fn with_settings(seed: u64, settings: Settings) -> Self {
        let mut source = TokenSource::new(seed);
        let grid = generate_board(&mut source, settings.init_attempts);
        let mut state = Self::assemble(seed, settings, grid, source);
        log::info!("New game with seed {}", seed);
        state.handle_next_step();
        state
    }

    /// Wrap an existing board. The state starts `Idle` without analyzing it.
    pub fn from_grid(grid: Grid, seed: u64, settings: Settings) -> Self {
        let source = TokenSource::starting_after(seed, grid.max_id());
        Self::assemble(seed, settings, grid, source)
    }

    fn assemble(seed: u64, settings: Settings, grid: Grid, source: TokenSource) -> Self {
        Self {
            seed,
            settings,
            grid,
            source,
            phase: Phase::Idle,
            score: 0,
            combo: 0,
            max_combo: 0,
            hint_timer_ms: None,
            hint: None,
            shuffled_recently: false,
            combo_text: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// Revealed hint, if the idle timer has run out
    pub fn hint(&self) -> Option<(Position, Position)> {
        self.hint
    }

    pub fn combo_text(&self) -> Option<&ComboText> {
        self.combo_text.as_ref()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Bump the combo and score a clear
    pub(crate) fn award(&mut self, cells: &CellSet) -> u64 {
        self.combo += 1;
        let points = combo_points(cells.len(), self.combo, self.settings.points_per_item);
        self.score += points;

        if self.combo > 1 && !cells.is_empty() {
            let sum = cells
                .iter()
                .map(|p| cell_center(p.row, p.col, self.settings.cell_size))
                .fold(Vec2::ZERO, |acc, v| acc + v);
            self.combo_text = Some(ComboText {
                combo: self.combo,
                text: format!("Combo x{}", self.combo),
                pos: sum / cells.len() as f32,
            });
        }
        log::debug!(
            "cleared {} cells at combo {} for {} points (score {})",
            cells.len(),
            self.combo,
            points,
            self.score
        );
        points
    }

    /// The chain reaction is over
    pub(crate) fn end_combo(&mut self) {
        if self.combo > self.max_combo {
            self.max_combo = self.combo;
        }
        self.combo = 0;
    }

    /// Player touched the board: cancel any pending or shown hint
    pub(crate) fn register_interaction(&mut self) {
        self.hint_timer_ms = None;
        self.hint = None;
    }
}

/// Build a starting board with no match or pending promotion.
///
/// Each cell avoids the shape that would complete a 3-run to its left or
/// above. Boards that still analyze non-empty (2x2 blocks) are regenerated
/// up to `attempts` times; after that the last board is kept.
pub fn generate_board(source: &mut TokenSource, attempts: u32) -> Grid {
    let mut grid = fill_avoiding_runs(source);
    for attempt in 1..=attempts.max(1) {
        if analyze(&grid).is_empty() {
            log::debug!("clean board after {} attempt(s)", attempt);
            return grid;
        }
        if attempt < attempts {
            grid = fill_avoiding_runs(source);
        }
    }
    log::warn!("starting board still has matches after {} attempts", attempts);
    grid
}

fn fill_avoiding_runs(source: &mut TokenSource) -> Grid {
    let mut grid = Grid::empty();
    for pos in Grid::positions() {
        let mut exclude = Vec::with_capacity(2);
        if pos.col >= 2 {
            let left = grid.shape_at(Position::new(pos.row, pos.col - 1));
            if left.is_some() && left == grid.shape_at(Position::new(pos.row, pos.col - 2)) {
                exclude.extend(left);
            }
        }
        if pos.row >= 2 {
            let up = grid.shape_at(Position::new(pos.row - 1, pos.col));
            if up.is_some() && up == grid.shape_at(Position::new(pos.row - 2, pos.col)) {
                exclude.extend(up);
            }
        }
        grid.set(pos, Some(source.spawn(&exclude)));
    }
    grid
}
