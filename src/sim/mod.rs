//! Deterministic board simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable row-major iteration order
//! - Millisecond timers advanced by the caller
//! - No rendering or platform dependencies

pub mod analyze;
pub mod cascade;
pub mod cells;
pub mod gravity;
pub mod grid;
pub mod oracle;
pub mod state;
pub mod tick;
pub mod token;

#[cfg(test)]
mod fixtures;

pub use analyze::{Activation, AnalysisResult, SpecialSpawn, analyze, effect_cells};
pub use cascade::{Cascade, MAX_CASCADE_WAVES, Resolution, resolve};
pub use cells::{CellSet, Position};
pub use gravity::{Fall, apply_gravity, clear_cells, refill};
pub use grid::Grid;
pub use oracle::{find_hint, has_possible_moves, would_swap_create_match};
pub use state::{ComboText, GameState, Phase, combo_points, generate_board};
pub use tick::{TickInput, tick};
pub use token::{Shape, SpecialKind, Token, TokenId, TokenSource};
