//! Shape Match - a match-3 board engine
//!
//! Core modules:
//! - `sim`: Deterministic board simulation (analysis, cascades, gravity, hints)
//! - `settings`: Tunable engine settings
//! - `persistence`: Key-value storage with versioned JSON envelopes
//! - `highscores`: Top-5 leaderboard
//! - `platform`: Browser bindings (wasm32 only)

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{EngineError, StoreError};
pub use highscores::HighScores;
pub use settings::Settings;

use glam::Vec2;

/// Board configuration constants
pub mod consts {
    /// Board rows
    pub const ROWS: usize = 8;
    /// Board columns
    pub const COLS: usize = 8;
    /// Total cells on the board
    pub const CELLS: usize = ROWS * COLS;

    /// Default cell edge in pixels (renderer space)
    pub const CELL_SIZE: f32 = 50.0;

    /// Base points per cleared cell
    pub const POINTS_PER_ITEM: u64 = 10;

    /// Bomb blast radius (1 = 3x3)
    pub const BOMB_RADIUS: usize = 1;

    /// Idle time before a hint is shown
    pub const HINT_DELAY_MS: u32 = 3000;
    /// Delay between deadlock detection and the shuffle
    pub const SHUFFLE_DELAY_MS: u32 = 1000;

    /// Regeneration attempts for a clean starting board
    pub const INIT_ATTEMPTS: u32 = 10;
    /// Permutation attempts per shuffle
    pub const SHUFFLE_ATTEMPTS: u32 = 10;

    // CellSet packs the board into a u64
    const _: () = assert!(CELLS <= 64);
}

/// Pixel-space center of a cell
#[inline]
pub fn cell_center(row: usize, col: usize, cell_size: f32) -> Vec2 {
    Vec2::new(
        col as f32 * cell_size + cell_size / 2.0,
        row as f32 * cell_size + cell_size / 2.0,
    )
}
