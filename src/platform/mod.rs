//! Platform glue
//!
//! Front ends see the engine through JSON snapshots. The browser bindings
//! live in `web` (wasm32 only).

#[cfg(target_arch = "wasm32")]
pub mod web;

use serde::Serialize;

use crate::sim::{ComboText, GameState, Grid, Phase, Position};

/// Everything a renderer needs for one frame
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub grid: &'a Grid,
    pub phase: &'a Phase,
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub hint: Option<(Position, Position)>,
    pub combo_text: Option<&'a ComboText>,
    pub game_over: bool,
}

impl<'a> Snapshot<'a> {
    pub fn of(state: &'a GameState) -> Self {
        Self {
            grid: state.grid(),
            phase: state.phase(),
            score: state.score(),
            combo: state.combo(),
            max_combo: state.max_combo(),
            hint: state.hint(),
            combo_text: state.combo_text(),
            game_over: state.is_game_over(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
