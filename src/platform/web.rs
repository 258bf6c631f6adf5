//! Browser bindings
//!
//! `WebGame` wraps the engine for a JS front end: commands in, JSON
//! snapshots out. Settings and high scores live in LocalStorage.

use wasm_bindgen::prelude::*;

use super::Snapshot;
use crate::highscores::HighScores;
use crate::persistence::LocalStore;
use crate::settings::Settings;
use crate::sim::{GameState, Position, TickInput, tick};

const STORAGE_PREFIX: &str = "shape_match";

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Shape Match starting...");
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn pos(row: u32, col: u32) -> Position {
    Position::new(row as usize, col as usize)
}

#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    store: LocalStore,
    high_scores: HighScores,
    pending: TickInput,
}

#[wasm_bindgen]
impl WebGame {
    /// New game; a missing seed uses the clock
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<f64>) -> WebGame {
        let store = LocalStore::new(STORAGE_PREFIX);
        let settings = Settings::load(&store);
        let high_scores = HighScores::load(&store);
        let seed = seed.unwrap_or_else(js_sys::Date::now) as u64;
        WebGame {
            state: GameState::with_settings(seed, settings),
            store,
            high_scores,
            pending: TickInput::default(),
        }
    }

    /// Queue a swap for the next frame
    pub fn swap(&mut self, r1: u32, c1: u32, r2: u32, c2: u32) {
        self.pending.swap = Some((pos(r1, c1), pos(r2, c2)));
    }

    /// Queue a click on a special for the next frame
    pub fn activate(&mut self, row: u32, col: u32) {
        self.pending.activate = Some(pos(row, col));
    }

    /// The current phase's animation finished
    pub fn phase_done(&mut self) {
        self.pending.phase_done = true;
    }

    /// Pointer moved or pressed
    pub fn interact(&mut self) {
        self.pending.interaction = true;
    }

    pub fn restart(&mut self) {
        self.pending.restart = true;
    }

    /// Apply queued input and advance timers
    pub fn frame(&mut self, dt_ms: u32) {
        let input = std::mem::take(&mut self.pending);
        tick(&mut self.state, &input, dt_ms);
    }

    /// JSON snapshot of the board, phase and score
    pub fn snapshot(&self) -> Result<String, JsValue> {
        Snapshot::of(&self.state).to_json().map_err(to_js)
    }

    pub fn score(&self) -> f64 {
        self.state.score() as f64
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    pub fn qualifies(&self) -> bool {
        self.high_scores.qualifies(self.state.score())
    }

    /// Record the current score; returns the rank or undefined
    pub fn submit_score(&mut self, name: &str) -> Result<Option<u32>, JsValue> {
        let rank = self.high_scores.add_score(name, self.state.score());
        if rank.is_some() {
            self.high_scores.save(&mut self.store).map_err(to_js)?;
        }
        Ok(rank.map(|r| r as u32))
    }

    /// JSON list of `{name, score}`
    pub fn high_scores(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.high_scores.entries).map_err(to_js)
    }
}
