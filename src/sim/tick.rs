//! Phase transitions and the frame tick
//!
//! Player commands only start work from `Idle`. Everything after that is
//! driven by the front end reporting that a phase's animation is done.

use rand::Rng;
use rand::seq::SliceRandom;

use super::analyze::{AnalysisResult, analyze};
use super::cascade::{Resolution, resolve};
use super::cells::Position;
use super::gravity::{apply_gravity, clear_cells, refill};
use super::grid::Grid;
use super::oracle::{find_hint, has_possible_moves};
use super::state::{GameState, Phase};
use crate::consts::CELLS;
use crate::error::EngineError;

/// Upper bound on phase completions in one `settle` call
const SETTLE_STEP_LIMIT: usize = 4 * CELLS * CELLS;

/// Commands collected by the host during one frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player dragged one token onto a neighbor
    pub swap: Option<(Position, Position)>,
    /// Player clicked a special
    pub activate: Option<Position>,
    /// The current phase's animation finished
    pub phase_done: bool,
    /// Any pointer activity (hides the hint and restarts its countdown)
    pub interaction: bool,
    /// Start over
    pub restart: bool,
}

/// Advance the game by one frame of `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: u32) {
    if input.restart {
        state.restart();
        return;
    }
    if state.phase == Phase::GameOver {
        return;
    }

    if input.interaction {
        state.register_interaction();
        // Debounce: the hint comes back after a full idle delay
        if state.phase == Phase::Idle {
            state.hint_timer_ms = Some(state.settings.hint_delay_ms);
        }
    }
    if input.phase_done {
        state.complete_phase();
    }
    if let Some((a, b)) = input.swap {
        if let Err(err) = state.attempt_swap(a, b) {
            log::debug!("swap rejected: {}", err);
        }
    }
    if let Some(pos) = input.activate {
        if let Err(err) = state.activate_special(pos) {
            log::debug!("activation rejected: {}", err);
        }
    }

    advance_timers(state, dt_ms);
}

fn advance_timers(state: &mut GameState, dt_ms: u32) {
    if let Phase::Shuffling { remaining_ms } = &mut state.phase {
        if *remaining_ms > dt_ms {
            *remaining_ms -= dt_ms;
        } else {
            state.phase = Phase::Idle;
            state.shuffle();
            state.shuffled_recently = true;
            state.handle_next_step();
        }
        return;
    }

    if state.phase != Phase::Idle {
        return;
    }
    if let Some(remaining) = state.hint_timer_ms {
        if remaining > dt_ms {
            state.hint_timer_ms = Some(remaining - dt_ms);
        } else {
            state.hint_timer_ms = None;
            state.hint = find_hint(&state.grid);
            log::debug!("hint revealed: {:?}", state.hint);
        }
    }
}

impl GameState {
    fn ensure_idle(&self) -> Result<(), EngineError> {
        if self.phase == Phase::Idle {
            Ok(())
        } else {
            Err(EngineError::Busy(self.phase.name()))
        }
    }

    fn ensure_occupied(&self, pos: Position) -> Result<(), EngineError> {
        if !pos.in_bounds() {
            return Err(EngineError::OutOfBounds(pos));
        }
        if !self.grid.is_occupied(pos) {
            return Err(EngineError::EmptyCell(pos));
        }
        Ok(())
    }

    /// Start swapping two neighboring tokens
    pub fn attempt_swap(&mut self, a: Position, b: Position) -> Result<(), EngineError> {
        self.ensure_idle()?;
        self.ensure_occupied(a)?;
        self.ensure_occupied(b)?;
        if !a.is_adjacent(b) {
            return Err(EngineError::NotAdjacent(a, b));
        }
        self.register_interaction();
        self.end_combo();
        self.phase = Phase::AttemptingSwap { a, b };
        log::debug!("swap {} <-> {}", a, b);
        Ok(())
    }

    /// Set off the special at `pos`. Returns whether anything happened.
    pub fn activate_special(&mut self, pos: Position) -> Result<bool, EngineError> {
        self.ensure_idle()?;
        self.ensure_occupied(pos)?;
        if self.grid.special_at(pos).is_none() {
            return Err(EngineError::NotSpecial(pos));
        }
        self.register_interaction();
        self.end_combo();
        Ok(self.process_actions(&AnalysisResult::default(), Some(pos)))
    }

    /// Apply an analysis and enter the phase it calls for
    pub fn process_actions(&mut self, analysis: &AnalysisResult, trigger: Option<Position>) -> bool {
        match resolve(&mut self.grid, analysis, trigger) {
            Resolution::Activating(cascade) => {
                self.phase = Phase::SpecialActivating {
                    activations: cascade.activations,
                    clear: cascade.clear,
                };
                true
            }
            Resolution::Matching(cells) => {
                self.award(&cells);
                self.phase = Phase::Matching { cells };
                true
            }
            Resolution::Promoted => true,
            Resolution::Nothing => false,
        }
    }

    /// The front end finished animating the current phase
    pub fn complete_phase(&mut self) {
        let finished = std::mem::replace(&mut self.phase, Phase::Idle);
        log::debug!("phase {} complete", finished.name());

        match finished {
            Phase::Idle | Phase::Shuffling { .. } | Phase::GameOver => {
                self.phase = finished;
                return;
            }
            Phase::AttemptingSwap { a, b } => {
                self.grid.swap(a, b);
                let analysis = analyze(&self.grid);
                if !self.process_actions(&analysis, None) {
                    self.grid.swap(a, b);
                    self.phase = Phase::InvalidSwap { a, b };
                    return;
                }
                if self.phase != Phase::Idle {
                    return;
                }
            }
            Phase::SpecialActivating { clear, .. } => {
                if !clear.is_empty() {
                    self.award(&clear);
                    self.phase = Phase::Matching { cells: clear };
                    return;
                }
            }
            Phase::Matching { cells } => {
                clear_cells(&mut self.grid, &cells);
                let falls = apply_gravity(&mut self.grid, self.settings.cell_size);
                if !falls.is_empty() {
                    self.phase = Phase::Falling { falls };
                    return;
                }
                if self.start_refill() {
                    return;
                }
            }
            Phase::Falling { .. } => {
                if self.start_refill() {
                    return;
                }
            }
            Phase::Refilling { .. } | Phase::InvalidSwap { .. } => {}
        }

        self.handle_next_step();
    }

    fn start_refill(&mut self) -> bool {
        let falls = refill(&mut self.grid, &mut self.source, self.settings.cell_size);
        if falls.is_empty() {
            return false;
        }
        self.phase = Phase::Refilling { falls };
        true
    }

    /// Resolve whatever the settled board holds, or decide what happens
    /// when nothing is left. Returns whether a new phase started.
    pub fn handle_next_step(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }

        // Promotions with nothing to clear leave us in Idle; look again
        for _ in 0..CELLS {
            let analysis = analyze(&self.grid);
            if !self.process_actions(&analysis, None) {
                break;
            }
            if self.phase != Phase::Idle {
                return true;
            }
        }

        self.end_combo();
        if has_possible_moves(&self.grid) {
            self.shuffled_recently = false;
            self.hint = None;
            self.hint_timer_ms = Some(self.settings.hint_delay_ms);
        } else if self.shuffled_recently {
            self.shuffled_recently = false;
            self.phase = Phase::GameOver;
            log::info!("Game over: no moves after shuffle, score {}", self.score);
        } else {
            self.register_interaction();
            self.phase = Phase::Shuffling {
                remaining_ms: self.settings.shuffle_delay_ms,
            };
            log::info!("No moves left, shuffling");
        }
        false
    }

    /// Permute the tokens on the board until it has no match and a move
    pub fn shuffle(&mut self) {
        let occupied: Vec<Position> = self.grid.occupied().iter().collect();
        let mut tokens: Vec<_> = occupied.iter().filter_map(|&p| self.grid.get(p).copied()).collect();
        let attempts = self.settings.shuffle_attempts.max(1);

        for attempt in 1..=attempts {
            tokens.shuffle(self.source.rng());
            for (&pos, &token) in occupied.iter().zip(&tokens) {
                self.grid.set(pos, Some(token));
            }
            if analyze(&self.grid).is_empty() && has_possible_moves(&self.grid) {
                log::info!("Shuffled board in {} attempt(s)", attempt);
                return;
            }
        }
        log::warn!("shuffle gave up after {} attempts", attempts);
    }

    /// Complete phases until the board is at rest.
    ///
    /// Stops in `Idle`, `Shuffling` or `GameOver`.
    pub fn settle(&mut self) {
        if self.phase == Phase::Idle {
            self.handle_next_step();
        }
        let mut steps = 0;
        while self.phase.is_animating() {
            if steps >= SETTLE_STEP_LIMIT {
                log::warn!("settle stopped after {} steps in {}", steps, self.phase.name());
                break;
            }
            self.complete_phase();
            steps += 1;
        }
    }

    /// Fresh board with the same settings
    pub fn restart(&mut self) {
        let seed = self.source.rng().random::<u64>();
        log::info!("Restarting (final score {})", self.score);
        *self = GameState::with_settings(seed, self.settings.clone());
    }

    /// Replace the board, e.g. for scripted scenarios. Resets to `Idle`.
    pub fn load_grid(&mut self, grid: Grid) {
        self.grid = grid;
        self.phase = Phase::Idle;
        self.register_interaction();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::cells::CellSet;
    use crate::sim::fixtures::{deadlocked, place, place_special};
    use crate::sim::oracle::would_swap_create_match;
    use crate::sim::token::{Shape, SpecialKind};

    const FRAME_MS: u32 = 16;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    /// Deadlocked board plus one available move in the bottom-left corner
    fn playable() -> Grid {
        let mut grid = deadlocked();
        // (6,2)<->(7,2) lines up row 7; (6,1)<->(6,2) lines up column 1
        place(&mut grid, Shape::Hexagon, &[(7, 0), (7, 1), (6, 2)]);
        grid
    }

    fn state_for(grid: Grid) -> GameState {
        GameState::from_grid(grid, 7, Settings::default())
    }

    #[test]
    fn test_playable_fixture() {
        let grid = playable();
        assert!(analyze(&grid).is_empty());
        assert_eq!(find_hint(&grid), Some((p(6, 1), p(6, 2))));
        assert!(would_swap_create_match(&grid, p(6, 2), p(7, 2)));
    }

    #[test]
    fn test_valid_swap_runs_to_idle() {
        let mut state = state_for(playable());
        state.attempt_swap(p(6, 2), p(7, 2)).unwrap();
        assert_eq!(state.phase().name(), "attempting_swap");

        state.complete_phase();
        let Phase::Matching { cells } = state.phase() else {
            panic!("expected matching, got {:?}", state.phase());
        };
        let expected: CellSet = [p(7, 0), p(7, 1), p(7, 2)].into_iter().collect();
        assert_eq!(*cells, expected);
        assert_eq!(state.score(), 30);
        assert_eq!(state.combo(), 1);

        state.settle();
        assert!(state.grid().is_full());
        assert!(analyze(state.grid()).is_empty());
        assert_eq!(state.combo(), 0);
        assert!(state.max_combo() >= 1);
        assert!(state.score() >= 30);
    }

    #[test]
    fn test_invalid_swap_reverts() {
        let mut state = state_for(playable());
        let before = *state.grid();
        state.attempt_swap(p(0, 0), p(0, 1)).unwrap();
        state.complete_phase();
        assert_eq!(state.phase(), &Phase::InvalidSwap { a: p(0, 0), b: p(0, 1) });
        assert_eq!(state.grid(), &before);

        state.complete_phase();
        assert_eq!(state.phase(), &Phase::Idle);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_swap_validation() {
        let mut state = state_for(playable());
        assert_eq!(
            state.attempt_swap(p(0, 0), p(1, 1)),
            Err(EngineError::NotAdjacent(p(0, 0), p(1, 1)))
        );
        assert_eq!(
            state.attempt_swap(p(0, 7), p(0, 8)),
            Err(EngineError::OutOfBounds(p(0, 8)))
        );
        state.grid.set(p(3, 3), None);
        assert_eq!(
            state.attempt_swap(p(3, 3), p(3, 4)),
            Err(EngineError::EmptyCell(p(3, 3)))
        );

        state.attempt_swap(p(0, 0), p(0, 1)).unwrap();
        assert_eq!(
            state.attempt_swap(p(6, 2), p(7, 2)),
            Err(EngineError::Busy("attempting_swap"))
        );
    }

    #[test]
    fn test_activate_special() {
        let mut state = state_for(playable());
        assert_eq!(state.activate_special(p(3, 3)), Err(EngineError::NotSpecial(p(3, 3))));

        place_special(&mut state.grid, p(3, 3), SpecialKind::LineV);
        assert_eq!(state.activate_special(p(3, 3)), Ok(true));
        let Phase::SpecialActivating { activations, clear } = state.phase().clone() else {
            panic!("expected activation");
        };
        assert_eq!(activations.len(), 1);
        assert_eq!(clear.len(), 8);
        assert_eq!(state.score(), 0);

        state.complete_phase();
        assert!(matches!(state.phase(), Phase::Matching { cells } if cells.len() == 8));
        assert_eq!(state.score(), 80);
    }

    #[test]
    fn test_settle_is_idempotent() {
        let mut state = GameState::new(2024);
        state.settle();
        let grid = *state.grid();
        let score = state.score();
        state.settle();
        assert_eq!(state.grid(), &grid);
        assert_eq!(state.score(), score);
    }

    #[test]
    fn test_hint_timer() {
        let mut state = state_for(playable());
        state.handle_next_step();
        assert_eq!(state.hint(), None);

        tick(&mut state, &TickInput::default(), 2999);
        assert_eq!(state.hint(), None);
        tick(&mut state, &TickInput::default(), 1);
        assert_eq!(state.hint(), Some((p(6, 1), p(6, 2))));

        let touch = TickInput {
            interaction: true,
            ..Default::default()
        };
        tick(&mut state, &touch, FRAME_MS);
        assert_eq!(state.hint(), None);

        // countdown restarts from the last touch
        tick(&mut state, &TickInput::default(), 2000);
        tick(&mut state, &touch, FRAME_MS);
        tick(&mut state, &TickInput::default(), 2999 - FRAME_MS);
        assert_eq!(state.hint(), None);
        tick(&mut state, &TickInput::default(), 1);
        assert_eq!(state.hint(), Some((p(6, 1), p(6, 2))));
    }

    #[test]
    fn test_tap_on_settled_board_brings_hint_back() {
        let mut state = GameState::new(2024);
        state.settle();
        assert_eq!(state.phase(), &Phase::Idle);
        let touch = TickInput {
            interaction: true,
            ..Default::default()
        };
        tick(&mut state, &touch, FRAME_MS);
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), 1000);
        }
        assert!(state.hint().is_some());
        assert_eq!(state.hint(), find_hint(state.grid()));
    }

    #[test]
    fn test_deadlock_shuffles_then_game_over() {
        let mut state = state_for(deadlocked());
        assert!(!state.handle_next_step());
        assert_eq!(state.phase(), &Phase::Shuffling { remaining_ms: 1000 });

        // interaction does not cancel a pending shuffle
        let touch = TickInput {
            interaction: true,
            ..Default::default()
        };
        tick(&mut state, &touch, 400);
        assert_eq!(state.phase(), &Phase::Shuffling { remaining_ms: 600 });

        let ids_before: Vec<_> = Grid::positions().filter_map(|p| state.grid().get(p).map(|t| t.id)).collect();
        tick(&mut state, &TickInput::default(), 600);
        let mut ids_after: Vec<_> = Grid::positions().filter_map(|p| state.grid().get(p).map(|t| t.id)).collect();
        ids_after.sort();
        let mut sorted_before = ids_before.clone();
        sorted_before.sort();
        assert_eq!(ids_after, sorted_before);

        if state.phase() == &Phase::Idle {
            assert!(has_possible_moves(state.grid()));
        }

        // A deadlock right after a shuffle ends the game
        state.load_grid(deadlocked());
        state.shuffled_recently = true;
        state.handle_next_step();
        assert!(state.is_game_over());

        tick(&mut state, &TickInput::default(), FRAME_MS);
        assert!(state.is_game_over());
    }

    #[test]
    fn test_restart_resets_progress() {
        let mut state = state_for(playable());
        state.attempt_swap(p(6, 2), p(7, 2)).unwrap();
        state.settle();
        assert!(state.score() > 0);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, FRAME_MS);
        assert_eq!(state.score(), 0);
        assert_eq!(state.max_combo(), 0);
        assert!(state.grid().is_full());
        assert!(analyze(state.grid()).is_empty());
    }

    #[test]
    fn test_tick_drives_a_swap() {
        let mut state = state_for(playable());
        let swap = TickInput {
            swap: Some((p(6, 2), p(7, 2))),
            ..Default::default()
        };
        tick(&mut state, &swap, FRAME_MS);
        assert!(matches!(state.phase(), Phase::AttemptingSwap { .. }));

        let done = TickInput {
            phase_done: true,
            ..Default::default()
        };
        for _ in 0..1000 {
            if !state.phase().is_animating() {
                break;
            }
            tick(&mut state, &done, FRAME_MS);
        }
        assert!(!state.phase().is_animating());
        assert!(state.score() >= 30);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        for state in [&mut state1, &mut state2] {
            for _ in 0..5 {
                let Some((a, b)) = find_hint(state.grid()) else {
                    break;
                };
                state.attempt_swap(a, b).unwrap();
                state.settle();
                if state.phase() != &Phase::Idle {
                    break;
                }
            }
        }

        assert_eq!(state1.grid(), state2.grid());
        assert_eq!(state1.score(), state2.score());
        assert_eq!(state1.phase(), state2.phase());
    }
}
