//! Shape Match entry point
//!
//! Native builds run a headless autoplay session that follows the engine's
//! own hints. The browser build starts from `platform::web`.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use clap::Parser;

    use shape_match::persistence::FileStore;
    use shape_match::sim::{GameState, Phase, TickInput, find_hint, tick};
    use shape_match::{HighScores, Settings, StoreError};

    /// Headless match-3 autoplayer.
    #[derive(Debug, Parser)]
    #[command(
        name = "shape-match",
        version,
        about = "Plays a match-3 game by taking the hint every move, then records the score."
    )]
    pub struct Args {
        /// RNG seed (defaults to the current time)
        #[arg(short, long)]
        pub seed: Option<u64>,

        /// Number of moves to play before stopping
        #[arg(short, long, default_value = "50", value_name = "N")]
        pub moves: u32,

        /// Directory for settings and high scores
        #[arg(long, default_value = ".shape-match", value_name = "DIR")]
        pub store_dir: PathBuf,

        /// Initials for the high score table
        #[arg(long, default_value = "CPU")]
        pub name: String,
    }

    fn clock_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Let a pending shuffle run out
    fn wait_out_shuffle(state: &mut GameState) {
        loop {
            let remaining_ms = match state.phase() {
                Phase::Shuffling { remaining_ms } => *remaining_ms,
                _ => break,
            };
            tick(state, &TickInput::default(), remaining_ms);
            state.settle();
        }
    }

    pub fn run() -> Result<(), StoreError> {
        let args = Args::parse();
        let mut store = FileStore::new(&args.store_dir);
        let settings = Settings::load(&store);
        let seed = args.seed.unwrap_or_else(clock_seed);

        let mut state = GameState::with_settings(seed, settings);
        let mut played = 0;
        while played < args.moves {
            wait_out_shuffle(&mut state);
            if state.is_game_over() {
                break;
            }
            let Some((a, b)) = find_hint(state.grid()) else {
                break;
            };
            if let Err(err) = state.attempt_swap(a, b) {
                log::warn!("hinted swap refused: {}", err);
                break;
            }
            state.settle();
            played += 1;
            log::debug!("move {}: {} <-> {}, score {}", played, a, b, state.score());
        }

        println!("Seed:      {}", seed);
        println!("Moves:     {}", played);
        println!("Score:     {}", state.score());
        println!("Max combo: {}", state.max_combo());
        if state.is_game_over() {
            println!("Game over: no moves left");
        }

        let mut scores = HighScores::load(&store);
        if let Some(rank) = scores.add_score(&args.name, state.score()) {
            scores.save(&mut store)?;
            println!("New high score, rank #{}", rank);
        }
        for (i, entry) in scores.entries.iter().enumerate() {
            println!("{:>2}. {:<3} {:>8}", i + 1, entry.name, entry.score);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Shape Match (native) starting...");

    if let Err(err) = native::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start
}
