//! Error types for the engine boundary and storage

use thiserror::Error;

use crate::sim::Position;

/// Rejected player commands and malformed board descriptions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("engine is busy ({0})")]
    Busy(&'static str),
    #[error("position {0} is outside the board")]
    OutOfBounds(Position),
    #[error("no token at {0}")]
    EmptyCell(Position),
    #[error("{0} and {1} are not adjacent")]
    NotAdjacent(Position, Position),
    #[error("token at {0} is not a special item")]
    NotSpecial(Position),
    #[error("grid has {found} rows, expected {expected}")]
    BadGridRowCount { found: usize, expected: usize },
    #[error("grid row {row} has {len} cells, expected {expected}")]
    BadGridRow { row: usize, len: usize, expected: usize },
    #[error("unknown grid character {0:?}")]
    BadGridChar(char),
}

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported envelope version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
