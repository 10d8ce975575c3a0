use thiserror::Error;

use crate::grid::CellPos;

/// A user action that the session or grid refused to carry out.
///
/// None of these are fatal: the caller decides whether to ignore them or show
/// a short notice.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InteractionError {
    #[error("a search or animation is already running")]
    Busy,
    #[error("cell {0} is the token, source or target and cannot be edited")]
    ProtectedCell(CellPos),
    #[error("cell {0} is an obstacle")]
    ObstacleCell(CellPos),
    #[error("cell {0} is outside the grid")]
    OutOfBounds(CellPos),
    #[error("both a source and a target are required to run")]
    MissingEndpoints,
    #[error("unsupported movement mode: {0} neighbors")]
    InvalidMovementMode(u8),
    #[error("obstacle probability {0} is not within 0..=1")]
    InvalidProbability(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("layout contains no grid rows")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("unknown symbol {symbol:?} at row {row}, col {col}")]
    UnknownSymbol { symbol: char, row: usize, col: usize },
    #[error("marker {0:?} appears more than once")]
    DuplicateMarker(char),
}
