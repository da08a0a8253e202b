//! Error types.

use thiserror::Error;

use crate::core::store::EntityId;

/// Geometry construction errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A vector component was NaN or infinite.
    #[error("vector component is not finite: ({x}, {y})")]
    NonFinite {
        /// Offending x
        x: f64,
        /// Offending y
        y: f64,
    },
}

/// Tile map parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// The text contained no rows.
    #[error("empty board")]
    Empty,

    /// A row's length differs from row 0.
    #[error("row {row} is {found} tiles long, expected {expected} like row 0")]
    RaggedRow {
        /// Zero-based row index
        row: usize,
        /// Length of row 0
        expected: usize,
        /// Length of this row
        found: usize,
    },

    /// A token other than `.` or `w`.
    #[error("unrecognized tile {token:?} at row {row}, column {column}")]
    UnrecognizedTile {
        /// Zero-based row index
        row: usize,
        /// Zero-based column index
        column: usize,
        /// The token as written
        token: String,
    },
}

/// Simulation errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// A player handle from another simulation was passed in.
    #[error("player {player} belongs to simulation {owner}, not {caller}")]
    ForeignPlayer {
        /// The player's id in its own simulation
        player: EntityId,
        /// Simulation that owns the player
        owner: u64,
        /// Simulation that was asked to act on it
        caller: u64,
    },

    /// Drawing was requested while the simulation is not running.
    #[error("draw requested while the simulation is not running")]
    NotRunning,

    /// Invalid map.
    #[error("map error: {0}")]
    Map(#[from] MapError),

    /// A physics constant outside its usable range.
    #[error("invalid physics setting {field}: {reason}")]
    InvalidPhysics {
        /// Offending field name
        field: &'static str,
        /// What the value must satisfy
        reason: &'static str,
    },

    /// Invalid JSON configuration or input binding.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// An input variant id with no registered parser.
    #[error("unrecognized input variant {0:?}")]
    UnknownInputVariant(String),
}
