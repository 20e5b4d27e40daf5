use crate::store::{PlayerId, StoreError};
use thiserror::Error;
use tillage_flow::{InvalidItem, PlotError};

/// Errors surfaced by the engine.
///
/// Nothing is retried or recovered here; every failure reaches the caller
/// as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid item code: {0}")]
    InvalidItem(i64),

    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("Plot {plot} of player {player} not found")]
    PlotNotFound { player: PlayerId, plot: i64 },

    #[error("Player name must not be empty")]
    InvalidName,

    #[error("Player name {0:?} is already taken")]
    NameTaken(String),

    #[error("Corrupt plot record: {0}")]
    CorruptRecord(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<InvalidItem> for EngineError {
    fn from(err: InvalidItem) -> Self {
        EngineError::InvalidItem(err.0)
    }
}

impl From<PlotError> for EngineError {
    fn from(err: PlotError) -> Self {
        match err {
            PlotError::InvalidItem(InvalidItem(code)) => EngineError::InvalidItem(code),
            other => EngineError::CorruptRecord(other.to_string()),
        }
    }
}
