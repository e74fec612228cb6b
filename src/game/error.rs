//! Error taxonomy of the session engine.
//!
//! Every rejection has its own variant so callers can tell causes apart;
//! `kind()` folds them into the coarse classes the transport layers map
//! onto status codes.

use thiserror::Error;

use crate::game::types::{PlayerId, SessionId, SessionStatus};
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    Forbidden,
    ValidationFailure,
    InsufficientResource,
    Capacity,
    Conflict,
    Infrastructure,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("game {0} not found")]
    SessionNotFound(SessionId),

    #[error("game is {actual}, expected {expected}")]
    InvalidStatus {
        expected: SessionStatus,
        actual: SessionStatus,
    },

    #[error("player {0} has been eliminated")]
    ActorEliminated(PlayerId),

    #[error("at least {required} players are required to start, got {actual}")]
    NotEnoughPlayers { required: usize, actual: usize },

    #[error("only the game creator can {0}")]
    NotCreator(&'static str),

    #[error("player {0} is not in this game")]
    NotMember(PlayerId),

    #[error("position ({x}, {y}) is outside the board")]
    OutOfBounds { x: i64, y: i64 },

    #[error("position ({x}, {y}) is on the outer ring; players stay inside it")]
    EdgeCell { x: usize, y: usize },

    #[error("position ({x}, {y}) is already occupied")]
    CellOccupied { x: usize, y: usize },

    #[error("no living player at ({x}, {y})")]
    NoLivingTarget { x: usize, y: usize },

    #[error("a player cannot target themselves")]
    SelfTarget,

    #[error("target is at distance {distance}, allowed range is {min}..={max}")]
    OutOfRange { distance: usize, min: usize, max: usize },

    #[error("amount must be at least 1")]
    InvalidAmount,

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("not enough action points: {required} required, {available} available")]
    InsufficientAp { required: u32, available: u32 },

    #[error("game is full ({max} players)")]
    SessionFull { max: usize },

    #[error("board is too crowded to place player {player}")]
    PlacementFailed { player: PlayerId },

    #[error("player {0} already joined this game")]
    AlreadyJoined(PlayerId),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    #[error("game record could not be decoded: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("game worker unavailable: {0}")]
    Unavailable(String),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::SessionNotFound(_) => ErrorKind::NotFound,
            GameError::InvalidStatus { .. }
            | GameError::ActorEliminated(_)
            | GameError::NotEnoughPlayers { .. } => ErrorKind::InvalidState,
            GameError::NotCreator(_) | GameError::NotMember(_) => ErrorKind::Forbidden,
            GameError::OutOfBounds { .. }
            | GameError::EdgeCell { .. }
            | GameError::CellOccupied { .. }
            | GameError::NoLivingTarget { .. }
            | GameError::SelfTarget
            | GameError::OutOfRange { .. }
            | GameError::InvalidAmount
            | GameError::InvalidInput { .. } => ErrorKind::ValidationFailure,
            GameError::InsufficientAp { .. } => ErrorKind::InsufficientResource,
            GameError::SessionFull { .. } | GameError::PlacementFailed { .. } => ErrorKind::Capacity,
            GameError::AlreadyJoined(_) => ErrorKind::Conflict,
            GameError::Store(_) | GameError::Codec(_) | GameError::Unavailable(_) => {
                ErrorKind::Infrastructure
            }
        }
    }

    /// Stable machine-readable code sent to clients next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::SessionNotFound(_) => "GAME_NOT_FOUND",
            GameError::InvalidStatus { .. } => "INVALID_STATUS",
            GameError::ActorEliminated(_) => "PLAYER_ELIMINATED",
            GameError::NotEnoughPlayers { .. } => "NOT_ENOUGH_PLAYERS",
            GameError::NotCreator(_) => "NOT_CREATOR",
            GameError::NotMember(_) => "NOT_IN_GAME",
            GameError::OutOfBounds { .. } => "OUT_OF_BOUNDS",
            GameError::EdgeCell { .. } => "EDGE_CELL",
            GameError::CellOccupied { .. } => "CELL_OCCUPIED",
            GameError::NoLivingTarget { .. } => "NO_TARGET",
            GameError::SelfTarget => "SELF_TARGET",
            GameError::OutOfRange { .. } => "OUT_OF_RANGE",
            GameError::InvalidAmount => "INVALID_AMOUNT",
            GameError::InvalidInput { .. } => "INVALID_INPUT",
            GameError::InsufficientAp { .. } => "INSUFFICIENT_AP",
            GameError::SessionFull { .. } => "GAME_FULL",
            GameError::PlacementFailed { .. } => "PLACEMENT_FAILED",
            GameError::AlreadyJoined(_) => "ALREADY_JOINED",
            GameError::Store(_) => "STORE_ERROR",
            GameError::Codec(_) => "CODEC_ERROR",
            GameError::Unavailable(_) => "UNAVAILABLE",
        }
    }

    pub(crate) fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        GameError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infrastructure_is_not_a_validation_failure() {
        let err = GameError::Store(StoreError::Unavailable("connection reset".into()));
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
        assert_eq!(GameError::SelfTarget.kind(), ErrorKind::ValidationFailure);
    }

    #[test]
    fn messages_carry_the_cause() {
        let err = GameError::InsufficientAp {
            required: 3,
            available: 2,
        };
        assert_eq!(err.kind(), ErrorKind::InsufficientResource);
        assert_eq!(err.code(), "INSUFFICIENT_AP");
        assert!(err.to_string().contains("3 required"));
    }
}
