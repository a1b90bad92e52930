//! Engine errors. Every failing operation leaves its input untouched.

use derive_more::{Display, Error};

use crate::board::Cell;
use crate::rules::Move;

/// Why a move was refused.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum InvalidMoveReason {
    #[display("a covered cell is not on the board")]
    OffBoard,
    #[display("a covered cell is not empty")]
    Occupied,
    #[display("piece shape does not belong to that side")]
    WrongShape,
    #[display("not a legal move in this position")]
    NotLegal,
    #[display("the game is over")]
    GameOver,
}

/// Errors raised by the game engine.
#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
pub enum EngineError {
    /// Target cells not empty, off board, or the move is not currently legal.
    #[display("invalid move {mv}: {reason}")]
    InvalidMove { mv: Move, reason: InvalidMoveReason },
    /// A builder edit would leave the board disconnected.
    #[display("editing cell {cell} would disconnect the board")]
    DisconnectedBoard { cell: Cell },
    /// Persisted state is inconsistent with itself or the board.
    #[display("malformed import: {reason}")]
    MalformedImport { reason: String },
}

impl EngineError {
    #[inline]
    pub(crate) fn invalid(mv: Move, reason: InvalidMoveReason) -> EngineError {
        EngineError::InvalidMove { mv, reason }
    }
}
