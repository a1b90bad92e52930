//! Turn order and termination.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::board::Cell;
use crate::config::EngineConfig;
use crate::error::{EngineError, InvalidMoveReason};
use crate::position::Position;
use crate::rules::{has_domino_on_row, legal_moves, Move, Side};

/// Whether the game can continue.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Phase {
    InProgress,
    /// `stuck` is the side to act, which has no legal move. It loses.
    Terminal { stuck: Side },
}

/// A position plus whose turn it is.
///
/// Transitions never mutate in place: [`GameState::play`] returns the next
/// state and leaves `self` as it was, including on error.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GameState {
    position: Position,
    mover: Side,
    phase: Phase,
    /// Rows blocked by row retirement, in the order they were retired.
    retired_rows: Vec<i32>,
}

impl GameState {
    /// Start (or resume) a game with `mover` to act.
    pub fn new(position: Position, mover: Side, config: &EngineConfig) -> GameState {
        GameState {
            position,
            mover,
            phase: Phase::InProgress,
            retired_rows: Vec::new(),
        }
        .settle(config)
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn mover(&self) -> Side {
        self.mover
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Terminal { .. })
    }

    /// The winner under normal play, once the game is over.
    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            Phase::InProgress => None,
            Phase::Terminal { stuck } => Some(stuck.opponent()),
        }
    }

    pub fn retired_rows(&self) -> &[i32] {
        &self.retired_rows
    }

    pub fn into_position(self) -> Position {
        self.position
    }

    /// Legal moves for the side to act (empty once terminal).
    pub fn legal_moves(&self, config: &EngineConfig) -> Vec<Move> {
        if self.is_terminal() {
            return Vec::new();
        }
        legal_moves(&self.position, self.mover, config)
    }

    /// Play `mv` for the side to act and hand the turn over.
    ///
    /// The move is checked against a freshly generated legal-move list, so a
    /// stale or replayed move is refused instead of corrupting occupancy.
    #[instrument(level = "debug", skip(self, config), fields(mover = %self.mover))]
    pub fn play(&self, mv: Move, config: &EngineConfig) -> Result<GameState, EngineError> {
        if self.is_terminal() {
            return Err(EngineError::invalid(mv, InvalidMoveReason::GameOver));
        }
        if mv.side != self.mover || !self.legal_moves(config).contains(&mv) {
            return Err(EngineError::invalid(mv, InvalidMoveReason::NotLegal));
        }

        let mut position = self.position.clone();
        position.apply(mv)?;
        debug!(%mv, "move applied");

        Ok(GameState {
            position,
            mover: self.mover.opponent(),
            phase: Phase::InProgress,
            retired_rows: self.retired_rows.clone(),
        }
        .settle(config))
    }

    /// Play the mover's legal move anchored at `cell`, the way a click does.
    pub fn play_at(&self, cell: Cell, config: &EngineConfig) -> Result<GameState, EngineError> {
        let mv = self
            .legal_moves(config)
            .into_iter()
            .find(|m| m.anchor == cell)
            .unwrap_or_else(|| Move::domino(self.mover, cell));
        self.play(mv, config)
    }

    /// Hand the turn to `side` and re-evaluate termination.
    pub fn with_mover(&self, side: Side, config: &EngineConfig) -> GameState {
        GameState {
            position: self.position.clone(),
            mover: side,
            phase: Phase::InProgress,
            retired_rows: self.retired_rows.clone(),
        }
        .settle(config)
    }

    /// Decide the phase for the current mover, retiring exhausted rows if enabled.
    fn settle(mut self, config: &EngineConfig) -> GameState {
        loop {
            if !legal_moves(&self.position, self.mover, config).is_empty() {
                self.phase = Phase::InProgress;
                return self;
            }
            let Some(top) = self.position.top_row() else {
                break;
            };
            if !config.row_retirement
                || Side::all().any(|s| has_domino_on_row(&self.position, s, config.ruleset, top))
            {
                break;
            }
            let blocked = self.position.block_row(top);
            debug!(row = top, blocked, "retired exhausted row");
            self.retired_rows.push(top);
        }
        debug!(stuck = %self.mover, "game over");
        self.phase = Phase::Terminal { stuck: self.mover };
        self
    }
}
