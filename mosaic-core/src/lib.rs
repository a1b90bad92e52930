//! Domineering on sparse polyomino boards, with the all-small variant.
//!
//! # Rules
//!
//! ```text
//! Left  places vertical dominoes   (anchor, anchor + (0,1))
//! Right places horizontal dominoes (anchor, anchor + (1,0))
//!
//! A move must be anchored on a top row: the topmost row of the empty
//! region it sits in (default), or the single topmost row of the whole
//! board (`Ruleset::GlobalTop`). All covered cells must be empty.
//!
//! All-small: a side with no domino move may place one 1x1 piece on the
//! first empty anchor cell instead.
//!
//! Normal play: the side to act with no legal move loses.
//! ```
//!
//! # Mark Encoding
//!
//! ```text
//! 0 = Empty   1 = Blocked (retired row)   2 = Left   3 = Right   4 = Small
//! ```
//!
//! Cells are ordered row-major (ascending `y`, then `x`); `y` grows
//! downwards. A [`PositionKey`] is the mark code of every board cell in that
//! order.

pub mod board;
pub mod components;
pub mod config;
pub mod error;
pub mod game;
pub mod generate;
pub mod playout;
pub mod position;
pub mod rules;
pub mod snapshot;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use board::{Board, Bounds, Cell};
pub use components::{anchor_cells, empty_components, EmptyComponent};
pub use config::{EngineConfig, Ruleset};
pub use error::{EngineError, InvalidMoveReason};
pub use game::{GameState, Phase};
pub use generate::{generate_polyomino, random_board};
pub use playout::{explore, playout, ExploreSummary, PlayoutResult, PlayoutStep};
pub use position::{Mark, Position, PositionKey, UnknownMark};
pub use rules::{is_terminal, legal_moves, options, Move, MoveKind, Side};
pub use snapshot::{MarkEntry, Snapshot};

/// Apply `mv` to a copy of `position`, leaving the original untouched.
///
/// Checks cell occupancy and shape only; see [`GameState::play`] for full
/// turn and top-row legality.
pub fn apply_move(position: &Position, mv: Move) -> Result<Position, EngineError> {
    position.with_move(mv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_move_leaves_source() {
        let pos = Position::new(Board::rectangle(2, 2));
        let next = apply_move(&pos, Move::domino(Side::Right, Cell::new(0, 1))).unwrap();
        assert_eq!(pos.empty_count(), 4);
        assert_eq!(next.empty_count(), 2);
        assert!(apply_move(&next, Move::domino(Side::Left, Cell::new(0, 0))).is_err());
    }

    #[test]
    fn test_top_level_flow() {
        let cfg = EngineConfig::default();
        let mut game = GameState::new(Position::new(Board::rectangle(3, 3)), Side::Left, &cfg);
        let mut plies = 0;
        while let Some(&mv) = game.legal_moves(&cfg).first() {
            game = game.play(mv, &cfg).unwrap();
            plies += 1;
        }
        assert!(game.is_terminal());
        assert!(plies > 0);
        assert_eq!(game.winner(), Some(game.mover().opponent()));
    }
}
