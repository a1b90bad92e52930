//! Sides, moves, and move legality.
//!
//! A move is legal when it is anchored on an allowed top row (see
//! [`Ruleset`]) and every cell it covers is empty. When a side has no domino
//! move and the all-small rule is on, it may instead place one 1x1 piece on
//! the first empty anchor cell.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Cell;
use crate::components::anchor_cells;
use crate::config::{EngineConfig, Ruleset};
use crate::position::{Mark, Position};

/// The two players. Left places vertical dominoes, Right horizontal ones.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    /// Get the opponent.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// The domino shape this side places.
    #[inline]
    pub fn domino(self) -> MoveKind {
        match self {
            Side::Left => MoveKind::Vertical,
            Side::Right => MoveKind::Horizontal,
        }
    }

    /// Both sides, Left first.
    pub fn all() -> impl Iterator<Item = Side> {
        [Side::Left, Side::Right].into_iter()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("Left"),
            Side::Right => f.write_str("Right"),
        }
    }
}

/// Piece shape.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum MoveKind {
    /// Covers the anchor and the cell below it.
    Vertical,
    /// Covers the anchor and the cell to its right.
    Horizontal,
    /// Covers only the anchor.
    Small,
}

impl MoveKind {
    /// Whether `side` may place this shape.
    #[inline]
    pub fn fits(self, side: Side) -> bool {
        matches!(
            (self, side),
            (MoveKind::Vertical, Side::Left)
                | (MoveKind::Horizontal, Side::Right)
                | (MoveKind::Small, _)
        )
    }
}

/// A placement by one side.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Move {
    pub side: Side,
    pub kind: MoveKind,
    pub anchor: Cell,
}

impl Move {
    /// The side's domino anchored at `anchor`.
    #[inline]
    pub fn domino(side: Side, anchor: Cell) -> Move {
        Move {
            side,
            kind: side.domino(),
            anchor,
        }
    }

    /// A 1x1 all-small placement.
    #[inline]
    pub fn small(side: Side, anchor: Cell) -> Move {
        Move {
            side,
            kind: MoveKind::Small,
            anchor,
        }
    }

    /// Cells covered by the move, anchor first.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let second = match self.kind {
            MoveKind::Vertical => Some(self.anchor.below()),
            MoveKind::Horizontal => Some(self.anchor.right()),
            MoveKind::Small => None,
        };
        std::iter::once(self.anchor).chain(second)
    }

    /// Whether the move covers `cell`.
    pub fn covers(&self, cell: Cell) -> bool {
        self.cells().any(|c| c == cell)
    }

    /// The mark written by this move.
    #[inline]
    pub fn mark(&self) -> Mark {
        match (self.kind, self.side) {
            (MoveKind::Small, _) => Mark::Small,
            (_, Side::Left) => Mark::Left,
            (_, Side::Right) => Mark::Right,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self.kind {
            MoveKind::Vertical => "vertical",
            MoveKind::Horizontal => "horizontal",
            MoveKind::Small => "1x1",
        };
        write!(f, "{} {} at {}", self.side, shape, self.anchor)
    }
}

/// Domino moves for `side` anchored on the given cells.
fn domino_moves(position: &Position, side: Side, anchors: &[Cell]) -> Vec<Move> {
    anchors
        .iter()
        .map(|&anchor| Move::domino(side, anchor))
        .filter(|mv| mv.cells().all(|c| position.is_empty(c)))
        .collect()
}

/// All legal moves for `side`, ordered by anchor (row-major).
///
/// Falls back to a single Small move when there is no domino move and
/// `config.all_small` is set.
pub fn legal_moves(position: &Position, side: Side, config: &EngineConfig) -> Vec<Move> {
    let anchors = anchor_cells(position, config.ruleset);
    let mut moves = domino_moves(position, side, &anchors);
    if moves.is_empty() && config.all_small {
        if let Some(&first) = anchors.first() {
            moves.push(Move::small(side, first));
        }
    }
    moves
}

/// Whether `side` has a domino anchored on row `y`.
pub fn has_domino_on_row(position: &Position, side: Side, ruleset: Ruleset, y: i32) -> bool {
    let anchors: Vec<Cell> = anchor_cells(position, ruleset)
        .into_iter()
        .filter(|c| c.y == y)
        .collect();
    !domino_moves(position, side, &anchors).is_empty()
}

/// True when neither side has any legal move.
///
/// This single predicate decides both live-play termination and CGT leaves.
pub fn is_terminal(position: &Position, config: &EngineConfig) -> bool {
    Side::all().all(|side| legal_moves(position, side, config).is_empty())
}

/// Every legal move for `side` together with the position it leads to.
pub fn options(position: &Position, side: Side, config: &EngineConfig) -> Vec<(Move, Position)> {
    legal_moves(position, side, config)
        .into_iter()
        .map(|mv| {
            let mut child = position.clone();
            child.place(mv);
            (mv, child)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Left.opponent(), Side::Right);
        assert_eq!(Side::Right.opponent(), Side::Left);
    }

    #[test]
    fn test_move_cells() {
        let v = Move::domino(Side::Left, Cell::new(2, 3));
        assert_eq!(v.cells().collect::<Vec<_>>(), vec![Cell::new(2, 3), Cell::new(2, 4)]);
        let h = Move::domino(Side::Right, Cell::new(2, 3));
        assert_eq!(h.cells().collect::<Vec<_>>(), vec![Cell::new(2, 3), Cell::new(3, 3)]);
        let s = Move::small(Side::Right, Cell::new(2, 3));
        assert_eq!(s.cells().count(), 1);
        assert_eq!(s.mark(), Mark::Small);
        assert!(h.covers(Cell::new(3, 3)));
    }

    #[test]
    fn test_vertical_pair() {
        let pos = Position::new(Board::rectangle(1, 2));
        assert_eq!(
            legal_moves(&pos, Side::Left, &config()),
            vec![Move::domino(Side::Left, Cell::new(0, 0))]
        );
        assert!(legal_moves(&pos, Side::Right, &config()).is_empty());
    }

    #[test]
    fn test_horizontal_pair() {
        let pos = Position::new(Board::rectangle(2, 1));
        assert!(legal_moves(&pos, Side::Left, &config()).is_empty());
        assert_eq!(
            legal_moves(&pos, Side::Right, &config()),
            vec![Move::domino(Side::Right, Cell::new(0, 0))]
        );
    }

    #[test]
    fn test_only_top_row() {
        let pos = Position::new(Board::rectangle(3, 3));
        let left = legal_moves(&pos, Side::Left, &config());
        assert_eq!(left.len(), 3);
        assert!(left.iter().all(|m| m.anchor.y == 0));
        let right = legal_moves(&pos, Side::Right, &config());
        assert_eq!(
            right.iter().map(|m| m.anchor).collect::<Vec<_>>(),
            vec![Cell::new(0, 0), Cell::new(1, 0)]
        );
    }

    #[test]
    fn test_per_component_vs_global_top() {
        // Two regions: a lone cell at the top, and a 2x2 square lower down.
        let board = Board::from_cells([
            Cell::new(0, 0),
            Cell::new(3, 2),
            Cell::new(4, 2),
            Cell::new(3, 3),
            Cell::new(4, 3),
        ]);
        let pos = Position::new(board);

        let per = config();
        assert_eq!(legal_moves(&pos, Side::Left, &per).len(), 2);
        assert_eq!(legal_moves(&pos, Side::Right, &per).len(), 1);

        let global = config().with_ruleset(Ruleset::GlobalTop);
        assert!(legal_moves(&pos, Side::Left, &global).is_empty());
        assert!(legal_moves(&pos, Side::Right, &global).is_empty());
        assert!(is_terminal(&pos, &global));
        assert!(!is_terminal(&pos, &per));
    }

    #[test]
    fn test_small_fallback() {
        let pos = Position::new(Board::rectangle(1, 1));
        assert!(legal_moves(&pos, Side::Left, &config()).is_empty());
        let small = config().with_all_small(true);
        assert_eq!(
            legal_moves(&pos, Side::Left, &small),
            vec![Move::small(Side::Left, Cell::new(0, 0))]
        );
        assert_eq!(
            legal_moves(&pos, Side::Right, &small),
            vec![Move::small(Side::Right, Cell::new(0, 0))]
        );
        assert!(is_terminal(&pos, &config()));
        assert!(!is_terminal(&pos, &small));
    }

    #[test]
    fn test_small_only_without_domino() {
        let pos = Position::new(Board::rectangle(1, 2));
        let small = config().with_all_small(true);
        // Left still has its domino, Right falls back to a 1x1.
        assert_eq!(legal_moves(&pos, Side::Left, &small)[0].kind, MoveKind::Vertical);
        assert_eq!(
            legal_moves(&pos, Side::Right, &small),
            vec![Move::small(Side::Right, Cell::new(0, 0))]
        );
    }

    #[test]
    fn test_legal_moves_cover_only_empty_cells() {
        let mut pos = Position::new(Board::rectangle(4, 4));
        pos.apply(Move::domino(Side::Left, Cell::new(1, 0))).unwrap();
        for side in Side::all() {
            for mv in legal_moves(&pos, side, &config()) {
                assert!(mv.cells().all(|c| pos.is_empty(c)), "{mv}");
                assert!(!mv.covers(Cell::new(1, 0)) && !mv.covers(Cell::new(1, 1)));
            }
        }
    }

    #[test]
    fn test_options_children() {
        let pos = Position::new(Board::rectangle(2, 2));
        let opts = options(&pos, Side::Left, &config());
        assert_eq!(opts.len(), 2);
        for (mv, child) in &opts {
            assert_eq!(child.empty_count(), 2);
            assert_eq!(child.mark(mv.anchor), Some(Mark::Left));
        }
        // Source position untouched.
        assert_eq!(pos.empty_count(), 4);
    }

    #[test]
    fn test_has_domino_on_row() {
        let pos = Position::new(Board::rectangle(2, 2));
        assert!(has_domino_on_row(&pos, Side::Left, Ruleset::PerComponentTop, 0));
        assert!(!has_domino_on_row(&pos, Side::Left, Ruleset::PerComponentTop, 1));
    }
}
