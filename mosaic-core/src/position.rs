//! Occupancy over a board, and the canonical key used for memoization.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell};
use crate::error::{EngineError, InvalidMoveReason};
use crate::rules::Move;

/// What occupies a board cell.
///
/// The numeric codes are the persisted representation:
/// ```text
/// 0 = Empty, 1 = Blocked, 2 = Left piece, 3 = Right piece, 4 = Small piece
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Mark {
    #[default]
    Empty = 0,
    /// Retired cell, owned by neither side.
    Blocked = 1,
    Left = 2,
    Right = 3,
    /// 1x1 all-small placement.
    Small = 4,
}

/// A mark code outside `0..=4`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display, Error)]
#[display("unknown mark code {code}")]
pub struct UnknownMark {
    pub code: u8,
}

impl From<Mark> for u8 {
    fn from(mark: Mark) -> u8 {
        mark as u8
    }
}

impl TryFrom<u8> for Mark {
    type Error = UnknownMark;

    fn try_from(code: u8) -> Result<Mark, UnknownMark> {
        match code {
            0 => Ok(Mark::Empty),
            1 => Ok(Mark::Blocked),
            2 => Ok(Mark::Left),
            3 => Ok(Mark::Right),
            4 => Ok(Mark::Small),
            _ => Err(UnknownMark { code }),
        }
    }
}

impl Mark {
    /// Single-character glyph used by the text renderer.
    pub fn glyph(self) -> char {
        match self {
            Mark::Empty => '.',
            Mark::Blocked => '#',
            Mark::Left => 'L',
            Mark::Right => 'R',
            Mark::Small => 's',
        }
    }
}

/// Canonical serialization of a position's occupancy.
///
/// One mark code per board cell, in row-major cell order. Two positions on
/// the same board have equal keys iff their occupancies are equal.
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct PositionKey(Box<[u8]>);

impl PositionKey {
    /// Wrap raw key bytes (as read back from a checkpoint).
    pub fn from_bytes(bytes: Vec<u8>) -> PositionKey {
        PositionKey(bytes.into_boxed_slice())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A board plus its occupancy.
///
/// Cloning is cheap on the board side: the board is shared, only the mark map
/// is copied. Cells absent from the mark map are empty.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Position {
    board: Arc<Board>,
    marks: BTreeMap<Cell, Mark>,
}

impl Position {
    /// An all-empty position on the given board.
    pub fn new(board: Board) -> Position {
        Position {
            board: Arc::new(board),
            marks: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The mark at `cell`, or `None` if the cell is not on the board.
    #[inline]
    pub fn mark(&self, cell: Cell) -> Option<Mark> {
        if !self.board.contains(cell) {
            return None;
        }
        Some(self.marks.get(&cell).copied().unwrap_or_default())
    }

    /// True if `cell` is on the board and unoccupied.
    #[inline]
    pub fn is_empty(&self, cell: Cell) -> bool {
        self.mark(cell) == Some(Mark::Empty)
    }

    /// Set a single mark. Fails if `cell` is off the board.
    pub fn set_mark(&mut self, cell: Cell, mark: Mark) -> Result<(), EngineError> {
        if !self.board.contains(cell) {
            return Err(EngineError::MalformedImport {
                reason: format!("mark for {} which is not on the board", cell),
            });
        }
        if mark == Mark::Empty {
            self.marks.remove(&cell);
        } else {
            self.marks.insert(cell, mark);
        }
        Ok(())
    }

    /// Non-empty marks in row-major order.
    pub fn marks(&self) -> impl Iterator<Item = (Cell, Mark)> + '_ {
        self.marks.iter().map(|(&c, &m)| (c, m))
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.board.cells().filter(|c| !self.marks.contains_key(c))
    }

    pub fn empty_count(&self) -> usize {
        self.board.len() - self.marks.len()
    }

    /// Minimum `y` over all empty cells (the global top row).
    pub fn top_row(&self) -> Option<i32> {
        self.empty_cells().next().map(|c| c.y)
    }

    /// Mark every empty cell in row `y` as blocked. Returns how many were blocked.
    pub fn block_row(&mut self, y: i32) -> usize {
        let row: Vec<Cell> = self.empty_cells().filter(|c| c.y == y).collect();
        for &cell in &row {
            self.marks.insert(cell, Mark::Blocked);
        }
        row.len()
    }

    /// Canonical memo key for this occupancy.
    pub fn key(&self) -> PositionKey {
        let bytes: Vec<u8> = self
            .board
            .cells()
            .map(|c| self.marks.get(&c).copied().unwrap_or_default() as u8)
            .collect();
        PositionKey(bytes.into_boxed_slice())
    }

    // ========== Builder edits ==========

    /// Add a playable cell (starts empty). See [`Board::add_cell`].
    pub fn add_cell(&mut self, cell: Cell) -> Result<(), EngineError> {
        let mut board = (*self.board).clone();
        board.add_cell(cell)?;
        self.board = Arc::new(board);
        Ok(())
    }

    /// Remove a playable cell and whatever occupied it. See [`Board::remove_cell`].
    pub fn remove_cell(&mut self, cell: Cell) -> Result<(), EngineError> {
        let mut board = (*self.board).clone();
        board.remove_cell(cell)?;
        self.board = Arc::new(board);
        self.marks.remove(&cell);
        Ok(())
    }

    // ========== Move application ==========

    /// Apply a move, writing its marks.
    ///
    /// Only checks that the move is well-formed and its cells are empty; it does
    /// NOT check top-row legality. Use [`crate::GameState::play`] for that.
    pub fn apply(&mut self, mv: Move) -> Result<(), EngineError> {
        if !mv.kind.fits(mv.side) {
            return Err(EngineError::invalid(mv, InvalidMoveReason::WrongShape));
        }
        for cell in mv.cells() {
            match self.mark(cell) {
                None => return Err(EngineError::invalid(mv, InvalidMoveReason::OffBoard)),
                Some(Mark::Empty) => {}
                Some(_) => return Err(EngineError::invalid(mv, InvalidMoveReason::Occupied)),
            }
        }
        self.place(mv);
        Ok(())
    }

    /// Value-style [`Position::apply`]: returns the child position.
    pub fn with_move(&self, mv: Move) -> Result<Position, EngineError> {
        let mut next = self.clone();
        next.apply(mv)?;
        Ok(next)
    }

    /// Write marks for a move already known to be legal.
    #[inline]
    pub(crate) fn place(&mut self, mv: Move) {
        let mark = mv.mark();
        for cell in mv.cells() {
            self.marks.insert(cell, mark);
        }
    }
}

impl fmt::Display for Position {
    /// Grid rendering; `' '` for holes in the bounding box.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(b) = self.board.bounds() else {
            return writeln!(f, "(empty board)");
        };
        for y in b.min_y..=b.max_y {
            let row: String = (b.min_x..=b.max_x)
                .map(|x| self.mark(Cell::new(x, y)).map_or(' ', Mark::glyph))
                .collect();
            writeln!(f, "{}", row.trim_end())?;
        }
        Ok(())
    }
}
