//! Sparse board model: the set of playable cells.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A board coordinate. `y` grows downwards, so the "top" row is the minimum `y`.
///
/// Cells order row-major: ascending `(y, x)`. Every deterministic iteration in
/// the engine relies on this order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    /// Largest coordinate magnitude accepted from imported data. Neighbor
    /// arithmetic stays well inside `i32` for every cell within it.
    pub const MAX_COORD: i32 = 1 << 20;

    /// Create a cell from its coordinates.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Cell {
        Cell { x, y }
    }

    /// Whether both coordinates lie within [`Cell::MAX_COORD`].
    #[inline]
    pub const fn in_range(self) -> bool {
        let max = Cell::MAX_COORD as u32;
        self.x.unsigned_abs() <= max && self.y.unsigned_abs() <= max
    }

    /// The cell directly below (second half of a vertical domino).
    #[inline]
    pub const fn below(self) -> Cell {
        Cell::new(self.x, self.y + 1)
    }

    /// The cell directly to the right (second half of a horizontal domino).
    #[inline]
    pub const fn right(self) -> Cell {
        Cell::new(self.x + 1, self.y)
    }

    /// The four edge-adjacent cells.
    #[inline]
    pub const fn neighbors(self) -> [Cell; 4] {
        [
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x - 1, self.y),
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x, self.y - 1),
        ]
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Axis-aligned bounding rectangle of a board (inclusive).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }
}

/// The playable region.
///
/// Builder edits (`add_cell` / `remove_cell`) keep the board 4-connected.
/// Boards built with [`Board::from_cells`] are taken as given, which is how
/// imported positions and disjoint sums are constructed.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: BTreeSet<Cell>,
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Board {
        Board::default()
    }

    /// Build a board from a list of cells without any connectivity check.
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Board {
        Board {
            cells: cells.into_iter().collect(),
        }
    }

    /// A `width` × `height` rectangle anchored at the origin.
    pub fn rectangle(width: i32, height: i32) -> Board {
        Board::from_cells((0..height).flat_map(|y| (0..width).map(move |x| Cell::new(x, y))))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Iterate cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    /// Add a cell, rejecting the edit if the result would be disconnected.
    ///
    /// Adding to an empty board always succeeds; adding an existing cell is a no-op.
    pub fn add_cell(&mut self, cell: Cell) -> Result<(), EngineError> {
        if !self.cells.insert(cell) {
            return Ok(());
        }
        if !self.is_connected() {
            self.cells.remove(&cell);
            return Err(EngineError::DisconnectedBoard { cell });
        }
        Ok(())
    }

    /// Remove a cell, rejecting the edit if the remaining board would be disconnected.
    pub fn remove_cell(&mut self, cell: Cell) -> Result<(), EngineError> {
        if !self.cells.remove(&cell) {
            return Ok(());
        }
        if !self.is_connected() {
            self.cells.insert(cell);
            return Err(EngineError::DisconnectedBoard { cell });
        }
        Ok(())
    }

    /// Breadth-first reachability over 4-adjacency. The empty board is connected.
    pub fn is_connected(&self) -> bool {
        let Some(&start) = self.cells.first() else {
            return true;
        };
        let mut seen = HashSet::with_capacity(self.cells.len());
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        while let Some(cell) = queue.pop_front() {
            for next in cell.neighbors() {
                if self.cells.contains(&next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen.len() == self.cells.len()
    }

    /// Minimal rectangle containing every cell, or `None` for an empty board.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.cells.first()?;
        let mut b = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for c in &self.cells {
            b.min_x = b.min_x.min(c.x);
            b.min_y = b.min_y.min(c.y);
            b.max_x = b.max_x.max(c.x);
            b.max_y = b.max_y.max(c.y);
        }
        Some(b)
    }

    /// Translate the board so its bounds start at (0, 0).
    ///
    /// Returns the `(dx, dy)` that was added to every cell.
    pub fn normalize_origin(&mut self) -> (i32, i32) {
        let Some(b) = self.bounds() else {
            return (0, 0);
        };
        if b.min_x == 0 && b.min_y == 0 {
            return (0, 0);
        }
        let (dx, dy) = (-b.min_x, -b.min_y);
        self.cells = self
            .cells
            .iter()
            .map(|c| Cell::new(c.x + dx, c.y + dy))
            .collect();
        (dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Eight cells: a 2x2 square and an L-tromino joined by the single cell (2,0).
    fn dumbbell() -> Board {
        Board::from_cells([
            Cell::new(0, 0),
            Cell::new(1, 0),
            Cell::new(0, 1),
            Cell::new(1, 1),
            Cell::new(2, 0),
            Cell::new(3, 0),
            Cell::new(4, 0),
            Cell::new(4, 1),
        ])
    }

    #[test]
    fn test_cell_order_is_row_major() {
        let mut cells = vec![Cell::new(1, 0), Cell::new(0, 1), Cell::new(0, 0)];
        cells.sort();
        assert_eq!(cells, vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(0, 1)]);
    }

    #[test]
    fn test_cell_in_range() {
        assert!(Cell::new(0, 0).in_range());
        assert!(Cell::new(-Cell::MAX_COORD, Cell::MAX_COORD).in_range());
        assert!(!Cell::new(Cell::MAX_COORD + 1, 0).in_range());
        assert!(!Cell::new(0, i32::MIN).in_range());
        assert!(!Cell::new(i32::MAX, 0).in_range());
    }

    #[test]
    fn test_add_cell_to_empty_board() {
        let mut board = Board::new();
        assert!(board.add_cell(Cell::new(5, 7)).is_ok());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_add_disconnected_cell_rejected() {
        let mut board = Board::rectangle(2, 2);
        let before = board.clone();
        let err = board.add_cell(Cell::new(5, 5)).unwrap_err();
        assert_eq!(err, EngineError::DisconnectedBoard { cell: Cell::new(5, 5) });
        assert_eq!(board, before);
    }

    #[test]
    fn test_add_adjacent_cell() {
        let mut board = Board::rectangle(2, 2);
        board.add_cell(Cell::new(2, 1)).unwrap();
        assert!(board.contains(Cell::new(2, 1)));
        assert!(board.is_connected());
    }

    #[test]
    fn test_remove_bridge_rejected() {
        let mut board = dumbbell();
        assert_eq!(board.len(), 8);
        let before = board.clone();
        assert!(board.remove_cell(Cell::new(2, 0)).is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn test_remove_leaf_allowed() {
        let mut board = dumbbell();
        board.remove_cell(Cell::new(4, 1)).unwrap();
        assert_eq!(board.len(), 7);
        assert!(board.is_connected());
    }

    #[test]
    fn test_remove_last_cell() {
        let mut board = Board::from_cells([Cell::new(0, 0)]);
        board.remove_cell(Cell::new(0, 0)).unwrap();
        assert!(board.is_empty());
        assert!(board.is_connected());
    }

    #[test]
    fn test_bounds() {
        assert_eq!(Board::new().bounds(), None);
        let b = dumbbell().bounds().unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (0, 0, 4, 1));
        assert_eq!((b.width(), b.height()), (5, 2));
    }

    #[test]
    fn test_normalize_origin() {
        let mut board = Board::from_cells([Cell::new(-2, 3), Cell::new(-1, 3)]);
        assert_eq!(board.normalize_origin(), (2, -3));
        assert!(board.contains(Cell::new(0, 0)));
        assert!(board.contains(Cell::new(1, 0)));
        assert_eq!(board.normalize_origin(), (0, 0));
    }
}
