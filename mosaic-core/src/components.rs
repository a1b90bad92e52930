//! Decomposition of the empty cells into independent regions.

use std::collections::{HashSet, VecDeque};

use crate::board::Cell;
use crate::config::Ruleset;
use crate::position::Position;

/// A maximal 4-connected group of empty cells.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EmptyComponent {
    /// Row-major sorted.
    cells: Vec<Cell>,
}

impl EmptyComponent {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Minimum `y` in the component. Components are never empty.
    pub fn top_y(&self) -> i32 {
        self.cells[0].y
    }

    /// Cells on the component's top row, left to right.
    pub fn top_row(&self) -> impl Iterator<Item = Cell> + '_ {
        let top = self.top_y();
        self.cells.iter().copied().take_while(move |c| c.y == top)
    }
}

/// Flood-fill the empty cells into components.
///
/// Occupied, blocked and off-board cells are walls. Components are returned
/// ordered by their first (row-major smallest) cell.
pub fn empty_components(position: &Position) -> Vec<EmptyComponent> {
    let mut seen: HashSet<Cell> = HashSet::new();
    let mut components = Vec::new();

    for start in position.empty_cells() {
        if !seen.insert(start) {
            continue;
        }
        let mut cells = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            for next in cell.neighbors() {
                if position.is_empty(next) && seen.insert(next) {
                    cells.push(next);
                    queue.push_back(next);
                }
            }
        }
        cells.sort();
        components.push(EmptyComponent { cells });
    }

    components
}

/// Empty cells on which a move may be anchored, in row-major order.
pub fn anchor_cells(position: &Position, ruleset: Ruleset) -> Vec<Cell> {
    match ruleset {
        Ruleset::PerComponentTop => {
            let mut anchors: Vec<Cell> = empty_components(position)
                .iter()
                .flat_map(|comp| comp.top_row().collect::<Vec<_>>())
                .collect();
            anchors.sort();
            anchors
        }
        Ruleset::GlobalTop => match position.top_row() {
            Some(top) => position
                .empty_cells()
                .take_while(|c| c.y == top)
                .collect(),
            None => Vec::new(),
        },
    }
}
