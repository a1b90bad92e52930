//! Persisted game state.
//!
//! The JSON shape is the one the browser front end exports:
//!
//! ```json
//! {
//!   "cells": [{"x": 0, "y": 0}, {"x": 0, "y": 1}],
//!   "occ": [{"cell": {"x": 0, "y": 0}, "v": 2}, {"cell": {"x": 0, "y": 1}, "v": 2}],
//!   "current": "Right",
//!   "mode": "play",
//!   "allSmall": false
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::game::GameState;
use crate::position::{Mark, Position};
use crate::rules::Side;

/// One `(cell, mark)` pair.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct MarkEntry {
    pub cell: Cell,
    pub v: Mark,
}

/// Serializable game state.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub occ: Vec<MarkEntry>,
    #[serde(default)]
    pub current: Side,
    /// Front-end mode name. [`Snapshot::capture`] writes `play`; restoring
    /// ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default)]
    pub all_small: bool,
}

impl Snapshot {
    /// Capture `game`. Every board cell gets an `occ` entry, empties included.
    pub fn capture(game: &GameState, config: &EngineConfig) -> Snapshot {
        let position = game.position();
        let cells: Vec<Cell> = position.board().cells().collect();
        let occ = cells
            .iter()
            .map(|&cell| MarkEntry {
                cell,
                v: position.mark(cell).unwrap_or_default(),
            })
            .collect();
        Snapshot {
            cells,
            occ,
            current: game.mover(),
            mode: Some("play".to_string()),
            all_small: config.all_small,
        }
    }

    /// Rebuild the game this snapshot describes.
    ///
    /// The snapshot's `allSmall` flag overrides the one in `config`. Fails on
    /// a coordinate beyond [`Cell::MAX_COORD`], a mark for a cell that is not
    /// on the board, or two different marks for the same cell.
    pub fn restore(
        &self,
        config: &EngineConfig,
    ) -> Result<(GameState, EngineConfig), EngineError> {
        let listed = self.occ.iter().map(|entry| entry.cell);
        if let Some(cell) = self.cells.iter().copied().chain(listed).find(|c| !c.in_range()) {
            return Err(EngineError::MalformedImport {
                reason: format!("cell {} is outside the coordinate range", cell),
            });
        }

        let board = Board::from_cells(self.cells.iter().copied());

        let mut marks: BTreeMap<Cell, Mark> = BTreeMap::new();
        for entry in &self.occ {
            if let Some(&prev) = marks.get(&entry.cell) {
                if prev != entry.v {
                    return Err(EngineError::MalformedImport {
                        reason: format!(
                            "cell {} is marked both {} and {}",
                            entry.cell,
                            u8::from(prev),
                            u8::from(entry.v)
                        ),
                    });
                }
            }
            marks.insert(entry.cell, entry.v);
        }

        let mut position = Position::new(board);
        for (cell, mark) in marks {
            position.set_mark(cell, mark)?;
        }

        let config = config.with_all_small(self.all_small);
        Ok((GameState::new(position, self.current, &config), config))
    }
}
