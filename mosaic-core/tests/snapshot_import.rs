//! Browser Export Compatibility
//!
//! Loads game states in the JSON shape written by the browser front end and
//! verifies the engine restores them with the same occupancy, mover and
//! legal moves, and that a re-export reads back identically.

use mosaic_core::{Cell, EngineConfig, EngineError, Mark, MoveKind, Side, Snapshot};

/// 2x3 board, one Left domino down the first column, Right to move.
const MID_GAME: &str = r#"{
  "cells": [
    {"x": 0, "y": 0}, {"x": 1, "y": 0},
    {"x": 0, "y": 1}, {"x": 1, "y": 1},
    {"x": 0, "y": 2}, {"x": 1, "y": 2}
  ],
  "occ": [
    {"cell": {"x": 0, "y": 0}, "v": 2},
    {"cell": {"x": 1, "y": 0}, "v": 0},
    {"cell": {"x": 0, "y": 1}, "v": 2},
    {"cell": {"x": 1, "y": 1}, "v": 0},
    {"cell": {"x": 0, "y": 2}, "v": 0},
    {"cell": {"x": 1, "y": 2}, "v": 0}
  ],
  "current": "Right",
  "mode": "play",
  "allSmall": true
}"#;

#[test]
fn test_import_mid_game() {
    let snapshot: Snapshot = serde_json::from_str(MID_GAME).unwrap();
    let (game, config) = snapshot.restore(&EngineConfig::default()).unwrap();

    assert!(config.all_small);
    assert_eq!(game.mover(), Side::Right);
    let pos = game.position();
    assert_eq!(pos.board().len(), 6);
    assert_eq!(pos.mark(Cell::new(0, 1)), Some(Mark::Left));
    assert_eq!(pos.empty_count(), 4);

    // Right's top row is the lone (1,0): no horizontal fits, so all-small applies.
    let moves = game.legal_moves(&config);
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].kind, MoveKind::Small);
    assert_eq!(moves[0].anchor, Cell::new(1, 0));
}

#[test]
fn test_reexport_reads_back() {
    let snapshot: Snapshot = serde_json::from_str(MID_GAME).unwrap();
    let (game, config) = snapshot.restore(&EngineConfig::default()).unwrap();

    let json = serde_json::to_string_pretty(&Snapshot::capture(&game, &config)).unwrap();
    assert!(json.contains("\"allSmall\": true"));
    assert!(json.contains("\"current\": \"Right\""));

    let again: Snapshot = serde_json::from_str(&json).unwrap();
    let (game2, _) = again.restore(&EngineConfig::default()).unwrap();
    assert_eq!(game, game2);
}

#[test]
fn test_missing_fields_default() {
    // Older exports carry only the board.
    let json = r#"{"cells": [{"x": 0, "y": 0}, {"x": 0, "y": 1}]}"#;
    let snapshot: Snapshot = serde_json::from_str(json).unwrap();
    let (game, config) = snapshot.restore(&EngineConfig::default()).unwrap();
    assert_eq!(game.mover(), Side::Left);
    assert!(!config.all_small);
    assert_eq!(game.legal_moves(&config).len(), 1);
}

#[test]
fn test_unknown_mark_code_rejected() {
    let json = r#"{
      "cells": [{"x": 0, "y": 0}],
      "occ": [{"cell": {"x": 0, "y": 0}, "v": 9}]
    }"#;
    assert!(serde_json::from_str::<Snapshot>(json).is_err());
}

#[test]
fn test_mark_outside_board_rejected() {
    let json = r#"{
      "cells": [{"x": 0, "y": 0}],
      "occ": [{"cell": {"x": 4, "y": 0}, "v": 3}],
      "current": "Left"
    }"#;
    let snapshot: Snapshot = serde_json::from_str(json).unwrap();
    let err = snapshot.restore(&EngineConfig::default()).unwrap_err();
    assert!(matches!(err, EngineError::MalformedImport { .. }));
}

#[test]
fn test_extreme_coordinates_rejected() {
    let json = r#"{"cells": [{"x": 2147483647, "y": 0}, {"x": 2147483646, "y": 0}]}"#;
    let snapshot: Snapshot = serde_json::from_str(json).unwrap();
    let err = snapshot.restore(&EngineConfig::default()).unwrap_err();
    assert!(matches!(err, EngineError::MalformedImport { .. }));

    let json = r#"{
      "cells": [{"x": 0, "y": 0}],
      "occ": [{"cell": {"x": 0, "y": -2147483648}, "v": 0}]
    }"#;
    let snapshot: Snapshot = serde_json::from_str(json).unwrap();
    let err = snapshot.restore(&EngineConfig::default()).unwrap_err();
    assert!(matches!(err, EngineError::MalformedImport { .. }));
}

#[test]
fn test_far_but_in_range_board_restores() {
    let json = r#"{"cells": [{"x": 1048576, "y": -1048576}, {"x": 1048576, "y": -1048575}]}"#;
    let snapshot: Snapshot = serde_json::from_str(json).unwrap();
    let (game, config) = snapshot.restore(&EngineConfig::default()).unwrap();
    assert_eq!(game.legal_moves(&config).len(), 1);
}
