//! WASM bindings for mosaic-core
//!
//! Provides a JavaScript-friendly API for the game logic. State crosses the
//! boundary in the snapshot JSON shape (see [`crate::Snapshot`]).

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use crate::{
    generate_polyomino, Board, Cell, EngineConfig, GameState, Move, MoveKind, Phase, Position,
    Side, Snapshot,
};

/// WASM-friendly wrapper around a game in progress
#[wasm_bindgen]
pub struct WasmGame {
    inner: GameState,
    config: EngineConfig,
}

#[wasm_bindgen]
impl WasmGame {
    /// Start on a `width` x `height` rectangle, Left to move
    #[wasm_bindgen(constructor)]
    pub fn new(width: i32, height: i32, all_small: bool) -> WasmGame {
        let config = EngineConfig::default().with_all_small(all_small);
        let position = Position::new(Board::rectangle(width, height));
        WasmGame {
            inner: GameState::new(position, Side::Left, &config),
            config,
        }
    }

    /// Start on a random polyomino of `size` cells
    pub fn generate(size: usize, seed: u64, all_small: bool) -> WasmGame {
        let config = EngineConfig::default().with_all_small(all_small);
        let mut rng = StdRng::seed_from_u64(seed);
        let position = Position::new(generate_polyomino(size, &mut rng));
        WasmGame {
            inner: GameState::new(position, Side::Left, &config),
            config,
        }
    }

    /// Restore from snapshot JSON
    #[wasm_bindgen(js_name = fromSnapshot)]
    pub fn from_snapshot(value: JsValue) -> Result<WasmGame, JsValue> {
        let snapshot: Snapshot = serde_wasm_bindgen::from_value(value)?;
        let (inner, config) = snapshot
            .restore(&EngineConfig::default())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmGame { inner, config })
    }

    /// Export as snapshot JSON
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = Snapshot::capture(&self.inner, &self.config);
        Ok(serde_wasm_bindgen::to_value(&snapshot)?)
    }

    /// Side to move: "Left" or "Right"
    pub fn mover(&self) -> String {
        self.inner.mover().to_string()
    }

    /// Mark code at (x, y), or 255 when the cell is not on the board
    pub fn mark(&self, x: i32, y: i32) -> u8 {
        self.inner
            .position()
            .mark(Cell::new(x, y))
            .map_or(u8::MAX, u8::from)
    }

    /// Get legal moves as JSON array
    /// Each move is { x, y, kind: "vertical" | "horizontal" | "small" }
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Result<JsValue, JsValue> {
        let moves: Vec<WasmMove> = self
            .inner
            .legal_moves(&self.config)
            .into_iter()
            .map(WasmMove::from)
            .collect();
        Ok(serde_wasm_bindgen::to_value(&moves)?)
    }

    /// Play the mover's move anchored at (x, y). Returns true if successful.
    #[wasm_bindgen(js_name = playAt)]
    pub fn play_at(&mut self, x: i32, y: i32) -> bool {
        match self.inner.play_at(Cell::new(x, y), &self.config) {
            Ok(next) => {
                self.inner = next;
                true
            }
            Err(_) => false,
        }
    }

    #[wasm_bindgen(js_name = isTerminal)]
    pub fn is_terminal(&self) -> bool {
        self.inner.is_terminal()
    }

    /// Get game result: "ongoing", "left_wins" or "right_wins"
    pub fn result(&self) -> String {
        match self.inner.phase() {
            Phase::InProgress => "ongoing".to_string(),
            Phase::Terminal { stuck: Side::Left } => "right_wins".to_string(),
            Phase::Terminal { stuck: Side::Right } => "left_wins".to_string(),
        }
    }
}

/// Serializable move for JavaScript
#[derive(serde::Serialize)]
struct WasmMove {
    x: i32,
    y: i32,
    kind: &'static str,
}

impl From<Move> for WasmMove {
    fn from(mv: Move) -> Self {
        let kind = match mv.kind {
            MoveKind::Vertical => "vertical",
            MoveKind::Horizontal => "horizontal",
            MoveKind::Small => "small",
        };
        WasmMove {
            x: mv.anchor.x,
            y: mv.anchor.y,
            kind,
        }
    }
}
