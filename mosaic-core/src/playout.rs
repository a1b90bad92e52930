//! Uniform-random playouts for outcome estimation ("Explore" mode).

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::position::Position;
use crate::rules::{legal_moves, Move, Side};

/// One step of a playout.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum PlayoutStep {
    Placed(Move),
    Pass(Side),
}

/// Result of a single playout.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct PlayoutResult {
    /// The side that moved last.
    pub winner: Side,
    pub remaining_empties: usize,
    pub steps: Vec<PlayoutStep>,
}

/// Play random moves from `position` until two consecutive passes or a full board.
///
/// Works on a private copy; the caller's position is never touched. A side
/// without a legal move passes. With all-small enabled the legal-move list
/// already holds the 1x1 fallback, so a pass only happens when nothing fits.
pub fn playout<R: Rng + ?Sized>(
    position: &Position,
    mover: Side,
    config: &EngineConfig,
    rng: &mut R,
) -> PlayoutResult {
    let mut pos = position.clone();
    let mut side = mover;
    let mut passes = 0;
    let mut steps = Vec::new();

    while passes < 2 && pos.empty_count() > 0 {
        let moves = legal_moves(&pos, side, config);
        match moves.choose(rng) {
            Some(&mv) => {
                pos.place(mv);
                steps.push(PlayoutStep::Placed(mv));
                passes = 0;
            }
            None => {
                steps.push(PlayoutStep::Pass(side));
                passes += 1;
            }
        }
        side = side.opponent();
    }

    PlayoutResult {
        // `side` would act next, so its opponent made the last placement.
        winner: side.opponent(),
        remaining_empties: pos.empty_count(),
        steps,
    }
}

/// Aggregate of repeated playouts.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
pub struct ExploreSummary {
    pub runs: u32,
    pub left_wins: u32,
    pub right_wins: u32,
    pub total_empties: u64,
}

impl ExploreSummary {
    pub fn record(&mut self, result: &PlayoutResult) {
        self.runs += 1;
        match result.winner {
            Side::Left => self.left_wins += 1,
            Side::Right => self.right_wins += 1,
        }
        self.total_empties += result.remaining_empties as u64;
    }

    /// Fraction of runs won by `side` (0 when no runs).
    pub fn win_rate(&self, side: Side) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        let wins = match side {
            Side::Left => self.left_wins,
            Side::Right => self.right_wins,
        };
        wins as f64 / self.runs as f64
    }

    pub fn average_empties(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.total_empties as f64 / self.runs as f64
    }
}

/// Run `repeats` independent playouts (at least one) from the same start.
#[instrument(level = "debug", skip(position, config, rng))]
pub fn explore<R: Rng + ?Sized>(
    position: &Position,
    mover: Side,
    config: &EngineConfig,
    repeats: u32,
    rng: &mut R,
) -> ExploreSummary {
    let mut summary = ExploreSummary::default();
    for _ in 0..repeats.max(1) {
        let result = playout(position, mover, config, rng);
        summary.record(&result);
    }
    debug!(
        runs = summary.runs,
        left = summary.left_wins,
        right = summary.right_wins,
        "explore finished"
    );
    summary
}
