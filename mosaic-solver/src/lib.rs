//! Combinatorial game analysis for Mosaic Mayhem positions.
//!
//! The [`Evaluator`] computes Grundy values and depth-limited bracket trees
//! over the legal moves defined in `mosaic-core`; [`render_tree`] prints
//! them and [`Checkpoint`] persists the Grundy memo between runs.

pub mod cgt;
pub mod checkpoint;
pub mod render;
pub mod settings;
pub mod stats;

pub use cgt::{mex, simplify, BracketNode, CgtConfig, CgtError, CgtExport, Evaluator};
pub use checkpoint::{fingerprint, Checkpoint};
pub use render::render_tree;
pub use settings::{ExploreSettings, Settings, SettingsError};
pub use stats::EvalStats;
