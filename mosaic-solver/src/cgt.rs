//! Combinatorial game theory evaluation: Grundy values and bracket notation.
//!
//! Grundy values treat the position impartially: the options of a position
//! are all Left options together with all Right options. Brackets are the
//! partizan `{L | R}` form, explored to a bounded depth and rewritten to a
//! canonical name where a known pattern matches.

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use derive_more::{Display, Error};
use mosaic_core::{is_terminal, options, EngineConfig, Position, PositionKey, Side};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::stats::EvalStats;

pub const MIN_DEPTH: u32 = 1;
pub const MAX_DEPTH: u32 = 8;
pub const DEFAULT_DEPTH: u32 = 4;
pub const DEFAULT_MAX_LINES: usize = 300;

/// Text of a node cut off by the depth limit.
pub const STUB: &str = "{…|…}";

/// Errors raised by the evaluator.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display, Error)]
pub enum CgtError {
    /// The cancel flag was raised or the deadline passed.
    #[display("evaluation cancelled")]
    Cancelled,
}

/// Analysis options.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CgtConfig {
    /// Bracket depth. Always used clamped to `1..=8`, see [`CgtConfig::depth`].
    pub depth: u32,
    /// Node line budget of the rendered tree.
    pub max_lines: usize,
    /// Append `(G=n)` to rendered nodes.
    pub show_grundy: bool,
}

impl Default for CgtConfig {
    fn default() -> Self {
        CgtConfig {
            depth: DEFAULT_DEPTH,
            max_lines: DEFAULT_MAX_LINES,
            show_grundy: true,
        }
    }
}

impl CgtConfig {
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth.clamp(MIN_DEPTH, MAX_DEPTH);
        self
    }

    /// The clamped depth.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth.clamp(MIN_DEPTH, MAX_DEPTH)
    }
}

/// Minimum excludant: the smallest natural number not in `values`.
pub fn mex<'a, I: IntoIterator<Item = &'a u32>>(values: I) -> u32 {
    let present: BTreeSet<u32> = values.into_iter().copied().collect();
    let mut m = 0;
    while present.contains(&m) {
        m += 1;
    }
    m
}

/// One node of a bracket tree.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BracketNode {
    /// Canonical name (`0`, `*`, `±1`, ...) or literal `{a, b | c}`.
    pub text: String,
    /// `None` for depth stubs.
    pub grundy: Option<u32>,
    /// True if this node or any descendant was cut off by the depth limit.
    pub approximate: bool,
    /// Distinct Left options, first occurrence kept.
    pub left: Vec<Rc<BracketNode>>,
    /// Distinct Right options, first occurrence kept.
    pub right: Vec<Rc<BracketNode>>,
}

impl BracketNode {
    fn stub() -> BracketNode {
        BracketNode {
            text: STUB.to_string(),
            grundy: None,
            approximate: true,
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    fn zero() -> BracketNode {
        BracketNode {
            text: "0".to_string(),
            grundy: Some(0),
            approximate: false,
            left: Vec::new(),
            right: Vec::new(),
        }
    }
}

/// Summary of a bracket evaluation, as exported to JSON.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CgtExport {
    pub depth: u32,
    pub bracket: String,
    pub grundy: Option<u32>,
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl CgtExport {
    pub fn new(depth: u32, node: &BracketNode) -> CgtExport {
        CgtExport {
            depth,
            bracket: node.text.clone(),
            grundy: node.grundy,
            left: node.left.iter().map(|n| n.text.clone()).collect(),
            right: node.right.iter().map(|n| n.text.clone()).collect(),
        }
    }
}

// ============================================================================
// Simplifier
// ============================================================================

/// Rewrite a few small games to their canonical names.
///
/// Option lists are already deduplicated. Returns `None` when no pattern
/// matches and the literal form should be kept.
pub fn simplify(left: &[Rc<BracketNode>], right: &[Rc<BracketNode>]) -> Option<&'static str> {
    fn only<'a>(nodes: &'a [Rc<BracketNode>]) -> Option<&'a str> {
        match nodes {
            [single] => Some(single.text.as_str()),
            _ => None,
        }
    }

    let l = if left.is_empty() { Some("") } else { only(left) };
    let r = if right.is_empty() { Some("") } else { only(right) };

    match (l?, r?) {
        ("", "") => Some("0"),
        ("0", "") => Some("1"),
        ("", "0") => Some("-1"),
        ("0", "0") => Some("*"),
        ("0", "1") => Some("1/2"),
        ("1", "0") => Some("-1/2"),
        ("1", "-1") => Some("±1"),
        ("0", "*") => Some("↑"),
        ("*", "0") => Some("↓"),
        ("↑", "0") => Some("1/2"),
        _ => None,
    }
}

/// The literal `{L1, L2 | R1, R2}` form.
pub fn literal(left: &[Rc<BracketNode>], right: &[Rc<BracketNode>]) -> String {
    let join = |nodes: &[Rc<BracketNode>]| {
        nodes
            .iter()
            .map(|n| n.text.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{{{} | {}}}", join(left), join(right))
}

// ============================================================================
// Evaluator
// ============================================================================

/// Stack frame for the iterative Grundy search.
struct Frame {
    key: PositionKey,
    /// Left options followed by Right options.
    options: Vec<Position>,
    next: usize,
    values: Vec<u32>,
}

/// Memoizing CGT evaluator for positions on one board.
///
/// Memo tables live as long as the evaluator; build a new one (or seed it
/// from a fingerprinted checkpoint) whenever the board or rules change.
pub struct Evaluator {
    engine: EngineConfig,
    grundy_memo: HashMap<PositionKey, u32>,
    /// Bracket nodes with the depth they were built at.
    bracket_memo: HashMap<PositionKey, (u32, Rc<BracketNode>)>,
    cancel: Arc<AtomicBool>,
    deadline: Option<Instant>,
    log_interval_secs: u64,
    pub stats: EvalStats,
}

impl Evaluator {
    pub fn new(engine: EngineConfig) -> Self {
        Self {
            engine,
            grundy_memo: HashMap::new(),
            bracket_memo: HashMap::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            deadline: None,
            log_interval_secs: 5,
            stats: EvalStats::new(),
        }
    }

    /// Observe `flag`; raising it makes the running evaluation return
    /// [`CgtError::Cancelled`].
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_log_interval(mut self, secs: u64) -> Self {
        self.log_interval_secs = secs;
        self
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// The Grundy memo, for checkpointing.
    pub fn grundy_table(&self) -> &HashMap<PositionKey, u32> {
        &self.grundy_memo
    }

    /// Seed the Grundy memo from saved entries.
    pub fn seed_grundy<I: IntoIterator<Item = (PositionKey, u32)>>(&mut self, entries: I) {
        self.grundy_memo.extend(entries);
    }

    #[inline]
    fn check_cancel(&self) -> Result<(), CgtError> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(CgtError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(CgtError::Cancelled);
        }
        Ok(())
    }

    fn open_frame(&mut self, position: &Position, key: PositionKey) -> Frame {
        let options: Vec<Position> = Side::all()
            .flat_map(|side| options(position, side, &self.engine))
            .map(|(_, child)| child)
            .collect();
        if options.is_empty() {
            self.stats.terminal_positions += 1;
        }
        Frame {
            key,
            options,
            next: 0,
            values: Vec::new(),
        }
    }

    /// Grundy value of `position`: 0 when terminal, otherwise the mex of
    /// the values of every Left and Right option.
    ///
    /// Iterative depth-first search over an explicit stack, memoized by
    /// position key.
    pub fn grundy(&mut self, position: &Position) -> Result<u32, CgtError> {
        let root_key = position.key();
        if let Some(&g) = self.grundy_memo.get(&root_key) {
            self.stats.cache_hits += 1;
            return Ok(g);
        }

        let mut stack: Vec<Frame> = vec![self.open_frame(position, root_key)];

        loop {
            self.check_cancel()?;

            if self.stats.should_log(self.log_interval_secs) {
                self.stats.log_progress(self.grundy_memo.len());
            }

            let Some(frame) = stack.last_mut() else {
                break;
            };

            if frame.next < frame.options.len() {
                let child = std::mem::replace(
                    &mut frame.options[frame.next],
                    Position::new(Default::default()),
                );
                frame.next += 1;
                let key = child.key();
                if let Some(&g) = self.grundy_memo.get(&key) {
                    self.stats.cache_hits += 1;
                    frame.values.push(g);
                    continue;
                }
                let child_frame = self.open_frame(&child, key);
                stack.push(child_frame);
                self.stats.max_depth = self.stats.max_depth.max(stack.len() as u64);
            } else {
                let Some(done) = stack.pop() else {
                    break;
                };
                let g = mex(&done.values);
                self.grundy_memo.insert(done.key, g);
                self.stats.positions_evaluated += 1;
                match stack.last_mut() {
                    Some(parent) => parent.values.push(g),
                    None => return Ok(g),
                }
            }
        }

        // The stack only empties through the return above.
        Err(CgtError::Cancelled)
    }

    /// Bracket tree of `position` explored `depth` plies deep.
    ///
    /// `depth` 0 yields an approximate stub. A memoized node is reused when
    /// it is exact or was built at the same depth.
    pub fn bracket(
        &mut self,
        position: &Position,
        depth: u32,
    ) -> Result<Rc<BracketNode>, CgtError> {
        self.check_cancel()?;

        if depth == 0 {
            self.stats.depth_stubs += 1;
            return Ok(Rc::new(BracketNode::stub()));
        }

        let key = position.key();
        if let Some((built_at, node)) = self.bracket_memo.get(&key) {
            if !node.approximate || *built_at == depth {
                self.stats.cache_hits += 1;
                return Ok(Rc::clone(node));
            }
        }

        if is_terminal(position, &self.engine) {
            let node = Rc::new(BracketNode::zero());
            self.grundy_memo.insert(key.clone(), 0);
            self.bracket_memo.insert(key, (depth, Rc::clone(&node)));
            return Ok(node);
        }

        let left = self.side_nodes(position, Side::Left, depth - 1)?;
        let right = self.side_nodes(position, Side::Right, depth - 1)?;

        let text = match simplify(&left, &right) {
            Some(name) => name.to_string(),
            None => literal(&left, &right),
        };
        let approximate = left.iter().chain(&right).any(|n| n.approximate);
        let grundy = Some(self.grundy(position)?);

        let node = Rc::new(BracketNode {
            text,
            grundy,
            approximate,
            left,
            right,
        });
        self.bracket_memo.insert(key, (depth, Rc::clone(&node)));
        Ok(node)
    }

    /// Bracket nodes of every `side` option, deduplicated by text. The first
    /// option in move order wins, so its subtree and Grundy value are shown.
    fn side_nodes(
        &mut self,
        position: &Position,
        side: Side,
        depth: u32,
    ) -> Result<Vec<Rc<BracketNode>>, CgtError> {
        let mut nodes: Vec<Rc<BracketNode>> = Vec::new();
        for (_, child) in options(position, side, &self.engine) {
            let node = self.bracket(&child, depth)?;
            if !nodes.iter().any(|n| n.text == node.text) {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    /// Evaluate `position` at the configured (clamped) depth.
    #[instrument(
        level = "info",
        skip(self, position, config),
        fields(depth = config.depth(), cells = position.board().len())
    )]
    pub fn analyze(
        &mut self,
        position: &Position,
        config: &CgtConfig,
    ) -> Result<Rc<BracketNode>, CgtError> {
        let start = Instant::now();
        let node = self.bracket(position, config.depth())?;
        debug!(
            memo = self.grundy_memo.len(),
            brackets = self.bracket_memo.len(),
            "memo sizes"
        );
        info!(
            bracket = %node.text,
            grundy = ?node.grundy,
            approximate = node.approximate,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analysis complete"
        );
        Ok(node)
    }
}
