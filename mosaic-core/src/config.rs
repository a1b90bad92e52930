//! Rule switches threaded through every engine call.

use serde::{Deserialize, Serialize};

/// Which row(s) moves may be anchored on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ruleset {
    /// Each empty region plays at its own topmost row.
    #[default]
    PerComponentTop,
    /// Every move sits on the single topmost row holding an empty cell.
    GlobalTop,
}

/// Engine configuration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// A side with no domino move may place a 1x1 piece instead.
    pub all_small: bool,
    /// Block an exhausted top row so play continues below it.
    pub row_retirement: bool,
    pub ruleset: Ruleset,
}

impl EngineConfig {
    pub fn with_all_small(mut self, on: bool) -> Self {
        self.all_small = on;
        self
    }

    pub fn with_row_retirement(mut self, on: bool) -> Self {
        self.row_retirement = on;
        self
    }

    pub fn with_ruleset(mut self, ruleset: Ruleset) -> Self {
        self.ruleset = ruleset;
        self
    }
}
