//! Text rendering of bracket trees.
//!
//! ```text
//! ±1 (G=0)
//! Left:
//!   1 (G=1)
//!   Left:
//!     0 (G=0)
//! Right:
//!   -1 (G=1)
//!   Right:
//!     0 (G=0)
//! ```
//!
//! Only node lines count against the budget. Once it is spent a single `...`
//! line is written at the depth where output stopped.

use std::fmt::Write;

use crate::cgt::BracketNode;

struct Renderer {
    out: String,
    lines: usize,
    max_lines: usize,
    show_grundy: bool,
    truncated: bool,
}

impl Renderer {
    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn node(&mut self, node: &BracketNode, indent: usize) {
        if self.truncated {
            return;
        }
        if self.lines >= self.max_lines {
            self.line(indent, "...");
            self.truncated = true;
            return;
        }

        let mut text = node.text.clone();
        if self.show_grundy {
            if let Some(g) = node.grundy {
                let _ = write!(text, " (G={})", g);
            }
        }
        self.line(indent, &text);
        self.lines += 1;

        for (label, kids) in [("Left:", &node.left), ("Right:", &node.right)] {
            if kids.is_empty() || self.truncated {
                continue;
            }
            self.line(indent, label);
            for kid in kids {
                self.node(kid, indent + 1);
                if self.truncated {
                    break;
                }
            }
        }
    }
}

/// Render `root` depth-first, at most `max_lines` node lines.
pub fn render_tree(root: &BracketNode, max_lines: usize, show_grundy: bool) -> String {
    let mut r = Renderer {
        out: String::new(),
        lines: 0,
        max_lines,
        show_grundy,
        truncated: false,
    };
    r.node(root, 0);
    r.out
}
