//! Command-line interface for the `mosaic` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mosaic_core::{Cell, Side};

/// Mosaic Mayhem - Domineering on polyomino boards, with CGT analysis
#[derive(Parser, Debug)]
#[command(name = "mosaic")]
#[command(about = "Play, simulate and analyze Domineering on polyomino boards", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML settings file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable the all-small 1x1 fallback
    #[arg(long, global = true)]
    pub all_small: bool,

    /// Block exhausted top rows so play continues below them
    #[arg(long, global = true)]
    pub row_retirement: bool,

    /// Anchor moves on the single global top row instead of per region
    #[arg(long, global = true)]
    pub global_top: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Where the starting position comes from.
#[derive(Args, Debug, Clone)]
pub struct Source {
    /// Load a snapshot JSON file
    #[arg(long, conflicts_with_all = ["rect", "size"])]
    pub state: Option<PathBuf>,

    /// Rectangular board, e.g. `4x3`
    #[arg(long, value_parser = parse_rect, conflicts_with = "size")]
    pub rect: Option<(i32, i32)>,

    /// Random polyomino with this many cells (random 12-20 when no source is given)
    #[arg(long)]
    pub size: Option<usize>,

    /// RNG seed for board generation and playouts
    #[arg(long)]
    pub seed: Option<u64>,

    /// Side to move (ignored for snapshots, which carry their own)
    #[arg(long, default_value = "left", value_parser = parse_side)]
    pub mover: Side,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the board and the legal moves of the side to act
    Moves {
        #[command(flatten)]
        source: Source,
    },

    /// Play moves anchored at the given cells, alternating sides
    Play {
        #[command(flatten)]
        source: Source,

        /// Anchor cells as `x,y`, applied in order
        #[arg(value_parser = parse_cell)]
        cells: Vec<Cell>,

        /// Write the resulting snapshot here
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Estimate outcomes with random playouts
    Explore {
        #[command(flatten)]
        source: Source,

        /// Number of playouts (overrides settings)
        #[arg(short, long)]
        repeats: Option<u32>,
    },

    /// Compute the bracket tree and Grundy value
    Analyze {
        #[command(flatten)]
        source: Source,

        /// Bracket depth, clamped to 1-8 (overrides settings)
        #[arg(short, long)]
        depth: Option<u32>,

        /// Node line budget for the printed tree
        #[arg(long)]
        max_lines: Option<usize>,

        /// Omit `(G=n)` annotations
        #[arg(long)]
        no_grundy: bool,

        /// Print the export payload as JSON instead of the tree
        #[arg(long)]
        json: bool,

        /// Grundy memo checkpoint to seed from and save to
        #[arg(long)]
        memo: Option<PathBuf>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Generate a random polyomino and print it as snapshot JSON
    Generate {
        /// Number of cells, clamped to 1-400 (random 12-20 when omitted)
        #[arg(long)]
        size: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_pair(s: &str, sep: char) -> Result<(i32, i32), String> {
    let (a, b) = s
        .split_once(sep)
        .ok_or_else(|| format!("expected two numbers separated by '{}'", sep))?;
    let a = a.trim().parse().map_err(|e| format!("{}: {}", a, e))?;
    let b = b.trim().parse().map_err(|e| format!("{}: {}", b, e))?;
    Ok((a, b))
}

fn parse_rect(s: &str) -> Result<(i32, i32), String> {
    let (w, h) = parse_pair(&s.to_ascii_lowercase(), 'x')?;
    if w < 1 || h < 1 {
        return Err("width and height must be at least 1".to_string());
    }
    Ok((w, h))
}

fn parse_cell(s: &str) -> Result<Cell, String> {
    parse_pair(s, ',').map(|(x, y)| Cell::new(x, y))
}

fn parse_side(s: &str) -> Result<Side, String> {
    match s.to_ascii_lowercase().as_str() {
        "left" | "l" => Ok(Side::Left),
        "right" | "r" => Ok(Side::Right),
        other => Err(format!("unknown side '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parsers() {
        assert_eq!(parse_rect("4x3"), Ok((4, 3)));
        assert_eq!(parse_rect("2X5"), Ok((2, 5)));
        assert!(parse_rect("0x3").is_err());
        assert_eq!(parse_cell("3,-1"), Ok(Cell::new(3, -1)));
        assert!(parse_cell("3").is_err());
        assert_eq!(parse_side("R"), Ok(Side::Right));
        assert!(parse_side("up").is_err());
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "mosaic", "--all-small", "analyze", "--rect", "2x2", "-d", "6", "--json",
        ])
        .unwrap();
        assert!(cli.all_small);
        match cli.command {
            Command::Analyze {
                source, depth, json, ..
            } => {
                assert_eq!(source.rect, Some((2, 2)));
                assert_eq!(depth, Some(6));
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_play_cells() {
        let cli = Cli::try_parse_from(["mosaic", "play", "--rect", "3x3", "0,0", "1,0"]).unwrap();
        match cli.command {
            Command::Play { cells, .. } => {
                assert_eq!(cells, vec![Cell::new(0, 0), Cell::new(1, 0)]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
