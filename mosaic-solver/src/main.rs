//! Mosaic Mayhem command-line front end.
//!
//! Plays, simulates and analyzes Domineering positions on polyomino boards.

mod cli;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use mosaic_core::{
    explore, generate_polyomino, random_board, Board, EngineConfig, GameState, Position, Ruleset,
    Side, Snapshot,
};
use mosaic_solver::{
    fingerprint, render_tree, CgtError, CgtExport, Checkpoint, Evaluator, Settings,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, Source};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    if cli.all_small {
        settings.engine.all_small = true;
    }
    if cli.row_retirement {
        settings.engine.row_retirement = true;
    }
    if cli.global_top {
        settings.engine.ruleset = Ruleset::GlobalTop;
    }

    match cli.command {
        Command::Moves { source } => run_moves(&source, &settings),
        Command::Play {
            source,
            cells,
            export,
        } => run_play(&source, &cells, export.as_deref(), &settings),
        Command::Explore { source, repeats } => run_explore(&source, repeats, &settings),
        Command::Analyze {
            source,
            depth,
            max_lines,
            no_grundy,
            json,
            memo,
            timeout_secs,
        } => {
            let mut cgt = settings.cgt;
            if let Some(depth) = depth {
                cgt = cgt.with_depth(depth);
            }
            if let Some(max_lines) = max_lines {
                cgt.max_lines = max_lines;
            }
            if no_grundy {
                cgt.show_grundy = false;
            }
            settings.cgt = cgt;
            run_analyze(&source, json, memo.as_deref(), timeout_secs, &settings)
        }
        Command::Generate { size, seed, out } => {
            run_generate(size, seed, out.as_deref(), &settings)
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Build the starting game from a snapshot, rectangle, or random board.
fn load_game(source: &Source, engine: &EngineConfig) -> Result<(GameState, EngineConfig)> {
    if let Some(path) = &source.state {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&text)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;
        let (game, mut restored) = snapshot.restore(engine)?;
        // Command-line switches win over the snapshot flag.
        restored.all_small |= engine.all_small;
        info!(path = %path.display(), cells = game.position().board().len(), "snapshot loaded");
        return Ok((game.with_mover(game.mover(), &restored), restored));
    }

    let board = match (source.rect, source.size) {
        (Some((w, h)), _) => Board::rectangle(w, h),
        (None, Some(size)) => generate_polyomino(size, &mut make_rng(source.seed)),
        (None, None) => random_board(&mut make_rng(source.seed)),
    };
    Ok((GameState::new(Position::new(board), source.mover, engine), *engine))
}

fn print_state(game: &GameState) {
    print!("{}", game.position());
    match game.winner() {
        Some(winner) => println!("Game over: {} cannot move, {} wins", game.mover(), winner),
        None => println!("{} to move", game.mover()),
    }
    if !game.retired_rows().is_empty() {
        println!("Retired rows: {:?}", game.retired_rows());
    }
}

fn run_moves(source: &Source, settings: &Settings) -> Result<()> {
    let (game, engine) = load_game(source, &settings.engine)?;
    print_state(&game);
    let moves = game.legal_moves(&engine);
    println!("{} legal move(s):", moves.len());
    for mv in moves {
        println!("  {}", mv);
    }
    Ok(())
}

fn run_play(
    source: &Source,
    cells: &[mosaic_core::Cell],
    export: Option<&Path>,
    settings: &Settings,
) -> Result<()> {
    let (mut game, engine) = load_game(source, &settings.engine)?;
    for &cell in cells {
        let mover = game.mover();
        game = game
            .play_at(cell, &engine)
            .with_context(|| format!("{} playing at {}", mover, cell))?;
    }
    print_state(&game);

    if let Some(path) = export {
        let json = serde_json::to_string_pretty(&Snapshot::capture(&game, &engine))?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "snapshot written");
    }
    Ok(())
}

fn run_explore(source: &Source, repeats: Option<u32>, settings: &Settings) -> Result<()> {
    let (game, engine) = load_game(source, &settings.engine)?;
    let repeats = repeats.unwrap_or(settings.explore.repeats);
    let mut rng = make_rng(source.seed);

    print_state(&game);
    let summary = explore(game.position(), game.mover(), &engine, repeats, &mut rng);
    println!("Runs: {}", summary.runs);
    println!(
        "Left wins: {} ({:.1}%)",
        summary.left_wins,
        100.0 * summary.win_rate(Side::Left)
    );
    println!(
        "Right wins: {} ({:.1}%)",
        summary.right_wins,
        100.0 * summary.win_rate(Side::Right)
    );
    println!("Average empties left: {:.2}", summary.average_empties());
    Ok(())
}

fn run_analyze(
    source: &Source,
    json: bool,
    memo: Option<&Path>,
    timeout_secs: Option<u64>,
    settings: &Settings,
) -> Result<()> {
    let (game, engine) = load_game(source, &settings.engine)?;
    let position = game.position();
    let cgt = settings.cgt;

    // Set up SIGINT handler for graceful cancellation
    let cancel = Arc::new(AtomicBool::new(false));
    let c = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, cancelling analysis...");
        c.store(true, Ordering::SeqCst);
    })
    .context("installing Ctrl-C handler")?;

    let mut evaluator = Evaluator::new(engine).with_cancel(cancel);
    if let Some(secs) = timeout_secs {
        evaluator = evaluator.with_timeout(Duration::from_secs(secs));
    }

    let fp = fingerprint(position.board(), &engine);
    if let Some(path) = memo.filter(|p| p.exists()) {
        let start = Instant::now();
        match Checkpoint::load_for(path, fp) {
            Ok(checkpoint) => {
                let count = checkpoint.entries.len();
                evaluator.seed_grundy(checkpoint.entries);
                info!(
                    count,
                    secs = start.elapsed().as_secs_f64(),
                    "memo checkpoint loaded"
                );
            }
            Err(e) => warn!(error = %e, "ignoring memo checkpoint, starting fresh"),
        }
    }

    let result = evaluator.analyze(position, &cgt);

    if let Some(path) = memo {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let count = Checkpoint::save(path, fp, evaluator.grundy_table())
            .with_context(|| format!("saving memo checkpoint {}", path.display()))?;
        info!(count, path = %path.display(), "memo checkpoint saved");
    }

    let node = match result {
        Ok(node) => node,
        Err(CgtError::Cancelled) => {
            evaluator.stats.print_summary();
            bail!("analysis cancelled before completion");
        }
    };

    if json {
        let export = CgtExport::new(cgt.depth(), &node);
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    print_state(&game);
    println!();
    print!("{}", render_tree(&node, cgt.max_lines, cgt.show_grundy));
    println!();
    match node.grundy {
        Some(g) => println!("Grundy value: {}", g),
        None => println!("Grundy value: unknown"),
    }
    if node.approximate {
        println!("(approximate: depth {} reached before the game ended)", cgt.depth());
    }
    println!();
    evaluator.stats.print_summary();
    Ok(())
}

fn run_generate(
    size: Option<usize>,
    seed: Option<u64>,
    out: Option<&Path>,
    settings: &Settings,
) -> Result<()> {
    let mut rng = make_rng(seed);
    let board = match size {
        Some(size) => generate_polyomino(size, &mut rng),
        None => random_board(&mut rng),
    };
    info!(cells = board.len(), "board generated");

    let game = GameState::new(Position::new(board), Side::Left, &settings.engine);
    let json = serde_json::to_string_pretty(&Snapshot::capture(&game, &settings.engine))?;
    match out {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?
        }
        None => println!("{}", json),
    }
    Ok(())
}
