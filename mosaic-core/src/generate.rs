//! Random board generation.

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use crate::board::{Board, Cell};

/// Largest board the generator will build.
pub const MAX_POLYOMINO: usize = 400;

/// Size range used by [`random_board`].
pub const RANDOM_SIZE_MIN: usize = 12;
pub const RANDOM_SIZE_MAX: usize = 20;

/// Grow a connected polyomino of `size` cells (clamped to `1..=400`).
///
/// Starts at (0, 0); each step picks a random grown cell and a random
/// direction, keeping the neighbour if it is new. The result is shifted so
/// its bounds start at the origin.
pub fn generate_polyomino<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Board {
    let size = size.clamp(1, MAX_POLYOMINO);
    let origin = Cell::new(0, 0);
    let mut board = Board::from_cells([origin]);
    let mut frontier = vec![origin];

    while board.len() < size {
        let Some(&base) = frontier.choose(rng) else {
            break;
        };
        let dirs = base.neighbors();
        let Some(&next) = dirs.choose(rng) else {
            break;
        };
        if !board.contains(next) {
            // Adjacent to `base`, so this never disconnects.
            if board.add_cell(next).is_ok() {
                frontier.push(next);
            }
        }
    }

    board.normalize_origin();
    debug!(size = board.len(), "generated polyomino");
    board
}

/// A polyomino with a random size in `12..=20`, as used for a fresh game.
pub fn random_board<R: Rng + ?Sized>(rng: &mut R) -> Board {
    let size = rng.random_range(RANDOM_SIZE_MIN..=RANDOM_SIZE_MAX);
    generate_polyomino(size, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_size_and_connectivity() {
        let mut rng = StdRng::seed_from_u64(0xB0A2D);
        for size in [1, 2, 5, 16, 60] {
            let board = generate_polyomino(size, &mut rng);
            assert_eq!(board.len(), size);
            assert!(board.is_connected());
            let b = board.bounds().unwrap();
            assert_eq!((b.min_x, b.min_y), (0, 0));
        }
    }

    #[test]
    fn test_size_clamped() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(generate_polyomino(0, &mut rng).len(), 1);
        assert_eq!(generate_polyomino(10_000, &mut rng).len(), MAX_POLYOMINO);
    }

    #[test]
    fn test_random_board_size_range() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            let board = random_board(&mut rng);
            assert!((RANDOM_SIZE_MIN..=RANDOM_SIZE_MAX).contains(&board.len()));
            assert!(board.is_connected());
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = generate_polyomino(30, &mut StdRng::seed_from_u64(5));
        let b = generate_polyomino(30, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
