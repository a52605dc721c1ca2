//! Seeded shape selection
//!
//! Pieces are picked by a linear-congruential hash of the running block
//! counter, so the same seed always yields the same shape, ids and layout.

use crate::piece::{Position, Shape};
use crate::settings::Settings;
use crate::tetromino::TetrominoType;

const LCG_MULTIPLIER: u64 = 1_103_515_245;
const LCG_INCREMENT: u64 = 12_345;
const LCG_MODULUS: u64 = 1 << 31;

/// Hash `seed` into `0..max`
///
/// Wrapping arithmetic is exact here: 2^31 divides 2^64, so the low 31 bits
/// of the wrapped product are those of the true product.
pub fn hash(seed: u64, max: u64) -> u64 {
    let mixed = LCG_MULTIPLIER
        .wrapping_mul(seed)
        .wrapping_add(LCG_INCREMENT)
        % LCG_MODULUS;
    mixed % max
}

/// Kind selected for a given seed
pub fn kind_for_seed(seed: u64) -> TetrominoType {
    let kinds = TetrominoType::all();
    kinds[hash(seed, kinds.len() as u64) as usize]
}

/// Build the shape for `seed` at `at`, using the configured land delay and
/// block pixel size
pub fn new_shape(at: Position, seed: u64, settings: &Settings) -> Shape {
    Shape::spawn(
        kind_for_seed(seed),
        at,
        seed,
        settings.timing.land_delay,
        settings.block_size(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hash_matches_reference_values() {
        assert_eq!(hash(0, 7), 4);
        assert_eq!(hash(4, 7), 0);
        assert_eq!(hash(8, 7), 3);
        // 1103515245 * 4 + 12345 = 4414073325, minus 2 * 2^31 = 119106029
        assert_eq!(hash(4, 1 << 40), 119_106_029);
    }

    #[test]
    fn test_seed_four_spawns_j_piece() {
        let settings = Settings::default();
        let shape = new_shape(Position::new(4, -1), 4, &settings);
        assert_eq!(shape.kind, TetrominoType::J);
        let positions: Vec<_> = shape.positions().collect();
        assert_eq!(
            positions,
            [
                Position::new(5, -1),
                Position::new(5, -2),
                Position::new(3, -1),
                Position::new(4, -1),
            ]
        );
        assert_eq!(shape.blocks[0].id, "J4");
        assert_eq!(shape.blocks[3].id, "J7");
    }

    #[test]
    fn test_seed_eight_spawns_straight_piece() {
        let settings = Settings::default();
        let shape = new_shape(Position::new(4, -1), 8, &settings);
        assert_eq!(shape.kind, TetrominoType::I);
        assert_eq!(shape.blocks[0].id, "straight8");
        assert_eq!(shape.blocks[3].position, Position::new(6, -1));
    }

    #[test]
    fn test_new_shape_is_deterministic() {
        let settings = Settings::default();
        for seed in [0, 4, 8, 1_000, 123_456_789] {
            let a = new_shape(Position::new(3, 2), seed, &settings);
            let b = new_shape(Position::new(3, 2), seed, &settings);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_counter_stream_covers_every_kind() {
        // Seeds advance by 4 per shape; seven consecutive shapes see all kinds
        let kinds: HashSet<_> = (0..7).map(|n| kind_for_seed(n * 4)).collect();
        assert_eq!(kinds.len(), 7);
    }

    #[test]
    fn test_large_seeds_stay_in_range() {
        for seed in [u64::MAX, u64::MAX / 3, 1 << 50] {
            assert!(hash(seed, 7) < 7);
        }
    }
}
