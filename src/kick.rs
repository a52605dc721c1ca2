//! Wall kick data
//!
//! When a rotation would collide, the rotated footprint is nudged sideways
//! and retried. Offsets are tried in order; the first valid one wins.

use crate::board::Matrix;
use crate::piece::Block;

/// Horizontal offsets to try: in place, kick right, kick left
pub const WALL_KICKS: [i32; 3] = [0, 1, -1];

/// First kicked placement of `rotated` that fits the matrix
pub fn first_valid_kick(rotated: &[Block; 4], matrix: &Matrix) -> Option<[Block; 4]> {
    WALL_KICKS.iter().find_map(|&dx| {
        let kicked = rotated.clone().map(|block| block.shifted(dx, 0));
        matrix.is_valid(&kicked).then_some(kicked)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Position;
    use crate::settings::Settings;
    use crate::tetromino::Style;

    fn row(xs: [i32; 4], y: i32) -> [Block; 4] {
        xs.map(|x| Block::new(format!("k{x}"), Position::new(x, y), Style::Blue, (20.0, 20.0)))
    }

    #[test]
    fn test_first_kick_is_identity() {
        assert_eq!(WALL_KICKS[0], 0);
        let matrix = Matrix::empty(&Settings::default());
        let blocks = row([3, 4, 5, 6], 5);
        assert_eq!(first_valid_kick(&blocks, &matrix), Some(blocks));
    }

    #[test]
    fn test_kicks_right_off_left_wall() {
        let matrix = Matrix::empty(&Settings::default());
        let kicked = first_valid_kick(&row([-1, 0, 1, 2], 5), &matrix).unwrap();
        assert_eq!(kicked[0].position.x, 0);
    }

    #[test]
    fn test_kicks_left_off_right_wall() {
        let matrix = Matrix::empty(&Settings::default());
        let kicked = first_valid_kick(&row([7, 8, 9, 10], 5), &matrix).unwrap();
        assert_eq!(kicked[3].position.x, 9);
    }

    #[test]
    fn test_right_kick_wins_when_both_fit() {
        let settings = Settings::default();
        let matrix = Matrix::rebuild(
            &[Block::new("wall".to_string(), Position::new(5, 4), Style::Red, (20.0, 20.0))],
            &settings,
        );
        let column: [Block; 4] = std::array::from_fn(|y| {
            Block::new(format!("c{y}"), Position::new(5, 3 + y as i32), Style::Blue, (20.0, 20.0))
        });
        assert!(!matrix.is_valid(&column));

        let kicked = first_valid_kick(&column, &matrix).unwrap();
        assert!(kicked.iter().all(|block| block.position.x == 6));
    }

    #[test]
    fn test_no_kick_when_both_sides_blocked() {
        let matrix = Matrix::empty(&Settings::default());
        // Too far out for a single-column nudge
        assert_eq!(first_valid_kick(&row([8, 9, 10, 11], 5), &matrix), None);
    }
}
