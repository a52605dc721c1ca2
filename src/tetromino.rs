//! Tetromino definitions and shapes
//!
//! All 7 tetrominoes with their hand-authored rotation tables. Offsets are
//! (dx, dy) from the shape's center, with y increasing downward.

use serde::{Deserialize, Serialize};

/// Offsets of the four blocks for one rotation state
pub type Offsets = [(i32, i32); 4];

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrominoType {
    J,
    L,
    S,
    I, // straight
    T,
    Z,
    O, // square
}

/// Render style tag carried by every block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Orange,
    Blue,
    Green,
    LightBlue,
    Purple,
    Red,
    Yellow,
}

impl Style {
    /// CSS colour name
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Orange => "orange",
            Style::Blue => "blue",
            Style::Green => "green",
            Style::LightBlue => "lightblue",
            Style::Purple => "purple",
            Style::Red => "red",
            Style::Yellow => "yellow",
        }
    }
}

impl TetrominoType {
    /// Constructor order used by the seeded selector
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::J,
            TetrominoType::L,
            TetrominoType::S,
            TetrominoType::I,
            TetrominoType::T,
            TetrominoType::Z,
            TetrominoType::O,
        ]
    }

    /// Get the style for this tetromino
    pub fn style(&self) -> Style {
        match self {
            TetrominoType::J => Style::Orange,
            TetrominoType::L => Style::Blue,
            TetrominoType::S => Style::Green,
            TetrominoType::I => Style::LightBlue,
            TetrominoType::T => Style::Purple,
            TetrominoType::Z => Style::Red,
            TetrominoType::O => Style::Yellow,
        }
    }

    /// Prefix for block ids of this kind
    pub fn id_prefix(&self) -> &'static str {
        match self {
            TetrominoType::J => "J",
            TetrominoType::L => "L",
            TetrominoType::S => "S",
            TetrominoType::I => "straight",
            TetrominoType::T => "T",
            TetrominoType::Z => "Z",
            TetrominoType::O => "square",
        }
    }

    /// Block offsets from the center at a given rotation
    pub fn offsets(&self, rotation: Rotation) -> Offsets {
        self.rotation_table()[rotation.index()]
    }

    /// Full rotation table, indexed by rotation state
    pub fn rotation_table(&self) -> &'static [Offsets; 4] {
        const J: [Offsets; 4] = [
            [(0, 0), (-1, 0), (1, -1), (1, 0)],
            [(0, -1), (0, 1), (0, 0), (1, 1)],
            [(0, 0), (-1, 0), (1, 0), (-1, 1)],
            [(0, 0), (0, -1), (0, 1), (-1, -1)],
        ];
        const L: [Offsets; 4] = [
            [(0, 0), (-1, -1), (1, 0), (-1, 0)],
            [(0, -1), (0, 1), (0, 0), (1, -1)],
            [(0, 0), (-1, 0), (1, 0), (1, 1)],
            [(0, 0), (0, -1), (0, 1), (-1, 1)],
        ];
        const S: [Offsets; 4] = [
            [(0, 0), (1, -1), (0, -1), (-1, 0)],
            [(1, 0), (1, 1), (0, -1), (0, 0)],
            [(0, 0), (1, 0), (0, 1), (-1, 1)],
            [(0, 0), (0, 1), (-1, 0), (-1, -1)],
        ];
        const I: [Offsets; 4] = [
            [(0, 0), (1, 0), (2, 0), (-1, 0)],
            [(1, 0), (1, -1), (1, 1), (1, 2)],
            [(0, 1), (1, 1), (2, 1), (-1, 1)],
            [(0, -1), (0, 1), (0, 2), (0, 0)],
        ];
        const T: [Offsets; 4] = [
            [(0, -1), (-1, 0), (0, 0), (1, 0)],
            [(0, -1), (0, 1), (0, 0), (1, 0)],
            [(-1, 0), (0, 1), (0, 0), (1, 0)],
            [(-1, 0), (0, 1), (0, 0), (0, -1)],
        ];
        const Z: [Offsets; 4] = [
            [(0, 0), (0, -1), (-1, -1), (1, 0)],
            [(0, 0), (0, 1), (1, 0), (1, -1)],
            [(0, 0), (-1, 0), (0, 1), (1, 1)],
            [(0, 0), (0, -1), (-1, 0), (-1, 1)],
        ];
        // The square never changes footprint
        const O: [Offsets; 4] = [[(0, -1), (1, -1), (0, 0), (1, 0)]; 4];

        match self {
            TetrominoType::J => &J,
            TetrominoType::L => &L,
            TetrominoType::S => &S,
            TetrominoType::I => &I,
            TetrominoType::T => &T,
            TetrominoType::Z => &Z,
            TetrominoType::O => &O,
        }
    }

    /// Spawn layout relative to the requested spawn position: the center
    /// offset and the four block offsets, in id order.
    ///
    /// This is the freshly constructed footprint, which is not always the
    /// rotation-0 row of the table; S and Z sit their center one row up.
    pub fn spawn_layout(&self) -> ((i32, i32), Offsets) {
        match self {
            TetrominoType::J => ((0, 0), [(1, 0), (1, -1), (-1, 0), (0, 0)]),
            TetrominoType::L => ((0, 0), [(1, 0), (-1, -1), (-1, 0), (0, 0)]),
            TetrominoType::S => ((0, -1), [(-1, 0), (1, -1), (0, 0), (0, -1)]),
            TetrominoType::I => ((0, 0), [(0, 0), (-1, 0), (1, 0), (2, 0)]),
            TetrominoType::T => ((0, 0), [(-1, 0), (1, 0), (0, 0), (0, -1)]),
            TetrominoType::Z => ((0, -1), [(1, 0), (-1, -1), (0, -1), (0, 0)]),
            TetrominoType::O => ((0, 0), [(0, 0), (1, 0), (0, -1), (1, -1)]),
        }
    }
}

/// Rotation states, advanced clockwise one quarter turn at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    North, // Spawn state
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise: North → East → South → West → North
    pub fn cw(&self) -> Rotation {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Row of the rotation table for this state
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }
}
