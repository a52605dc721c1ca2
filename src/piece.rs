//! Grid positions, blocks and tetromino shapes
//!
//! All of these are immutable values: moving or rotating a shape builds a
//! new one and leaves the original untouched.

use crate::tetromino::{Rotation, Style, TetrominoType};
use serde::{Deserialize, Serialize};

/// Marker prepended to block ids whenever a shape is re-centered
pub const SWAPPED_PREFIX: &str = "swapped";

/// A (column, row) coordinate in the grid, row 0 being the top visible row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A single unit cell. The id stays fixed for the block's whole life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub width: f32,
    pub height: f32,
    pub position: Position,
    pub style: Style,
}

impl Block {
    pub fn new(id: String, position: Position, style: Style, size: (f32, f32)) -> Self {
        Self {
            id,
            width: size.0,
            height: size.1,
            position,
            style,
        }
    }

    /// Same block at another position
    pub fn moved_to(&self, position: Position) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }

    /// Same block shifted by (dx, dy)
    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        self.moved_to(self.position.offset(dx, dy))
    }
}

/// A four-block tetromino
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: TetrominoType,
    pub blocks: [Block; 4],
    pub center: Position,
    pub rotation: Rotation,
    /// Fall steps left before a grounded shape locks; `<= 0` means exhausted
    pub land_delay: i32,
    /// Set once the shape came out of the hold slot during its lifetime
    pub swapped: bool,
}

impl Shape {
    /// Construct a fresh shape at `at`, with block ids `obj_id..obj_id + 4`
    pub fn spawn(
        kind: TetrominoType,
        at: Position,
        obj_id: u64,
        land_delay: i32,
        block_size: (f32, f32),
    ) -> Self {
        let ((cx, cy), offsets) = kind.spawn_layout();
        let blocks = std::array::from_fn(|index| {
            let (dx, dy) = offsets[index];
            Block::new(
                format!("{}{}", kind.id_prefix(), obj_id + index as u64),
                at.offset(dx, dy),
                kind.style(),
                block_size,
            )
        });

        Self {
            kind,
            blocks,
            center: at.offset(cx, cy),
            rotation: Rotation::North,
            land_delay,
            swapped: false,
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.blocks.iter().map(|block| block.position)
    }

    /// Blocks laid out around the current center at `rotation`
    pub fn layout(&self, rotation: Rotation) -> [Block; 4] {
        let offsets = self.kind.offsets(rotation);
        std::array::from_fn(|index| {
            let (dx, dy) = offsets[index];
            self.blocks[index].moved_to(self.center.offset(dx, dy))
        })
    }

    /// Shape shifted by (dx, dy), center included
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            blocks: self.blocks.clone().map(|block| block.shifted(dx, dy)),
            center: self.center.offset(dx, dy),
            ..self.clone()
        }
    }

    /// Move to a new center in rotation 0 with freshly prefixed ids
    pub fn recentered(&self, center: Position, swapped: bool, land_delay: i32) -> Self {
        let offsets = self.kind.offsets(Rotation::North);
        let blocks = std::array::from_fn(|index| {
            let (dx, dy) = offsets[index];
            let block = &self.blocks[index];
            Block {
                id: format!("{SWAPPED_PREFIX}{}", block.id),
                position: center.offset(dx, dy),
                ..block.clone()
            }
        });

        Self {
            kind: self.kind,
            blocks,
            center,
            rotation: Rotation::North,
            land_delay,
            swapped,
        }
    }
}
