//! Occupancy grid and collision detection

use crate::piece::{Block, Position};
use crate::settings::Settings;

/// Occupancy grid, stored as [row][col] with `true` meaning free.
///
/// Row 0 of the storage is the top hidden row: a block at logical row `y`
/// lives in storage row `y + buffer_rows`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    cells: Vec<Vec<bool>>,
    width: i32,
    height: i32,
    buffer_rows: i32,
}

impl Matrix {
    /// A fully free grid
    pub fn new(width: i32, height: i32, buffer_rows: i32) -> Self {
        Self {
            cells: vec![vec![true; width as usize]; (height + buffer_rows) as usize],
            width,
            height,
            buffer_rows,
        }
    }

    /// A fully free grid sized by the settings
    pub fn empty(settings: &Settings) -> Self {
        Self::new(
            settings.grid.width,
            settings.grid.height,
            settings.grid.buffer_rows,
        )
    }

    /// Grid with every settled block marked occupied
    pub fn rebuild<'a>(blocks: impl IntoIterator<Item = &'a Block>, settings: &Settings) -> Self {
        let mut matrix = Self::empty(settings);
        for block in blocks {
            matrix.occupy(block.position);
        }
        matrix
    }

    fn index(&self, pos: Position) -> Option<(usize, usize)> {
        let row = pos.y + self.buffer_rows;
        if row < 0 || pos.x < 0 || pos.x >= self.width || row as usize >= self.cells.len() {
            return None;
        }
        Some((row as usize, pos.x as usize))
    }

    /// Cells above the storage count as free, cells beside or below it as taken
    pub fn is_free(&self, pos: Position) -> bool {
        match self.index(pos) {
            Some((row, col)) => self.cells[row][col],
            None => pos.y + self.buffer_rows < 0 && (0..self.width).contains(&pos.x),
        }
    }

    /// Mark a cell occupied; positions outside the storage are ignored
    fn occupy(&mut self, pos: Position) {
        if let Some((row, col)) = self.index(pos) {
            self.cells[row][col] = false;
        }
    }

    /// Whether every block is inside the columns, above the floor and on a
    /// free cell. There is no ceiling: shapes may sit above row 0.
    pub fn is_valid<'a>(&self, blocks: impl IntoIterator<Item = &'a Block>) -> bool {
        blocks.into_iter().all(|block| {
            let pos = block.position;
            pos.x >= 0 && pos.x < self.width && pos.y < self.height && self.is_free(pos)
        })
    }

    /// Whether any of the positions rests on the floor or on an occupied cell
    pub fn has_landed(&self, positions: impl IntoIterator<Item = Position>) -> bool {
        positions
            .into_iter()
            .any(|pos| pos.y + 1 >= self.height || !self.is_free(pos.offset(0, 1)))
    }

    /// Logical rows whose cells are all occupied, top to bottom
    pub fn full_rows(&self) -> Vec<i32> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|free| !free))
            .map(|(index, _)| index as i32 - self.buffer_rows)
            .collect()
    }

    /// Check if the last hidden row, directly above the visible field, holds
    /// a settled block. A grid without hidden rows never tops out.
    pub fn is_topped_out(&self) -> bool {
        usize::try_from(self.buffer_rows - 1)
            .ok()
            .and_then(|row| self.cells.get(row))
            .is_some_and(|row| row.iter().any(|free| !free))
    }

    /// Check if the grid is completely free
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|row| row.iter().all(|free| *free))
    }
}
