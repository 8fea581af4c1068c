use serde::{Deserialize, Serialize};

use crate::common::{TileCoord, SCREEN_COLS, SCREEN_ROWS, TILE_HEIGHT, TILE_WIDTH};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionMap {
    cols: usize,
    rows: usize,
    flags: Vec<u8>, // 0 or 1, row-major
}

impl Default for CollisionMap {
    fn default() -> Self {
        Self::new(SCREEN_COLS, SCREEN_ROWS)
    }
}

impl CollisionMap {
    pub fn new(cols: usize, rows: usize) -> Self {
        CollisionMap {
            cols,
            rows,
            flags: vec![0; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn index(&self, col: TileCoord, row: TileCoord) -> Option<usize> {
        let (col, row) = (col as usize, row as usize);
        if col < self.cols && row < self.rows {
            Some(self.cols * row + col)
        } else {
            None
        }
    }

    /// Cell containing the pixel at (x, y), if any.
    pub fn cell_at_pixel(&self, x: f32, y: f32) -> Option<(TileCoord, TileCoord)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / TILE_WIDTH as f32) as usize;
        let row = (y / TILE_HEIGHT as f32) as usize;
        if col < self.cols && row < self.rows {
            Some((col as TileCoord, row as TileCoord))
        } else {
            None
        }
    }

    pub fn is_set(&self, col: TileCoord, row: TileCoord) -> bool {
        self.index(col, row).is_some_and(|i| self.flags[i] != 0)
    }

    /// Returns false if the cell is out of range.
    pub fn set(&mut self, col: TileCoord, row: TileCoord, value: bool) -> bool {
        match self.index(col, row) {
            Some(i) => {
                self.flags[i] = value as u8;
                true
            }
            None => false,
        }
    }

    pub fn toggle(&mut self, col: TileCoord, row: TileCoord) -> bool {
        let value = !self.is_set(col, row);
        self.set(col, row, value)
    }

    pub fn clear(&mut self) {
        self.flags.fill(0);
    }

    pub fn count(&self) -> usize {
        self.flags.iter().filter(|&&f| f != 0).count()
    }

    pub fn flags(&self) -> &[u8] {
        &self.flags
    }

    pub fn iter_set(&self) -> impl Iterator<Item = (TileCoord, TileCoord)> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, &f)| f != 0)
            .map(|(i, _)| ((i % self.cols) as TileCoord, (i / self.cols) as TileCoord))
    }

    /// Loaded data may have been edited by hand.
    pub fn is_consistent(&self) -> bool {
        self.flags.len() == self.cols * self.rows && self.flags.iter().all(|&f| f <= 1)
    }
}
