use crate::{
    common::{PixelValue, TileCoord, TILE_HEIGHT, TILE_WIDTH},
    error::ConvertError,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Tile {
    pub pixels: [[PixelValue; TILE_WIDTH]; TILE_HEIGHT],
}

impl Tile {
    pub fn filled(value: PixelValue) -> Self {
        Tile {
            pixels: [[value; TILE_WIDTH]; TILE_HEIGHT],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<PixelValue>, // row-major
}

impl PixelGrid {
    pub fn new(width: usize, height: usize, pixels: Vec<PixelValue>) -> Result<Self, ConvertError> {
        if pixels.len() != width * height {
            return Err(ConvertError::PixelCountMismatch {
                expected: width * height,
                actual: pixels.len(),
            });
        }
        Ok(PixelGrid {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> PixelValue {
        self.pixels[y * self.width + x]
    }

    pub fn contains(&self, value: PixelValue) -> bool {
        self.pixels.contains(&value)
    }

    /// Size of the tile grid as (columns, rows). Fails unless both
    /// dimensions are whole multiples of the tile size.
    pub fn tile_dims(&self) -> Result<(usize, usize), ConvertError> {
        if self.width % TILE_WIDTH != 0 || self.height % TILE_HEIGHT != 0 {
            return Err(ConvertError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok((self.width / TILE_WIDTH, self.height / TILE_HEIGHT))
    }

    pub fn tile_at(&self, row: TileCoord, col: TileCoord) -> Tile {
        let mut tile = Tile::default();
        let x0 = col as usize * TILE_WIDTH;
        let y0 = row as usize * TILE_HEIGHT;
        for y in 0..TILE_HEIGHT {
            let start = (y0 + y) * self.width + x0;
            tile.pixels[y].copy_from_slice(&self.pixels[start..start + TILE_WIDTH]);
        }
        tile
    }

    /// All tiles in row-major cell order: cell `i` sits at row `i / stride`,
    /// column `i % stride`.
    pub fn tiles(&self) -> Result<Vec<Tile>, ConvertError> {
        let (stride, rows) = self.tile_dims()?;
        let mut tiles = Vec::with_capacity(stride * rows);
        for i in 0..stride * rows {
            tiles.push(self.tile_at((i / stride) as TileCoord, (i % stride) as TileCoord));
        }
        Ok(tiles)
    }
}
