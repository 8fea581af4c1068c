pub type PixelValue = u16; // RGB sum (0-765) or palette index
pub type ColorCode = u8; // Hardware 2-bit color code (0-3)
pub type Utid = usize; // Index into the unique tile set
pub type TileCoord = u16; // Tile-grid row or column

pub const TILE_WIDTH: usize = 8;
pub const TILE_HEIGHT: usize = 8;
pub const TILE_PIXELS: usize = TILE_WIDTH * TILE_HEIGHT;

// Two bitplane bytes per tile row.
pub const ENCODED_TILE_LEN: usize = TILE_HEIGHT * 2;

// Visible screen area, in tiles.
pub const SCREEN_COLS: usize = 20;
pub const SCREEN_ROWS: usize = 18;
