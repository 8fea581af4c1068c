use crate::{
    common::{ColorCode, ENCODED_TILE_LEN, TILE_HEIGHT, TILE_WIDTH},
    error::ConvertError,
    grid::Tile,
    palette::{ColorCodeMap, FallbackStats},
};

pub type CodeGrid = [[ColorCode; TILE_WIDTH]; TILE_HEIGHT];

// Per row: low bitplane byte, then high bitplane byte. Column 0 is the MSB.
pub type EncodedTile = [u8; ENCODED_TILE_LEN];

pub fn map_tile(
    tile: &Tile,
    code_map: &ColorCodeMap,
    stats: &mut FallbackStats,
) -> Result<CodeGrid, ConvertError> {
    let mut codes: CodeGrid = [[0; TILE_WIDTH]; TILE_HEIGHT];
    for y in 0..TILE_HEIGHT {
        for x in 0..TILE_WIDTH {
            codes[y][x] = code_map.resolve(tile.pixels[y][x], stats)?;
        }
    }
    Ok(codes)
}

pub fn encode_codes(codes: &CodeGrid) -> EncodedTile {
    let mut out: EncodedTile = [0; ENCODED_TILE_LEN];
    for y in 0..TILE_HEIGHT {
        let mut lo = 0u8;
        let mut hi = 0u8;
        for x in 0..TILE_WIDTH {
            let c = codes[y][x];
            lo |= (c & 1) << (7 - x);
            hi |= ((c >> 1) & 1) << (7 - x);
        }
        out[y * 2] = lo;
        out[y * 2 + 1] = hi;
    }
    out
}

pub fn decode_tile(data: &EncodedTile) -> CodeGrid {
    let mut codes: CodeGrid = [[0; TILE_WIDTH]; TILE_HEIGHT];
    for y in 0..TILE_HEIGHT {
        for x in 0..TILE_WIDTH {
            let c0 = (data[y * 2] >> (7 - x)) & 1;
            let c1 = (data[y * 2 + 1] >> (7 - x)) & 1;
            codes[y][x] = c0 | (c1 << 1);
        }
    }
    codes
}

/// Encode one tile of raw pixel values. Values missing from `code_map` are
/// substituted (and recorded in `stats`) unless the map is strict.
pub fn encode_tile(
    tile: &Tile,
    code_map: &ColorCodeMap,
    stats: &mut FallbackStats,
) -> Result<EncodedTile, ConvertError> {
    Ok(encode_codes(&map_tile(tile, code_map, stats)?))
}
