use hashbrown::{hash_map::Entry, HashMap};
use log::debug;

use crate::{
    codec::encode_tile,
    common::{Utid, ENCODED_TILE_LEN},
    error::ConvertError,
    grid::{PixelGrid, Tile},
    palette::{ColorCodeMap, FallbackStats},
};

/// Pixel-distinct tiles, indexed by utid in first-occurrence order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniqueTileSet {
    tiles: Vec<Tile>,
}

impl UniqueTileSet {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, utid: Utid) -> Option<&Tile> {
        self.tiles.get(utid)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

/// One utid per tile-grid cell, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileIndexMap {
    stride: usize,
    rows: usize,
    utids: Vec<Utid>,
}

impl TileIndexMap {
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn utids(&self) -> &[Utid] {
        &self.utids
    }

    pub fn get(&self, row: usize, col: usize) -> Utid {
        self.utids[row * self.stride + col]
    }

    pub fn max_utid(&self) -> Option<Utid> {
        self.utids.iter().copied().max()
    }
}

pub fn dedupe_and_map(grid: &PixelGrid) -> Result<(UniqueTileSet, TileIndexMap), ConvertError> {
    let (stride, rows) = grid.tile_dims()?;
    let cells = grid.tiles()?;

    // Keyed on the raw pixels, so the first cell with given contents claims
    // the next utid and every later identical cell reuses it.
    let mut tile_lookup: HashMap<Tile, Utid> = HashMap::with_capacity(cells.len());
    let mut unique_tiles: Vec<Tile> = vec![];
    let mut utids: Vec<Utid> = Vec::with_capacity(cells.len());
    for tile in cells {
        let utid = match tile_lookup.entry(tile) {
            Entry::Occupied(occupied_entry) => *occupied_entry.get(),
            Entry::Vacant(vacant_entry) => {
                let utid = unique_tiles.len();
                unique_tiles.push(tile);
                vacant_entry.insert(utid);
                utid
            }
        };
        utids.push(utid);
    }
    debug!(
        "{}x{} tile grid reduced to {} unique tiles",
        stride,
        rows,
        unique_tiles.len()
    );

    Ok((
        UniqueTileSet {
            tiles: unique_tiles,
        },
        TileIndexMap {
            stride,
            rows,
            utids,
        },
    ))
}

/// Encoded representatives concatenated in utid order.
pub fn tile_data_blob(
    unique: &UniqueTileSet,
    code_map: &ColorCodeMap,
    stats: &mut FallbackStats,
) -> Result<Vec<u8>, ConvertError> {
    let mut data = Vec::with_capacity(unique.len() * ENCODED_TILE_LEN);
    for tile in unique.tiles() {
        data.extend(encode_tile(tile, code_map, stats)?);
    }
    Ok(data)
}

/// One byte per cell holding `utid + offset`.
pub fn map_blob(map: &TileIndexMap, offset: usize) -> Result<Vec<u8>, ConvertError> {
    let max_utid = map.max_utid().unwrap_or(0);
    max_utid
        .checked_add(offset)
        .filter(|&top| top <= u8::MAX as usize)
        .ok_or(ConvertError::OffsetOverflow { max_utid, offset })?;
    Ok(map.utids.iter().map(|&utid| (utid + offset) as u8).collect())
}

/// Every tile of the grid encoded in cell order, without deduplication.
pub fn sprite_data_blob(
    grid: &PixelGrid,
    code_map: &ColorCodeMap,
    stats: &mut FallbackStats,
) -> Result<Vec<u8>, ConvertError> {
    let tiles = grid.tiles()?;
    let mut data = Vec::with_capacity(tiles.len() * ENCODED_TILE_LEN);
    for tile in &tiles {
        data.extend(encode_tile(tile, code_map, stats)?);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::PixelValue,
        palette::{ImageKind, PixelEncoding},
    };

    // Build a grid from one fill value per tile, row-major.
    fn grid_of(stride: usize, fills: &[PixelValue]) -> PixelGrid {
        let rows = fills.len() / stride;
        let width = stride * 8;
        let mut pixels = vec![0; width * rows * 8];
        for (i, &v) in fills.iter().enumerate() {
            let (ty, tx) = (i / stride, i % stride);
            for y in 0..8 {
                for x in 0..8 {
                    pixels[(ty * 8 + y) * width + tx * 8 + x] = v;
                }
            }
        }
        PixelGrid::new(width, rows * 8, pixels).unwrap()
    }

    // Pairwise first-occurrence scan, used as a reference.
    fn naive_dedupe(grid: &PixelGrid) -> (Vec<Tile>, Vec<Utid>) {
        let cells = grid.tiles().unwrap();
        let mut claimed: Vec<Option<Utid>> = vec![None; cells.len()];
        let mut unique = vec![];
        for i in 0..cells.len() {
            if claimed[i].is_some() {
                continue;
            }
            let utid = unique.len();
            unique.push(cells[i]);
            claimed[i] = Some(utid);
            for j in i + 1..cells.len() {
                if claimed[j].is_none() && cells[j] == cells[i] {
                    claimed[j] = Some(utid);
                }
            }
        }
        (unique, claimed.into_iter().map(Option::unwrap).collect())
    }

    #[test]
    fn all_duplicates_collapse_to_one() {
        let grid = grid_of(4, &[7; 12]);
        let (unique, map) = dedupe_and_map(&grid).unwrap();
        assert_eq!(unique.len(), 1);
        assert!(map.utids().iter().all(|&u| u == 0));
        assert_eq!((map.stride(), map.rows()), (4, 3));
    }

    #[test]
    fn no_duplicates_keep_scan_order() {
        let fills: Vec<PixelValue> = (0..6).collect();
        let grid = grid_of(3, &fills);
        let (unique, map) = dedupe_and_map(&grid).unwrap();
        assert_eq!(unique.len(), 6);
        assert_eq!(map.utids(), &[0, 1, 2, 3, 4, 5]);
        for (i, tile) in unique.tiles().iter().enumerate() {
            assert_eq!(*tile, Tile::filled(i as PixelValue));
        }
    }

    #[test]
    fn first_occurrence_order() {
        let grid = grid_of(3, &[5, 9, 5, 2, 9, 2]);
        let (unique, map) = dedupe_and_map(&grid).unwrap();
        assert_eq!(map.utids(), &[0, 1, 0, 2, 1, 2]);
        assert_eq!(unique.get(0), Some(&Tile::filled(5)));
        assert_eq!(unique.get(1), Some(&Tile::filled(9)));
        assert_eq!(unique.get(2), Some(&Tile::filled(2)));
        assert_eq!(map.get(1, 1), 1);
    }

    #[test]
    fn single_pixel_difference_is_distinct() {
        let mut grid_pixels = vec![1; 16 * 8];
        grid_pixels[8 + 7 * 16 + 7] = 2; // bottom-right of the second tile
        let grid = PixelGrid::new(16, 8, grid_pixels).unwrap();
        let (unique, map) = dedupe_and_map(&grid).unwrap();
        assert_eq!(unique.len(), 2);
        assert_eq!(map.utids(), &[0, 1]);
    }

    #[test]
    fn matches_pairwise_reference() {
        let fills: Vec<PixelValue> = (0..360)
            .map(|i| ((i * 7 + i / 20) % 23) as PixelValue)
            .collect();
        let grid = grid_of(20, &fills);
        let (unique, map) = dedupe_and_map(&grid).unwrap();
        let (ref_unique, ref_utids) = naive_dedupe(&grid);
        assert_eq!(unique.tiles(), ref_unique.as_slice());
        assert_eq!(map.utids(), ref_utids.as_slice());
    }

    #[test]
    fn deterministic() {
        let grid = grid_of(4, &[3, 1, 3, 8, 1, 1, 8, 0]);
        assert_eq!(dedupe_and_map(&grid), dedupe_and_map(&grid));
    }

    #[test]
    fn every_cell_points_at_identical_tile() {
        let grid = grid_of(5, &[4, 4, 6, 1, 6, 1, 4, 9, 9, 6]);
        let (unique, map) = dedupe_and_map(&grid).unwrap();
        for row in 0..map.rows() {
            for col in 0..map.stride() {
                let utid = map.get(row, col);
                assert_eq!(
                    unique.get(utid),
                    Some(&grid.tile_at(row as u16, col as u16))
                );
            }
        }
    }

    #[test]
    fn single_tile_grid() {
        let grid = grid_of(1, &[4]);
        let (unique, map) = dedupe_and_map(&grid).unwrap();
        assert_eq!(unique.len(), 1);
        assert_eq!(map_blob(&map, 37).unwrap(), vec![37]);
    }

    #[test]
    fn two_identical_tiles() {
        let grid = grid_of(2, &[679, 679]);
        let (unique, map) = dedupe_and_map(&grid).unwrap();
        assert_eq!(unique.tiles(), &[Tile::filled(679)]);
        assert_eq!(map.utids(), &[0, 0]);
        assert_eq!(map_blob(&map, 0).unwrap(), vec![0x00, 0x00]);
    }

    #[test]
    fn invalid_dimensions() {
        let grid = PixelGrid::new(10, 8, vec![0; 80]).unwrap();
        assert_eq!(
            dedupe_and_map(&grid),
            Err(ConvertError::InvalidDimensions {
                width: 10,
                height: 8
            })
        );
    }

    #[test]
    fn offset_overflow() {
        let grid = grid_of(7, &[0, 1, 2, 3, 4, 5, 6]);
        let (_, map) = dedupe_and_map(&grid).unwrap();
        assert_eq!(
            map_blob(&map, 250),
            Err(ConvertError::OffsetOverflow {
                max_utid: 6,
                offset: 250
            })
        );
        assert_eq!(map_blob(&map, 249).unwrap(), vec![249, 250, 251, 252, 253, 254, 255]);
    }

    #[test]
    fn huge_offset_overflows() {
        let grid = grid_of(2, &[679, 64]);
        let (_, map) = dedupe_and_map(&grid).unwrap();
        assert_eq!(
            map_blob(&map, usize::MAX),
            Err(ConvertError::OffsetOverflow {
                max_utid: 1,
                offset: usize::MAX
            })
        );
    }

    #[test]
    fn tile_data_in_utid_order() {
        let grid = grid_of(3, &[64, 679, 64]);
        let map_codes = ColorCodeMap::builtin(ImageKind::Background, PixelEncoding::RgbSum);
        let mut stats = FallbackStats::default();
        let (unique, _) = dedupe_and_map(&grid).unwrap();
        let data = tile_data_blob(&unique, &map_codes, &mut stats).unwrap();
        assert_eq!(data.len(), 32);
        assert!(data[..16].iter().all(|&b| b == 0xFF));
        assert!(data[16..].iter().all(|&b| b == 0x00));
    }

    #[test]
    fn sprite_blob_keeps_duplicates() {
        let grid = grid_of(3, &[64, 679, 64]);
        let map_codes = ColorCodeMap::builtin(ImageKind::Background, PixelEncoding::RgbSum);
        let mut stats = FallbackStats::default();
        let data = sprite_data_blob(&grid, &map_codes, &mut stats).unwrap();
        assert_eq!(data.len(), 48);
        assert_eq!(data[..16], data[32..]);
    }
}
