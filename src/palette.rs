use hashbrown::HashMap;
use itertools::Itertools;
use log::warn;

use crate::{
    common::{ColorCode, PixelValue},
    error::ConvertError,
    grid::PixelGrid,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Sprite,
    Background,
}

/// How the decoder reduced each pixel to a single integer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PixelEncoding {
    RgbSum,
    Indexed,
}

// RGB sum of the sprite transparency color (101, 255, 0).
const SPRITE_TRANSPARENT_RGB: PixelValue = 356;
// Index 3 (dark green) only exists in the background palette.
const BACKGROUND_ONLY_INDEX: PixelValue = 3;

/// Ordered pixel value -> color code table. Declaration order decides ties
/// in the nearest-key fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorCodeMap {
    entries: Vec<(PixelValue, ColorCode)>,
    strict: bool,
}

/// Record of pixel values that had no exact entry in the map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FallbackStats {
    pub total: usize,
    pub by_value: HashMap<PixelValue, usize>,
}

impl FallbackStats {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn record(&mut self, value: PixelValue, code: ColorCode) {
        self.total += 1;
        let count = self.by_value.entry(value).or_insert(0);
        if *count == 0 {
            warn!("Pixel value {value} is not in the palette, substituting color code {code}");
        }
        *count += 1;
    }

    pub fn merge(&mut self, other: &FallbackStats) {
        self.total += other.total;
        for (&value, &count) in &other.by_value {
            *self.by_value.entry(value).or_insert(0) += count;
        }
    }

    /// Distinct unmapped values in ascending order.
    pub fn values(&self) -> Vec<PixelValue> {
        self.by_value.keys().copied().sorted().collect()
    }
}

impl ColorCodeMap {
    pub fn new(entries: &[(PixelValue, ColorCode)]) -> Self {
        ColorCodeMap {
            entries: entries.iter().map(|&(v, c)| (v, c & 3)).collect(),
            strict: false,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn get(&self, value: PixelValue) -> Option<ColorCode> {
        self.entries
            .iter()
            .find(|&&(v, _)| v == value)
            .map(|&(_, c)| c)
    }

    /// Code of the entry whose key is numerically closest to `value`.
    /// `min_by_key` keeps the first of equal candidates.
    pub fn nearest(&self, value: PixelValue) -> Option<ColorCode> {
        self.entries
            .iter()
            .min_by_key(|&&(v, _)| v.abs_diff(value))
            .map(|&(_, c)| c)
    }

    pub fn resolve(
        &self,
        value: PixelValue,
        stats: &mut FallbackStats,
    ) -> Result<ColorCode, ConvertError> {
        if let Some(code) = self.get(value) {
            return Ok(code);
        }
        if self.strict {
            return Err(ConvertError::UnmappedColor { value });
        }
        let code = self
            .nearest(value)
            .ok_or(ConvertError::UnmappedColor { value })?;
        stats.record(value, code);
        Ok(code)
    }

    pub fn builtin(kind: ImageKind, encoding: PixelEncoding) -> Self {
        match (kind, encoding) {
            (ImageKind::Sprite, PixelEncoding::RgbSum) => {
                Self::new(&[(356, 0), (679, 1), (434, 2), (64, 3)])
            }
            (ImageKind::Background, PixelEncoding::RgbSum) => {
                Self::new(&[(679, 0), (434, 1), (202, 2), (64, 3)])
            }
            (ImageKind::Sprite, PixelEncoding::Indexed) => {
                Self::new(&[(0, 0), (1, 1), (2, 2), (4, 3)])
            }
            (ImageKind::Background, PixelEncoding::Indexed) => {
                Self::new(&[(1, 0), (2, 1), (3, 2), (4, 3)])
            }
        }
    }
}

pub fn detect_kind(grid: &PixelGrid, encoding: PixelEncoding) -> ImageKind {
    match encoding {
        PixelEncoding::RgbSum => {
            if grid.contains(SPRITE_TRANSPARENT_RGB) {
                ImageKind::Sprite
            } else {
                ImageKind::Background
            }
        }
        PixelEncoding::Indexed => {
            if grid.contains(BACKGROUND_ONLY_INDEX) {
                ImageKind::Background
            } else {
                ImageKind::Sprite
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_lookup() {
        let map = ColorCodeMap::builtin(ImageKind::Background, PixelEncoding::RgbSum);
        let mut stats = FallbackStats::default();
        assert_eq!(map.resolve(679, &mut stats), Ok(0));
        assert_eq!(map.resolve(434, &mut stats), Ok(1));
        assert_eq!(map.resolve(202, &mut stats), Ok(2));
        assert_eq!(map.resolve(64, &mut stats), Ok(3));
        assert!(stats.is_empty());
    }

    #[test]
    fn nearest_fallback_is_counted() {
        let map = ColorCodeMap::builtin(ImageKind::Background, PixelEncoding::RgbSum);
        let mut stats = FallbackStats::default();
        assert_eq!(map.resolve(70, &mut stats), Ok(3));
        assert_eq!(map.resolve(70, &mut stats), Ok(3));
        assert_eq!(map.resolve(430, &mut stats), Ok(1));
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_value[&70], 2);
        assert_eq!(stats.values(), vec![70, 430]);
    }

    #[test]
    fn fallback_tie_goes_to_first_entry() {
        let map = ColorCodeMap::new(&[(10, 2), (20, 1)]);
        assert_eq!(map.nearest(15), Some(2));
        let map = ColorCodeMap::new(&[(20, 1), (10, 2)]);
        assert_eq!(map.nearest(15), Some(1));
    }

    #[test]
    fn strict_mode_rejects_unmapped() {
        let map =
            ColorCodeMap::builtin(ImageKind::Sprite, PixelEncoding::Indexed).with_strict(true);
        let mut stats = FallbackStats::default();
        assert_eq!(map.resolve(4, &mut stats), Ok(3));
        assert_eq!(
            map.resolve(3, &mut stats),
            Err(ConvertError::UnmappedColor { value: 3 })
        );
        assert!(stats.is_empty());
    }

    #[test]
    fn empty_map_cannot_fall_back() {
        let map = ColorCodeMap::new(&[]);
        let mut stats = FallbackStats::default();
        assert_eq!(
            map.resolve(1, &mut stats),
            Err(ConvertError::UnmappedColor { value: 1 })
        );
    }

    #[test]
    fn merge_stats() {
        let mut a = FallbackStats::default();
        a.record(5, 0);
        let mut b = FallbackStats::default();
        b.record(5, 0);
        b.record(9, 1);
        a.merge(&b);
        assert_eq!(a.total, 3);
        assert_eq!(a.by_value[&5], 2);
    }

    #[test]
    fn detects_kind() {
        let sprite = PixelGrid::new(2, 1, vec![356, 64]).unwrap();
        let bkg = PixelGrid::new(2, 1, vec![679, 64]).unwrap();
        assert_eq!(detect_kind(&sprite, PixelEncoding::RgbSum), ImageKind::Sprite);
        assert_eq!(detect_kind(&bkg, PixelEncoding::RgbSum), ImageKind::Background);

        let sprite = PixelGrid::new(2, 1, vec![0, 4]).unwrap();
        let bkg = PixelGrid::new(2, 1, vec![3, 4]).unwrap();
        assert_eq!(detect_kind(&sprite, PixelEncoding::Indexed), ImageKind::Sprite);
        assert_eq!(detect_kind(&bkg, PixelEncoding::Indexed), ImageKind::Background);
    }
}
