use thiserror::Error;

use crate::common::{PixelValue, Utid};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("image size {width}x{height} is not a multiple of the 8x8 tile size")]
    InvalidDimensions { width: usize, height: usize },

    #[error("highest tile index {max_utid} plus offset {offset} does not fit in a byte")]
    OffsetOverflow { max_utid: Utid, offset: usize },

    #[error("pixel value {value} has no entry in the color code map")]
    UnmappedColor { value: PixelValue },

    #[error("pixel buffer holds {actual} values but the grid needs {expected}")]
    PixelCountMismatch { expected: usize, actual: usize },
}
