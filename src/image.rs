use std::{fs::File, io::BufReader, io::Read, path::Path};

use anyhow::{bail, ensure, Context, Result};
use log::info;

use crate::{common::PixelValue, grid::PixelGrid, palette::PixelEncoding};

pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn unpack_indices(row: &[u8], bit_depth: usize, width: usize) -> Vec<PixelValue> {
    let per_byte = 8 / bit_depth;
    let mask = (1u16 << bit_depth) - 1;
    (0..width)
        .map(|x| {
            let byte = row[x / per_byte] as u16;
            let shift = 8 - bit_depth * (x % per_byte + 1);
            (byte >> shift) & mask
        })
        .collect()
}

/// Decode PNG data into a grid of palette indices (indexed and greyscale
/// images) or RGB sums (truecolor images, alpha dropped).
pub fn decode_grid<R: Read>(source: R) -> Result<(PixelGrid, PixelEncoding)> {
    let mut decoder = png::Decoder::new(source);
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let width = info.width as usize;
    let height = info.height as usize;
    let bit_depth = info.bit_depth as usize;
    let line_size = info.line_size;

    let rows = buf[..info.buffer_size()].chunks(line_size);
    let mut pixels: Vec<PixelValue> = Vec::with_capacity(width * height);
    let encoding = match info.color_type {
        png::ColorType::Indexed | png::ColorType::Grayscale => {
            ensure!(bit_depth <= 8, "16-bit greyscale images are not supported");
            for row in rows {
                pixels.extend(unpack_indices(row, bit_depth, width));
            }
            PixelEncoding::Indexed
        }
        png::ColorType::Rgb | png::ColorType::Rgba => {
            ensure!(bit_depth == 8, "only 8-bit RGB images are supported");
            let channels = info.color_type.samples();
            for row in rows {
                pixels.extend(
                    row[..width * channels]
                        .chunks(channels)
                        .map(|px| px[0] as PixelValue + px[1] as PixelValue + px[2] as PixelValue),
                );
            }
            PixelEncoding::RgbSum
        }
        png::ColorType::GrayscaleAlpha => {
            bail!("greyscale images with alpha are not supported");
        }
    };
    let grid = PixelGrid::new(width, height, pixels)?;
    Ok((grid, encoding))
}

pub fn load_grid(path: &Path) -> Result<(PixelGrid, PixelEncoding)> {
    info!("Loading {}", path.display());
    decode_grid(open(path)?).with_context(|| format!("Unable to decode {}", path.display()))
}

pub fn decode_rgba<R: Read>(source: R) -> Result<RgbaImage> {
    let mut decoder = png::Decoder::new(source);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let bytes = &buf[..info.buffer_size()];
    let data: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => bytes.to_vec(),
        png::ColorType::Rgb => bytes
            .chunks(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        png::ColorType::Grayscale => bytes.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::GrayscaleAlpha => bytes
            .chunks(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        png::ColorType::Indexed => bail!("palette was not expanded"),
    };
    Ok(RgbaImage {
        width: info.width,
        height: info.height,
        data,
    })
}

pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    info!("Loading {}", path.display());
    decode_rgba(open(path)?).with_context(|| format!("Unable to decode {}", path.display()))
}
