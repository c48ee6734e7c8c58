//! PNG reading and deterministic PNG writing for surfaces.
//!
//! Output uses fixed compression settings so identical surfaces encode to
//! identical bytes.

use std::io::{BufRead, Seek, Write};
use std::path::Path;

use png::{BitDepth, ColorType, Compression, Decoder, Encoder, FilterType, Transformations};
use thiserror::Error;

use crate::surface::{Surface, SurfaceError};

/// Errors from PNG operations.
#[derive(Debug, Error)]
pub enum PngError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("PNG decoding error: {0}")]
    Decoding(#[from] png::DecodingError),

    #[error("Unsupported PNG layout: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// PNG export configuration for deterministic output.
#[derive(Debug, Clone)]
pub struct PngConfig {
    /// Compression level. Use a fixed value for determinism.
    pub compression: Compression,
    /// Filter type. Use a fixed value for determinism.
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            filter: FilterType::NoFilter,
        }
    }
}

impl PngConfig {
    /// Create config optimized for speed (larger files).
    pub fn fast() -> Self {
        Self {
            compression: Compression::Fast,
            filter: FilterType::NoFilter,
        }
    }
}

/// Write a surface to a PNG file as 8-bit RGBA.
pub fn write_surface(surface: &Surface, path: &Path, config: &PngConfig) -> Result<(), PngError> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);

    write_surface_to_writer(surface, writer, config)
}

/// Write a surface to any writer as 8-bit RGBA.
pub fn write_surface_to_writer<W: Write>(
    surface: &Surface,
    writer: W,
    config: &PngConfig,
) -> Result<(), PngError> {
    let mut encoder = Encoder::new(writer, surface.width(), surface.height());
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(config.compression);
    encoder.set_filter(config.filter);

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&surface.to_rgba8())?;

    Ok(())
}

/// Encode a surface in memory and return the bytes with their BLAKE3 hash.
pub fn write_surface_to_vec_with_hash(
    surface: &Surface,
    config: &PngConfig,
) -> Result<(Vec<u8>, String), PngError> {
    let mut data = Vec::new();
    write_surface_to_writer(surface, &mut data, config)?;
    let hash = blake3::hash(&data).to_hex().to_string();
    Ok((data, hash))
}

/// Read a PNG file into a surface.
pub fn read_surface(path: &Path) -> Result<Surface, PngError> {
    let file = std::fs::File::open(path)?;
    read_surface_from_reader(std::io::BufReader::new(file))
}

/// Read a PNG stream into a surface.
///
/// Palette and low bit depth images are expanded and 16-bit channels are
/// stripped to 8 bits; gray and RGB images become opaque.
pub fn read_surface_from_reader<R: BufRead + Seek>(reader: R) -> Result<Surface, PngError> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);

    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let bytes = &buf[..info.buffer_size()];

    let rgba: Vec<u8> = match info.color_type {
        ColorType::Rgba => bytes.to_vec(),
        ColorType::Rgb => bytes
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        ColorType::GrayscaleAlpha => bytes
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        ColorType::Grayscale => bytes.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        ColorType::Indexed => {
            return Err(PngError::Unsupported(
                "indexed color was not expanded".to_string(),
            ))
        }
    };

    Ok(Surface::from_rgba8(info.width, info.height, &rgba)?)
}
