//! Render surfaces shared between tile workers.

use std::sync::atomic::{AtomicU32, Ordering};

use thiserror::Error;

use crate::color::ColorBgra;
use crate::rect::Rect;

/// Errors from surface construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Expected {expected} bytes for {width}x{height} RGBA, got {actual}")]
    DataLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A 2D BGRA pixel surface.
///
/// Pixels are stored as atomic words so that several render workers can
/// write disjoint regions of the same surface through a shared reference.
/// Writes use relaxed ordering; callers publish finished frames through
/// their own synchronization (thread join, lock release).
#[derive(Debug)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Box<[AtomicU32]>,
}

fn pixel_count(width: u32, height: u32) -> Result<usize, SurfaceError> {
    if width == 0 || height == 0 {
        return Err(SurfaceError::InvalidDimensions(format!(
            "surface must be at least 1x1, got {}x{}",
            width, height
        )));
    }

    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| SurfaceError::InvalidDimensions(format!("{}x{} is too large", width, height)))
}

impl Surface {
    /// Create a surface filled with a color.
    pub fn new(width: u32, height: u32, fill: ColorBgra) -> Result<Self, SurfaceError> {
        let count = pixel_count(width, height)?;
        let packed = fill.to_u32();
        let pixels = (0..count).map(|_| AtomicU32::new(packed)).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a transparent surface.
    pub fn transparent(width: u32, height: u32) -> Result<Self, SurfaceError> {
        Self::new(width, height, ColorBgra::transparent())
    }

    /// Create a surface from 8-bit RGBA bytes (row-major).
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> Result<Self, SurfaceError> {
        let count = pixel_count(width, height)?;
        let expected = count * 4;
        if data.len() != expected {
            return Err(SurfaceError::DataLength {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        let pixels = data
            .chunks_exact(4)
            .map(|px| AtomicU32::new(ColorBgra::from_rgba8([px[0], px[1], px[2], px[3]]).to_u32()))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The full surface rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    /// Get a pixel. Panics if out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> ColorBgra {
        ColorBgra::from_u32(self.pixels[self.index(x, y)].load(Ordering::Relaxed))
    }

    /// Set a pixel. Panics if out of bounds.
    #[inline]
    pub fn set(&self, x: u32, y: u32, color: ColorBgra) {
        self.pixels[self.index(x, y)].store(color.to_u32(), Ordering::Relaxed);
    }

    /// Fill the whole surface with a color.
    pub fn fill(&self, color: ColorBgra) {
        let packed = color.to_u32();
        for px in self.pixels.iter() {
            px.store(packed, Ordering::Relaxed);
        }
    }

    /// Copy `src` onto this surface.
    ///
    /// Surfaces of different sizes copy their overlapping top-left area.
    pub fn copy_surface(&self, src: &Surface) {
        self.copy_region(src, self.bounds());
    }

    /// Copy the pixels of `rect` from `src` onto this surface.
    ///
    /// The rectangle is clipped to both surfaces.
    pub fn copy_region(&self, src: &Surface, rect: Rect) {
        let Some(clip) = rect
            .intersect(&self.bounds())
            .and_then(|r| r.intersect(&src.bounds()))
        else {
            return;
        };

        for y in clip.y..clip.bottom() {
            let src_row = src.index(clip.x, y);
            let dst_row = self.index(clip.x, y);
            for dx in 0..clip.width as usize {
                let packed = src.pixels[src_row + dx].load(Ordering::Relaxed);
                self.pixels[dst_row + dx].store(packed, Ordering::Relaxed);
            }
        }
    }

    /// Snapshot of all pixels, row-major.
    pub fn pixels(&self) -> Vec<ColorBgra> {
        self.pixels
            .iter()
            .map(|px| ColorBgra::from_u32(px.load(Ordering::Relaxed)))
            .collect()
    }

    /// Returns true if every pixel inside `rect` equals the corresponding
    /// pixel of `other`.
    pub fn region_eq(&self, other: &Surface, rect: Rect) -> bool {
        let Some(clip) = rect
            .intersect(&self.bounds())
            .and_then(|r| r.intersect(&other.bounds()))
        else {
            return rect.is_empty();
        };
        if clip != rect {
            return false;
        }

        (clip.y..clip.bottom()).all(|y| (clip.x..clip.right()).all(|x| self.get(x, y) == other.get(x, y)))
    }

    /// Convert to 8-bit RGBA bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in self.pixels() {
            bytes.extend_from_slice(&color.to_rgba8());
        }
        bytes
    }
}

impl Clone for Surface {
    fn clone(&self) -> Self {
        let pixels = self
            .pixels
            .iter()
            .map(|px| AtomicU32::new(px.load(Ordering::Relaxed)))
            .collect();
        Self {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

impl PartialEq for Surface {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.pixels() == other.pixels()
    }
}

impl Eq for Surface {}
