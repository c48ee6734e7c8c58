//! Packed 8-bit color used by render surfaces.

/// BGRA color with 8-bit channels.
///
/// Packs into a `u32` as `0xAARRGGBB` so a surface can store each pixel in a
/// single atomic word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorBgra {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl ColorBgra {
    /// Create an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { b, g, r, a: 255 }
    }

    /// Create a color with alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    /// Create an opaque gray.
    pub const fn gray(value: u8) -> Self {
        Self::rgb(value, value, value)
    }

    /// Opaque black.
    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// Opaque white.
    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Fully transparent black.
    pub const fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    /// Pack into `0xAARRGGBB`.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Unpack from `0xAARRGGBB`.
    #[inline]
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            b: packed as u8,
            g: (packed >> 8) as u8,
            r: (packed >> 16) as u8,
            a: (packed >> 24) as u8,
        }
    }

    /// Convert to 8-bit RGBA byte order.
    pub const fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Create from 8-bit RGBA byte order.
    pub const fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self::rgba(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    /// Perceived brightness (Rec. 601 weights), 0-255.
    pub fn luminance(&self) -> u8 {
        let l = 0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64;
        l.round().clamp(0.0, 255.0) as u8
    }

    /// Invert the color channels, keeping alpha.
    pub const fn inverted(self) -> Self {
        Self::rgba(255 - self.r, 255 - self.g, 255 - self.b, self.a)
    }

    /// Multiply color channels by a factor, saturating at 0 and 255.
    pub fn scale(&self, factor: f64) -> Self {
        let channel = |c: u8| (c as f64 * factor).round().clamp(0.0, 255.0) as u8;
        Self::rgba(channel(self.r), channel(self.g), channel(self.b), self.a)
    }
}

impl Default for ColorBgra {
    fn default() -> Self {
        Self::transparent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing_layout() {
        let c = ColorBgra::rgba(0x11, 0x22, 0x33, 0x44);
        assert_eq!(c.to_u32(), 0x4411_2233);
        assert_eq!(ColorBgra::from_u32(0x4411_2233), c);
    }

    #[test]
    fn test_luminance() {
        assert_eq!(ColorBgra::white().luminance(), 255);
        assert_eq!(ColorBgra::black().luminance(), 0);
        assert_eq!(ColorBgra::gray(128).luminance(), 128);
    }

    #[test]
    fn test_inverted_keeps_alpha() {
        let c = ColorBgra::rgba(10, 20, 30, 40).inverted();
        assert_eq!(c, ColorBgra::rgba(245, 235, 225, 40));
    }

    #[test]
    fn test_scale_saturates() {
        let c = ColorBgra::rgb(200, 100, 0).scale(2.0);
        assert_eq!(c, ColorBgra::rgb(255, 200, 0));
    }
}
