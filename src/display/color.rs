//! RGB565 wire pixel format
//!
//! Conversion is pure bit extraction: each 8-bit channel is truncated to
//! 5/6/5 bits with no rounding.

use byteorder::{BigEndian, ByteOrder, NativeEndian};
use thiserror::Error;

/// RGB565 color (16-bit: 5 red, 6 green, 5 blue)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    /// Bytes per pixel on the wire
    pub const BYTES: u32 = 2;

    pub const BLACK: Self = Self(0x0000);
    pub const WHITE: Self = Self(0xFFFF);
    pub const RED: Self = Self(0xF800);
    pub const GREEN: Self = Self(0x07E0);
    pub const BLUE: Self = Self(0x001F);

    /// Convert a packed `0xRRGGBB` color
    pub const fn from_rgb888(rgb888: u32) -> Self {
        let r = ((rgb888 >> 19) & 0x1F) as u16;
        let g = ((rgb888 >> 10) & 0x3F) as u16;
        let b = ((rgb888 >> 3) & 0x1F) as u16;
        Self((r << 11) | (g << 5) | b)
    }

    /// Create RGB565 from RGB888 components
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r5 = (r >> 3) as u16;
        let g6 = (g >> 2) as u16;
        let b5 = (b >> 3) as u16;
        Self((r5 << 11) | (g6 << 5) | b5)
    }

    /// Write the two pixel bytes into `out[..2]`
    #[inline]
    pub fn write(self, out: &mut [u8], order: PixelOrder) {
        match order {
            PixelOrder::BigEndian => BigEndian::write_u16(out, self.0),
            PixelOrder::Native => NativeEndian::write_u16(out, self.0),
        }
    }
}

/// Byte layout of pixels inside a staging buffer
///
/// The wire is always big-endian. 8-bit data frames are shifted out byte by
/// byte, so they need `BigEndian`. 16-bit frames are shifted out as host
/// words MSB-first, so they need `Native`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelOrder {
    BigEndian,
    Native,
}

const NAMED: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xFFFFFF),
    ("red", 0xFF0000),
    ("green", 0x00FF00),
    ("blue", 0x0000FF),
    ("yellow", 0xFFFF00),
    ("cyan", 0x00FFFF),
    ("magenta", 0xFF00FF),
    ("orange", 0xFFA500),
    ("gray", 0x808080),
];

/// Parse `#RRGGBB`, `0xRRGGBB`, `RRGGBB` or a basic color name
pub fn parse_rgb888(s: &str) -> Result<u32, ColorParseError> {
    let s = s.trim();
    let lower = s.to_ascii_lowercase();

    if let Some((_, value)) = NAMED.iter().find(|(name, _)| *name == lower) {
        return Ok(*value);
    }

    let hex = lower
        .strip_prefix('#')
        .or_else(|| lower.strip_prefix("0x"))
        .unwrap_or(&lower);

    if hex.is_empty() || hex.len() > 6 {
        return Err(ColorParseError(s.to_string()));
    }
    u32::from_str_radix(hex, 16).map_err(|_| ColorParseError(s.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color '{0}': expected #RRGGBB, 0xRRGGBB or a color name")]
pub struct ColorParseError(pub String);
