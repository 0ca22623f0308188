//! Synthetic test pattern
//!
//! The image is split into a 16-row top band and a bottom band covering the
//! remaining rows. Each band is tiled with 8x8 blocks whose parity
//! `(row / 8 + col / 8) % 2` picks one of two colors:
//!
//! | band   | even parity | odd parity |
//! |--------|-------------|------------|
//! | top    | white       | red        |
//! | bottom | black       | yellow     |
//!
//! [`Pattern::swatch`] is the single definition of this rule. The generator
//! writes it and both verifiers read it back, so the two sides cannot drift.

use rgb::Rgb;
use whereat::at;

use crate::error::{Error, Result};
use crate::format::{Orientation, PixelFormat, ScaleFactor};

/// Pixel period of the block grid at full resolution
pub const BLOCK_SIZE: usize = 8;
/// Height of the top band at full resolution
pub const HALFWAY: usize = 16;

/// Logical color of a pattern pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    /// Top band, even parity
    White,
    /// Top band, odd parity
    Red,
    /// Bottom band, even parity
    Black,
    /// Bottom band, odd parity
    Yellow,
}

impl Swatch {
    /// Packed RGB value
    pub fn rgb(self) -> Rgb<u8> {
        let (r, g, b) = match self {
            Swatch::White => (255, 255, 255),
            Swatch::Red => (255, 0, 0),
            Swatch::Black => (0, 0, 0),
            Swatch::Yellow => (255, 255, 0),
        };
        Rgb { r, g, b }
    }

    /// BT.601 luma, as stored in grayscale buffers and the Y plane
    pub fn luma(self) -> u8 {
        match self {
            Swatch::White => 255,
            Swatch::Red => 76,
            Swatch::Black => 0,
            Swatch::Yellow => 226,
        }
    }

    /// Full-range `(Cb, Cr)` pair, as stored in the U and V planes
    pub fn chroma(self) -> (u8, u8) {
        match self {
            Swatch::White | Swatch::Black => (128, 128),
            Swatch::Red => (85, 255),
            Swatch::Yellow => (0, 149),
        }
    }
}

/// The block/band rule at a given scale
///
/// A downscaled decode shrinks the block period and band boundary by the same
/// divisor, so both are stored here rather than fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    block_size: usize,
    halfway: usize,
}

impl Pattern {
    /// Pattern at full resolution
    pub const FULL: Self = Self {
        block_size: BLOCK_SIZE,
        halfway: HALFWAY,
    };

    /// Pattern as it appears after decoding at `1/scale`
    pub fn scaled(scale: ScaleFactor) -> Self {
        Self {
            block_size: BLOCK_SIZE / scale.get(),
            halfway: HALFWAY / scale.get(),
        }
    }

    /// Block period in pixels
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// First row of the bottom band
    pub fn halfway(&self) -> usize {
        self.halfway
    }

    /// Returns true if the block containing `(row, col)` has even parity
    #[inline]
    pub fn even(&self, row: usize, col: usize) -> bool {
        (row / self.block_size + col / self.block_size) % 2 == 0
    }

    /// Color at logical `(row, col)`
    #[inline]
    pub fn swatch(&self, row: usize, col: usize) -> Swatch {
        Self::pick(row < self.halfway, self.even(row, col))
    }

    /// Color for a band and parity already computed by the caller
    ///
    /// Chroma planes derive parity from luma-space coordinates, so they need
    /// this rather than [`Pattern::swatch`].
    #[inline]
    pub fn pick(top: bool, even: bool) -> Swatch {
        match (top, even) {
            (true, true) => Swatch::White,
            (true, false) => Swatch::Red,
            (false, true) => Swatch::Black,
            (false, false) => Swatch::Yellow,
        }
    }
}

/// Bytes needed to hold a packed image
pub fn packed_size(width: usize, height: usize, format: PixelFormat) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(at(Error::InvalidDimensions { width, height }));
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
        .ok_or_else(|| at(Error::InvalidDimensions { width, height }))
}

/// Fill a packed buffer with the pattern at full resolution
///
/// The buffer is zero-filled first, including any trailing bytes past
/// `width * height * bytes_per_pixel`. Rows are written in the order
/// requested by `orientation`; the logical image is the same either way.
pub fn generate_pattern(
    buf: &mut [u8],
    width: usize,
    height: usize,
    format: PixelFormat,
    orientation: Orientation,
) -> Result<()> {
    let required = packed_size(width, height, format)?;
    if buf.len() < required {
        return Err(at(Error::InvalidBuffer {
            required,
            actual: buf.len(),
        }));
    }

    buf.fill(0);
    let ps = format.bytes_per_pixel();
    let pattern = Pattern::FULL;

    for row in 0..height {
        let start = orientation.physical_row(row, height) * width * ps;
        let line = &mut buf[start..start + width * ps];
        for (col, pixel) in line.chunks_exact_mut(ps).enumerate() {
            let swatch = pattern.swatch(row, col);
            match format.channel_offsets() {
                Some(o) => {
                    let rgb = swatch.rgb();
                    pixel[o.r] = rgb.r;
                    pixel[o.g] = rgb.g;
                    pixel[o.b] = rgb.b;
                }
                None => pixel[0] = swatch.luma(),
            }
        }
    }
    Ok(())
}
