//! Verification of packed (interleaved) pixel buffers

use core::fmt;

use whereat::at;

use crate::error::{Channel, Error, Mismatch, Result};
use crate::format::{ChromaSampling, Orientation, PixelFormat, ScaleFactor};
use crate::pattern::{Pattern, packed_size};
use crate::tolerance;

/// Every mismatch in a decoded packed buffer, in scan order
///
/// `width` and `height` are the dimensions of `buf` itself, i.e. already
/// divided by `scale` when verifying a downscaled decode. The pattern is
/// evaluated with its block period and band boundary divided by `scale`.
///
/// Luma-only images (Gray sampling, or a Gray output format) must carry the
/// pattern's luma in every channel. Color images must carry its RGB value.
///
/// Within a pixel, channels are checked R, G, B, except for color images in
/// the bottom band, which are checked B, R, G.
pub fn packed_mismatches<'a>(
    buf: &'a [u8],
    width: usize,
    height: usize,
    format: PixelFormat,
    sampling: ChromaSampling,
    scale: ScaleFactor,
    orientation: Orientation,
) -> Result<impl Iterator<Item = Mismatch> + 'a> {
    let required = packed_size(width, height, format)?;
    if buf.len() < required {
        return Err(at(Error::InvalidBuffer {
            required,
            actual: buf.len(),
        }));
    }

    let pattern = Pattern::scaled(scale);
    let luma_only = sampling == ChromaSampling::Gray || format.is_gray();
    let ps = format.bytes_per_pixel();

    let iter = (0..height).flat_map(move |row| {
        let start = orientation.physical_row(row, height) * width * ps;
        (0..width).flat_map(move |col| {
            let actual = format.read(&buf[start + col * ps..]);
            let swatch = pattern.swatch(row, col);
            let expected = if luma_only {
                let y = swatch.luma();
                rgb::Rgb { r: y, g: y, b: y }
            } else {
                swatch.rgb()
            };
            let checks = [
                (Channel::R, expected.r, actual.r),
                (Channel::G, expected.g, actual.g),
                (Channel::B, expected.b, actual.b),
            ];
            // Color pixels in the bottom band are checked blue first
            let order = if !luma_only && row >= pattern.halfway() {
                [2, 0, 1]
            } else {
                [0, 1, 2]
            };
            order.into_iter().filter_map(move |i| {
                let (channel, expected, actual) = checks[i];
                tolerance::check(channel, row, col, expected, actual)
            })
        })
    });
    Ok(iter)
}

/// Verify a decoded packed buffer, stopping at the first mismatch
///
/// See [`packed_mismatches`] for the expected values.
pub fn verify_packed(
    buf: &[u8],
    width: usize,
    height: usize,
    format: PixelFormat,
    sampling: ChromaSampling,
    scale: ScaleFactor,
    orientation: Orientation,
) -> Result<()> {
    let first = packed_mismatches(buf, width, height, format, sampling, scale, orientation)?.next();
    match first {
        Some(mismatch) => Err(at(Error::ValueMismatch(mismatch))),
        None => Ok(()),
    }
}

/// Text dump of a packed buffer, one `rrr/ggg/bbb` cell per pixel
///
/// Rows are printed in memory order.
pub struct PackedDump<'a> {
    buf: &'a [u8],
    width: usize,
    height: usize,
    format: PixelFormat,
}

impl<'a> PackedDump<'a> {
    /// Dump `buf` as a `width x height` image of `format`
    pub fn new(buf: &'a [u8], width: usize, height: usize, format: PixelFormat) -> Self {
        Self {
            buf,
            width,
            height,
            format,
        }
    }
}

impl fmt::Display for PackedDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ps = self.format.bytes_per_pixel();
        let row_bytes = self.width * ps;
        for line in self.buf.chunks_exact(row_bytes).take(self.height) {
            for pixel in line.chunks_exact(ps) {
                let px = self.format.read(pixel);
                write!(f, "{:3}/{:3}/{:3} ", px.r, px.g, px.b)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::generate_pattern;

    fn pattern(w: usize, h: usize, format: PixelFormat, orientation: Orientation) -> Vec<u8> {
        let mut buf = vec![0u8; w * h * format.bytes_per_pixel() + 1];
        generate_pattern(&mut buf, w, h, format, orientation).unwrap();
        buf
    }

    #[test]
    fn generated_pattern_verifies_in_every_format() {
        for format in PixelFormat::ALL {
            for orientation in Orientation::ALL {
                let buf = pattern(35, 39, format, orientation);
                let sampling = if format.is_gray() {
                    ChromaSampling::Gray
                } else {
                    ChromaSampling::Cs444
                };
                verify_packed(&buf, 35, 39, format, sampling, ScaleFactor::ONE, orientation)
                    .unwrap();
            }
        }
    }

    #[test]
    fn wrong_orientation_is_caught() {
        let buf = pattern(39, 41, PixelFormat::Rgbx, Orientation::TopDown);
        let err = verify_packed(
            &buf,
            39,
            41,
            PixelFormat::Rgbx,
            ChromaSampling::Cs444,
            ScaleFactor::ONE,
            Orientation::BottomUp,
        )
        .unwrap_err();
        assert!(matches!(err.into_inner(), Error::ValueMismatch(_)));
    }

    #[test]
    fn first_mismatch_names_channel_and_logical_row() {
        let (w, h) = (16, 20);
        let mut buf = pattern(w, h, PixelFormat::Bgr, Orientation::BottomUp);
        // Logical row 17 lives at physical row 2 in a bottom-up buffer
        let i = (2 * w + 9) * 3;
        buf[i + 1] = 100;

        let err = verify_packed(
            &buf,
            w,
            h,
            PixelFormat::Bgr,
            ChromaSampling::Cs444,
            ScaleFactor::ONE,
            Orientation::BottomUp,
        )
        .unwrap_err()
        .into_inner();
        let Error::ValueMismatch(m) = err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(
            m,
            Mismatch {
                channel: Channel::G,
                row: 17,
                col: 9,
                expected: 255,
                actual: 100,
            }
        );
    }

    #[test]
    fn bottom_band_reports_blue_first() {
        let (w, h) = (16, 20);
        let ps = 3;
        let mut buf = pattern(w, h, PixelFormat::Rgb, Orientation::TopDown);
        let first = |buf: &[u8], sampling| {
            let err = verify_packed(
                buf,
                w,
                h,
                PixelFormat::Rgb,
                sampling,
                ScaleFactor::ONE,
                Orientation::TopDown,
            )
            .unwrap_err()
            .into_inner();
            let Error::ValueMismatch(m) = err else {
                panic!("unexpected error {err:?}");
            };
            (m.channel, m.row)
        };

        // Yellow pixel at (17, 9): R and B both wrong
        let i = (17 * w + 9) * ps;
        buf[i] = 100;
        buf[i + 2] = 100;
        assert_eq!(first(&buf, ChromaSampling::Cs444), (Channel::B, 17));

        // Same corruption in the top band: red first
        let mut buf = pattern(w, h, PixelFormat::Rgb, Orientation::TopDown);
        let i = (3 * w + 9) * ps;
        buf[i] = 100;
        buf[i + 2] = 100;
        assert_eq!(first(&buf, ChromaSampling::Cs444), (Channel::R, 3));
    }

    #[test]
    fn all_mismatches_are_collected() {
        let (w, h) = (8, 8);
        let buf = vec![0u8; w * h * 3];
        let found: Vec<_> = packed_mismatches(
            &buf,
            w,
            h,
            PixelFormat::Rgb,
            ChromaSampling::Cs444,
            ScaleFactor::ONE,
            Orientation::TopDown,
        )
        .unwrap()
        .collect();
        // Every pixel is white: three failing channels each
        assert_eq!(found.len(), w * h * 3);
    }

    #[test]
    fn gray_sampling_expects_luma_in_color_buffers() {
        let (w, h) = (17, 18);
        let mut buf = vec![0u8; w * h * 4];
        for row in 0..h {
            for col in 0..w {
                let y = Pattern::FULL.swatch(row, col).luma();
                let i = (row * w + col) * 4;
                buf[i + 1..i + 4].fill(y);
            }
        }
        verify_packed(
            &buf,
            w,
            h,
            PixelFormat::Xbgr,
            ChromaSampling::Gray,
            ScaleFactor::ONE,
            Orientation::TopDown,
        )
        .unwrap();
    }

    #[test]
    fn short_buffer_is_rejected() {
        let err = verify_packed(
            &[0u8; 5],
            2,
            2,
            PixelFormat::Rgb,
            ChromaSampling::Cs444,
            ScaleFactor::ONE,
            Orientation::TopDown,
        )
        .unwrap_err();
        assert!(matches!(err.into_inner(), Error::InvalidBuffer { .. }));
    }

    #[test]
    fn dump_prints_triplets() {
        let buf = pattern(2, 1, PixelFormat::Bgrx, Orientation::TopDown);
        let text = PackedDump::new(&buf, 2, 1, PixelFormat::Bgrx).to_string();
        assert_eq!(text, "255/255/255 255/255/255 \n");
    }
}
