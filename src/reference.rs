//! Uncompressed YCbCr reference codec
//!
//! [`ReferenceCodec`] stores the planar YCbCr image behind a 16-byte header.
//! It performs the color conversion, chroma subsampling, edge padding and
//! downscaled decode that a JPEG codec performs around its DCT stage, and
//! nothing else, so a conforming codec and this one agree on every pattern
//! sample to within one level.
//!
//! Stream layout (all integers little-endian):
//!
//! ```text
//! 0..4    magic "PXYC"
//! 4       version (1)
//! 5       subsampling (0 = 4:4:4, 1 = 4:2:2, 2 = 4:2:0, 3 = gray)
//! 6       quality
//! 7       reserved (0)
//! 8..12   width  (u32)
//! 12..16  height (u32)
//! 16..    planar image, see `PlanarLayout`
//! ```

use imgref::{ImgRef, ImgVec};
use rgb::Rgb;
use whereat::at;

use crate::codec::{Codec, CompressParams, DecompressParams, ScalingFactor};
use crate::error::{Error, Header, Result};
use crate::format::{ChromaSampling, Orientation, PixelFormat, ScaleFactor};
use crate::layout::PlanarLayout;
use crate::pattern::packed_size;
use crate::ycc;

const MAGIC: &[u8; 4] = b"PXYC";
const VERSION: u8 = 1;
/// Bytes before the planar image
pub const HEADER_LEN: usize = 16;

const SCALING_FACTORS: [ScalingFactor; 4] = [
    ScalingFactor::new(1, 1),
    ScalingFactor::new(1, 2),
    ScalingFactor::new(1, 4),
    ScalingFactor::new(1, 8),
];

fn sampling_code(sampling: ChromaSampling) -> u8 {
    match sampling {
        ChromaSampling::Cs444 => 0,
        ChromaSampling::Cs422 => 1,
        ChromaSampling::Cs420 => 2,
        ChromaSampling::Gray => 3,
    }
}

fn sampling_from_code(code: u8) -> Option<ChromaSampling> {
    ChromaSampling::ALL.into_iter().find(|&s| sampling_code(s) == code)
}

/// Uncompressed planar YCbCr codec
///
/// Quality is validated and recorded in the header but does not affect the
/// stored samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceCodec;

impl ReferenceCodec {
    /// Create the codec
    pub fn new() -> Self {
        Self
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 || u32::try_from(width).is_err() || u32::try_from(height).is_err()
    {
        return Err(at(Error::InvalidDimensions { width, height }));
    }
    Ok(())
}

/// Layout of an image whose dimensions may come from a stream header
fn checked_layout(width: usize, height: usize, sampling: ChromaSampling) -> Result<PlanarLayout> {
    check_dimensions(width, height)?;
    PlanarLayout::checked_new(width, height, sampling)
        .ok_or_else(|| at(Error::InvalidDimensions { width, height }))
}

/// Read the source pixel at logical `(row, col)` as RGB, clamping to the edge
fn read_clamped(
    src: &[u8],
    width: usize,
    height: usize,
    format: PixelFormat,
    orientation: Orientation,
    row: usize,
    col: usize,
) -> Rgb<u8> {
    let row = orientation.physical_row(row.min(height - 1), height);
    let col = col.min(width - 1);
    let ps = format.bytes_per_pixel();
    format.read(&src[(row * width + col) * ps..])
}

/// Write the planar image of `src` into `planes`, which is exactly
/// `layout.total_size` bytes
fn encode_planes(
    src: &[u8],
    width: usize,
    height: usize,
    format: PixelFormat,
    orientation: Orientation,
    layout: &PlanarLayout,
    planes: &mut [u8],
) {
    let (pw, ph) = (layout.padded_width, layout.padded_height);
    let (mut y_plane, u_plane, v_plane) = layout.planes_mut(planes);

    // Full-resolution chroma, padded by edge replication
    let mut cb_full = ImgVec::new(vec![128u8; pw * ph], pw, ph);
    let mut cr_full = ImgVec::new(vec![128u8; pw * ph], pw, ph);

    for row in 0..ph {
        for col in 0..pw {
            let px = read_clamped(src, width, height, format, orientation, row, col);
            let (y, cb, cr) = if format.is_gray() {
                (px.r, 128, 128)
            } else {
                ycc::rgb_to_ycbcr(px)
            };
            y_plane[(col, row)] = y;
            cb_full[(col, row)] = cb;
            cr_full[(col, row)] = cr;
        }
    }

    let (Some(mut u_plane), Some(mut v_plane)) = (u_plane, v_plane) else {
        return;
    };
    let (hsf, vsf) = (layout.sampling.h_factor(), layout.sampling.v_factor());
    for row in 0..layout.chroma_height {
        for col in 0..layout.chroma_width {
            u_plane[(col, row)] = box_average(cb_full.as_ref(), col * hsf, row * vsf, hsf, vsf);
            v_plane[(col, row)] = box_average(cr_full.as_ref(), col * hsf, row * vsf, hsf, vsf);
        }
    }
}

/// Rounded mean of the `w x h` cell at `(x, y)`, clipped to the image
fn box_average(img: ImgRef<'_, u8>, x: usize, y: usize, w: usize, h: usize) -> u8 {
    let x_end = (x + w).min(img.width());
    let y_end = (y + h).min(img.height());
    let sum: u32 = img
        .sub_image(x, y, x_end - x, y_end - y)
        .pixels()
        .map(u32::from)
        .sum();
    let n = ((x_end - x) * (y_end - y)) as u32;
    ((sum + n / 2) / n) as u8
}

impl Codec for ReferenceCodec {
    /// Header plus the largest planar image over all samplings, or 0 when the
    /// dimensions cannot be compressed
    fn compressed_bound(&self, width: usize, height: usize) -> usize {
        ChromaSampling::ALL
            .into_iter()
            .try_fold(0usize, |max, s| {
                let planes = checked_layout(width, height, s).ok()?.total_size;
                Some(max.max(planes))
            })
            .and_then(|planes| planes.checked_add(HEADER_LEN))
            .unwrap_or(0)
    }

    fn compress_into(
        &self,
        src: &[u8],
        width: usize,
        height: usize,
        format: PixelFormat,
        params: &CompressParams,
        dst: &mut [u8],
    ) -> Result<usize> {
        let layout = checked_layout(width, height, params.sampling)?;
        if !(1..=100).contains(&params.quality) {
            return Err(at(Error::InvalidQuality(params.quality)));
        }
        let required = packed_size(width, height, format)?;
        if src.len() < required {
            return Err(at(Error::InvalidBuffer {
                required,
                actual: src.len(),
            }));
        }

        let header_len = if params.planar { 0 } else { HEADER_LEN };
        let total = layout
            .total_size
            .checked_add(header_len)
            .ok_or_else(|| at(Error::InvalidDimensions { width, height }))?;
        if dst.len() < total {
            return Err(at(Error::BufferTooSmall {
                required: total,
                available: dst.len(),
            }));
        }

        let (header, planes) = dst[..total].split_at_mut(header_len);
        if !params.planar {
            header[0..4].copy_from_slice(MAGIC);
            header[4] = VERSION;
            header[5] = sampling_code(params.sampling);
            header[6] = params.quality;
            header[7] = 0;
            header[8..12].copy_from_slice(&(width as u32).to_le_bytes());
            header[12..16].copy_from_slice(&(height as u32).to_le_bytes());
        }
        planes.fill(0);
        encode_planes(
            src,
            width,
            height,
            format,
            params.orientation,
            &layout,
            planes,
        );

        log::trace!(
            "compressed {width}x{height} {} -> {} ({total} bytes)",
            format.name(),
            params.sampling.name()
        );
        Ok(total)
    }

    fn read_header(&self, data: &[u8]) -> Result<Header> {
        if data.len() < HEADER_LEN {
            return Err(at(Error::Malformed("truncated header")));
        }
        if &data[0..4] != MAGIC {
            return Err(at(Error::Malformed("bad magic")));
        }
        if data[4] != VERSION {
            return Err(at(Error::Malformed("unsupported version")));
        }
        let sampling =
            sampling_from_code(data[5]).ok_or_else(|| at(Error::Malformed("bad subsampling")))?;
        let width = u32::from_le_bytes([data[8], data[9], data[10], data[11]]) as usize;
        let height = u32::from_le_bytes([data[12], data[13], data[14], data[15]]) as usize;
        check_dimensions(width, height)?;
        Ok(Header {
            width,
            height,
            sampling,
        })
    }

    fn decompress(&self, data: &[u8], params: &DecompressParams) -> Result<Vec<u8>> {
        let header = self.read_header(data)?;
        let layout = checked_layout(header.width, header.height, header.sampling)?;
        let planes = data
            .get(HEADER_LEN..)
            .and_then(|p| p.get(..layout.total_size))
            .ok_or_else(|| at(Error::Malformed("truncated planes")))?;

        if params.planar {
            return Ok(planes.to_vec());
        }

        let scale = SCALING_FACTORS
            .iter()
            .find(|sf| {
                sf.scale(header.width) == params.width && sf.scale(header.height) == params.height
            })
            .and_then(|sf| sf.divisor())
            .ok_or_else(|| {
                at(Error::UnsupportedScale {
                    width: params.width,
                    height: params.height,
                })
            })?;

        let full = decode_rgb(&header, &layout, planes, params.format);
        let scaled = downscale(full.as_ref(), scale);
        Ok(write_packed(scaled.as_ref(), params.format, params.orientation))
    }

    fn scaling_factors(&self) -> &[ScalingFactor] {
        &SCALING_FACTORS
    }
}

/// Full-resolution RGB image of the planes
///
/// Luma-only sources and Gray output carry luma in every channel.
fn decode_rgb(
    header: &Header,
    layout: &PlanarLayout,
    planes: &[u8],
    format: PixelFormat,
) -> ImgVec<Rgb<u8>> {
    let (w, h) = (header.width, header.height);
    let y_plane = layout.y_plane(planes);
    let chroma = layout.u_plane(planes).zip(layout.v_plane(planes));
    let (hsf, vsf) = (header.sampling.h_factor(), header.sampling.v_factor());

    let mut out = Vec::with_capacity(w * h);
    for row in 0..h {
        for col in 0..w {
            let y = y_plane[(col, row)];
            let px = match &chroma {
                Some((u, v)) if !format.is_gray() => {
                    let (cx, cy) = (col / hsf, row / vsf);
                    ycc::ycbcr_to_rgb(y, u[(cx, cy)], v[(cx, cy)])
                }
                _ => Rgb { r: y, g: y, b: y },
            };
            out.push(px);
        }
    }
    ImgVec::new(out, w, h)
}

/// Box-filter `img` by `scale` in both dimensions
fn downscale(img: ImgRef<'_, Rgb<u8>>, scale: ScaleFactor) -> ImgVec<Rgb<u8>> {
    let s = scale.get();
    if s == 1 {
        return ImgVec::new(img.pixels().collect(), img.width(), img.height());
    }
    let (w, h) = (scale.scale(img.width()), scale.scale(img.height()));
    let mut out = Vec::with_capacity(w * h);
    for row in 0..h {
        for col in 0..w {
            let (x, y) = (col * s, row * s);
            let cell = img.sub_image(x, y, s.min(img.width() - x), s.min(img.height() - y));
            let n = (cell.width() * cell.height()) as u32;
            let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
            for px in cell.pixels() {
                r += px.r as u32;
                g += px.g as u32;
                b += px.b as u32;
            }
            out.push(Rgb {
                r: ((r + n / 2) / n) as u8,
                g: ((g + n / 2) / n) as u8,
                b: ((b + n / 2) / n) as u8,
            });
        }
    }
    ImgVec::new(out, w, h)
}

/// Serialise `img` as packed pixels; padding bytes are 0xFF
fn write_packed(img: ImgRef<'_, Rgb<u8>>, format: PixelFormat, orientation: Orientation) -> Vec<u8> {
    let (w, h) = (img.width(), img.height());
    let ps = format.bytes_per_pixel();
    let mut out = vec![0xFFu8; w * h * ps];
    for (row, line) in img.rows().enumerate() {
        let start = orientation.physical_row(row, h) * w * ps;
        let dst = &mut out[start..start + w * ps];
        for (px, pixel) in line.iter().zip(dst.chunks_exact_mut(ps)) {
            match format.channel_offsets() {
                Some(o) => {
                    pixel[o.r] = px.r;
                    pixel[o.g] = px.g;
                    pixel[o.b] = px.b;
                }
                None => pixel[0] = px.r,
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::generate_pattern;

    #[test]
    fn header_round_trip() {
        let codec = ReferenceCodec::new();
        let (w, h) = (41, 35);
        let mut src = vec![0u8; w * h * 4];
        generate_pattern(&mut src, w, h, PixelFormat::Xrgb, Orientation::TopDown).unwrap();
        let data = codec
            .compress(
                &src,
                w,
                h,
                PixelFormat::Xrgb,
                &CompressParams::new(ChromaSampling::Cs422),
            )
            .unwrap();
        let header = codec.read_header(&data).unwrap();
        assert_eq!(
            header,
            Header {
                width: w,
                height: h,
                sampling: ChromaSampling::Cs422,
            }
        );
        assert_eq!(
            data.len(),
            HEADER_LEN + PlanarLayout::new(w, h, ChromaSampling::Cs422).total_size
        );
    }

    #[test]
    fn too_small_destination_is_refused() {
        let codec = ReferenceCodec::new();
        let src = vec![0u8; 4 * 4 * 3];
        let mut dst = vec![0u8; 20];
        let err = codec
            .compress_into(
                &src,
                4,
                4,
                PixelFormat::Rgb,
                &CompressParams::new(ChromaSampling::Cs444),
                &mut dst,
            )
            .unwrap_err()
            .into_inner();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                required: 64,
                available: 20
            }
        ));
        assert!(dst.iter().all(|&b| b == 0));
    }

    #[test]
    fn invalid_quality_is_refused() {
        let codec = ReferenceCodec::new();
        let src = vec![0u8; 3];
        let err = codec
            .compress(
                &src,
                1,
                1,
                PixelFormat::Rgb,
                &CompressParams::new(ChromaSampling::Cs444).quality(0),
            )
            .unwrap_err()
            .into_inner();
        assert!(matches!(err, Error::InvalidQuality(0)));
    }

    #[test]
    fn malformed_headers() {
        let codec = ReferenceCodec::new();
        assert!(codec.read_header(b"PXYC").is_err());
        let mut data = [0u8; HEADER_LEN];
        data[0..4].copy_from_slice(b"JFIF");
        assert!(codec.read_header(&data).is_err());
        data[0..4].copy_from_slice(MAGIC);
        data[4] = VERSION;
        data[5] = 9;
        assert!(codec.read_header(&data).is_err());
        data[5] = 0;
        // zero width
        assert!(codec.read_header(&data).is_err());
    }

    fn header(sampling: u8, width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity(HEADER_LEN);
        data.extend_from_slice(MAGIC);
        data.extend_from_slice(&[VERSION, sampling, 100, 0]);
        data.extend_from_slice(&width.to_le_bytes());
        data.extend_from_slice(&height.to_le_bytes());
        data
    }

    #[test]
    fn oversized_header_is_an_error() {
        let codec = ReferenceCodec::new();
        let data = header(2, u32::MAX, u32::MAX);
        let err = codec
            .decompress(&data, &DecompressParams::new(1, 1, PixelFormat::Rgb))
            .unwrap_err()
            .into_inner();
        assert!(matches!(err, Error::InvalidDimensions { .. }));

        // Layout fits but the planes are missing
        let data = header(0, 1 << 20, 1 << 20);
        let err = codec
            .decompress(&data, &DecompressParams::new(1 << 20, 1 << 20, PixelFormat::Rgb))
            .unwrap_err()
            .into_inner();
        assert!(matches!(err, Error::Malformed("truncated planes")));
    }

    #[test]
    fn oversized_dimensions_are_refused() {
        let codec = ReferenceCodec::new();
        let src = [0u8; 3];
        assert_eq!(codec.compressed_bound(usize::MAX, 1), 0);
        assert_eq!(codec.compressed_bound(1, usize::MAX), 0);
        for (w, h) in [(usize::MAX, 1), (1, usize::MAX), (usize::MAX, usize::MAX)] {
            let err = codec
                .compress(
                    &src,
                    w,
                    h,
                    PixelFormat::Rgb,
                    &CompressParams::new(ChromaSampling::Cs444),
                )
                .unwrap_err()
                .into_inner();
            assert!(matches!(err, Error::InvalidDimensions { .. }), "{w}x{h}");
        }
    }

    #[test]
    fn unsupported_target_size() {
        let codec = ReferenceCodec::new();
        let src = vec![0u8; 16 * 16 * 3];
        let data = codec
            .compress(
                &src,
                16,
                16,
                PixelFormat::Rgb,
                &CompressParams::new(ChromaSampling::Cs444),
            )
            .unwrap();
        let err = codec
            .decompress(&data, &DecompressParams::new(5, 5, PixelFormat::Rgb))
            .unwrap_err()
            .into_inner();
        assert!(matches!(err, Error::UnsupportedScale { width: 5, height: 5 }));
    }

    #[test]
    fn scaled_size_picks_largest_fitting_factor() {
        let codec = ReferenceCodec::new();
        let header = Header {
            width: 35,
            height: 39,
            sampling: ChromaSampling::Cs444,
        };
        assert_eq!(codec.scaled_size(&header, 0, 0).unwrap(), (35, 39));
        assert_eq!(codec.scaled_size(&header, 18, 20).unwrap(), (18, 20));
        assert_eq!(codec.scaled_size(&header, 17, 20).unwrap(), (9, 10));
        assert_eq!(codec.scaled_size(&header, 5, 5).unwrap(), (5, 5));
        assert!(codec.scaled_size(&header, 4, 4).is_err());
    }

    #[test]
    fn box_average_rounds_and_clips() {
        let img = ImgVec::new(vec![0u8, 255, 255, 255, 1, 2], 3, 2);
        assert_eq!(box_average(img.as_ref(), 0, 0, 2, 2), 128);
        assert_eq!(box_average(img.as_ref(), 2, 0, 2, 2), 129);
    }
}
