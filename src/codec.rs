//! The codec contract exercised by the oracle
//!
//! A [`Codec`] turns packed pixels into some compressed representation and
//! back. The oracle never looks inside that representation; it only needs the
//! header queries and the two conversions below.

use whereat::at;

use crate::error::{Error, Header, Result};
use crate::format::{ChromaSampling, Orientation, PixelFormat, ScaleFactor};

/// A rational scaling factor offered by a decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingFactor {
    /// Numerator
    pub num: usize,
    /// Denominator
    pub denom: usize,
}

impl ScalingFactor {
    /// Create a factor of `num / denom`
    pub const fn new(num: usize, denom: usize) -> Self {
        Self { num, denom }
    }

    /// `ceil(dim * num / denom)`
    #[inline]
    pub fn scale(self, dim: usize) -> usize {
        (dim * self.num).div_ceil(self.denom)
    }

    /// The equivalent integer divisor, if this factor is `1/n` for a
    /// supported `n`
    pub fn divisor(self) -> Option<ScaleFactor> {
        if self.num != 1 {
            return None;
        }
        ScaleFactor::new(u8::try_from(self.denom).ok()?)
    }
}

impl From<ScaleFactor> for ScalingFactor {
    fn from(s: ScaleFactor) -> Self {
        Self::new(1, s.get())
    }
}

/// Options for [`Codec::compress_into`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressParams {
    /// Chroma subsampling of the output
    pub sampling: ChromaSampling,
    /// Quality, 1..=100
    pub quality: u8,
    /// Row order of the source buffer
    pub orientation: Orientation,
    /// Emit the planar YUV image instead of the compressed stream
    pub planar: bool,
}

impl CompressParams {
    /// Top-down, quality 100, compressed output
    pub fn new(sampling: ChromaSampling) -> Self {
        Self {
            sampling,
            quality: 100,
            orientation: Orientation::TopDown,
            planar: false,
        }
    }

    /// Set the quality
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Set the source row order
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Request planar output
    pub fn planar(mut self, planar: bool) -> Self {
        self.planar = planar;
        self
    }
}

/// Options for [`Codec::decompress`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressParams {
    /// Output width; a value below the native width requests downscaling
    pub width: usize,
    /// Output height
    pub height: usize,
    /// Output pixel format
    pub format: PixelFormat,
    /// Output row order
    pub orientation: Orientation,
    /// Emit the planar YUV image instead of packed pixels
    pub planar: bool,
}

impl DecompressParams {
    /// Top-down packed output of `width x height` pixels in `format`
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            orientation: Orientation::TopDown,
            planar: false,
        }
    }

    /// Set the output row order
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Request planar output
    pub fn planar(mut self, planar: bool) -> Self {
        self.planar = planar;
        self
    }
}

/// An image codec under test
pub trait Codec {
    /// Upper bound on the output of [`Codec::compress_into`] for any
    /// subsampling, quality or output kind
    ///
    /// Must not panic for any dimensions. Dimensions the codec rejects may
    /// report 0, leaving [`Codec::compress_into`] to return the error.
    fn compressed_bound(&self, width: usize, height: usize) -> usize;

    /// Compress `src` into `dst`, returning the number of bytes written
    ///
    /// Implementations must fail with [`Error::BufferTooSmall`] rather than
    /// write past `dst`.
    fn compress_into(
        &self,
        src: &[u8],
        width: usize,
        height: usize,
        format: PixelFormat,
        params: &CompressParams,
        dst: &mut [u8],
    ) -> Result<usize>;

    /// Read width, height and subsampling from compressed data
    fn read_header(&self, data: &[u8]) -> Result<Header>;

    /// Decompress `data` to packed pixels or planar YUV
    fn decompress(&self, data: &[u8], params: &DecompressParams) -> Result<Vec<u8>>;

    /// Supported scaling factors, largest first
    fn scaling_factors(&self) -> &[ScalingFactor];

    /// Compress into a freshly allocated buffer of [`Codec::compressed_bound`]
    /// bytes, truncated to the written length
    fn compress(
        &self,
        src: &[u8],
        width: usize,
        height: usize,
        format: PixelFormat,
        params: &CompressParams,
    ) -> Result<Vec<u8>> {
        let mut dst = vec![0u8; self.compressed_bound(width, height)];
        let len = self.compress_into(src, width, height, format, params, &mut dst)?;
        dst.truncate(len);
        Ok(dst)
    }

    /// Largest output size not exceeding `desired_width x desired_height`
    ///
    /// A desired dimension of 0 stands for the native one.
    fn scaled_size(
        &self,
        header: &Header,
        desired_width: usize,
        desired_height: usize,
    ) -> Result<(usize, usize)> {
        let dw = if desired_width == 0 { header.width } else { desired_width };
        let dh = if desired_height == 0 { header.height } else { desired_height };
        self.scaling_factors()
            .iter()
            .map(|sf| (sf.scale(header.width), sf.scale(header.height)))
            .find(|&(w, h)| w <= dw && h <= dh)
            .ok_or_else(|| {
                at(Error::UnsupportedScale {
                    width: desired_width,
                    height: desired_height,
                })
            })
    }
}
