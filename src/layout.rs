//! Planar YUV buffer layout
//!
//! A planar buffer holds the luma plane followed by the U and V planes. Each
//! plane's width is padded to the subsampling factor and then to a 4-byte
//! pitch; heights are padded to the vertical factor.

use imgref::{Img, ImgRef, ImgRefMut};

use crate::format::ChromaSampling;

/// Row alignment of every plane
pub const PITCH_ALIGN: usize = 4;

/// Round `v` up to a multiple of the power of two `p`
#[inline]
pub const fn round_up(v: usize, p: usize) -> usize {
    (v + p - 1) & !(p - 1)
}

/// [`round_up`], or `None` if the result does not fit in `usize`
#[inline]
pub const fn checked_round_up(v: usize, p: usize) -> Option<usize> {
    match v.checked_add(p - 1) {
        Some(s) => Some(s & !(p - 1)),
        None => None,
    }
}

/// Dimensions and offsets of a planar image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanarLayout {
    /// Mode the layout was computed for
    pub sampling: ChromaSampling,
    /// Luma width padded to the horizontal factor
    pub padded_width: usize,
    /// Luma height padded to the vertical factor
    pub padded_height: usize,
    /// Chroma plane width
    pub chroma_width: usize,
    /// Chroma plane height
    pub chroma_height: usize,
    /// Bytes per luma row
    pub y_pitch: usize,
    /// Bytes per chroma row
    pub uv_pitch: usize,
    /// Bytes in the whole buffer
    pub total_size: usize,
}

impl PlanarLayout {
    /// Compute the layout of a `width x height` image
    ///
    /// Panics if the layout overflows `usize`; use [`PlanarLayout::checked_new`]
    /// for dimensions that come from untrusted input.
    pub fn new(width: usize, height: usize, sampling: ChromaSampling) -> Self {
        let (hsf, vsf) = (sampling.h_factor(), sampling.v_factor());
        let padded_width = round_up(width, hsf);
        let padded_height = round_up(height, vsf);
        let chroma_width = padded_width / hsf;
        let chroma_height = padded_height / vsf;
        let y_pitch = round_up(padded_width, PITCH_ALIGN);
        let uv_pitch = round_up(chroma_width, PITCH_ALIGN);
        let chroma_size = if sampling.has_chroma() {
            2 * uv_pitch * chroma_height
        } else {
            0
        };

        Self {
            sampling,
            padded_width,
            padded_height,
            chroma_width,
            chroma_height,
            y_pitch,
            uv_pitch,
            total_size: y_pitch * padded_height + chroma_size,
        }
    }

    /// Compute the layout, or `None` if any size overflows `usize`
    pub fn checked_new(width: usize, height: usize, sampling: ChromaSampling) -> Option<Self> {
        let (hsf, vsf) = (sampling.h_factor(), sampling.v_factor());
        let padded_width = checked_round_up(width, hsf)?;
        let padded_height = checked_round_up(height, vsf)?;
        let chroma_width = padded_width / hsf;
        let chroma_height = padded_height / vsf;
        let y_pitch = checked_round_up(padded_width, PITCH_ALIGN)?;
        let uv_pitch = checked_round_up(chroma_width, PITCH_ALIGN)?;
        let chroma_size = if sampling.has_chroma() {
            uv_pitch.checked_mul(chroma_height)?.checked_mul(2)?
        } else {
            0
        };

        Some(Self {
            sampling,
            padded_width,
            padded_height,
            chroma_width,
            chroma_height,
            y_pitch,
            uv_pitch,
            total_size: y_pitch.checked_mul(padded_height)?.checked_add(chroma_size)?,
        })
    }

    /// Byte offset of the U plane
    pub fn u_offset(&self) -> usize {
        self.y_pitch * self.padded_height
    }

    /// Byte offset of the V plane
    pub fn v_offset(&self) -> usize {
        self.u_offset() + self.uv_pitch * self.chroma_height
    }

    /// Luma plane of `buf`; `buf` must be at least `total_size` long
    pub fn y_plane<'a>(&self, buf: &'a [u8]) -> ImgRef<'a, u8> {
        Img::new_stride(
            &buf[..self.u_offset()],
            self.padded_width,
            self.padded_height,
            self.y_pitch,
        )
    }

    /// U plane of `buf`, or `None` for Gray
    pub fn u_plane<'a>(&self, buf: &'a [u8]) -> Option<ImgRef<'a, u8>> {
        self.chroma_plane(buf, self.u_offset())
    }

    /// V plane of `buf`, or `None` for Gray
    pub fn v_plane<'a>(&self, buf: &'a [u8]) -> Option<ImgRef<'a, u8>> {
        self.chroma_plane(buf, self.v_offset())
    }

    fn chroma_plane<'a>(&self, buf: &'a [u8], offset: usize) -> Option<ImgRef<'a, u8>> {
        self.sampling.has_chroma().then(|| {
            Img::new_stride(
                &buf[offset..offset + self.uv_pitch * self.chroma_height],
                self.chroma_width,
                self.chroma_height,
                self.uv_pitch,
            )
        })
    }

    /// Mutable views of all three planes; chroma views are `None` for Gray
    pub fn planes_mut<'a>(
        &self,
        buf: &'a mut [u8],
    ) -> (
        ImgRefMut<'a, u8>,
        Option<ImgRefMut<'a, u8>>,
        Option<ImgRefMut<'a, u8>>,
    ) {
        let (y, chroma) = buf[..self.total_size].split_at_mut(self.u_offset());
        let y = Img::new_stride(y, self.padded_width, self.padded_height, self.y_pitch);
        if !self.sampling.has_chroma() {
            return (y, None, None);
        }
        let (u, v) = chroma.split_at_mut(self.uv_pitch * self.chroma_height);
        let u = Img::new_stride(u, self.chroma_width, self.chroma_height, self.uv_pitch);
        let v = Img::new_stride(v, self.chroma_width, self.chroma_height, self.uv_pitch);
        (y, Some(u), Some(v))
    }
}

/// Planar layout of a `width x height` image
pub fn compute_planar_layout(width: usize, height: usize, sampling: ChromaSampling) -> PlanarLayout {
    PlanarLayout::new(width, height, sampling)
}
