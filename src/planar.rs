//! Verification of planar YUV buffers

use core::fmt;

use imgref::ImgRef;
use whereat::at;

use crate::error::{Channel, Error, Mismatch, Result};
use crate::format::ChromaSampling;
use crate::layout::PlanarLayout;
use crate::pattern::{BLOCK_SIZE, HALFWAY, Pattern};
use crate::tolerance;

/// Every mismatch in a planar buffer: Y first, then U and V interleaved
///
/// The buffer length must equal the layout's `total_size`, otherwise a
/// [`Error::LayoutMismatch`] is returned. Planar output is always at full
/// resolution, padding included.
pub fn planar_mismatches(
    buf: &[u8],
    width: usize,
    height: usize,
    sampling: ChromaSampling,
) -> Result<impl Iterator<Item = Mismatch> + '_> {
    let layout = PlanarLayout::checked_new(width, height, sampling)
        .ok_or_else(|| at(Error::InvalidDimensions { width, height }))?;
    if buf.len() != layout.total_size {
        return Err(at(Error::LayoutMismatch {
            expected: layout.total_size,
            actual: buf.len(),
        }));
    }

    let luma = (0..layout.padded_height).flat_map(move |row| {
        (0..layout.padded_width).filter_map(move |col| {
            let expected = Pattern::FULL.swatch(row, col).luma();
            let actual = buf[row * layout.y_pitch + col];
            tolerance::check(Channel::Y, row, col, expected, actual)
        })
    });

    let chroma = sampling
        .has_chroma()
        .then(move || chroma_mismatches(layout, buf))
        .into_iter()
        .flatten();

    Ok(luma.chain(chroma))
}

fn chroma_mismatches(layout: PlanarLayout, buf: &[u8]) -> impl Iterator<Item = Mismatch> + '_ {
    let (hsf, vsf) = (layout.sampling.h_factor(), layout.sampling.v_factor());
    let (u_offset, v_offset) = (layout.u_offset(), layout.v_offset());
    (0..layout.chroma_height).flat_map(move |row| {
        (0..layout.chroma_width).flat_map(move |col| {
            // Parity and band are taken in luma coordinates
            let even = (row * vsf / BLOCK_SIZE + col * hsf / BLOCK_SIZE) % 2 == 0;
            let (u, v) = Pattern::pick(row < HALFWAY / vsf, even).chroma();
            let i = row * layout.uv_pitch + col;
            [
                tolerance::check(Channel::U, row, col, u, buf[u_offset + i]),
                tolerance::check(Channel::V, row, col, v, buf[v_offset + i]),
            ]
            .into_iter()
            .flatten()
        })
    })
}

/// Verify a planar buffer, stopping at the first mismatch
///
/// On a value mismatch all three planes are dumped to the log before the
/// error is returned.
pub fn verify_planar(
    buf: &[u8],
    width: usize,
    height: usize,
    sampling: ChromaSampling,
) -> Result<()> {
    let first = planar_mismatches(buf, width, height, sampling)?.next();
    match first {
        Some(mismatch) => {
            let layout = PlanarLayout::new(width, height, sampling);
            log::warn!("{mismatch}\n{}", PlanarDump::new(buf, layout));
            Err(at(Error::ValueMismatch(mismatch)))
        }
        None => Ok(()),
    }
}

/// Text dump of the Y, U and V planes, padding columns excluded
pub struct PlanarDump<'a> {
    buf: &'a [u8],
    layout: PlanarLayout,
}

impl<'a> PlanarDump<'a> {
    /// Dump `buf`, which must be at least `layout.total_size` long
    pub fn new(buf: &'a [u8], layout: PlanarLayout) -> Self {
        Self { buf, layout }
    }
}

fn write_plane(f: &mut fmt::Formatter<'_>, plane: ImgRef<'_, u8>) -> fmt::Result {
    for row in plane.rows() {
        for v in row {
            write!(f, "{v:3} ")?;
        }
        writeln!(f)?;
    }
    writeln!(f)
}

impl fmt::Display for PlanarDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_plane(f, self.layout.y_plane(self.buf))?;
        if let Some(u) = self.layout.u_plane(self.buf) {
            write_plane(f, u)?;
        }
        if let Some(v) = self.layout.v_plane(self.buf) {
            write_plane(f, v)?;
        }
        Ok(())
    }
}
