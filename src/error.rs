//! Error types for pixel-oracle

use core::fmt;

use enough::StopReason;

use crate::format::ChromaSampling;

/// Sample channel named in a [`Mismatch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Red channel of a packed pixel
    R,
    /// Green channel of a packed pixel
    G,
    /// Blue channel of a packed pixel
    B,
    /// Luma plane sample
    Y,
    /// Blue-difference chroma plane sample
    U,
    /// Red-difference chroma plane sample
    V,
}

impl Channel {
    /// Single-letter name used in reports
    pub fn name(self) -> &'static str {
        match self {
            Channel::R => "R",
            Channel::G => "G",
            Channel::B => "B",
            Channel::Y => "Y",
            Channel::U => "U",
            Channel::V => "V",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A sample outside its tolerance window
///
/// Coordinates are logical: `row` counts from the top of the image regardless
/// of the buffer's orientation. For chroma planes they are chroma-plane
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Channel or plane that failed
    pub channel: Channel,
    /// Logical row
    pub row: usize,
    /// Column
    pub col: usize,
    /// Expected level
    pub expected: u8,
    /// Value found in the buffer
    pub actual: u8,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Comp. {} at {},{} should be {}, not {}",
            self.channel, self.row, self.col, self.expected, self.actual
        )
    }
}

/// Image properties reported by a codec header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Native image width
    pub width: usize,
    /// Native image height
    pub height: usize,
    /// Native chroma subsampling
    pub sampling: ChromaSampling,
}

/// Error type for pixel-oracle operations
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Planar buffer size disagrees with the computed layout
    #[error("Incorrect size {actual}. Should be {expected}")]
    LayoutMismatch {
        /// Size from [`crate::PlanarLayout`]
        expected: usize,
        /// Size of the buffer under test
        actual: usize,
    },

    /// A sample fell outside its tolerance window
    #[error("{0}")]
    ValueMismatch(Mismatch),

    /// Codec header disagrees with the image that was encoded
    #[error("Incorrect header: expected {expected:?}, got {actual:?}")]
    HeaderMismatch {
        /// Properties of the encoded image
        expected: Header,
        /// Properties reported by the codec
        actual: Header,
    },

    /// Codec scaled-size computation disagrees with the requested scale
    #[error("Scaled size mismatch: expected {expected:?}, got {actual:?}")]
    ScaledSizeMismatch {
        /// `(width, height)` at the requested scale
        expected: (usize, usize),
        /// `(width, height)` reported by the codec
        actual: (usize, usize),
    },

    /// Width or height is zero or too large
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Image width
        width: usize,
        /// Image height
        height: usize,
    },

    /// Pixel buffer is too short for the described image
    #[error("Buffer of {actual} bytes is too short, need {required}")]
    InvalidBuffer {
        /// Bytes required by the image description
        required: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Destination buffer cannot hold the codec output
    #[error("Destination buffer too small: need {required} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes the codec needs to write
        required: usize,
        /// Capacity of the destination
        available: usize,
    },

    /// Requested output size is not reachable with any supported scaling factor
    #[error("Unsupported scaled size {width}x{height}")]
    UnsupportedScale {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },

    /// Quality outside 1..=100
    #[error("Invalid quality {0}")]
    InvalidQuality(u8),

    /// Compressed data could not be parsed
    #[error("Malformed data: {0}")]
    Malformed(&'static str),

    /// Operation was cancelled via Stop trait
    #[error("Operation cancelled: {0:?}")]
    Cancelled(StopReason),
}

impl From<StopReason> for Error {
    fn from(reason: StopReason) -> Self {
        Error::Cancelled(reason)
    }
}

impl From<Mismatch> for Error {
    fn from(mismatch: Mismatch) -> Self {
        Error::ValueMismatch(mismatch)
    }
}

/// Result type for pixel-oracle operations with location tracking
pub type Result<T, E = whereat::At<Error>> = core::result::Result<T, E>;
