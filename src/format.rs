//! Pixel format, chroma sampling and orientation tables
//!
//! These are the only static tables in the crate. The pattern generator, both
//! verifiers and the reference codec all address pixels through them.

use rgb::Rgb;

/// Byte offsets of the color channels within one packed pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelOffsets {
    /// Red channel offset
    pub r: usize,
    /// Green channel offset
    pub g: usize,
    /// Blue channel offset
    pub b: usize,
}

/// Packed pixel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 3 bytes: red, green, blue
    Rgb,
    /// 3 bytes: blue, green, red
    Bgr,
    /// 4 bytes: red, green, blue, padding
    Rgbx,
    /// 4 bytes: blue, green, red, padding
    Bgrx,
    /// 4 bytes: padding, blue, green, red
    Xbgr,
    /// 4 bytes: padding, red, green, blue
    Xrgb,
    /// 1 byte: luma
    Gray,
}

impl PixelFormat {
    /// Every supported format
    pub const ALL: [PixelFormat; 7] = [
        PixelFormat::Rgb,
        PixelFormat::Bgr,
        PixelFormat::Rgbx,
        PixelFormat::Bgrx,
        PixelFormat::Xbgr,
        PixelFormat::Xrgb,
        PixelFormat::Gray,
    ];

    /// Formats with a 3-byte stride
    pub const THREE_BYTE: [PixelFormat; 2] = [PixelFormat::Rgb, PixelFormat::Bgr];

    /// Formats with a 4-byte stride
    pub const FOUR_BYTE: [PixelFormat; 4] = [
        PixelFormat::Rgbx,
        PixelFormat::Bgrx,
        PixelFormat::Xbgr,
        PixelFormat::Xrgb,
    ];

    /// Bytes per pixel
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb | PixelFormat::Bgr => 3,
            PixelFormat::Rgbx | PixelFormat::Bgrx | PixelFormat::Xbgr | PixelFormat::Xrgb => 4,
            PixelFormat::Gray => 1,
        }
    }

    /// Color channel offsets, or `None` for grayscale
    pub fn channel_offsets(self) -> Option<ChannelOffsets> {
        let (r, g, b) = match self {
            PixelFormat::Rgb | PixelFormat::Rgbx => (0, 1, 2),
            PixelFormat::Bgr | PixelFormat::Bgrx => (2, 1, 0),
            PixelFormat::Xbgr => (3, 2, 1),
            PixelFormat::Xrgb => (1, 2, 3),
            PixelFormat::Gray => return None,
        };
        Some(ChannelOffsets { r, g, b })
    }

    /// Returns true for the single-channel format
    pub fn is_gray(self) -> bool {
        self == PixelFormat::Gray
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::Rgb => "RGB",
            PixelFormat::Bgr => "BGR",
            PixelFormat::Rgbx => "RGBX",
            PixelFormat::Bgrx => "BGRX",
            PixelFormat::Xbgr => "XBGR",
            PixelFormat::Xrgb => "XRGB",
            PixelFormat::Gray => "Grayscale",
        }
    }

    /// Read the pixel starting at `pixel` as RGB
    ///
    /// Grayscale pixels read as `r == g == b`.
    #[inline]
    pub(crate) fn read(self, pixel: &[u8]) -> Rgb<u8> {
        match self.channel_offsets() {
            Some(o) => Rgb {
                r: pixel[o.r],
                g: pixel[o.g],
                b: pixel[o.b],
            },
            None => Rgb {
                r: pixel[0],
                g: pixel[0],
                b: pixel[0],
            },
        }
    }
}

/// Chroma subsampling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChromaSampling {
    /// 4:4:4 - no chroma subsampling
    Cs444,
    /// 4:2:2 - chroma is half resolution horizontally
    Cs422,
    /// 4:2:0 - chroma is half resolution in both dimensions
    Cs420,
    /// Luma only, no chroma planes
    Gray,
}

impl ChromaSampling {
    /// Every supported mode
    pub const ALL: [ChromaSampling; 4] = [
        ChromaSampling::Cs444,
        ChromaSampling::Cs422,
        ChromaSampling::Cs420,
        ChromaSampling::Gray,
    ];

    /// Horizontal subsampling factor
    pub fn h_factor(self) -> usize {
        match self {
            ChromaSampling::Cs422 | ChromaSampling::Cs420 => 2,
            ChromaSampling::Cs444 | ChromaSampling::Gray => 1,
        }
    }

    /// Vertical subsampling factor
    pub fn v_factor(self) -> usize {
        match self {
            ChromaSampling::Cs420 => 2,
            ChromaSampling::Cs444 | ChromaSampling::Cs422 | ChromaSampling::Gray => 1,
        }
    }

    /// Returns false when the mode carries luma only
    pub fn has_chroma(self) -> bool {
        self != ChromaSampling::Gray
    }

    /// Long display name, e.g. `4:2:0`
    pub fn name(self) -> &'static str {
        match self {
            ChromaSampling::Cs444 => "4:4:4",
            ChromaSampling::Cs422 => "4:2:2",
            ChromaSampling::Cs420 => "4:2:0",
            ChromaSampling::Gray => "GRAY",
        }
    }

    /// Short name, e.g. `420`
    pub fn short_name(self) -> &'static str {
        match self {
            ChromaSampling::Cs444 => "444",
            ChromaSampling::Cs422 => "422",
            ChromaSampling::Cs420 => "420",
            ChromaSampling::Gray => "GRAY",
        }
    }
}

/// Vertical order of rows in a packed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// First row in memory is the top of the image
    #[default]
    TopDown,
    /// First row in memory is the bottom of the image
    BottomUp,
}

impl Orientation {
    /// Both orientations, top-down first
    pub const ALL: [Orientation; 2] = [Orientation::TopDown, Orientation::BottomUp];

    /// Map a logical row (0 = top) to its row in memory
    #[inline]
    pub fn physical_row(self, row: usize, height: usize) -> usize {
        match self {
            Orientation::TopDown => row,
            Orientation::BottomUp => height - 1 - row,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Orientation::TopDown => "Top-Down",
            Orientation::BottomUp => "Bottom-Up",
        }
    }
}

/// Integer downscale divisor applied to both dimensions at decode time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScaleFactor(u8);

impl ScaleFactor {
    /// Full resolution
    pub const ONE: Self = Self(1);
    /// Every supported divisor, largest output first
    pub const ALL: [ScaleFactor; 4] = [Self(1), Self(2), Self(4), Self(8)];

    /// Create a scale factor; only 1, 2, 4 and 8 are valid
    pub fn new(divisor: u8) -> Option<Self> {
        matches!(divisor, 1 | 2 | 4 | 8).then_some(Self(divisor))
    }

    /// The divisor
    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// `ceil(dim / divisor)`
    #[inline]
    pub fn scale(self, dim: usize) -> usize {
        dim.div_ceil(self.get())
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::ONE
    }
}
