//! # pixel-oracle
//!
//! Test oracle for JPEG codec pixel-format and chroma subsampling handling.
//!
//! The crate generates a deterministic pattern into packed pixel buffers,
//! computes the planar YUV layout a codec must produce, and verifies what the
//! codec hands back, packed or planar, against the same pattern.
//!
//! ## Quick Start
//!
//! ```
//! use pixel_oracle::{
//!     ChromaSampling, Codec, CompressParams, DecompressParams, Orientation, PixelFormat,
//!     ReferenceCodec, ScaleFactor, generate_pattern, verify_packed,
//! };
//!
//! let (w, h) = (35, 39);
//! let format = PixelFormat::Bgrx;
//! let mut src = vec![0u8; w * h * format.bytes_per_pixel()];
//! generate_pattern(&mut src, w, h, format, Orientation::BottomUp).unwrap();
//!
//! let codec = ReferenceCodec::new();
//! let params = CompressParams::new(ChromaSampling::Cs444).orientation(Orientation::BottomUp);
//! let data = codec.compress(&src, w, h, format, &params).unwrap();
//!
//! let out = codec
//!     .decompress(
//!         &data,
//!         &DecompressParams::new(w, h, format).orientation(Orientation::BottomUp),
//!     )
//!     .unwrap();
//! verify_packed(
//!     &out,
//!     w,
//!     h,
//!     format,
//!     ChromaSampling::Cs444,
//!     ScaleFactor::ONE,
//!     Orientation::BottomUp,
//! )
//! .unwrap();
//! ```
//!
//! ## Running the full matrix
//!
//! ```no_run
//! use pixel_oracle::{PlanarMode, ReferenceCodec, Suite, SuiteConfig, Unstoppable};
//!
//! let suite = Suite::new(ReferenceCodec::new(), SuiteConfig::new().planar(PlanarMode::Encode));
//! let report = suite.run(&Unstoppable).unwrap();
//! for failure in report.failures() {
//!     eprintln!("{failure}");
//! }
//! assert!(report.passed());
//! ```

mod codec;
mod config;
mod error;
mod format;
mod layout;
mod packed;
mod pattern;
mod planar;
mod reference;
mod suite;
pub mod tolerance;
mod ycc;

pub use codec::{Codec, CompressParams, DecompressParams, ScalingFactor};
pub use config::{PlanarMode, SuiteConfig};
pub use enough::{Stop, StopReason, Unstoppable};
pub use error::{Channel, Error, Header, Mismatch, Result};
pub use format::{ChannelOffsets, ChromaSampling, Orientation, PixelFormat, ScaleFactor};
pub use layout::{
    PITCH_ALIGN, PlanarLayout, checked_round_up, compute_planar_layout, round_up,
};
pub use packed::{PackedDump, packed_mismatches, verify_packed};
pub use pattern::{BLOCK_SIZE, HALFWAY, Pattern, Swatch, generate_pattern, packed_size};
pub use planar::{PlanarDump, planar_mismatches, verify_planar};
pub use reference::{HEADER_LEN, ReferenceCodec};
pub use suite::{
    CaseResult, Outcome, Step, Suite, SuiteReport, TestCase, buffer_size_regression, test_cases,
};
pub use ycc::{rgb_to_y, rgb_to_ycbcr, ycbcr_to_rgb};
