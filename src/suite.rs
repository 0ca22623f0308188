//! Conformance suite driver
//!
//! Runs the format x subsampling x orientation x scale matrix against a
//! [`Codec`] and records one outcome per step. A failed step never stops the
//! run; [`SuiteReport::passed`] is the suite-wide verdict.

use core::fmt;

use enough::Stop;
use rgb::Rgb;
use whereat::at;

use crate::codec::{Codec, CompressParams, DecompressParams};
use crate::config::{PlanarMode, SuiteConfig};
use crate::error::{Error, Header, Result};
use crate::format::{ChromaSampling, Orientation, PixelFormat, ScaleFactor};
use crate::packed::{PackedDump, verify_packed};
use crate::pattern::{generate_pattern, packed_size};
use crate::planar::verify_planar;

/// One encoded image of the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestCase {
    /// Image width
    pub width: usize,
    /// Image height
    pub height: usize,
    /// Source and output pixel format
    pub format: PixelFormat,
    /// Subsampling requested from the encoder
    pub sampling: ChromaSampling,
    /// Row order of source and output buffers
    pub orientation: Orientation,
}

/// A group of cases sharing size and subsampling
#[derive(Debug, Clone, Copy)]
struct Group {
    width: usize,
    height: usize,
    formats: &'static [PixelFormat],
    sampling: ChromaSampling,
}

const fn group(
    width: usize,
    height: usize,
    formats: &'static [PixelFormat],
    sampling: ChromaSampling,
) -> Group {
    Group {
        width,
        height,
        formats,
        sampling,
    }
}

const THREE: &[PixelFormat] = &PixelFormat::THREE_BYTE;
const FOUR: &[PixelFormat] = &PixelFormat::FOUR_BYTE;
const GRAY: &[PixelFormat] = &[PixelFormat::Gray];
const RGB: &[PixelFormat] = &[PixelFormat::Rgb];

const PACKED_444: [Group; 2] = [
    group(35, 39, THREE, ChromaSampling::Cs444),
    group(39, 41, FOUR, ChromaSampling::Cs444),
];

const SUBSAMPLED: [Group; 4] = [
    group(41, 35, THREE, ChromaSampling::Cs422),
    group(35, 39, FOUR, ChromaSampling::Cs422),
    group(39, 41, THREE, ChromaSampling::Cs420),
    group(41, 35, FOUR, ChromaSampling::Cs420),
];

const PACKED_GRAY: [Group; 3] = [
    group(35, 39, GRAY, ChromaSampling::Gray),
    group(39, 41, THREE, ChromaSampling::Gray),
    group(41, 35, FOUR, ChromaSampling::Gray),
];

const PLANAR_DECODE: [Group; 8] = [
    group(48, 48, RGB, ChromaSampling::Cs444),
    group(35, 39, RGB, ChromaSampling::Cs444),
    group(48, 48, RGB, ChromaSampling::Cs422),
    group(39, 41, RGB, ChromaSampling::Cs422),
    group(48, 48, RGB, ChromaSampling::Cs420),
    group(41, 35, RGB, ChromaSampling::Cs420),
    group(48, 48, GRAY, ChromaSampling::Gray),
    group(35, 39, GRAY, ChromaSampling::Gray),
];

/// Every case the suite runs for `mode`, in run order
pub fn test_cases(mode: PlanarMode) -> Vec<TestCase> {
    let groups: Vec<Group> = match mode {
        PlanarMode::Packed => PACKED_444.iter().chain(&PACKED_GRAY).copied().collect(),
        PlanarMode::Encode => PACKED_444
            .iter()
            .chain(&SUBSAMPLED)
            .chain(&PACKED_GRAY)
            .copied()
            .collect(),
        PlanarMode::Decode => PLANAR_DECODE.to_vec(),
    };
    // Planar decode output has no row order
    let orientations: &[Orientation] = match mode {
        PlanarMode::Decode => &[Orientation::TopDown],
        PlanarMode::Packed | PlanarMode::Encode => &Orientation::ALL,
    };

    let mut cases = Vec::new();
    for g in groups {
        for &format in g.formats {
            for &orientation in orientations {
                cases.push(TestCase {
                    width: g.width,
                    height: g.height,
                    format,
                    sampling: g.sampling,
                    orientation,
                });
            }
        }
    }
    cases
}

/// Decode scales exercised for a case; scaled decodes run for packed 4:4:4
/// and Gray only
fn scales(mode: PlanarMode, sampling: ChromaSampling) -> &'static [ScaleFactor] {
    match (mode, sampling) {
        (PlanarMode::Packed, ChromaSampling::Cs444 | ChromaSampling::Gray) => &ScaleFactor::ALL,
        _ => &[ScaleFactor::ONE],
    }
}

/// The part of a case a result refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Compression; verified only for planar-encode runs
    Compress,
    /// Decompression at `1/scale`
    Decompress(ScaleFactor),
}

/// Pass or fail of one step
#[derive(Debug)]
pub enum Outcome {
    /// Step succeeded
    Passed,
    /// Step failed
    Failed(Error),
}

impl Outcome {
    fn from_result(result: Result<()>) -> Self {
        match result {
            Ok(()) => Outcome::Passed,
            Err(e) => Outcome::Failed(e.into_inner()),
        }
    }

    /// Returns true for [`Outcome::Passed`]
    pub fn passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

/// Outcome of one step of one case
#[derive(Debug)]
pub struct CaseResult {
    /// The case
    pub case: TestCase,
    /// The step
    pub step: Step,
    /// Its outcome
    pub outcome: Outcome,
}

impl fmt::Display for CaseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.case;
        match self.step {
            Step::Compress => write!(
                f,
                "{}x{} {} {} -> {}",
                c.width,
                c.height,
                c.format.name(),
                c.orientation.name(),
                c.sampling.name()
            )?,
            Step::Decompress(scale) => {
                write!(
                    f,
                    "{}x{} {} -> {} {}",
                    c.width,
                    c.height,
                    c.sampling.name(),
                    c.format.name(),
                    c.orientation.name()
                )?;
                if scale != ScaleFactor::ONE {
                    write!(f, " 1/{}", scale.get())?;
                }
            }
        }
        match &self.outcome {
            Outcome::Passed => write!(f, " ... Passed."),
            Outcome::Failed(e) => write!(f, " ... FAILED! {e}"),
        }
    }
}

/// Results of a suite run
#[derive(Debug, Default)]
pub struct SuiteReport {
    /// One entry per executed step, in run order
    pub results: Vec<CaseResult>,
    /// Buffer-size regression outcome, if the sweep ran
    pub regression: Option<Outcome>,
}

impl SuiteReport {
    /// Returns true when every step and the regression sweep passed
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.outcome.passed())
            && self.regression.as_ref().is_none_or(Outcome::passed)
    }

    /// Failed steps
    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|r| !r.outcome.passed())
    }
}

/// Conformance suite bound to a codec
pub struct Suite<C> {
    codec: C,
    config: SuiteConfig,
}

impl<C: Codec> Suite<C> {
    /// Create a suite for `codec`
    pub fn new(codec: C, config: SuiteConfig) -> Self {
        Self { codec, config }
    }

    /// Run every case, then the regression sweep if enabled
    ///
    /// Only cancellation aborts the run.
    pub fn run(&self, stop: &impl Stop) -> Result<SuiteReport> {
        let mode = self.config.planar;
        let mut report = SuiteReport::default();

        for case in test_cases(mode) {
            stop.check().map_err(|e| at(Error::Cancelled(e)))?;
            self.run_case(&case, &mut report.results);
        }

        if self.config.buffer_regression && mode == PlanarMode::Packed {
            let outcome = match buffer_size_regression(&self.codec, self.config.max_length, stop)
            {
                Ok(()) => Outcome::Passed,
                Err(e) => match e.into_inner() {
                    Error::Cancelled(reason) => return Err(at(Error::Cancelled(reason))),
                    e => Outcome::Failed(e),
                },
            };
            report.regression = Some(outcome);
        }

        let failed = report.failures().count();
        log::info!(
            "{} steps, {} failed, regression {:?}",
            report.results.len(),
            failed,
            report.regression.as_ref().map(Outcome::passed)
        );
        Ok(report)
    }

    fn run_case(&self, case: &TestCase, results: &mut Vec<CaseResult>) {
        let mode = self.config.planar;
        let compressed = self.compress_case(case);
        let data = match (compressed, mode) {
            (Ok(data), PlanarMode::Encode) => {
                let verified = verify_planar(&data, case.width, case.height, case.sampling);
                push(results, case, Step::Compress, verified);
                return;
            }
            (Ok(data), _) => {
                push(results, case, Step::Compress, Ok(()));
                data
            }
            (Err(e), _) => {
                push(results, case, Step::Compress, Err(e));
                return;
            }
        };

        for &scale in scales(mode, case.sampling) {
            let result = self.decompress_case(case, &data, scale);
            push(results, case, Step::Decompress(scale), result);
        }
    }

    fn compress_case(&self, case: &TestCase) -> Result<Vec<u8>> {
        let mut src = vec![0u8; packed_size(case.width, case.height, case.format)? + 1];
        generate_pattern(&mut src, case.width, case.height, case.format, case.orientation)?;
        let params = CompressParams::new(case.sampling)
            .quality(self.config.quality)
            .orientation(case.orientation)
            .planar(self.config.planar == PlanarMode::Encode);
        self.codec
            .compress(&src, case.width, case.height, case.format, &params)
    }

    fn decompress_case(&self, case: &TestCase, data: &[u8], scale: ScaleFactor) -> Result<()> {
        let expected = Header {
            width: case.width,
            height: case.height,
            sampling: case.sampling,
        };
        let header = self.codec.read_header(data)?;
        if header != expected {
            return Err(at(Error::HeaderMismatch {
                expected,
                actual: header,
            }));
        }

        let (sw, sh) = (scale.scale(case.width), scale.scale(case.height));
        let scaled = self.codec.scaled_size(&header, sw, sh)?;
        if scaled != (sw, sh) {
            return Err(at(Error::ScaledSizeMismatch {
                expected: (sw, sh),
                actual: scaled,
            }));
        }

        let planar = self.config.planar == PlanarMode::Decode;
        let params = DecompressParams::new(sw, sh, case.format)
            .orientation(case.orientation)
            .planar(planar);
        let out = self.codec.decompress(data, &params)?;

        if planar {
            return verify_planar(&out, case.width, case.height, case.sampling);
        }
        let verified = verify_packed(
            &out,
            sw,
            sh,
            case.format,
            case.sampling,
            scale,
            case.orientation,
        );
        if verified.is_err() {
            log::warn!("{}", PackedDump::new(&out, sw, sh, case.format));
        }
        verified
    }
}

fn push(results: &mut Vec<CaseResult>, case: &TestCase, step: Step, result: Result<()>) {
    let entry = CaseResult {
        case: *case,
        step,
        outcome: Outcome::from_result(result),
    };
    if entry.outcome.passed() {
        log::debug!("{entry}");
    } else {
        log::warn!("{entry}");
    }
    results.push(entry);
}

/// Colors cycled through the first regression image
const CYCLE: [Rgb<u8>; 9] = [
    Rgb { r: 0, g: 255, b: 0 },
    Rgb { r: 255, g: 0, b: 255 },
    Rgb { r: 255, g: 255, b: 0 },
    Rgb { r: 0, g: 0, b: 255 },
    Rgb { r: 0, g: 255, b: 255 },
    Rgb { r: 255, g: 0, b: 0 },
    Rgb { r: 255, g: 255, b: 255 },
    Rgb { r: 0, g: 0, b: 0 },
    Rgb { r: 255, g: 0, b: 0 },
];

fn fill_bgrx(buf: &mut [u8], color: impl Fn(usize) -> Rgb<u8>) {
    let format = PixelFormat::Bgrx;
    let Some(o) = format.channel_offsets() else {
        return;
    };
    for (i, pixel) in buf.chunks_exact_mut(format.bytes_per_pixel()).enumerate() {
        let c = color(i);
        pixel[o.r] = c.r;
        pixel[o.g] = c.g;
        pixel[o.b] = c.b;
    }
}

/// Compress hard-to-code images into buffers of exactly
/// [`Codec::compressed_bound`] bytes
///
/// Sweeps `i x j` for `j` in `1..48` and `i` in `1..48` (`1..max_length` when
/// `j == 1`), compressing a nine-color cycle at `i x j` and a white/black
/// alternation at `j x i`, both 4:4:4 at quality 100. Returns the first
/// failure.
pub fn buffer_size_regression<C: Codec>(
    codec: &C,
    max_length: usize,
    stop: &impl Stop,
) -> Result<()> {
    let format = PixelFormat::Bgrx;
    let params = CompressParams::new(ChromaSampling::Cs444);

    for j in 1..48 {
        stop.check().map_err(|e| at(Error::Cancelled(e)))?;
        let end = if j == 1 { max_length } else { 48 };
        for i in 1..end {
            let mut src = vec![0u8; i * j * format.bytes_per_pixel()];
            fill_bgrx(&mut src, |n| CYCLE[n % CYCLE.len()]);
            let mut dst = vec![0u8; codec.compressed_bound(i, j)];
            codec.compress_into(&src, i, j, format, &params, &mut dst)?;

            fill_bgrx(&mut src, |n| {
                let v = if n % 2 == 0 { 0xFF } else { 0 };
                Rgb { r: v, g: v, b: v }
            });
            let mut dst = vec![0u8; codec.compressed_bound(j, i)];
            codec.compress_into(&src, j, i, format, &params, &mut dst)?;
        }
    }
    log::debug!("buffer size regression passed up to {max_length}");
    Ok(())
}
