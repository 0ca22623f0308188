//! Suite runs against the reference codec and deliberately broken codecs

use pixel_oracle::{
    ChromaSampling, Codec, CompressParams, DecompressParams, Error, HEADER_LEN, Header,
    Orientation, Outcome, PixelFormat, PlanarMode, ReferenceCodec, Result, ScalingFactor, Step,
    Suite, SuiteConfig, Unstoppable, buffer_size_regression, test_cases,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn reference_codec_passes_packed_suite() {
    init();
    let report = Suite::new(ReferenceCodec::new(), SuiteConfig::new())
        .run(&Unstoppable)
        .unwrap();
    for failure in report.failures() {
        eprintln!("{failure}");
    }
    assert!(report.passed());
    assert!(matches!(report.regression, Some(Outcome::Passed)));

    // 444 and Gray decode at four scales after one compress step
    let cases = test_cases(PlanarMode::Packed).len();
    assert_eq!(report.results.len(), cases * 5);
}

#[test]
fn reference_codec_passes_planar_encode_suite() {
    init();
    let config = SuiteConfig::new().planar(PlanarMode::Encode);
    let report = Suite::new(ReferenceCodec::new(), config)
        .run(&Unstoppable)
        .unwrap();
    assert!(report.passed());
    assert!(report.regression.is_none());
    assert_eq!(report.results.len(), test_cases(PlanarMode::Encode).len());
    assert!(report.results.iter().all(|r| r.step == Step::Compress));
}

#[test]
fn reference_codec_passes_planar_decode_suite() {
    init();
    let config = SuiteConfig::new().planar(PlanarMode::Decode);
    let report = Suite::new(ReferenceCodec::new(), config)
        .run(&Unstoppable)
        .unwrap();
    assert!(report.passed());
    assert_eq!(report.results.len(), test_cases(PlanarMode::Decode).len() * 2);
}

/// Decoder that always writes top-down rows
struct IgnoresOrientation(ReferenceCodec);

impl Codec for IgnoresOrientation {
    fn compressed_bound(&self, width: usize, height: usize) -> usize {
        self.0.compressed_bound(width, height)
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
        self.0.compress_into(src, width, height, format, params, dst)
    }

    fn read_header(&self, data: &[u8]) -> Result<Header> {
        self.0.read_header(data)
    }

    fn decompress(&self, data: &[u8], params: &DecompressParams) -> Result<Vec<u8>> {
        self.0.decompress(data, &params.orientation(Orientation::TopDown))
    }

    fn scaling_factors(&self) -> &[ScalingFactor] {
        self.0.scaling_factors()
    }
}

#[test]
fn failures_are_collected_and_the_run_continues() {
    init();
    let config = SuiteConfig::new().buffer_regression(false);
    let report = Suite::new(IgnoresOrientation(ReferenceCodec::new()), config)
        .run(&Unstoppable)
        .unwrap();

    assert!(!report.passed());
    assert_eq!(report.results.len(), test_cases(PlanarMode::Packed).len() * 5);
    let failures: Vec<_> = report.failures().collect();
    assert!(!failures.is_empty());
    // Top-down cases still pass
    assert!(failures.iter().all(|r| r.case.orientation == Orientation::BottomUp));
    assert!(
        failures
            .iter()
            .all(|r| matches!(r.outcome, Outcome::Failed(Error::ValueMismatch(_))))
    );
    let line = failures[0].to_string();
    assert!(line.contains("Bottom-Up"), "{line}");
    assert!(line.contains("FAILED!"), "{line}");
}

/// Header reader that reports the wrong width
struct MislabelsWidth(ReferenceCodec);

impl Codec for MislabelsWidth {
    fn compressed_bound(&self, width: usize, height: usize) -> usize {
        self.0.compressed_bound(width, height)
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
        self.0.compress_into(src, width, height, format, params, dst)
    }

    fn read_header(&self, data: &[u8]) -> Result<Header> {
        let mut header = self.0.read_header(data)?;
        header.width += 1;
        Ok(header)
    }

    fn decompress(&self, data: &[u8], params: &DecompressParams) -> Result<Vec<u8>> {
        self.0.decompress(data, params)
    }

    fn scaling_factors(&self) -> &[ScalingFactor] {
        self.0.scaling_factors()
    }
}

#[test]
fn header_mismatch_fails_each_decode_step() {
    let config = SuiteConfig::new().buffer_regression(false);
    let report = Suite::new(MislabelsWidth(ReferenceCodec::new()), config)
        .run(&Unstoppable)
        .unwrap();
    for r in &report.results {
        match r.step {
            Step::Compress => assert!(r.outcome.passed()),
            Step::Decompress(_) => assert!(matches!(
                r.outcome,
                Outcome::Failed(Error::HeaderMismatch { expected, actual })
                    if actual.width == expected.width + 1
            )),
        }
    }
}

/// Claims a bound that leaves no room for chroma
struct TightBound(ReferenceCodec);

impl Codec for TightBound {
    fn compressed_bound(&self, width: usize, height: usize) -> usize {
        HEADER_LEN + width * height
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
        self.0.compress_into(src, width, height, format, params, dst)
    }

    fn read_header(&self, data: &[u8]) -> Result<Header> {
        self.0.read_header(data)
    }

    fn decompress(&self, data: &[u8], params: &DecompressParams) -> Result<Vec<u8>> {
        self.0.decompress(data, params)
    }

    fn scaling_factors(&self) -> &[ScalingFactor] {
        self.0.scaling_factors()
    }
}

#[test]
fn tight_bound_fails_regression_sweep() {
    let err = buffer_size_regression(&TightBound(ReferenceCodec::new()), 64, &Unstoppable)
        .unwrap_err()
        .into_inner();
    assert!(matches!(err, Error::BufferTooSmall { .. }));

    buffer_size_regression(&ReferenceCodec::new(), 64, &Unstoppable).unwrap();
}

#[test]
fn regression_sweep_covers_full_single_row_range() {
    init();
    let codec = ReferenceCodec::new();
    buffer_size_regression(&codec, 2048, &Unstoppable).unwrap();

    // Longest single-row images of the sweep, both orientations of the transpose
    for (w, h) in [(2047, 1), (1, 2047)] {
        let bound = codec.compressed_bound(w, h);
        assert!(bound >= HEADER_LEN + w.max(h) * 3);
        let src = vec![0u8; w * h * PixelFormat::Bgrx.bytes_per_pixel()];
        let mut dst = vec![0u8; bound];
        let params = CompressParams::new(ChromaSampling::Cs444);
        let written = codec
            .compress_into(&src, w, h, PixelFormat::Bgrx, &params, &mut dst)
            .unwrap();
        assert!(written <= bound);
    }
}

#[test]
fn regression_failure_fails_the_suite() {
    let config = SuiteConfig::new().max_length(16);
    let report = Suite::new(TightBound(ReferenceCodec::new()), config)
        .run(&Unstoppable)
        .unwrap();
    assert!(matches!(
        report.regression,
        Some(Outcome::Failed(Error::BufferTooSmall { .. }))
    ));
    assert!(!report.passed());
}
