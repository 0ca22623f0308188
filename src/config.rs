//! Suite configuration

/// Which side of the codec produces planar YUV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanarMode {
    /// Compress to a stream and decompress to packed pixels
    #[default]
    Packed,
    /// Compress straight to planar YUV and verify the planes
    Encode,
    /// Compress to a stream and decompress to planar YUV
    Decode,
}

/// Configuration for a conformance [`crate::Suite`] run
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    pub(crate) planar: PlanarMode,
    pub(crate) quality: u8,
    pub(crate) buffer_regression: bool,
    pub(crate) max_length: usize,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            planar: PlanarMode::Packed,
            quality: 100,
            buffer_regression: true,
            max_length: 2048,
        }
    }
}

impl SuiteConfig {
    /// Create a new suite configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Select packed, planar-encode or planar-decode runs
    pub fn planar(mut self, mode: PlanarMode) -> Self {
        self.planar = mode;
        self
    }

    /// Set the compression quality (default 100)
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Enable or disable the buffer-size regression sweep
    ///
    /// The sweep only runs in [`PlanarMode::Packed`].
    pub fn buffer_regression(mut self, enabled: bool) -> Self {
        self.buffer_regression = enabled;
        self
    }

    /// Set the exclusive upper bound on the long side of the regression sweep
    /// (default 2048)
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// The selected planar mode
    pub fn planar_mode(&self) -> PlanarMode {
        self.planar
    }
}
