//! The gzip compression applied to array records.

use std::io::{Read, Write};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};

/// A gzip compression level, `0` (none) to `9` (best).
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct GzipCompressionLevel(u32);

/// A gzip compression level outside of `0..=9`.
#[derive(Debug, thiserror::Error)]
#[error("gzip compression level {0} is out of range 0..=9")]
pub struct GzipCompressionLevelError(u32);

impl TryFrom<u32> for GzipCompressionLevel {
    type Error = GzipCompressionLevelError;

    fn try_from(level: u32) -> Result<Self, Self::Error> {
        (level <= 9)
            .then_some(Self(level))
            .ok_or(GzipCompressionLevelError(level))
    }
}

impl From<GzipCompressionLevel> for Compression {
    fn from(level: GzipCompressionLevel) -> Self {
        Self::new(level.0)
    }
}

impl GzipCompressionLevel {
    /// Best compression, as written by the Fortran and Python libraries.
    pub const DEFAULT: Self = Self(9);

    /// The level as an integer.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Compresses array record payloads into gzip streams and back.
#[derive(Clone, Debug)]
pub struct GzipCodec {
    level: GzipCompressionLevel,
}

impl Default for GzipCodec {
    fn default() -> Self {
        GzipCompressionLevel::DEFAULT.into()
    }
}

impl From<GzipCompressionLevel> for GzipCodec {
    fn from(level: GzipCompressionLevel) -> Self {
        Self { level }
    }
}

impl GzipCodec {
    /// Create a codec compressing at `level`.
    ///
    /// # Errors
    /// Returns [`GzipCompressionLevelError`] if `level` is greater than 9.
    pub fn new(level: u32) -> Result<Self, GzipCompressionLevelError> {
        Ok(GzipCompressionLevel::try_from(level)?.into())
    }

    /// The compression level of written records.
    #[must_use]
    pub const fn compression_level(&self) -> GzipCompressionLevel {
        self.level
    }

    /// Compress the text `payload` of an array record.
    ///
    /// # Errors
    /// Returns an IO error if compression fails.
    pub fn encode(&self, payload: Vec<u8>) -> std::io::Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(payload.len() / 4), self.level.into());
        encoder.write_all(&payload)?;
        encoder.finish()
    }

    /// Decompress the contents of an array record file.
    ///
    /// # Errors
    /// Returns an IO error if `file` is not a complete gzip stream.
    pub fn decode(&self, file: Vec<u8>) -> std::io::Result<Vec<u8>> {
        let mut payload = Vec::with_capacity(file.len() * 4);
        GzDecoder::new(file.as_slice()).read_to_end(&mut payload)?;
        Ok(payload)
    }
}
