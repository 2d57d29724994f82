//! EZFIO global configuration options.

use std::sync::OnceLock;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::codec::GzipCompressionLevel;

/// Global configuration options for the ezfio crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Gzip Compression Level
/// > default: `9`
///
/// The compression level of newly written array records.
/// Any level can be read.
///
/// ## Format Version
/// > default: `"2.0.7"`
///
/// The version string written to the `.version` marker of newly created roots and sections.
///
/// ## Library
/// > default: `"ezfio-rs <crate version>"`
///
/// The library identifier written to `ezfio/library` when a new root is created.
#[derive(Debug)]
pub struct Config {
    gzip_compression_level: GzipCompressionLevel,
    format_version: String,
    library: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gzip_compression_level: GzipCompressionLevel::DEFAULT,
            format_version: "2.0.7".to_string(),
            library: concat!("ezfio-rs ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Get the [gzip compression level](#gzip-compression-level) configuration.
    #[must_use]
    pub fn gzip_compression_level(&self) -> GzipCompressionLevel {
        self.gzip_compression_level
    }

    /// Set the [gzip compression level](#gzip-compression-level) configuration.
    pub fn set_gzip_compression_level(&mut self, compression_level: GzipCompressionLevel) {
        self.gzip_compression_level = compression_level;
    }

    /// Get the [format version](#format-version) configuration.
    #[must_use]
    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    /// Set the [format version](#format-version) configuration.
    pub fn set_format_version(&mut self, format_version: impl Into<String>) {
        self.format_version = format_version.into();
    }

    /// Get the [library](#library) configuration.
    #[must_use]
    pub fn library(&self) -> &str {
        &self.library
    }

    /// Set the [library](#library) configuration.
    pub fn set_library(&mut self, library: impl Into<String>) {
        self.library = library.into();
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global ezfio configuration.
///
/// The guard should not be held across store operations, which read the configuration themselves.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).read()
}

/// Returns a mutable reference to the global ezfio configuration.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).write()
}
