//! Blob store configuration.
//!
//! Provides [`BlobStoreConfig`] for tuning the in-memory storage primitive
//! and the multipart upload limits. Values are loaded from `BLOBSTORE_*`
//! environment variables.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Five gibibytes, the largest single part accepted.
const FIVE_GIB: u64 = 5 * 1024 * 1024 * 1024;

/// Thirty-two mebibytes, the slice size used when splitting a put.
const THIRTY_TWO_MIB: usize = 32 * 1024 * 1024;

/// Blob store configuration.
///
/// # Examples
///
/// ```
/// use blobstack_core::config::BlobStoreConfig;
///
/// let config = BlobStoreConfig::default();
/// assert_eq!(config.default_location, "local");
/// assert_eq!(config.maximum_part_count, 10_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct BlobStoreConfig {
    /// Payloads larger than this (in bytes) are spilled to a temporary file.
    #[builder(default = 524_288)]
    pub max_memory_blob_size: usize,

    /// Location recorded for containers created without an explicit one.
    #[builder(default = String::from("local"))]
    pub default_location: String,

    /// Smallest part size advertised to callers. Not enforced.
    #[builder(default = 1)]
    pub minimum_part_size: u64,

    /// Largest accepted part size in bytes.
    #[builder(default = FIVE_GIB)]
    pub maximum_part_size: u64,

    /// Highest accepted part number.
    #[builder(default = 10_000)]
    pub maximum_part_count: u32,

    /// Slice size used by `PutOptions::multipart` puts.
    #[builder(default = THIRTY_TWO_MIB)]
    pub multipart_chunk_size: usize,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            max_memory_blob_size: 524_288,
            default_location: String::from("local"),
            minimum_part_size: 1,
            maximum_part_size: FIVE_GIB,
            maximum_part_count: 10_000,
            multipart_chunk_size: THIRTY_TWO_MIB,
            log_level: String::from("info"),
        }
    }
}

impl BlobStoreConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `BLOBSTORE_MAX_MEMORY_BLOB_SIZE` | `524288` |
    /// | `BLOBSTORE_DEFAULT_LOCATION` | `local` |
    /// | `BLOBSTORE_MINIMUM_PART_SIZE` | `1` |
    /// | `BLOBSTORE_MAXIMUM_PART_SIZE` | `5368709120` |
    /// | `BLOBSTORE_MAXIMUM_PART_COUNT` | `10000` |
    /// | `BLOBSTORE_MULTIPART_CHUNK_SIZE` | `33554432` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// Numbers that fail to parse keep their default.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(n) = env_number("BLOBSTORE_MAX_MEMORY_BLOB_SIZE") {
            config.max_memory_blob_size = n;
        }
        if let Ok(v) = std::env::var("BLOBSTORE_DEFAULT_LOCATION") {
            config.default_location = v;
        }
        if let Some(n) = env_number("BLOBSTORE_MINIMUM_PART_SIZE") {
            config.minimum_part_size = n;
        }
        if let Some(n) = env_number("BLOBSTORE_MAXIMUM_PART_SIZE") {
            config.maximum_part_size = n;
        }
        if let Some(n) = env_number("BLOBSTORE_MAXIMUM_PART_COUNT") {
            config.maximum_part_count = n;
        }
        if let Some(n) = env_number::<usize>("BLOBSTORE_MULTIPART_CHUNK_SIZE") {
            // A zero chunk size would never make progress.
            if n > 0 {
                config.multipart_chunk_size = n;
            }
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}

/// Read and parse a numeric environment variable.
fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
