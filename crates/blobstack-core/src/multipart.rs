//! Multipart upload state encoded in blob keys.
//!
//! An upload has no storage of its own. It exists as a zero-length stub blob
//! and one blob per uploaded part, all under the reserved [`MPU_PREFIX`]:
//!
//! ```text
//! .mpus-{upload_id}-{blob_name}-stub
//! .mpus-{upload_id}-{blob_name}-{part_number}
//! ```
//!
//! Upload ids are dash-free hex, so the id ends at the first `-` after the
//! prefix and the suffix starts after the last one; blob names may contain
//! dashes freely. [`MultipartKey`] is the only place that builds or parses
//! these keys.
//!
//! The operations themselves live on [`crate::LocalBlobStore`].

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{BlobMetadata, PutOptions};

/// Reserved key prefix of every multipart stub and part blob.
pub const MPU_PREFIX: &str = ".mpus-";

/// Suffix of the stub key.
const STUB_SUFFIX: &str = "stub";

// ---------------------------------------------------------------------------
// MultipartKey
// ---------------------------------------------------------------------------

/// A decoded multipart artifact key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MultipartKey {
    /// The stub marking an upload in progress.
    Stub {
        /// The upload id.
        upload_id: String,
        /// Target blob name.
        blob_name: String,
    },
    /// One uploaded part.
    Part {
        /// The upload id.
        upload_id: String,
        /// Target blob name.
        blob_name: String,
        /// Part number, starting at 1.
        part_number: u32,
    },
}

impl MultipartKey {
    /// Key prefix shared by the stub and every part of an upload.
    #[must_use]
    pub fn upload_prefix(upload_id: &str, blob_name: &str) -> String {
        format!("{MPU_PREFIX}{upload_id}-{blob_name}-")
    }

    /// Encode into a blob key.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode a blob key. Returns `None` for keys that are not multipart
    /// artifacts.
    ///
    /// # Examples
    ///
    /// ```
    /// use blobstack_core::multipart::MultipartKey;
    ///
    /// let key = MultipartKey::decode(".mpus-abc123-dir/my-file.bin-7").unwrap();
    /// assert_eq!(
    ///     key,
    ///     MultipartKey::Part {
    ///         upload_id: "abc123".into(),
    ///         blob_name: "dir/my-file.bin".into(),
    ///         part_number: 7,
    ///     }
    /// );
    /// assert!(MultipartKey::decode("plain/key").is_none());
    /// ```
    #[must_use]
    pub fn decode(key: &str) -> Option<Self> {
        let rest = key.strip_prefix(MPU_PREFIX)?;
        let (upload_id, rest) = rest.split_once('-')?;
        let (blob_name, suffix) = rest.rsplit_once('-')?;
        if upload_id.is_empty() || blob_name.is_empty() {
            return None;
        }

        let upload_id = upload_id.to_owned();
        let blob_name = blob_name.to_owned();
        if suffix == STUB_SUFFIX {
            return Some(Self::Stub {
                upload_id,
                blob_name,
            });
        }

        // Reject signs and leading zeros so every part has exactly one key.
        if suffix.is_empty() || suffix.starts_with('0') || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let part_number = suffix.parse().ok()?;
        Some(Self::Part {
            upload_id,
            blob_name,
            part_number,
        })
    }

    /// The upload id.
    #[must_use]
    pub fn upload_id(&self) -> &str {
        match self {
            Self::Stub { upload_id, .. } | Self::Part { upload_id, .. } => upload_id,
        }
    }

    /// The target blob name.
    #[must_use]
    pub fn blob_name(&self) -> &str {
        match self {
            Self::Stub { blob_name, .. } | Self::Part { blob_name, .. } => blob_name,
        }
    }
}

impl fmt::Display for MultipartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stub {
                upload_id,
                blob_name,
            } => write!(f, "{MPU_PREFIX}{upload_id}-{blob_name}-{STUB_SUFFIX}"),
            Self::Part {
                upload_id,
                blob_name,
                part_number,
            } => write!(f, "{MPU_PREFIX}{upload_id}-{blob_name}-{part_number}"),
        }
    }
}

/// Whether `key` lies in the reserved multipart namespace.
#[must_use]
pub fn is_multipart_key(key: &str) -> bool {
    key.starts_with(MPU_PREFIX)
}

// ---------------------------------------------------------------------------
// MultipartUpload / MultipartPart
// ---------------------------------------------------------------------------

/// Handle of an in-progress multipart upload.
///
/// Returned by initiate and passed back to every later call. It carries the
/// target blob template and the put options applied at completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartUpload {
    /// Container holding the upload.
    pub container: String,
    /// Name of the blob the upload will create.
    pub blob_name: String,
    /// Unique upload id.
    pub upload_id: String,
    /// Template for the final blob: content metadata, user metadata, access.
    pub metadata: BlobMetadata,
    /// Options applied when writing the final blob.
    pub put_options: PutOptions,
}

impl MultipartUpload {
    /// Key of this upload's stub blob.
    #[must_use]
    pub fn stub_key(&self) -> String {
        MultipartKey::Stub {
            upload_id: self.upload_id.clone(),
            blob_name: self.blob_name.clone(),
        }
        .encode()
    }

    /// Key of one of this upload's part blobs.
    #[must_use]
    pub fn part_key(&self, part_number: u32) -> String {
        MultipartKey::Part {
            upload_id: self.upload_id.clone(),
            blob_name: self.blob_name.clone(),
            part_number,
        }
        .encode()
    }

    /// Prefix shared by this upload's stub and parts.
    #[must_use]
    pub fn key_prefix(&self) -> String {
        MultipartKey::upload_prefix(&self.upload_id, &self.blob_name)
    }
}

/// An uploaded part as reported by upload and list operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartPart {
    /// Part number, starting at 1.
    pub part_number: u32,
    /// Part size in bytes.
    pub size: u64,
    /// Quoted hex MD5 of the part.
    pub etag: String,
    /// When the part was last uploaded.
    pub last_modified: DateTime<Utc>,
}

/// Split `payload` into consecutive chunks of at most `chunk_size` bytes.
///
/// An empty payload yields a single empty chunk so that a multipart put of
/// nothing still produces one part.
#[must_use]
pub fn split_payload(payload: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let chunk_size = chunk_size.max(1);
    if payload.is_empty() {
        return vec![Bytes::new()];
    }
    (0..payload.len())
        .step_by(chunk_size)
        .map(|start| payload.slice(start..(start + chunk_size).min(payload.len())))
        .collect()
}
