use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::container::Access;
use crate::checksums::compute_etag;

// ---------------------------------------------------------------------------
// ContentMetadata
// ---------------------------------------------------------------------------

/// HTTP-style content metadata stored with a blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    /// `Content-Type`.
    pub content_type: Option<String>,
    /// `Content-Encoding`.
    pub content_encoding: Option<String>,
    /// `Content-Language`.
    pub content_language: Option<String>,
    /// `Content-Disposition`.
    pub content_disposition: Option<String>,
    /// `Cache-Control`.
    pub cache_control: Option<String>,
    /// `Expires`.
    pub expires: Option<DateTime<Utc>>,
    /// Payload length in bytes.
    pub content_length: Option<u64>,
    /// Base64 MD5 of the payload.
    pub content_md5: Option<String>,
}

impl ContentMetadata {
    /// Copy of this metadata with the length and checksum cleared.
    ///
    /// Used when the payload a record will describe differs from the one it
    /// was taken from.
    #[must_use]
    pub fn without_payload_fields(&self) -> Self {
        Self {
            content_length: None,
            content_md5: None,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// BlobMetadata
// ---------------------------------------------------------------------------

/// Metadata of a stored blob, without its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMetadata {
    /// The blob key.
    pub name: String,
    /// The owning container. Empty until the blob is stored.
    pub container: String,
    /// Quoted hex MD5 of the payload.
    pub etag: String,
    /// When the blob was last written.
    pub last_modified: DateTime<Utc>,
    /// Payload length in bytes.
    pub size: u64,
    /// Content metadata.
    pub content: ContentMetadata,
    /// User-defined metadata.
    pub user_metadata: HashMap<String, String>,
    /// Blob access policy.
    pub access: Access,
}

// ---------------------------------------------------------------------------
// ContentRange
// ---------------------------------------------------------------------------

/// One resolved slice of a ranged read, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRange {
    /// First byte offset.
    pub start: u64,
    /// Last byte offset.
    pub end: u64,
    /// Length of the full blob.
    pub total: u64,
}

impl ContentRange {
    /// Number of bytes covered by this slice.
    #[must_use]
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// A blob: metadata plus payload.
///
/// After a ranged read `payload` holds the concatenated slices and
/// `content_ranges` lists the slice each part of it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Blob metadata.
    pub metadata: BlobMetadata,
    /// The payload bytes.
    pub payload: Bytes,
    /// Slices served by a ranged read, empty for a full read.
    pub content_ranges: Vec<ContentRange>,
}

impl Blob {
    /// Start building a blob named `name`.
    pub fn builder(name: impl Into<String>) -> BlobBuilder {
        BlobBuilder::new(name)
    }

    /// The blob key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The blob ETag.
    #[must_use]
    pub fn etag(&self) -> &str {
        &self.metadata.etag
    }
}

/// Builder for a [`Blob`] about to be written.
///
/// # Examples
///
/// ```
/// use blobstack_core::model::Blob;
///
/// let blob = Blob::builder("notes/a.txt")
///     .payload("hello")
///     .content_type("text/plain")
///     .user_metadata("owner", "alice")
///     .build();
/// assert_eq!(blob.metadata.size, 5);
/// assert_eq!(blob.metadata.content.content_length, Some(5));
/// ```
#[derive(Debug, Clone)]
pub struct BlobBuilder {
    name: String,
    payload: Bytes,
    content: ContentMetadata,
    user_metadata: HashMap<String, String>,
    access: Access,
}

impl BlobBuilder {
    /// Create a builder for an empty blob named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: Bytes::new(),
            content: ContentMetadata::default(),
            user_metadata: HashMap::new(),
            access: Access::Private,
        }
    }

    /// Set the payload.
    #[must_use]
    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Replace all content metadata. Length is always recomputed at build.
    #[must_use]
    pub fn content_metadata(mut self, content: ContentMetadata) -> Self {
        self.content = content;
        self
    }

    /// Set `Content-Type`.
    #[must_use]
    pub fn content_type(mut self, value: impl Into<String>) -> Self {
        self.content.content_type = Some(value.into());
        self
    }

    /// Set `Content-Encoding`.
    #[must_use]
    pub fn content_encoding(mut self, value: impl Into<String>) -> Self {
        self.content.content_encoding = Some(value.into());
        self
    }

    /// Set `Content-Language`.
    #[must_use]
    pub fn content_language(mut self, value: impl Into<String>) -> Self {
        self.content.content_language = Some(value.into());
        self
    }

    /// Set `Content-Disposition`.
    #[must_use]
    pub fn content_disposition(mut self, value: impl Into<String>) -> Self {
        self.content.content_disposition = Some(value.into());
        self
    }

    /// Set `Cache-Control`.
    #[must_use]
    pub fn cache_control(mut self, value: impl Into<String>) -> Self {
        self.content.cache_control = Some(value.into());
        self
    }

    /// Set `Expires`.
    #[must_use]
    pub fn expires(mut self, value: DateTime<Utc>) -> Self {
        self.content.expires = Some(value);
        self
    }

    /// Set the base64 Content-MD5 the store verifies on write.
    #[must_use]
    pub fn content_md5(mut self, value: impl Into<String>) -> Self {
        self.content.content_md5 = Some(value.into());
        self
    }

    /// Add one user metadata entry.
    #[must_use]
    pub fn user_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.user_metadata.insert(key.into(), value.into());
        self
    }

    /// Replace all user metadata.
    #[must_use]
    pub fn user_metadata_map(mut self, metadata: HashMap<String, String>) -> Self {
        self.user_metadata = metadata;
        self
    }

    /// Set the blob access policy.
    #[must_use]
    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Build the blob.
    #[must_use]
    pub fn build(self) -> Blob {
        let size = self.payload.len() as u64;
        let content = ContentMetadata {
            content_length: Some(size),
            ..self.content
        };
        Blob {
            metadata: BlobMetadata {
                name: self.name,
                container: String::new(),
                etag: compute_etag(&self.payload),
                last_modified: Utc::now(),
                size,
                content,
                user_metadata: self.user_metadata,
                access: self.access,
            },
            payload: self.payload,
            content_ranges: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing entries
// ---------------------------------------------------------------------------

/// Kind of a listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageType {
    /// A stored blob.
    Blob,
    /// A synthesized common prefix, i.e. a "directory".
    RelativePath,
}

/// One entry of a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageMetadata {
    /// Entry kind.
    pub storage_type: StorageType,
    /// Blob key, or the common prefix including its trailing delimiter.
    pub name: String,
    /// Blob summary; `None` for relative paths.
    pub blob: Option<BlobMetadata>,
}

impl StorageMetadata {
    /// Entry for a stored blob.
    #[must_use]
    pub fn blob(metadata: BlobMetadata) -> Self {
        Self {
            storage_type: StorageType::Blob,
            name: metadata.name.clone(),
            blob: Some(metadata),
        }
    }

    /// Entry for a synthesized common prefix.
    pub fn relative_path(name: impl Into<String>) -> Self {
        Self {
            storage_type: StorageType::RelativePath,
            name: name.into(),
            blob: None,
        }
    }

    /// Whether this entry is a synthesized common prefix.
    #[must_use]
    pub fn is_relative_path(&self) -> bool {
        self.storage_type == StorageType::RelativePath
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSet<T> {
    /// Entries in lexicographic order.
    pub entries: Vec<T>,
    /// Marker to resume from; `None` at the end of the listing.
    pub next_marker: Option<String>,
}

impl<T> PageSet<T> {
    /// Number of entries on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this page is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }
}

impl<T> IntoIterator for PageSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
