//! Conditional access: HTTP-style preconditions and byte-range extraction.
//!
//! Preconditions are checked in a fixed order and the first failing one
//! decides the outcome:
//!
//! 1. `If-Match` mismatch -> [`BlobStoreError::PreconditionFailed`]
//! 2. `If-None-Match` match -> [`BlobStoreError::NotModified`]
//! 3. `If-Modified-Since` not strictly older -> [`BlobStoreError::NotModified`]
//! 4. `If-Unmodified-Since` strictly older -> [`BlobStoreError::PreconditionFailed`]
//!
//! Timestamps are compared at whole-second resolution. Ranges are resolved
//! against the content length at read time and concatenated in request
//! order.

use std::fmt;
use std::str::FromStr;

use bytes::{Bytes, BytesMut};

use crate::error::{BlobStoreError, BlobStoreResult};
use crate::model::{Blob, BlobMetadata, ContentMetadata, ContentRange, Preconditions};
use crate::utils::{is_valid_if_match, is_valid_if_none_match, truncate_to_seconds};

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

/// Check `preconditions` against a stored blob's metadata.
///
/// # Examples
///
/// ```
/// use blobstack_core::conditional::evaluate_preconditions;
/// use blobstack_core::error::BlobStoreError;
/// use blobstack_core::model::{Blob, Preconditions};
///
/// let blob = Blob::builder("k").payload("data").build();
/// let same = Preconditions::builder().if_none_match(blob.etag()).build();
/// assert!(matches!(
///     evaluate_preconditions(&blob.metadata, &same),
///     Err(BlobStoreError::NotModified)
/// ));
/// ```
pub fn evaluate_preconditions(
    metadata: &BlobMetadata,
    preconditions: &Preconditions,
) -> BlobStoreResult<()> {
    if let Some(if_match) = preconditions.if_match.as_deref() {
        if !is_valid_if_match(&metadata.etag, if_match) {
            return Err(BlobStoreError::PreconditionFailed);
        }
    }

    if let Some(if_none_match) = preconditions.if_none_match.as_deref() {
        if !is_valid_if_none_match(&metadata.etag, if_none_match) {
            return Err(BlobStoreError::NotModified);
        }
    }

    let stored = truncate_to_seconds(metadata.last_modified);

    if let Some(since) = preconditions.if_modified_since {
        if stored <= truncate_to_seconds(since) {
            return Err(BlobStoreError::NotModified);
        }
    }

    if let Some(since) = preconditions.if_unmodified_since {
        if stored > truncate_to_seconds(since) {
            return Err(BlobStoreError::PreconditionFailed);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// ByteRange
// ---------------------------------------------------------------------------

/// One byte-range specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteRange {
    /// `N-`: from offset N to the end.
    From(u64),
    /// `-N`: the last N bytes.
    Suffix(u64),
    /// `A-B`: offsets A through B inclusive, B clamped to the content.
    Bounded(u64, u64),
}

impl ByteRange {
    /// Resolve this specifier against a payload of `length` bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use blobstack_core::conditional::ByteRange;
    ///
    /// let r = ByteRange::Bounded(2, 50).resolve(10).unwrap();
    /// assert_eq!((r.start, r.end, r.total), (2, 9, 10));
    /// assert!(ByteRange::From(10).resolve(10).is_err());
    /// ```
    pub fn resolve(self, length: u64) -> BlobStoreResult<ContentRange> {
        if length == 0 {
            return Err(BlobStoreError::invalid_argument(format!(
                "range {self} cannot be satisfied by empty content"
            )));
        }

        let (start, end) = match self {
            Self::From(start) => (start, length - 1),
            Self::Suffix(0) => {
                return Err(BlobStoreError::invalid_argument(
                    "suffix range must cover at least one byte",
                ));
            }
            Self::Suffix(count) => (length.saturating_sub(count), length - 1),
            Self::Bounded(start, end) => {
                if start > end {
                    return Err(BlobStoreError::invalid_argument(format!(
                        "range {self} has its start after its end"
                    )));
                }
                (start, end.min(length - 1))
            }
        };

        if start >= length {
            return Err(BlobStoreError::invalid_argument(format!(
                "range {self} starts at or beyond content length {length}"
            )));
        }

        Ok(ContentRange {
            start,
            end,
            total: length,
        })
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::From(start) => write!(f, "{start}-"),
            Self::Suffix(count) => write!(f, "-{count}"),
            Self::Bounded(start, end) => write!(f, "{start}-{end}"),
        }
    }
}

impl FromStr for ByteRange {
    type Err = BlobStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        let spec = spec.strip_prefix("bytes=").unwrap_or(spec);
        let malformed = || BlobStoreError::invalid_argument(format!("malformed range: {s}"));

        let (start, end) = spec.split_once('-').ok_or_else(malformed)?;
        let parse = |v: &str| v.trim().parse::<u64>().map_err(|_| malformed());

        match (start.trim().is_empty(), end.trim().is_empty()) {
            (true, true) => Err(malformed()),
            (true, false) => match parse(end)? {
                0 => Err(malformed()),
                count => Ok(Self::Suffix(count)),
            },
            (false, true) => Ok(Self::From(parse(start)?)),
            (false, false) => Ok(Self::Bounded(parse(start)?, parse(end)?)),
        }
    }
}

/// Parse a comma-separated range list, with or without a `bytes=` prefix.
///
/// # Examples
///
/// ```
/// use blobstack_core::conditional::{ByteRange, parse_ranges};
///
/// let ranges = parse_ranges("bytes=0-1, 5-, -2").unwrap();
/// assert_eq!(
///     ranges,
///     vec![ByteRange::Bounded(0, 1), ByteRange::From(5), ByteRange::Suffix(2)]
/// );
/// ```
pub fn parse_ranges(header: &str) -> BlobStoreResult<Vec<ByteRange>> {
    let header = header.trim();
    let list = header.strip_prefix("bytes=").unwrap_or(header);
    if list.trim().is_empty() {
        return Err(BlobStoreError::invalid_argument("empty range list"));
    }
    list.split(',').map(str::parse).collect()
}

/// Return `blob` reduced to the requested ranges.
///
/// With no ranges the blob is returned unchanged. Otherwise the payload is
/// the in-order concatenation of every slice, `content_ranges` records one
/// entry per slice and `content.content_length` is the returned length.
/// `content.content_md5` is cleared; `metadata.size` and `metadata.etag`
/// keep describing the full blob.
pub fn apply_ranges(blob: Blob, ranges: &[ByteRange]) -> BlobStoreResult<Blob> {
    if ranges.is_empty() {
        return Ok(blob);
    }

    let length = blob.payload.len() as u64;
    let resolved = ranges
        .iter()
        .map(|range| range.resolve(length))
        .collect::<BlobStoreResult<Vec<_>>>()?;

    let payload = match resolved.as_slice() {
        [only] => slice(&blob.payload, only),
        _ => {
            let total: u64 = resolved.iter().map(ContentRange::length).sum();
            let mut buf = BytesMut::with_capacity(usize::try_from(total).unwrap_or(0));
            for range in &resolved {
                buf.extend_from_slice(&slice(&blob.payload, range));
            }
            buf.freeze()
        }
    };

    let mut metadata = blob.metadata;
    metadata.content = ContentMetadata {
        content_length: Some(payload.len() as u64),
        ..metadata.content.without_payload_fields()
    };

    Ok(Blob {
        metadata,
        payload,
        content_ranges: resolved,
    })
}

fn slice(payload: &Bytes, range: &ContentRange) -> Bytes {
    // Resolved ranges lie within the payload, whose length fits in usize.
    let start = usize::try_from(range.start).unwrap_or(usize::MAX);
    let end = usize::try_from(range.end).unwrap_or(usize::MAX);
    payload.slice(start..=end)
}
