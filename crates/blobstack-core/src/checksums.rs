//! Checksum computation for stored blobs.
//!
//! ETags are the quoted hex MD5 of the payload. Content-MD5 values travel
//! as base64 of the raw digest.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use md5::{Digest, Md5};

use crate::utils::quote_etag;

/// Compute the hex-encoded MD5 digest of `data`.
///
/// # Examples
///
/// ```
/// use blobstack_core::checksums::compute_md5;
///
/// assert_eq!(compute_md5(b"hello"), "5d41402abc4b2a76b9719d911017c592");
/// ```
#[must_use]
pub fn compute_md5(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Compute the quoted hex MD5 of `data`, used as the blob ETag.
///
/// # Examples
///
/// ```
/// use blobstack_core::checksums::compute_etag;
///
/// assert_eq!(compute_etag(b""), "\"d41d8cd98f00b204e9800998ecf8427e\"");
/// ```
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    quote_etag(&compute_md5(data))
}

/// Compute the base64-encoded MD5 of `data`, the Content-MD5 form.
#[must_use]
pub fn compute_content_md5(data: &[u8]) -> String {
    BASE64_STANDARD.encode(Md5::digest(data))
}
