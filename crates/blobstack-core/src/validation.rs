//! Validation for container names, blob keys, user metadata and parts.
//!
//! Container names follow the S3 bucket naming rules. Keys are opaque
//! strings with a length limit; only system-managed multipart artifacts may
//! use the reserved [`MPU_PREFIX`](crate::multipart::MPU_PREFIX).

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::net::Ipv4Addr;

use crate::error::BlobStoreError;
use crate::multipart::MPU_PREFIX;

/// Maximum blob key length in bytes.
const MAX_KEY_BYTES: usize = 1024;

/// Maximum total size (in bytes) of all user-defined metadata keys and values.
const MAX_METADATA_SIZE: usize = 2048;

/// Minimum container name length.
const MIN_CONTAINER_NAME_LEN: usize = 3;

/// Maximum container name length.
const MAX_CONTAINER_NAME_LEN: usize = 63;

/// Validate a container name.
///
/// Rules:
/// - 3-63 characters long
/// - Only lowercase letters, numbers, hyphens, and dots
/// - Must start and end with a letter or number
/// - No consecutive dots (`..`)
/// - Not formatted as an IPv4 address
///
/// # Examples
///
/// ```
/// use blobstack_core::validation::validate_container_name;
///
/// assert!(validate_container_name("photos-2024").is_ok());
/// assert!(validate_container_name("AB").is_err());
/// ```
pub fn validate_container_name(name: &str) -> Result<(), BlobStoreError> {
    let invalid = |reason: &str| BlobStoreError::InvalidContainerName {
        name: name.to_owned(),
        reason: reason.to_owned(),
    };

    let len = name.len();
    if !(MIN_CONTAINER_NAME_LEN..=MAX_CONTAINER_NAME_LEN).contains(&len) {
        return Err(BlobStoreError::InvalidContainerName {
            name: name.to_owned(),
            reason: format!(
                "Container name must be between {MIN_CONTAINER_NAME_LEN} and {MAX_CONTAINER_NAME_LEN} characters long"
            ),
        });
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(invalid(
            "Container name must only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }

    let bytes = name.as_bytes();
    let edge_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if !edge_ok(bytes[0]) || !edge_ok(bytes[len - 1]) {
        return Err(invalid(
            "Container name must start and end with a letter or number",
        ));
    }

    if name.contains("..") {
        return Err(invalid("Container name must not contain consecutive dots"));
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(invalid(
            "Container name must not be formatted as an IP address",
        ));
    }

    Ok(())
}

/// Validate a user-supplied blob key.
///
/// Keys must be 1-1024 bytes and must not start with the reserved
/// multipart prefix.
///
/// # Errors
///
/// Returns [`BlobStoreError::KeyTooLong`] for oversized keys and
/// [`BlobStoreError::InvalidArgument`] for empty or reserved keys.
///
/// # Examples
///
/// ```
/// use blobstack_core::validation::validate_blob_key;
///
/// assert!(validate_blob_key("photos/2024/cat.jpg").is_ok());
/// assert!(validate_blob_key(".mpus-abc-cat.jpg-stub").is_err());
/// ```
pub fn validate_blob_key(key: &str) -> Result<(), BlobStoreError> {
    validate_key_length(key)?;
    if key.starts_with(MPU_PREFIX) {
        return Err(BlobStoreError::invalid_argument(format!(
            "Blob keys must not start with the reserved prefix '{MPU_PREFIX}'"
        )));
    }
    Ok(())
}

/// Validate only the length rules of a key, allowing reserved names.
pub(crate) fn validate_key_length(key: &str) -> Result<(), BlobStoreError> {
    if key.is_empty() {
        return Err(BlobStoreError::invalid_argument(
            "Blob key must not be empty",
        ));
    }
    if key.len() > MAX_KEY_BYTES {
        return Err(BlobStoreError::KeyTooLong);
    }
    Ok(())
}

/// Validate the total size of user-defined metadata.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use blobstack_core::validation::validate_metadata;
///
/// let mut meta = HashMap::new();
/// meta.insert("color".to_owned(), "blue".to_owned());
/// assert!(validate_metadata(&meta).is_ok());
/// ```
pub fn validate_metadata<S: BuildHasher>(
    metadata: &HashMap<String, String, S>,
) -> Result<(), BlobStoreError> {
    let total_size: usize = metadata.iter().map(|(k, v)| k.len() + v.len()).sum();

    if total_size > MAX_METADATA_SIZE {
        return Err(BlobStoreError::invalid_argument(format!(
            "User-defined metadata must not exceed {MAX_METADATA_SIZE} bytes, got {total_size}"
        )));
    }

    Ok(())
}

/// Validate a part number against `[1, max_part_count]`.
pub fn validate_part_number(part_number: u32, max_part_count: u32) -> Result<(), BlobStoreError> {
    if part_number == 0 || part_number > max_part_count {
        return Err(BlobStoreError::invalid_argument(format!(
            "Part number must be an integer between 1 and {max_part_count}, inclusive"
        )));
    }
    Ok(())
}

/// Validate a part payload size against the store-wide maximum.
pub fn validate_part_size(size: u64, max_part_size: u64) -> Result<(), BlobStoreError> {
    if size > max_part_size {
        return Err(BlobStoreError::invalid_argument(format!(
            "Part size {size} exceeds the maximum allowed part size of {max_part_size} bytes"
        )));
    }
    Ok(())
}
