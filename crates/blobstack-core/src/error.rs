//! Blob store error types.
//!
//! Defines [`BlobStoreError`], the error taxonomy surfaced by every facade
//! operation, and [`StorageError`], the error raised by the storage
//! primitive. Storage errors are wrapped by [`BlobStoreError::Storage`]
//! without reinterpretation.
//!
//! The network layer is responsible for turning these into responses;
//! [`BlobStoreError::status_code`] and [`BlobStoreError::code`] give the
//! conventional mapping.
//!
//! # Usage
//!
//! ```
//! use blobstack_core::error::BlobStoreError;
//!
//! let err = BlobStoreError::ContainerNotFound {
//!     container: "photos".to_owned(),
//! };
//! assert_eq!(err.status_code(), http::StatusCode::NOT_FOUND);
//! assert_eq!(err.code(), "NoSuchBucket");
//! ```

use std::path::PathBuf;

use http::StatusCode;

/// Error raised by a [`crate::storage::BlobStorage`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing a spilled payload failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The Content-MD5 supplied with a write did not match the payload.
    #[error("Content-MD5 mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch {
        /// The caller-supplied base64 digest.
        expected: String,
        /// The base64 digest of the bytes actually received.
        actual: String,
    },

    /// The container addressed by a primitive call is gone.
    #[error("container `{container}` is not present in storage")]
    MissingContainer {
        /// The container name.
        container: String,
    },

    /// Any other primitive failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Blob store error type.
///
/// Each variant is one error kind of the object-store contract. Callers
/// should match on the variant; the message is for humans.
#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    // -----------------------------------------------------------------------
    // Not-found errors
    // -----------------------------------------------------------------------
    /// The referenced container does not exist.
    #[error("The specified container does not exist: {container}")]
    ContainerNotFound {
        /// The container name that was not found.
        container: String,
    },

    /// The referenced blob key does not exist.
    #[error("The specified key does not exist: {container}/{key}")]
    KeyNotFound {
        /// The container that was searched.
        container: String,
        /// The key that was not found.
        key: String,
    },

    /// The multipart upload id has no stub in its container.
    #[error("The specified upload does not exist: {upload_id}")]
    UploadNotFound {
        /// The upload id that was not found.
        upload_id: String,
    },

    /// A part named at completion is missing or its ETag does not match.
    #[error("Part {part_number} of upload {upload_id} is missing or its ETag does not match")]
    InvalidPart {
        /// The upload the part belongs to.
        upload_id: String,
        /// The missing part number.
        part_number: u32,
    },

    // -----------------------------------------------------------------------
    // Conditional request errors
    // -----------------------------------------------------------------------
    /// An If-Match or If-Unmodified-Since precondition did not hold.
    #[error("At least one of the preconditions you specified did not hold")]
    PreconditionFailed,

    /// An If-None-Match or If-Modified-Since condition evaluated false.
    #[error("Not Modified")]
    NotModified,

    // -----------------------------------------------------------------------
    // Validation errors
    // -----------------------------------------------------------------------
    /// Conflicting options, a malformed range, or an out-of-bounds offset.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// The container name violates the naming rules.
    #[error("Invalid container name: {name}: {reason}")]
    InvalidContainerName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The key exceeds the maximum key length.
    #[error("Your key is too long")]
    KeyTooLong,

    // -----------------------------------------------------------------------
    // Storage
    // -----------------------------------------------------------------------
    /// The storage primitive failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl BlobStoreError {
    /// Shorthand for an [`BlobStoreError::InvalidArgument`].
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// The S3-style error code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ContainerNotFound { .. } => "NoSuchBucket",
            Self::KeyNotFound { .. } => "NoSuchKey",
            Self::UploadNotFound { .. } => "NoSuchUpload",
            Self::InvalidPart { .. } => "InvalidPart",
            Self::PreconditionFailed => "PreconditionFailed",
            Self::NotModified => "NotModified",
            Self::InvalidArgument { .. } => "InvalidArgument",
            Self::InvalidContainerName { .. } => "InvalidBucketName",
            Self::KeyTooLong => "KeyTooLongError",
            Self::Storage(StorageError::ChecksumMismatch { .. }) => "BadDigest",
            Self::Storage(_) => "InternalError",
        }
    }

    /// The HTTP status a network layer would conventionally answer with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ContainerNotFound { .. }
            | Self::KeyNotFound { .. }
            | Self::UploadNotFound { .. } => StatusCode::NOT_FOUND,
            Self::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            Self::NotModified => StatusCode::NOT_MODIFIED,
            Self::InvalidPart { .. }
            | Self::InvalidArgument { .. }
            | Self::InvalidContainerName { .. }
            | Self::KeyTooLong
            | Self::Storage(StorageError::ChecksumMismatch { .. }) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is one of the not-found kinds.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ContainerNotFound { .. } | Self::KeyNotFound { .. } | Self::UploadNotFound { .. }
        )
    }
}

/// Convenience result type for blob store operations.
pub type BlobStoreResult<T> = Result<T, BlobStoreError>;
