//! Data model for containers, blobs, listings and operation options.
//!
//! All records are immutable values: an override produces a new record
//! built from the old one, never an in-place edit of a shared instance.

mod blob;
mod container;
mod options;

pub use blob::{
    Blob, BlobBuilder, BlobMetadata, ContentMetadata, ContentRange, PageSet, StorageMetadata,
    StorageType,
};
pub use container::{Access, ContainerMetadata, ParseAccessError};
pub use options::{
    CopyOptions, CreateContainerOptions, GetOptions, ListOptions, Preconditions, PutOptions,
};

/// Content type recorded on directory marker blobs.
pub const DIRECTORY_CONTENT_TYPE: &str = "application/x-directory";
