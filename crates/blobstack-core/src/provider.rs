//! The object store facade.
//!
//! [`LocalBlobStore`] owns the storage primitive and the configuration.
//! Individual operations are implemented in the `ops` submodules, grouped
//! by concern (containers, blobs, listing, multipart), as inherent methods
//! on this type.
//!
//! No operation spans more than one primitive call atomically. Callers that
//! need stronger consistency for a `(container, key)` or
//! `(container, upload_id)` must serialize those operations themselves.

use std::sync::Arc;

use crate::config::BlobStoreConfig;
use crate::error::{BlobStoreError, BlobStoreResult};
use crate::storage::{BlobStorage, InMemoryStorage};

/// Local object store with S3-like semantics.
///
/// Cloning is cheap: all fields are `Arc`-wrapped and clones share state.
///
/// # Examples
///
/// ```
/// use blobstack_core::{BlobStoreConfig, LocalBlobStore};
/// use blobstack_core::model::{Blob, CreateContainerOptions, PutOptions};
///
/// let store = LocalBlobStore::new(BlobStoreConfig::default());
/// store.create_container("photos", None, CreateContainerOptions::default()).unwrap();
/// store
///     .put_blob("photos", Blob::builder("cat.jpg").payload("meow").build(), PutOptions::default())
///     .unwrap();
/// assert!(store.blob_exists("photos", "cat.jpg").unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// The storage primitive.
    pub(crate) storage: Arc<dyn BlobStorage>,
    /// Store configuration.
    pub(crate) config: Arc<BlobStoreConfig>,
}

impl LocalBlobStore {
    /// Create a store backed by a fresh [`InMemoryStorage`].
    #[must_use]
    pub fn new(config: BlobStoreConfig) -> Self {
        let storage = InMemoryStorage::new(config.max_memory_blob_size);
        Self::with_storage(Arc::new(storage), config)
    }

    /// Create a store over an existing storage primitive.
    #[must_use]
    pub fn with_storage(storage: Arc<dyn BlobStorage>, config: BlobStoreConfig) -> Self {
        Self {
            storage,
            config: Arc::new(config),
        }
    }

    /// Returns the storage primitive.
    #[must_use]
    pub fn storage(&self) -> &dyn BlobStorage {
        self.storage.as_ref()
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &BlobStoreConfig {
        &self.config
    }

    /// Fail with `ContainerNotFound` unless `container` exists.
    pub(crate) fn require_container(&self, container: &str) -> BlobStoreResult<()> {
        if self.storage.container_exists(container) {
            Ok(())
        } else {
            Err(BlobStoreError::ContainerNotFound {
                container: container.to_owned(),
            })
        }
    }
}

impl Default for LocalBlobStore {
    fn default() -> Self {
        Self::new(BlobStoreConfig::default())
    }
}
