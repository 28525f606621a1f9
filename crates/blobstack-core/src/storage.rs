//! Storage primitive: a per-container key/value byte store with metadata.
//!
//! [`BlobStorage`] is the only interface the engine consumes. It owns no
//! object-store semantics beyond raw bytes and basic metadata (size, ETag,
//! last-modified, user metadata); every call is individually atomic.
//!
//! [`InMemoryStorage`] is the bundled implementation. Containers live in a
//! [`DashMap`]; each container keeps its blobs in a [`BTreeMap`] behind a
//! [`parking_lot::RwLock`], so key enumeration is naturally lexicographic.
//!
//! # Spillover to Disk
//!
//! Payloads larger than the configured threshold are written to temporary
//! files via the [`tempfile`] crate and read back on demand. The file is
//! removed when its entry is overwritten or deleted (via the [`Drop`]
//! implementation on `StoredData`).

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::checksums::{compute_content_md5, compute_etag};
use crate::error::StorageError;
use crate::model::{
    Access, Blob, BlobMetadata, ContainerMetadata, ContentMetadata, CreateContainerOptions,
};

/// Result type of storage primitive calls.
pub type StorageResult<T> = Result<T, StorageError>;

/// Default payload size (in bytes) kept in memory before spilling to disk.
const DEFAULT_MAX_MEMORY_SIZE: usize = 524_288;

// ---------------------------------------------------------------------------
// BlobStorage
// ---------------------------------------------------------------------------

/// A key/value blob store partitioned into containers.
///
/// Calls addressing a container that does not exist fail with
/// [`StorageError::MissingContainer`] unless documented otherwise.
pub trait BlobStorage: Send + Sync + fmt::Debug {
    /// Whether the container exists.
    fn container_exists(&self, container: &str) -> bool;

    /// Create a container. Returns `false` if it already existed.
    fn create_container(
        &self,
        container: &str,
        location: &str,
        options: CreateContainerOptions,
    ) -> StorageResult<bool>;

    /// Delete a container and everything in it. Absent containers are ignored.
    fn delete_container(&self, container: &str) -> StorageResult<()>;

    /// All containers, sorted by name.
    fn list_containers(&self) -> Vec<ContainerMetadata>;

    /// Metadata of one container.
    fn container_metadata(&self, container: &str) -> Option<ContainerMetadata>;

    /// Update a container's access policy.
    fn set_container_access(&self, container: &str, access: Access) -> StorageResult<()>;

    /// Whether the blob exists.
    fn blob_exists(&self, container: &str, key: &str) -> bool;

    /// Store a blob, replacing any previous one under the same key.
    ///
    /// The stored ETag, size, content length, Content-MD5 and last-modified
    /// are computed here from the payload. A Content-MD5 supplied on the
    /// blob is verified first. Returns the new ETag.
    fn put_blob(&self, container: &str, blob: Blob) -> StorageResult<String>;

    /// Fetch a blob with its payload; `None` if absent.
    fn get_blob(&self, container: &str, key: &str) -> StorageResult<Option<Blob>>;

    /// Fetch a blob's metadata without reading its payload.
    fn get_blob_metadata(&self, container: &str, key: &str) -> StorageResult<Option<BlobMetadata>>;

    /// Remove a blob. Absent keys are ignored.
    fn remove_blob(&self, container: &str, key: &str) -> StorageResult<()>;

    /// Every key in the container, in lexicographic order.
    fn list_keys(&self, container: &str) -> StorageResult<Vec<String>>;

    /// Update a blob's access policy. Returns `false` if the blob is absent.
    fn set_blob_access(&self, container: &str, key: &str, access: Access) -> StorageResult<bool>;
}

// ---------------------------------------------------------------------------
// StoredData
// ---------------------------------------------------------------------------

/// Payload bytes, either in memory or spilled to a temp file.
enum StoredData {
    InMemory { data: Bytes },
    OnDisk { path: PathBuf, size: u64 },
}

impl fmt::Debug for StoredData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory { data } => f
                .debug_struct("InMemory")
                .field("size", &data.len())
                .finish(),
            Self::OnDisk { path, size } => f
                .debug_struct("OnDisk")
                .field("path", path)
                .field("size", size)
                .finish(),
        }
    }
}

impl Drop for StoredData {
    fn drop(&mut self) {
        if let Self::OnDisk { path, .. } = self {
            match std::fs::remove_file(path.as_path()) {
                Ok(()) => trace!(path = %path.display(), "removed spilled payload"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove spilled payload"),
            }
        }
    }
}

impl StoredData {
    fn read_all(&self) -> StorageResult<Bytes> {
        match self {
            Self::InMemory { data } => Ok(data.clone()),
            Self::OnDisk { path, .. } => std::fs::read(path)
                .map(Bytes::from)
                .map_err(|source| StorageError::Io {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

// ---------------------------------------------------------------------------
// InMemoryStorage
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct StoredBlob {
    metadata: BlobMetadata,
    data: StoredData,
}

#[derive(Debug)]
struct StoredContainer {
    metadata: RwLock<ContainerMetadata>,
    blobs: RwLock<BTreeMap<String, StoredBlob>>,
}

/// In-memory [`BlobStorage`] with spillover to temp files for large payloads.
///
/// # Examples
///
/// ```
/// use blobstack_core::model::{Blob, CreateContainerOptions};
/// use blobstack_core::storage::{BlobStorage, InMemoryStorage};
///
/// let storage = InMemoryStorage::new(1024);
/// storage.create_container("photos", "local", CreateContainerOptions::default()).unwrap();
/// let etag = storage.put_blob("photos", Blob::builder("cat.jpg").payload("meow").build()).unwrap();
/// let blob = storage.get_blob("photos", "cat.jpg").unwrap().unwrap();
/// assert_eq!(blob.payload.as_ref(), b"meow");
/// assert_eq!(blob.etag(), etag);
/// ```
pub struct InMemoryStorage {
    containers: DashMap<String, StoredContainer>,
    max_memory_size: usize,
}

impl fmt::Debug for InMemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStorage")
            .field("container_count", &self.containers.len())
            .field("max_memory_size", &self.max_memory_size)
            .finish()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MEMORY_SIZE)
    }
}

impl InMemoryStorage {
    /// Create a storage backend that spills payloads above `max_memory_size`.
    #[must_use]
    pub fn new(max_memory_size: usize) -> Self {
        debug!(max_memory_size, "creating InMemoryStorage");
        Self {
            containers: DashMap::new(),
            max_memory_size,
        }
    }

    /// Size threshold above which payloads are spilled to disk.
    #[must_use]
    pub fn max_memory_size(&self) -> usize {
        self.max_memory_size
    }

    fn store_data(&self, data: Bytes) -> StorageResult<StoredData> {
        if data.len() > self.max_memory_size {
            Self::spill_to_disk(&data)
        } else {
            Ok(StoredData::InMemory { data })
        }
    }

    fn spill_to_disk(data: &[u8]) -> StorageResult<StoredData> {
        let mut temp = tempfile::NamedTempFile::new().map_err(|source| StorageError::Io {
            path: std::env::temp_dir(),
            source,
        })?;
        temp.as_file_mut()
            .write_all(data)
            .map_err(|source| StorageError::Io {
                path: temp.path().to_path_buf(),
                source,
            })?;

        // Keep the file past the handle; StoredData's Drop removes it.
        let path = temp
            .into_temp_path()
            .keep()
            .map_err(|e| StorageError::Io {
                path: e.path.to_path_buf(),
                source: e.error,
            })?;

        let size = data.len() as u64;
        trace!(path = %path.display(), size, "spilled payload to disk");
        Ok(StoredData::OnDisk { path, size })
    }

    fn missing(container: &str) -> StorageError {
        StorageError::MissingContainer {
            container: container.to_owned(),
        }
    }
}

impl BlobStorage for InMemoryStorage {
    fn container_exists(&self, container: &str) -> bool {
        self.containers.contains_key(container)
    }

    fn create_container(
        &self,
        container: &str,
        location: &str,
        options: CreateContainerOptions,
    ) -> StorageResult<bool> {
        let mut created = false;
        self.containers
            .entry(container.to_owned())
            .or_insert_with(|| {
                created = true;
                StoredContainer {
                    metadata: RwLock::new(ContainerMetadata {
                        name: container.to_owned(),
                        location: location.to_owned(),
                        creation_date: Utc::now(),
                        access: options.access,
                    }),
                    blobs: RwLock::new(BTreeMap::new()),
                }
            });
        trace!(container, location, created, "create container");
        Ok(created)
    }

    fn delete_container(&self, container: &str) -> StorageResult<()> {
        if let Some((_, removed)) = self.containers.remove(container) {
            trace!(container, blobs = removed.blobs.read().len(), "deleted container");
        }
        Ok(())
    }

    fn list_containers(&self) -> Vec<ContainerMetadata> {
        let mut all: Vec<ContainerMetadata> = self
            .containers
            .iter()
            .map(|entry| entry.value().metadata.read().clone())
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    fn container_metadata(&self, container: &str) -> Option<ContainerMetadata> {
        self.containers
            .get(container)
            .map(|entry| entry.metadata.read().clone())
    }

    fn set_container_access(&self, container: &str, access: Access) -> StorageResult<()> {
        let entry = self
            .containers
            .get(container)
            .ok_or_else(|| Self::missing(container))?;
        entry.metadata.write().access = access;
        Ok(())
    }

    fn blob_exists(&self, container: &str, key: &str) -> bool {
        self.containers
            .get(container)
            .is_some_and(|entry| entry.blobs.read().contains_key(key))
    }

    fn put_blob(&self, container: &str, blob: Blob) -> StorageResult<String> {
        let Blob {
            metadata, payload, ..
        } = blob;

        let actual_md5 = compute_content_md5(&payload);
        if let Some(expected) = metadata.content.content_md5.as_deref() {
            if expected != actual_md5 {
                return Err(StorageError::ChecksumMismatch {
                    expected: expected.to_owned(),
                    actual: actual_md5,
                });
            }
        }

        let etag = compute_etag(&payload);
        let size = payload.len() as u64;
        let key = metadata.name.clone();
        let stored_metadata = BlobMetadata {
            container: container.to_owned(),
            etag: etag.clone(),
            last_modified: Utc::now(),
            size,
            content: ContentMetadata {
                content_length: Some(size),
                content_md5: Some(actual_md5),
                ..metadata.content
            },
            ..metadata
        };

        let entry = self
            .containers
            .get(container)
            .ok_or_else(|| Self::missing(container))?;
        let data = self.store_data(payload)?;
        entry.blobs.write().insert(
            key.clone(),
            StoredBlob {
                metadata: stored_metadata,
                data,
            },
        );

        trace!(container, key = %key, size, "stored blob");
        Ok(etag)
    }

    fn get_blob(&self, container: &str, key: &str) -> StorageResult<Option<Blob>> {
        let entry = self
            .containers
            .get(container)
            .ok_or_else(|| Self::missing(container))?;
        let blobs = entry.blobs.read();
        let Some(stored) = blobs.get(key) else {
            return Ok(None);
        };
        let payload = stored.data.read_all()?;
        trace!(container, key, size = payload.len(), "read blob");
        Ok(Some(Blob {
            metadata: stored.metadata.clone(),
            payload,
            content_ranges: Vec::new(),
        }))
    }

    fn get_blob_metadata(&self, container: &str, key: &str) -> StorageResult<Option<BlobMetadata>> {
        let entry = self
            .containers
            .get(container)
            .ok_or_else(|| Self::missing(container))?;
        let blobs = entry.blobs.read();
        Ok(blobs.get(key).map(|stored| stored.metadata.clone()))
    }

    fn remove_blob(&self, container: &str, key: &str) -> StorageResult<()> {
        let entry = self
            .containers
            .get(container)
            .ok_or_else(|| Self::missing(container))?;
        let removed = entry.blobs.write().remove(key);
        trace!(container, key, existed = removed.is_some(), "removed blob");
        Ok(())
    }

    fn list_keys(&self, container: &str) -> StorageResult<Vec<String>> {
        let entry = self
            .containers
            .get(container)
            .ok_or_else(|| Self::missing(container))?;
        let keys: Vec<String> = entry.blobs.read().keys().cloned().collect();
        Ok(keys)
    }

    fn set_blob_access(&self, container: &str, key: &str, access: Access) -> StorageResult<bool> {
        let entry = self
            .containers
            .get(container)
            .ok_or_else(|| Self::missing(container))?;
        let mut blobs = entry.blobs.write();
        Ok(blobs.get_mut(key).is_some_and(|stored| {
            stored.metadata.access = access;
            true
        }))
    }
}
