//! Blob lifecycle operations: put, get, head, remove, copy, directories.

use tracing::debug;

use crate::conditional::{apply_ranges, evaluate_preconditions};
use crate::error::{BlobStoreError, BlobStoreResult};
use crate::model::{
    Access, Blob, BlobMetadata, CopyOptions, DIRECTORY_CONTENT_TYPE, GetOptions, PutOptions,
};
use crate::multipart::is_multipart_key;
use crate::provider::LocalBlobStore;
use crate::validation::{validate_blob_key, validate_metadata};

impl LocalBlobStore {
    /// Store a blob, replacing any blob under the same key.
    ///
    /// With [`PutOptions::multipart`] the payload is split into
    /// `multipart_chunk_size` parts and written through a multipart upload.
    /// Returns the new ETag.
    pub fn put_blob(&self, container: &str, blob: Blob, options: PutOptions) -> BlobStoreResult<String> {
        self.require_container(container)?;
        validate_blob_key(blob.name())?;
        validate_metadata(&blob.metadata.user_metadata)?;

        let blob = match options.access {
            Some(access) => Blob {
                metadata: BlobMetadata {
                    access,
                    ..blob.metadata
                },
                ..blob
            },
            None => blob,
        };

        if options.multipart {
            return self.put_blob_multipart(container, blob, options);
        }

        let key = blob.name().to_owned();
        let size = blob.payload.len();
        let etag = self.storage.put_blob(container, blob)?;
        debug!(container, key = %key, size, etag = %etag, "put blob");
        Ok(etag)
    }

    /// Fetch a blob with its payload; `None` when absent.
    ///
    /// Keys in the reserved multipart namespace are never returned.
    pub fn get_blob(&self, container: &str, key: &str) -> BlobStoreResult<Option<Blob>> {
        self.get_blob_with(container, key, &GetOptions::default())
    }

    /// Fetch a blob, enforcing preconditions and applying byte ranges.
    ///
    /// Preconditions are checked before the range is resolved, so a failed
    /// precondition wins over a malformed or unsatisfiable range.
    pub fn get_blob_with(
        &self,
        container: &str,
        key: &str,
        options: &GetOptions,
    ) -> BlobStoreResult<Option<Blob>> {
        self.require_container(container)?;
        if is_multipart_key(key) {
            return Ok(None);
        }
        let Some(blob) = self.storage.get_blob(container, key)? else {
            debug!(container, key, "blob not found");
            return Ok(None);
        };

        evaluate_preconditions(&blob.metadata, &options.preconditions)?;
        let blob = apply_ranges(blob, &options.ranges)?;
        debug!(
            container,
            key,
            size = blob.payload.len(),
            ranges = blob.content_ranges.len(),
            "get blob"
        );
        Ok(Some(blob))
    }

    /// Fetch a blob's metadata without its payload; `None` when absent.
    pub fn blob_metadata(&self, container: &str, key: &str) -> BlobStoreResult<Option<BlobMetadata>> {
        self.require_container(container)?;
        if is_multipart_key(key) {
            return Ok(None);
        }
        Ok(self.storage.get_blob_metadata(container, key)?)
    }

    /// Whether the blob exists.
    pub fn blob_exists(&self, container: &str, key: &str) -> BlobStoreResult<bool> {
        self.require_container(container)?;
        Ok(!is_multipart_key(key) && self.storage.blob_exists(container, key))
    }

    /// Remove a blob. Missing blobs and missing containers are not errors.
    pub fn remove_blob(&self, container: &str, key: &str) -> BlobStoreResult<()> {
        if !self.storage.container_exists(container) {
            return Ok(());
        }
        validate_blob_key(key)?;
        self.storage.remove_blob(container, key)?;
        debug!(container, key, "removed blob");
        Ok(())
    }

    /// Remove several blobs. Missing ones are skipped.
    pub fn remove_blobs<I, K>(&self, container: &str, keys: I) -> BlobStoreResult<()>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.remove_blob(container, key.as_ref())?;
        }
        Ok(())
    }

    /// Copy a blob by reading it fully and writing it under a new key.
    ///
    /// Preconditions are evaluated against the source. Content metadata and
    /// user metadata are carried over unless replaced in `options`. Returns
    /// the destination ETag.
    pub fn copy_blob(
        &self,
        from_container: &str,
        from_key: &str,
        to_container: &str,
        to_key: &str,
        options: &CopyOptions,
    ) -> BlobStoreResult<String> {
        self.require_container(from_container)?;
        self.require_container(to_container)?;
        validate_blob_key(to_key)?;

        let not_found = || BlobStoreError::KeyNotFound {
            container: from_container.to_owned(),
            key: from_key.to_owned(),
        };
        if is_multipart_key(from_key) {
            return Err(not_found());
        }
        let source = self
            .storage
            .get_blob(from_container, from_key)?
            .ok_or_else(not_found)?;
        evaluate_preconditions(&source.metadata, &options.preconditions)?;

        let Blob {
            metadata, payload, ..
        } = source;
        let content = options
            .content_metadata
            .clone()
            .unwrap_or(metadata.content)
            .without_payload_fields();
        let user_metadata = options
            .user_metadata
            .clone()
            .unwrap_or(metadata.user_metadata);
        validate_metadata(&user_metadata)?;

        let copy = Blob::builder(to_key)
            .payload(payload)
            .content_metadata(content)
            .user_metadata_map(user_metadata)
            .access(metadata.access)
            .build();
        let etag = self.storage.put_blob(to_container, copy)?;
        debug!(from_container, from_key, to_container, to_key, etag = %etag, "copied blob");
        Ok(etag)
    }

    /// The blob's access policy.
    pub fn blob_access(&self, container: &str, key: &str) -> BlobStoreResult<Access> {
        self.blob_metadata(container, key)?
            .map(|m| m.access)
            .ok_or_else(|| BlobStoreError::KeyNotFound {
                container: container.to_owned(),
                key: key.to_owned(),
            })
    }

    /// Set the blob's access policy.
    pub fn set_blob_access(&self, container: &str, key: &str, access: Access) -> BlobStoreResult<()> {
        self.require_container(container)?;
        validate_blob_key(key)?;
        if !self.storage.set_blob_access(container, key, access)? {
            return Err(BlobStoreError::KeyNotFound {
                container: container.to_owned(),
                key: key.to_owned(),
            });
        }
        debug!(container, key, %access, "set blob access");
        Ok(())
    }

    /// Number of ordinary blobs in the container, multipart artifacts excluded.
    pub fn count_blobs(&self, container: &str) -> BlobStoreResult<usize> {
        self.require_container(container)?;
        let keys = self.storage.list_keys(container)?;
        Ok(keys.iter().filter(|key| !is_multipart_key(key)).count())
    }

    // -----------------------------------------------------------------------
    // Directory markers
    // -----------------------------------------------------------------------

    /// Create a zero-length `dir/` marker blob.
    pub fn create_directory(&self, container: &str, directory: &str) -> BlobStoreResult<()> {
        let marker = directory_marker(directory)?;
        let blob = Blob::builder(marker)
            .content_type(DIRECTORY_CONTENT_TYPE)
            .build();
        self.put_blob(container, blob, PutOptions::default())?;
        Ok(())
    }

    /// Whether the `dir/` marker blob exists.
    pub fn directory_exists(&self, container: &str, directory: &str) -> BlobStoreResult<bool> {
        self.blob_exists(container, &directory_marker(directory)?)
    }

    /// Remove the `dir/` marker blob. Blobs under the directory are kept.
    pub fn delete_directory(&self, container: &str, directory: &str) -> BlobStoreResult<()> {
        self.remove_blob(container, &directory_marker(directory)?)
    }
}

/// Normalize a directory name to its marker key `dir/`.
fn directory_marker(directory: &str) -> BlobStoreResult<String> {
    let trimmed = directory.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(BlobStoreError::invalid_argument(
            "directory name must not be empty",
        ));
    }
    Ok(format!("{trimmed}/"))
}
