//! Listing operations.

use tracing::{debug, warn};

use crate::error::BlobStoreResult;
use crate::listing::{list_page, validate_list_options};
use crate::model::{BlobMetadata, ListOptions, PageSet, StorageMetadata};
use crate::multipart::is_multipart_key;
use crate::provider::LocalBlobStore;

impl LocalBlobStore {
    /// List one page of a container.
    ///
    /// Multipart stubs and parts are never listed. Keys whose metadata
    /// cannot be loaded are skipped as transiently absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use blobstack_core::LocalBlobStore;
    /// use blobstack_core::model::{Blob, CreateContainerOptions, ListOptions, PutOptions};
    ///
    /// let store = LocalBlobStore::default();
    /// store.create_container("docs", None, CreateContainerOptions::default()).unwrap();
    /// for key in ["a/b", "a/c", "a/d/e"] {
    ///     store.put_blob("docs", Blob::builder(key).build(), PutOptions::default()).unwrap();
    /// }
    ///
    /// let page = store
    ///     .list("docs", &ListOptions::builder().prefix("a/").delimiter("/").build())
    ///     .unwrap();
    /// let names: Vec<_> = page.iter().map(|e| e.name.as_str()).collect();
    /// assert_eq!(names, vec!["a/b", "a/c", "a/d/"]);
    /// ```
    pub fn list(
        &self,
        container: &str,
        options: &ListOptions,
    ) -> BlobStoreResult<PageSet<StorageMetadata>> {
        validate_list_options(options)?;
        self.require_container(container)?;

        let blobs = self.load_metadata(container, |key| !is_multipart_key(key))?;
        let page = list_page(blobs, options)?;
        debug!(
            container,
            count = page.len(),
            truncated = page.next_marker.is_some(),
            "listed container"
        );
        Ok(page)
    }

    /// One page over every key starting with `prefix`, reserved keys included.
    ///
    /// Keys at or before `marker` are skipped before their metadata is read.
    pub(crate) fn list_raw(
        &self,
        container: &str,
        prefix: &str,
        marker: Option<String>,
    ) -> BlobStoreResult<PageSet<StorageMetadata>> {
        let blobs = self.load_metadata(container, |key| {
            key.starts_with(prefix) && marker.as_deref().is_none_or(|m| key > m)
        })?;
        let mut options = ListOptions::builder().prefix(prefix).build();
        options.marker = marker;
        list_page(blobs, &options)
    }

    /// Metadata of every key accepted by `keep`, in key order.
    fn load_metadata(
        &self,
        container: &str,
        keep: impl Fn(&str) -> bool,
    ) -> BlobStoreResult<Vec<BlobMetadata>> {
        let keys = self.storage.list_keys(container)?;
        let mut blobs = Vec::with_capacity(keys.len());
        for key in keys.iter().filter(|key| keep(key.as_str())) {
            match self.storage.get_blob_metadata(container, key) {
                Ok(Some(metadata)) => blobs.push(metadata),
                Ok(None) => debug!(container, key = %key, "blob vanished while listing"),
                Err(e) => warn!(container, key = %key, error = %e, "skipping blob that failed to load"),
            }
        }
        Ok(blobs)
    }
}
