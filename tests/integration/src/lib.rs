//! End-to-end tests for the BlobStack object store engine.
//!
//! The tests drive [`LocalBlobStore`] through its public API only, the way
//! an embedding server would. Run them with:
//! ```text
//! cargo test -p blobstack-integration
//! ```
//!
//! Set `RUST_LOG=debug` to see the store's log output.

use std::sync::Once;

use blobstack_core::model::{Blob, CreateContainerOptions, PutOptions};
use blobstack_core::{BlobStoreConfig, LocalBlobStore};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Create a store with the default configuration.
#[must_use]
pub fn test_store() -> LocalBlobStore {
    test_store_with(BlobStoreConfig::default())
}

/// Create a store with a custom configuration.
#[must_use]
pub fn test_store_with(config: BlobStoreConfig) -> LocalBlobStore {
    init_tracing();
    LocalBlobStore::new(config)
}

/// Generate a unique container name for a test.
#[must_use]
pub fn test_container_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create a container and return its name.
pub fn create_test_container(store: &LocalBlobStore, prefix: &str) -> String {
    let name = test_container_name(prefix);
    store
        .create_container(&name, None, CreateContainerOptions::default())
        .unwrap_or_else(|e| panic!("failed to create container {name}: {e}"));
    name
}

/// Put a blob with the given payload and return its ETag.
pub fn put_blob(store: &LocalBlobStore, container: &str, key: &str, payload: &[u8]) -> String {
    let blob = Blob::builder(key)
        .payload(bytes::Bytes::copy_from_slice(payload))
        .build();
    store
        .put_blob(container, blob, PutOptions::default())
        .unwrap_or_else(|e| panic!("failed to put {container}/{key}: {e}"))
}

/// Abort open uploads, clear the container, then delete it.
pub fn cleanup_container(store: &LocalBlobStore, container: &str) {
    if let Ok(uploads) = store.list_multipart_uploads(container) {
        for upload in &uploads {
            if let Err(e) = store.abort_multipart_upload(upload) {
                tracing::warn!(container, upload_id = %upload.upload_id, error = %e, "abort failed");
            }
        }
    }
    if let Err(e) = store.delete_container(container) {
        tracing::warn!(container, error = %e, "cleanup failed");
    }
}

mod test_bucket;
mod test_list;
mod test_multipart;
mod test_object;
mod test_precondition;
