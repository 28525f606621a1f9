//! Container lifecycle operations.

use tracing::{debug, info};

use crate::error::{BlobStoreError, BlobStoreResult};
use crate::model::{Access, ContainerMetadata, CreateContainerOptions};
use crate::provider::LocalBlobStore;
use crate::validation::validate_container_name;

impl LocalBlobStore {
    /// List every container, sorted by name.
    #[must_use]
    pub fn list_containers(&self) -> Vec<ContainerMetadata> {
        self.storage.list_containers()
    }

    /// Whether the container exists.
    #[must_use]
    pub fn container_exists(&self, container: &str) -> bool {
        self.storage.container_exists(container)
    }

    /// Metadata of one container.
    pub fn container_metadata(&self, container: &str) -> BlobStoreResult<ContainerMetadata> {
        self.storage
            .container_metadata(container)
            .ok_or_else(|| BlobStoreError::ContainerNotFound {
                container: container.to_owned(),
            })
    }

    /// Create a container.
    ///
    /// Returns `false` when the container already exists; its location and
    /// access are left unchanged. `location` defaults to the configured
    /// default location.
    pub fn create_container(
        &self,
        container: &str,
        location: Option<&str>,
        options: CreateContainerOptions,
    ) -> BlobStoreResult<bool> {
        validate_container_name(container)?;
        let location = location.unwrap_or(self.config.default_location.as_str());
        let created = self
            .storage
            .create_container(container, location, options)?;
        if created {
            info!(container, location, access = %options.access, "created container");
        } else {
            debug!(container, "container already exists");
        }
        Ok(created)
    }

    /// Delete the container only if it holds no blobs.
    ///
    /// In-progress multipart uploads count as content. Returns `true` when
    /// the container is gone afterwards (including when it never existed)
    /// and `false` when it was kept because it is not empty.
    pub fn delete_container_if_empty(&self, container: &str) -> BlobStoreResult<bool> {
        if !self.storage.container_exists(container) {
            return Ok(true);
        }
        let keys = self.storage.list_keys(container)?;
        if !keys.is_empty() {
            debug!(container, keys = keys.len(), "container not empty, keeping it");
            return Ok(false);
        }
        self.storage.delete_container(container)?;
        info!(container, "deleted empty container");
        Ok(true)
    }

    /// Clear and delete the container. Absent containers are ignored.
    pub fn delete_container(&self, container: &str) -> BlobStoreResult<()> {
        if !self.storage.container_exists(container) {
            return Ok(());
        }
        self.clear_container(container)?;
        self.storage.delete_container(container)?;
        info!(container, "deleted container");
        Ok(())
    }

    /// Remove every blob in the container, multipart artifacts included.
    pub fn clear_container(&self, container: &str) -> BlobStoreResult<()> {
        self.require_container(container)?;
        let keys = self.storage.list_keys(container)?;
        for key in &keys {
            self.storage.remove_blob(container, key)?;
        }
        debug!(container, count = keys.len(), "cleared container");
        Ok(())
    }

    /// The container's access policy.
    pub fn container_access(&self, container: &str) -> BlobStoreResult<Access> {
        self.container_metadata(container).map(|m| m.access)
    }

    /// Set the container's access policy.
    pub fn set_container_access(&self, container: &str, access: Access) -> BlobStoreResult<()> {
        self.require_container(container)?;
        self.storage.set_container_access(container, access)?;
        debug!(container, %access, "set container access");
        Ok(())
    }
}
