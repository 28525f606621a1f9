//! Multipart upload operations built from ordinary blob puts and removes.

use bytes::{Bytes, BytesMut};
use tracing::{debug, info, warn};

use crate::checksums::compute_content_md5;
use crate::error::{BlobStoreError, BlobStoreResult, StorageError};
use crate::model::{Blob, BlobMetadata, PutOptions};
use crate::multipart::{MultipartKey, MultipartPart, MultipartUpload, split_payload};
use crate::provider::LocalBlobStore;
use crate::utils::{generate_upload_id, normalize_etag};
use crate::validation::{validate_blob_key, validate_metadata, validate_part_number, validate_part_size};

impl LocalBlobStore {
    /// Start a multipart upload of `template.name`.
    ///
    /// The template's content metadata, user metadata and access are stored on
    /// the upload's stub and applied to the final blob. `options.access`
    /// overrides the template's access.
    pub fn initiate_multipart_upload(
        &self,
        container: &str,
        template: &BlobMetadata,
        options: PutOptions,
    ) -> BlobStoreResult<MultipartUpload> {
        self.require_container(container)?;
        validate_blob_key(&template.name)?;
        validate_metadata(&template.user_metadata)?;

        let upload_id = generate_upload_id();
        let access = options.access.unwrap_or(template.access);
        let metadata = BlobMetadata {
            container: container.to_owned(),
            access,
            ..template.clone()
        };
        let upload = MultipartUpload {
            container: container.to_owned(),
            blob_name: template.name.clone(),
            upload_id,
            metadata,
            put_options: PutOptions {
                multipart: false,
                access: Some(access),
            },
        };

        let stub = Blob::builder(upload.stub_key())
            .content_metadata(upload.metadata.content.without_payload_fields())
            .user_metadata_map(upload.metadata.user_metadata.clone())
            .access(access)
            .build();
        self.storage.put_blob(container, stub)?;

        info!(
            container,
            key = %upload.blob_name,
            upload_id = %upload.upload_id,
            "initiated multipart upload"
        );
        Ok(upload)
    }

    /// Store one part. Re-uploading a part number replaces the earlier part.
    pub fn upload_part(
        &self,
        upload: &MultipartUpload,
        part_number: u32,
        payload: impl Into<Bytes>,
    ) -> BlobStoreResult<MultipartPart> {
        let payload = payload.into();
        validate_part_number(part_number, self.config.maximum_part_count)?;
        validate_part_size(payload.len() as u64, self.config.maximum_part_size)?;
        self.require_upload(upload)?;

        let key = upload.part_key(part_number);
        let size = payload.len() as u64;
        let etag = self
            .storage
            .put_blob(&upload.container, Blob::builder(key.as_str()).payload(payload).build())?;
        let last_modified = self
            .storage
            .get_blob_metadata(&upload.container, &key)?
            .map_or_else(chrono::Utc::now, |m| m.last_modified);

        debug!(
            container = %upload.container,
            upload_id = %upload.upload_id,
            part_number,
            size,
            etag = %etag,
            "uploaded part"
        );
        Ok(MultipartPart {
            part_number,
            size,
            etag,
            last_modified,
        })
    }

    /// Every uploaded part of `upload`, sorted by part number.
    pub fn list_parts(&self, upload: &MultipartUpload) -> BlobStoreResult<Vec<MultipartPart>> {
        self.require_container(&upload.container)?;
        let prefix = upload.key_prefix();
        let mut parts = Vec::new();
        let mut marker = None;

        loop {
            let page = self.list_raw(&upload.container, &prefix, marker.take())?;
            for entry in page.iter() {
                let Some(MultipartKey::Part {
                    upload_id,
                    blob_name,
                    part_number,
                }) = MultipartKey::decode(&entry.name)
                else {
                    continue;
                };
                if upload_id != upload.upload_id || blob_name != upload.blob_name {
                    continue;
                }
                if let Some(blob) = entry.blob.as_ref() {
                    parts.push(MultipartPart {
                        part_number,
                        size: blob.size,
                        etag: blob.etag.clone(),
                        last_modified: blob.last_modified,
                    });
                }
            }
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        parts.sort_by_key(|part| part.part_number);
        Ok(parts)
    }

    /// Assemble `parts`, in the given order, into the target blob.
    ///
    /// Every part is read before anything is written. If a part is missing
    /// or its ETag does not match, the target is left untouched and the
    /// upload stays open. On success the parts and the stub are removed and
    /// the final ETag is returned.
    pub fn complete_multipart_upload(
        &self,
        upload: &MultipartUpload,
        parts: &[MultipartPart],
    ) -> BlobStoreResult<String> {
        self.require_upload(upload)?;
        if parts.is_empty() {
            return Err(BlobStoreError::invalid_argument(
                "multipart upload must be completed with at least one part",
            ));
        }

        let mut chunks = Vec::with_capacity(parts.len());
        for part in parts {
            let invalid = || BlobStoreError::InvalidPart {
                upload_id: upload.upload_id.clone(),
                part_number: part.part_number,
            };
            let blob = self
                .storage
                .get_blob(&upload.container, &upload.part_key(part.part_number))?
                .ok_or_else(invalid)?;
            if normalize_etag(blob.etag()) != normalize_etag(&part.etag) {
                return Err(invalid());
            }
            chunks.push(blob.payload);
        }

        let total: usize = chunks.iter().map(Bytes::len).sum();
        let mut payload = BytesMut::with_capacity(total);
        for chunk in &chunks {
            payload.extend_from_slice(chunk);
        }

        let access = upload.put_options.access.unwrap_or(upload.metadata.access);
        let target = Blob::builder(upload.blob_name.as_str())
            .payload(payload.freeze())
            .content_metadata(upload.metadata.content.without_payload_fields())
            .user_metadata_map(upload.metadata.user_metadata.clone())
            .access(access)
            .build();
        let etag = self.storage.put_blob(&upload.container, target)?;

        self.remove_upload_artifacts(upload)?;
        info!(
            container = %upload.container,
            key = %upload.blob_name,
            upload_id = %upload.upload_id,
            parts = parts.len(),
            size = total,
            etag = %etag,
            "completed multipart upload"
        );
        Ok(etag)
    }

    /// Remove every part and the stub of `upload`. Missing pieces are ignored.
    pub fn abort_multipart_upload(&self, upload: &MultipartUpload) -> BlobStoreResult<()> {
        self.require_container(&upload.container)?;
        let removed = self.remove_upload_artifacts(upload)?;
        info!(
            container = %upload.container,
            upload_id = %upload.upload_id,
            removed,
            "aborted multipart upload"
        );
        Ok(())
    }

    /// In-progress uploads of a container, recovered from their stubs.
    pub fn list_multipart_uploads(&self, container: &str) -> BlobStoreResult<Vec<MultipartUpload>> {
        self.require_container(container)?;
        let mut uploads = Vec::new();
        for key in self.storage.list_keys(container)? {
            let Some(MultipartKey::Stub {
                upload_id,
                blob_name,
            }) = MultipartKey::decode(&key)
            else {
                continue;
            };
            let Some(stub) = self.storage.get_blob_metadata(container, &key)? else {
                continue;
            };
            let access = stub.access;
            uploads.push(MultipartUpload {
                container: container.to_owned(),
                blob_name: blob_name.clone(),
                upload_id,
                metadata: BlobMetadata {
                    name: blob_name,
                    size: 0,
                    etag: String::new(),
                    content: stub.content.without_payload_fields(),
                    ..stub
                },
                put_options: PutOptions {
                    multipart: false,
                    access: Some(access),
                },
            });
        }
        Ok(uploads)
    }

    /// Smallest part size callers should upload, except for the last part.
    #[must_use]
    pub fn minimum_multipart_part_size(&self) -> u64 {
        self.config.minimum_part_size
    }

    /// Largest part size accepted by [`Self::upload_part`].
    #[must_use]
    pub fn maximum_multipart_part_size(&self) -> u64 {
        self.config.maximum_part_size
    }

    /// Highest part number accepted by [`Self::upload_part`].
    #[must_use]
    pub fn maximum_multipart_part_count(&self) -> u32 {
        self.config.maximum_part_count
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Write `blob` through a full multipart upload, aborting it on failure.
    pub(crate) fn put_blob_multipart(
        &self,
        container: &str,
        blob: Blob,
        options: PutOptions,
    ) -> BlobStoreResult<String> {
        if let Some(expected) = blob.metadata.content.content_md5.as_deref() {
            let actual = compute_content_md5(&blob.payload);
            if expected != actual {
                return Err(StorageError::ChecksumMismatch {
                    expected: expected.to_owned(),
                    actual,
                }
                .into());
            }
        }

        let chunks = split_payload(&blob.payload, self.config.multipart_chunk_size);
        let max_parts = usize::try_from(self.config.maximum_part_count).unwrap_or(usize::MAX);
        if chunks.len() > max_parts {
            return Err(BlobStoreError::invalid_argument(format!(
                "payload needs {} parts, more than the maximum of {max_parts}",
                chunks.len()
            )));
        }

        let upload = self.initiate_multipart_upload(
            container,
            &blob.metadata,
            PutOptions {
                multipart: false,
                ..options
            },
        )?;

        match self.upload_chunks(&upload, chunks) {
            Ok(etag) => Ok(etag),
            Err(e) => {
                warn!(
                    container,
                    upload_id = %upload.upload_id,
                    error = %e,
                    "multipart put failed, aborting upload"
                );
                if let Err(abort_err) = self.abort_multipart_upload(&upload) {
                    warn!(upload_id = %upload.upload_id, error = %abort_err, "abort failed");
                }
                Err(e)
            }
        }
    }

    fn upload_chunks(&self, upload: &MultipartUpload, chunks: Vec<Bytes>) -> BlobStoreResult<String> {
        let mut parts = Vec::with_capacity(chunks.len());
        for (part_number, chunk) in (1_u32..).zip(chunks) {
            parts.push(self.upload_part(upload, part_number, chunk)?);
        }
        self.complete_multipart_upload(upload, &parts)
    }

    /// Fail with `UploadNotFound` unless the upload's stub exists.
    fn require_upload(&self, upload: &MultipartUpload) -> BlobStoreResult<()> {
        self.require_container(&upload.container)?;
        if self.storage.blob_exists(&upload.container, &upload.stub_key()) {
            Ok(())
        } else {
            Err(BlobStoreError::UploadNotFound {
                upload_id: upload.upload_id.clone(),
            })
        }
    }

    /// Remove the parts and the stub, returning how many parts were removed.
    fn remove_upload_artifacts(&self, upload: &MultipartUpload) -> BlobStoreResult<usize> {
        let parts = self.list_parts(upload)?;
        for part in &parts {
            self.storage
                .remove_blob(&upload.container, &upload.part_key(part.part_number))?;
        }
        self.storage.remove_blob(&upload.container, &upload.stub_key())?;
        Ok(parts.len())
    }
}
