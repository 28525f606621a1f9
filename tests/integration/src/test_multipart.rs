//! Multipart upload integration tests.

#[cfg(test)]
mod tests {
    use blobstack_core::model::{Blob, ListOptions, PutOptions};
    use blobstack_core::{BlobStoreConfig, BlobStoreError};

    use crate::{cleanup_container, create_test_container, test_store, test_store_with};

    #[test]
    fn test_should_complete_multipart_upload() {
        let store = test_store();
        let container = create_test_container(&store, "mpu");

        let template = Blob::builder("multipart.bin")
            .content_type("application/octet-stream")
            .content_disposition("attachment")
            .build()
            .metadata;
        let upload = store
            .initiate_multipart_upload(&container, &template, PutOptions::default())
            .unwrap_or_else(|e| panic!("initiate failed: {e}"));

        let part1 = store
            .upload_part(&upload, 1, "AAA")
            .unwrap_or_else(|e| panic!("upload part 1 failed: {e}"));
        let part2 = store
            .upload_part(&upload, 2, "BBB")
            .unwrap_or_else(|e| panic!("upload part 2 failed: {e}"));
        assert_eq!(part1.size, 3);

        let etag = store
            .complete_multipart_upload(&upload, &[part1, part2])
            .unwrap_or_else(|e| panic!("complete failed: {e}"));

        let blob = store
            .get_blob(&container, "multipart.bin")
            .unwrap_or_else(|e| panic!("get_blob failed: {e}"))
            .unwrap_or_else(|| panic!("blob missing"));
        assert_eq!(blob.payload.as_ref(), b"AAABBB");
        assert_eq!(blob.metadata.content.content_length, Some(6));
        assert_eq!(blob.etag(), etag);
        assert_eq!(blob.metadata.content.content_disposition.as_deref(), Some("attachment"));

        assert!(store
            .list_parts(&upload)
            .unwrap_or_else(|e| panic!("list_parts failed: {e}"))
            .is_empty());
        assert!(store
            .list_multipart_uploads(&container)
            .unwrap_or_else(|e| panic!("list uploads failed: {e}"))
            .is_empty());
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_abort_multipart_upload() {
        let store = test_store();
        let container = create_test_container(&store, "abort");
        let upload = store
            .initiate_multipart_upload(&container, &Blob::builder("target").build().metadata, PutOptions::default())
            .unwrap_or_else(|e| panic!("initiate failed: {e}"));
        for n in 1..=2 {
            store
                .upload_part(&upload, n, "data")
                .unwrap_or_else(|e| panic!("upload part {n} failed: {e}"));
        }

        store
            .abort_multipart_upload(&upload)
            .unwrap_or_else(|e| panic!("abort failed: {e}"));
        assert!(!store.blob_exists(&container, "target").unwrap_or(true));
        assert_eq!(store.storage().list_keys(&container).map(|k| k.len()).unwrap_or(1), 0);
        assert!(store.delete_container_if_empty(&container).unwrap_or(false));
    }

    #[test]
    fn test_should_keep_parts_after_failed_completion() {
        let store = test_store();
        let container = create_test_container(&store, "retry");
        let upload = store
            .initiate_multipart_upload(&container, &Blob::builder("target").build().metadata, PutOptions::default())
            .unwrap_or_else(|e| panic!("initiate failed: {e}"));
        let part1 = store
            .upload_part(&upload, 1, "AAA")
            .unwrap_or_else(|e| panic!("upload failed: {e}"));
        let ghost = blobstack_core::multipart::MultipartPart {
            part_number: 2,
            ..part1.clone()
        };

        assert!(matches!(
            store.complete_multipart_upload(&upload, &[part1.clone(), ghost]),
            Err(BlobStoreError::InvalidPart { part_number: 2, .. })
        ));
        assert!(!store.blob_exists(&container, "target").unwrap_or(true));

        let etag = store
            .complete_multipart_upload(&upload, &[part1])
            .unwrap_or_else(|e| panic!("retry failed: {e}"));
        assert!(!etag.is_empty());
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_split_multipart_put() {
        let config = BlobStoreConfig::builder().multipart_chunk_size(3).build();
        let store = test_store_with(config);
        let container = create_test_container(&store, "split");

        let payload = "abcdefghij";
        store
            .put_blob(
                &container,
                Blob::builder("split.txt").payload(payload).build(),
                PutOptions::builder().multipart(true).build(),
            )
            .unwrap_or_else(|e| panic!("multipart put failed: {e}"));

        let blob = store
            .get_blob(&container, "split.txt")
            .unwrap_or_else(|e| panic!("get_blob failed: {e}"))
            .unwrap_or_else(|| panic!("blob missing"));
        assert_eq!(blob.payload.as_ref(), payload.as_bytes());
        let page = store
            .list(&container, &ListOptions::builder().recursive(true).build())
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        assert_eq!(page.len(), 1);
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_clean_up_open_uploads_on_container_delete() {
        let store = test_store();
        let container = create_test_container(&store, "open");
        let upload = store
            .initiate_multipart_upload(&container, &Blob::builder("t").build().metadata, PutOptions::default())
            .unwrap_or_else(|e| panic!("initiate failed: {e}"));
        store
            .upload_part(&upload, 1, "x")
            .unwrap_or_else(|e| panic!("upload failed: {e}"));

        assert!(!store.delete_container_if_empty(&container).unwrap_or(true));
        store
            .delete_container(&container)
            .unwrap_or_else(|e| panic!("delete_container failed: {e}"));
        assert!(!store.container_exists(&container));
    }

    #[test]
    fn test_should_abort_open_uploads_during_cleanup() {
        let store = test_store();
        let container = create_test_container(&store, "cleanup");
        let upload = store
            .initiate_multipart_upload(&container, &Blob::builder("t").build().metadata, PutOptions::default())
            .unwrap_or_else(|e| panic!("initiate failed: {e}"));
        store
            .upload_part(&upload, 1, "x")
            .unwrap_or_else(|e| panic!("upload failed: {e}"));

        cleanup_container(&store, &container);
        assert!(!store.container_exists(&container));
        assert!(matches!(
            store.list_multipart_uploads(&container),
            Err(BlobStoreError::ContainerNotFound { .. })
        ));
    }
}
