//! Blob lifecycle integration tests.

#[cfg(test)]
mod tests {
    use blobstack_core::BlobStoreError;
    use blobstack_core::checksums::compute_etag;
    use blobstack_core::conditional::parse_ranges;
    use blobstack_core::model::{Access, Blob, CopyOptions, GetOptions, PutOptions};

    use crate::{cleanup_container, create_test_container, put_blob, test_store};

    #[test]
    fn test_should_put_get_and_remove_blob() {
        let store = test_store();
        let container = create_test_container(&store, "obj");

        let etag = put_blob(&store, &container, "docs/readme.txt", b"hello world");
        assert_eq!(etag, compute_etag(b"hello world"));

        let blob = store
            .get_blob(&container, "docs/readme.txt")
            .unwrap_or_else(|e| panic!("get_blob failed: {e}"))
            .unwrap_or_else(|| panic!("blob missing"));
        assert_eq!(blob.payload.as_ref(), b"hello world");
        assert_eq!(blob.metadata.size, 11);
        assert_eq!(blob.metadata.container, container);

        let head = store
            .blob_metadata(&container, "docs/readme.txt")
            .unwrap_or_else(|e| panic!("blob_metadata failed: {e}"))
            .unwrap_or_else(|| panic!("metadata missing"));
        assert_eq!(head.etag, etag);

        store
            .remove_blob(&container, "docs/readme.txt")
            .unwrap_or_else(|e| panic!("remove_blob failed: {e}"));
        assert!(store
            .get_blob(&container, "docs/readme.txt")
            .unwrap_or_else(|e| panic!("get_blob failed: {e}"))
            .is_none());
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_store_large_blob_out_of_memory() {
        let store = test_store();
        let container = create_test_container(&store, "large");
        let payload = vec![0xAB_u8; 1024 * 1024];
        put_blob(&store, &container, "big.bin", &payload);

        let blob = store
            .get_blob(&container, "big.bin")
            .unwrap_or_else(|e| panic!("get_blob failed: {e}"))
            .unwrap_or_else(|| panic!("blob missing"));
        assert_eq!(blob.payload.len(), payload.len());
        assert_eq!(blob.etag(), compute_etag(&payload));
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_return_byte_ranges() {
        let store = test_store();
        let container = create_test_container(&store, "range");
        put_blob(&store, &container, "digits", b"0123456789");

        for (header, expected) in [("bytes=2-5", "2345"), ("-3", "789"), ("7-", "789"), ("0-1,8-", "0189")] {
            let options = GetOptions::builder()
                .ranges(parse_ranges(header).unwrap_or_else(|e| panic!("parse {header}: {e}")))
                .build();
            let blob = store
                .get_blob_with(&container, "digits", &options)
                .unwrap_or_else(|e| panic!("get_blob_with failed: {e}"))
                .unwrap_or_else(|| panic!("blob missing"));
            assert_eq!(blob.payload.as_ref(), expected.as_bytes(), "range {header}");
            assert_eq!(blob.metadata.content.content_length, Some(expected.len() as u64));
            assert_eq!(blob.metadata.size, 10);
        }

        let options = GetOptions::builder()
            .ranges(parse_ranges("10-").unwrap_or_else(|e| panic!("{e}")))
            .build();
        assert!(matches!(
            store.get_blob_with(&container, "digits", &options),
            Err(BlobStoreError::InvalidArgument { .. })
        ));
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_copy_across_containers() {
        let store = test_store();
        let source = create_test_container(&store, "src");
        let target = create_test_container(&store, "dst");

        let blob = Blob::builder("photo.jpg")
            .payload("jpeg-bytes")
            .content_type("image/jpeg")
            .user_metadata("camera", "x100")
            .build();
        store
            .put_blob(&source, blob, PutOptions::builder().access(Access::PublicRead).build())
            .unwrap_or_else(|e| panic!("put_blob failed: {e}"));

        let etag = store
            .copy_blob(&source, "photo.jpg", &target, "copy.jpg", &CopyOptions::default())
            .unwrap_or_else(|e| panic!("copy_blob failed: {e}"));
        let copy = store
            .get_blob(&target, "copy.jpg")
            .unwrap_or_else(|e| panic!("get_blob failed: {e}"))
            .unwrap_or_else(|| panic!("copy missing"));
        assert_eq!(copy.etag(), etag);
        assert_eq!(copy.payload.as_ref(), b"jpeg-bytes");
        assert_eq!(copy.metadata.content.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(copy.metadata.user_metadata.get("camera").map(String::as_str), Some("x100"));
        assert_eq!(copy.metadata.access, Access::PublicRead);

        assert!(matches!(
            store.copy_blob(&source, "absent", &target, "x", &CopyOptions::default()),
            Err(BlobStoreError::KeyNotFound { .. })
        ));
        cleanup_container(&store, &source);
        cleanup_container(&store, &target);
    }

    #[test]
    fn test_should_manage_directories() {
        let store = test_store();
        let container = create_test_container(&store, "dirs");
        store
            .create_directory(&container, "photos")
            .unwrap_or_else(|e| panic!("create_directory failed: {e}"));
        put_blob(&store, &container, "photos/a.jpg", b"a");

        assert!(store.directory_exists(&container, "photos/").unwrap_or(false));
        store
            .delete_directory(&container, "photos")
            .unwrap_or_else(|e| panic!("delete_directory failed: {e}"));
        assert!(!store.directory_exists(&container, "photos").unwrap_or(true));
        assert!(store.blob_exists(&container, "photos/a.jpg").unwrap_or(false));
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_reject_reserved_and_oversized_keys() {
        let store = test_store();
        let container = create_test_container(&store, "keys");
        assert!(matches!(
            store.put_blob(&container, Blob::builder(".mpus-x-y-stub").build(), PutOptions::default()),
            Err(BlobStoreError::InvalidArgument { .. })
        ));
        assert!(matches!(
            store.put_blob(&container, Blob::builder("k".repeat(1025)).build(), PutOptions::default()),
            Err(BlobStoreError::KeyTooLong)
        ));
        cleanup_container(&store, &container);
    }
}
