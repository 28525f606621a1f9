//! Listing integration tests.

#[cfg(test)]
mod tests {
    use blobstack_core::BlobStoreError;
    use blobstack_core::model::{ListOptions, StorageType};

    use crate::{cleanup_container, create_test_container, put_blob, test_store};

    #[test]
    fn test_should_paginate_through_every_blob_once() {
        let store = test_store();
        let container = create_test_container(&store, "page");
        let mut keys: Vec<String> = (0..25).map(|i| format!("k/{i:03}")).collect();
        for key in &keys {
            put_blob(&store, &container, key, b"x");
        }
        keys.sort();

        let mut seen = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let mut options = ListOptions::builder().recursive(true).max_results(7).build();
            options.marker = marker.take();
            let page = store
                .list(&container, &options)
                .unwrap_or_else(|e| panic!("list failed: {e}"));
            assert!(page.len() <= 7);
            seen.extend(page.iter().map(|e| e.name.clone()));
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }
        assert_eq!(seen, keys);
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_compute_common_prefixes() {
        let store = test_store();
        let container = create_test_container(&store, "prefix");
        for key in ["a/b", "a/c", "a/d/e", "z"] {
            put_blob(&store, &container, key, b"x");
        }

        let page = store
            .list(&container, &ListOptions::builder().prefix("a/").delimiter("/").build())
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        let entries: Vec<(&str, StorageType)> =
            page.iter().map(|e| (e.name.as_str(), e.storage_type)).collect();
        assert_eq!(entries, vec![
            ("a/b", StorageType::Blob),
            ("a/c", StorageType::Blob),
            ("a/d/", StorageType::RelativePath),
        ]);
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_list_directory_contents() {
        let store = test_store();
        let container = create_test_container(&store, "dirlist");
        for key in ["a/", "a/b", "a/d/e", "ab"] {
            put_blob(&store, &container, key, b"x");
        }

        let page = store
            .list(&container, &ListOptions::builder().dir("a").build())
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        let names: Vec<&str> = page.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a/b", "a/d/"]);

        let page = store
            .list(&container, &ListOptions::builder().dir("a/").recursive(true).build())
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        let names: Vec<&str> = page.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a/b", "a/d/e"]);
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_not_repeat_common_prefix_across_pages() {
        let store = test_store();
        let container = create_test_container(&store, "dedup");
        for key in ["p/1", "p/2", "p/3", "q"] {
            put_blob(&store, &container, key, b"x");
        }

        let first = store
            .list(&container, &ListOptions::builder().max_results(1).build())
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        let names: Vec<&str> = first.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["p/"]);
        assert_eq!(first.next_marker.as_deref(), Some("p/"));

        let second = store
            .list(&container, &ListOptions::builder().max_results(1).marker("p/").build())
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        let names: Vec<&str> = second.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["q"]);
        assert!(second.next_marker.is_none());
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_strip_user_metadata_unless_detailed() {
        let store = test_store();
        let container = create_test_container(&store, "detail");
        let blob = blobstack_core::model::Blob::builder("k").user_metadata("a", "1").build();
        store
            .put_blob(&container, blob, blobstack_core::model::PutOptions::default())
            .unwrap_or_else(|e| panic!("put_blob failed: {e}"));

        let plain = store
            .list(&container, &ListOptions::default())
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        let meta = plain.entries[0].blob.as_ref().map(|b| b.user_metadata.len());
        assert_eq!(meta, Some(0));

        let detailed = store
            .list(&container, &ListOptions::builder().detailed(true).build())
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        let meta = detailed.entries[0].blob.as_ref().map(|b| b.user_metadata.len());
        assert_eq!(meta, Some(1));
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_reject_conflicting_options() {
        let store = test_store();
        let container = create_test_container(&store, "conflict");
        for options in [
            ListOptions::builder().prefix("a").dir("b").build(),
            ListOptions::builder().dir("a").delimiter("/").build(),
            ListOptions::builder().recursive(true).delimiter("/").build(),
        ] {
            assert!(matches!(
                store.list(&container, &options),
                Err(BlobStoreError::InvalidArgument { .. })
            ));
        }
        cleanup_container(&store, &container);
    }
}
