//! Conditional read and copy integration tests.

#[cfg(test)]
mod tests {
    use blobstack_core::BlobStoreError;
    use blobstack_core::conditional::ByteRange;
    use blobstack_core::model::{CopyOptions, GetOptions, Preconditions};
    use chrono::{Duration, Utc};

    use crate::{cleanup_container, create_test_container, put_blob, test_store};

    fn get_with(preconditions: Preconditions) -> GetOptions {
        GetOptions::builder().preconditions(preconditions).build()
    }

    #[test]
    fn test_should_honor_etag_conditions() {
        let store = test_store();
        let container = create_test_container(&store, "etag");
        let etag = put_blob(&store, &container, "k", b"payload");

        let matched = store
            .get_blob_with(&container, "k", &get_with(Preconditions::builder().if_match(etag.clone()).build()))
            .unwrap_or_else(|e| panic!("if-match get failed: {e}"));
        assert!(matched.is_some());

        for _ in 0..3 {
            assert!(matches!(
                store.get_blob_with(
                    &container,
                    "k",
                    &get_with(Preconditions::builder().if_none_match(etag.clone()).build())
                ),
                Err(BlobStoreError::NotModified)
            ));
        }

        assert!(matches!(
            store.get_blob_with(&container, "k", &get_with(Preconditions::builder().if_match("\"other\"").build())),
            Err(BlobStoreError::PreconditionFailed)
        ));
        assert!(store
            .get_blob_with(&container, "k", &get_with(Preconditions::builder().if_match("*").build()))
            .is_ok());
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_honor_date_conditions() {
        let store = test_store();
        let container = create_test_container(&store, "dates");
        put_blob(&store, &container, "k", b"payload");
        let past = Utc::now() - Duration::hours(1);
        let future = Utc::now() + Duration::hours(1);

        let ok = |p: Preconditions| store.get_blob_with(&container, "k", &get_with(p));
        assert!(ok(Preconditions::builder().if_modified_since(past).build()).is_ok());
        assert!(matches!(
            ok(Preconditions::builder().if_modified_since(future).build()),
            Err(BlobStoreError::NotModified)
        ));
        assert!(ok(Preconditions::builder().if_unmodified_since(future).build()).is_ok());
        assert!(matches!(
            ok(Preconditions::builder().if_unmodified_since(past).build()),
            Err(BlobStoreError::PreconditionFailed)
        ));
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_check_preconditions_before_ranges() {
        let store = test_store();
        let container = create_test_container(&store, "order");
        put_blob(&store, &container, "k", b"abc");

        let options = GetOptions::builder()
            .preconditions(Preconditions::builder().if_match("\"nope\"").build())
            .ranges(vec![ByteRange::From(100)])
            .build();
        assert!(matches!(
            store.get_blob_with(&container, "k", &options),
            Err(BlobStoreError::PreconditionFailed)
        ));
        cleanup_container(&store, &container);
    }

    #[test]
    fn test_should_gate_copy_on_source_conditions() {
        let store = test_store();
        let container = create_test_container(&store, "copycond");
        let etag = put_blob(&store, &container, "src", b"payload");

        let options = CopyOptions::builder()
            .preconditions(Preconditions::builder().if_none_match(etag.clone()).build())
            .build();
        assert!(matches!(
            store.copy_blob(&container, "src", &container, "dst", &options),
            Err(BlobStoreError::NotModified)
        ));
        assert!(!store.blob_exists(&container, "dst").unwrap_or(true));

        let options = CopyOptions::builder()
            .preconditions(Preconditions::builder().if_match(etag).build())
            .build();
        assert!(store
            .copy_blob(&container, "src", &container, "dst", &options)
            .is_ok());
        cleanup_container(&store, &container);
    }
}
