//! Container lifecycle integration tests.

#[cfg(test)]
mod tests {
    use blobstack_core::BlobStoreError;
    use blobstack_core::model::{Access, CreateContainerOptions};

    use crate::{cleanup_container, create_test_container, put_blob, test_container_name, test_store};

    #[test]
    fn test_should_create_and_list_containers() {
        let store = test_store();
        let first = create_test_container(&store, "list");
        let second = create_test_container(&store, "list");

        let names: Vec<String> = store.list_containers().into_iter().map(|c| c.name).collect();
        assert!(names.contains(&first));
        assert!(names.contains(&second));
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);

        cleanup_container(&store, &first);
        cleanup_container(&store, &second);
        assert!(store.list_containers().is_empty());
    }

    #[test]
    fn test_should_not_recreate_existing_container() {
        let store = test_store();
        let name = test_container_name("dup");
        let opts = CreateContainerOptions::builder().access(Access::PublicRead).build();
        assert!(store.create_container(&name, Some("eu-west-1"), opts).unwrap_or(false));
        assert!(!store
            .create_container(&name, None, CreateContainerOptions::default())
            .unwrap_or(true));

        let meta = store
            .container_metadata(&name)
            .unwrap_or_else(|e| panic!("container_metadata failed: {e}"));
        assert_eq!(meta.location, "eu-west-1");
        assert_eq!(meta.access, Access::PublicRead);
        cleanup_container(&store, &name);
    }

    #[test]
    fn test_should_keep_non_empty_container_until_cleared() {
        let store = test_store();
        let name = create_test_container(&store, "nonempty");
        put_blob(&store, &name, "k", b"v");

        assert!(!store.delete_container_if_empty(&name).unwrap_or(true));
        assert!(store.container_exists(&name));

        store
            .clear_container(&name)
            .unwrap_or_else(|e| panic!("clear_container failed: {e}"));
        assert!(store.delete_container_if_empty(&name).unwrap_or(false));
        assert!(!store.container_exists(&name));
    }

    #[test]
    fn test_should_report_operations_on_missing_container() {
        let store = test_store();
        let name = test_container_name("missing");
        let err = store
            .count_blobs(&name)
            .err()
            .unwrap_or_else(|| panic!("expected an error"));
        assert!(matches!(err, BlobStoreError::ContainerNotFound { .. }));
        assert_eq!(err.status_code().as_u16(), 404);
        assert!(store.remove_blob(&name, "k").is_ok());
        assert!(store.delete_container(&name).is_ok());
    }

    #[test]
    fn test_should_reject_invalid_container_names() {
        let store = test_store();
        for name in ["ab", "UPPER", "has_underscore", "192.168.1.1", "a..b", "-lead"] {
            assert!(
                matches!(
                    store.create_container(name, None, CreateContainerOptions::default()),
                    Err(BlobStoreError::InvalidContainerName { .. })
                ),
                "expected {name:?} to be rejected"
            );
        }
    }
}
