//! Hierarchical, paginated listing over a flat keyspace.
//!
//! [`list_page`] is a pure function: it takes blob summaries and
//! [`ListOptions`] and returns one [`PageSet`]. Keys are filtered by prefix
//! or directory and, unless the listing is recursive, collapsed at the next
//! delimiter into synthesized [`StorageType::RelativePath`] entries.
//!
//! Scope selection:
//!
//! | Options | Filter | Collapse with |
//! |---------|--------|---------------|
//! | `dir`, not recursive | strictly under `dir/` | `/` |
//! | `dir`, recursive | strictly under `dir/` | nothing |
//! | `prefix` (+ `delimiter`) | starts with `prefix` | `delimiter`, if given |
//! | neither, not recursive | everything | `delimiter`, default `/` |
//! | neither, recursive | everything | nothing |
//!
//! Entries are merged in a [`BTreeMap`], so the page is lexicographic and
//! each synthesized prefix appears once. A marker resumes strictly after the
//! named entry, and the next marker is always the name of the last entry
//! actually returned.
//!
//! [`StorageType::RelativePath`]: crate::model::StorageType::RelativePath

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::error::{BlobStoreError, BlobStoreResult};
use crate::model::{BlobMetadata, ListOptions, PageSet, StorageMetadata};

/// Page size used when `max_results` is not given.
pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// Delimiter used for directory listings and root collapsing.
pub const DEFAULT_DELIMITER: &str = "/";

/// Reject conflicting listing options.
///
/// `prefix` and `dir` may not both be set, and `delimiter` may not be
/// combined with `dir` or `recursive`.
pub fn validate_list_options(options: &ListOptions) -> BlobStoreResult<()> {
    if options.prefix.is_some() && options.dir.is_some() {
        return Err(BlobStoreError::invalid_argument(
            "prefix and dir cannot be combined",
        ));
    }
    if options.delimiter.is_some() && (options.dir.is_some() || options.recursive) {
        return Err(BlobStoreError::invalid_argument(
            "delimiter cannot be combined with dir or recursive",
        ));
    }
    if options.delimiter.as_deref() == Some("") {
        return Err(BlobStoreError::invalid_argument(
            "delimiter must not be empty",
        ));
    }
    if options.max_results == Some(0) {
        return Err(BlobStoreError::invalid_argument(
            "max results must be at least 1",
        ));
    }
    Ok(())
}

/// Which keys to keep and where to collapse them.
#[derive(Debug)]
struct Scope<'a> {
    base: String,
    delimiter: Option<&'a str>,
}

impl<'a> Scope<'a> {
    fn from_options(options: &'a ListOptions) -> Self {
        if let Some(dir) = options.dir.as_deref() {
            let trimmed = dir.trim_end_matches('/');
            let base = if trimmed.is_empty() {
                String::new()
            } else {
                format!("{trimmed}/")
            };
            let delimiter = (!options.recursive).then_some(DEFAULT_DELIMITER);
            return Self { base, delimiter };
        }

        if let Some(prefix) = options.prefix.as_deref() {
            return Self {
                base: prefix.to_owned(),
                delimiter: options.delimiter.as_deref(),
            };
        }

        let delimiter = if options.recursive {
            None
        } else {
            Some(options.delimiter.as_deref().unwrap_or(DEFAULT_DELIMITER))
        };
        Self {
            base: String::new(),
            delimiter,
        }
    }

    /// Whether the key equal to `base` itself is dropped.
    fn hides_base(&self, options: &ListOptions) -> bool {
        options.dir.is_some() || self.delimiter.is_some()
    }
}

/// Compute one listing page over `blobs`.
///
/// `blobs` need not be sorted. Multipart artifacts must already have been
/// removed by the caller.
///
/// # Examples
///
/// ```
/// use blobstack_core::listing::list_page;
/// use blobstack_core::model::{Blob, ListOptions, StorageType};
///
/// let blobs = ["a/b", "a/c", "a/d/e"]
///     .into_iter()
///     .map(|k| Blob::builder(k).build().metadata);
/// let page = list_page(blobs, &ListOptions::builder().prefix("a/").delimiter("/").build()).unwrap();
///
/// let names: Vec<_> = page.iter().map(|e| (e.name.as_str(), e.storage_type)).collect();
/// assert_eq!(names, vec![
///     ("a/b", StorageType::Blob),
///     ("a/c", StorageType::Blob),
///     ("a/d/", StorageType::RelativePath),
/// ]);
/// assert!(page.next_marker.is_none());
/// ```
pub fn list_page(
    blobs: impl IntoIterator<Item = BlobMetadata>,
    options: &ListOptions,
) -> BlobStoreResult<PageSet<StorageMetadata>> {
    validate_list_options(options)?;

    let scope = Scope::from_options(options);
    let hide_base = scope.hides_base(options);
    let mut merged: BTreeMap<String, StorageMetadata> = BTreeMap::new();

    for mut blob in blobs {
        let Some(rest) = blob.name.strip_prefix(scope.base.as_str()) else {
            continue;
        };
        if rest.is_empty() && hide_base {
            continue;
        }

        if let Some(delimiter) = scope.delimiter {
            if let Some(idx) = rest.find(delimiter) {
                let name = format!("{}{}{delimiter}", scope.base, &rest[..idx]);
                merged
                    .entry(name)
                    .or_insert_with_key(|name| StorageMetadata::relative_path(name.as_str()));
                continue;
            }
        }

        if !options.detailed {
            blob.user_metadata.clear();
        }
        merged.insert(blob.name.clone(), StorageMetadata::blob(blob));
    }

    let lower = match options.marker.as_deref() {
        Some(marker) => Bound::Excluded(marker),
        None => Bound::Unbounded,
    };
    let max_results = options.max_results.unwrap_or(DEFAULT_MAX_RESULTS);

    let mut remaining = merged
        .range::<str, _>((lower, Bound::Unbounded))
        .map(|(_, entry)| entry);
    let entries: Vec<StorageMetadata> = remaining.by_ref().take(max_results).cloned().collect();
    let truncated = remaining.next().is_some();

    let next_marker = if truncated {
        entries.last().map(|entry| entry.name.clone())
    } else {
        None
    };

    Ok(PageSet {
        entries,
        next_marker,
    })
}
