use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use super::blob::ContentMetadata;
use super::container::Access;
use crate::conditional::ByteRange;

/// Options for a single listing page.
///
/// `prefix` and `dir` are mutually exclusive, as are `delimiter` and either
/// `dir` or `recursive`.
///
/// # Examples
///
/// ```
/// use blobstack_core::model::ListOptions;
///
/// let opts = ListOptions::builder().prefix("a/").delimiter("/").max_results(50).build();
/// assert_eq!(opts.prefix.as_deref(), Some("a/"));
/// assert!(!opts.recursive);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    /// Keep only keys starting with this string.
    #[builder(default, setter(strip_option, into))]
    pub prefix: Option<String>,
    /// Keep only keys strictly under this directory.
    #[builder(default, setter(strip_option, into))]
    pub dir: Option<String>,
    /// Delimiter used to collapse keys into common prefixes.
    #[builder(default, setter(strip_option, into))]
    pub delimiter: Option<String>,
    /// Return every key instead of collapsing at the next delimiter.
    #[builder(default)]
    pub recursive: bool,
    /// Resume strictly after this name.
    #[builder(default, setter(strip_option, into))]
    pub marker: Option<String>,
    /// Page size; 1000 when absent.
    #[builder(default, setter(strip_option))]
    pub max_results: Option<usize>,
    /// Keep user metadata on blob entries.
    #[builder(default)]
    pub detailed: bool,
}

/// HTTP-style preconditions evaluated against a stored blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct Preconditions {
    /// `If-Match`.
    #[builder(default, setter(strip_option, into))]
    pub if_match: Option<String>,
    /// `If-None-Match`.
    #[builder(default, setter(strip_option, into))]
    pub if_none_match: Option<String>,
    /// `If-Modified-Since`.
    #[builder(default, setter(strip_option))]
    pub if_modified_since: Option<DateTime<Utc>>,
    /// `If-Unmodified-Since`.
    #[builder(default, setter(strip_option))]
    pub if_unmodified_since: Option<DateTime<Utc>>,
}

impl Preconditions {
    /// Whether no condition is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.if_match.is_none()
            && self.if_none_match.is_none()
            && self.if_modified_since.is_none()
            && self.if_unmodified_since.is_none()
    }
}

/// Options for a conditional and/or ranged read.
///
/// # Examples
///
/// ```
/// use blobstack_core::conditional::ByteRange;
/// use blobstack_core::model::{GetOptions, Preconditions};
///
/// let opts = GetOptions::builder()
///     .preconditions(Preconditions::builder().if_match("\"abc\"").build())
///     .ranges(vec![ByteRange::Bounded(0, 9)])
///     .build();
/// assert_eq!(opts.ranges.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct GetOptions {
    /// Preconditions checked before any bytes are returned.
    #[builder(default)]
    pub preconditions: Preconditions,
    /// Byte ranges to return, concatenated in order. Empty means the whole blob.
    #[builder(default)]
    pub ranges: Vec<ByteRange>,
}

/// Options for a put.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct PutOptions {
    /// Split the payload into parts and write it through a multipart upload.
    #[builder(default)]
    pub multipart: bool,
    /// Access policy applied to the written blob, overriding the blob's own.
    #[builder(default, setter(strip_option))]
    pub access: Option<Access>,
}

/// Options for a copy.
///
/// When `content_metadata` is `None` the source's content metadata is
/// carried over; likewise for `user_metadata`.
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct CopyOptions {
    /// Preconditions evaluated against the source blob.
    #[builder(default)]
    pub preconditions: Preconditions,
    /// Replacement content metadata.
    #[builder(default, setter(strip_option))]
    pub content_metadata: Option<ContentMetadata>,
    /// Replacement user metadata.
    #[builder(default, setter(strip_option))]
    pub user_metadata: Option<HashMap<String, String>>,
}

/// Options for container creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct CreateContainerOptions {
    /// Initial container access policy.
    #[builder(default)]
    pub access: Access,
}
