//! Local object-store engine for BlobStack.
//!
//! This crate emulates S3-like object-store semantics on top of a plain
//! key/value blob primitive: containers, keyed blobs, hierarchical listing
//! over a flat keyspace, conditional reads, byte-range retrieval and a
//! multipart upload protocol built entirely out of ordinary blob
//! operations.
//!
//! # Architecture
//!
//! ```text
//! network layer (not part of this crate)
//!        |
//!        v
//! LocalBlobStore (facade, ops/*)
//!        |
//!        +--> listing      (prefix / delimiter / marker paging)
//!        +--> conditional  (If-* preconditions, byte ranges)
//!        +--> multipart    (stub + part blobs under `.mpus-`)
//!        |
//!        v
//!   BlobStorage (InMemoryStorage with tempfile spillover)
//! ```
//!
//! Every operation is synchronous and runs to completion on the calling
//! thread. Each primitive call is atomic on its own; nothing spans several
//! calls, so callers that need cross-operation consistency must serialize
//! access to a `(container, key)` or `(container, upload_id)` themselves.

pub mod checksums;
pub mod conditional;
pub mod config;
pub mod error;
pub mod listing;
pub mod model;
pub mod multipart;
mod ops;
pub mod provider;
pub mod storage;
pub mod utils;
pub mod validation;

pub use config::BlobStoreConfig;
pub use error::{BlobStoreError, BlobStoreResult};
pub use provider::LocalBlobStore;
