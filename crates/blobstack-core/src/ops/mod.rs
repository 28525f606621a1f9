//! Object store operations.
//!
//! Each submodule adds inherent methods to [`crate::provider::LocalBlobStore`]
//! for one concern. Every operation validates its input, delegates to the
//! storage primitive and the pure listing / conditional / multipart helpers,
//! and logs one `debug!` line on success.

mod blob;
mod container;
mod list;
mod multipart;
