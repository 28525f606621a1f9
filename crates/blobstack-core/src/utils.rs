//! Shared utilities: ID generation, timestamp helpers and ETag matching.

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ID generation
// ---------------------------------------------------------------------------

/// Generate a fresh multipart upload id.
///
/// The id is a dash-free lowercase hex string, so it can be embedded in a
/// `-`-separated key and recovered without ambiguity.
///
/// # Examples
///
/// ```
/// use blobstack_core::utils::generate_upload_id;
///
/// let id = generate_upload_id();
/// assert_eq!(id.len(), 32);
/// assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn generate_upload_id() -> String {
    Uuid::new_v4().simple().to_string()
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Truncate a timestamp to whole seconds, the resolution of HTTP dates.
#[must_use]
pub fn truncate_to_seconds(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(0)
}

// ---------------------------------------------------------------------------
// ETag matching
// ---------------------------------------------------------------------------

/// Check whether the stored ETag satisfies an `If-Match` condition.
///
/// # Examples
///
/// ```
/// use blobstack_core::utils::is_valid_if_match;
///
/// assert!(is_valid_if_match("\"abc\"", "*"));
/// assert!(is_valid_if_match("\"abc\"", "abc"));
/// assert!(!is_valid_if_match("\"abc\"", "\"xyz\""));
/// ```
#[must_use]
pub fn is_valid_if_match(etag: &str, if_match: &str) -> bool {
    if if_match.trim() == "*" {
        return true;
    }
    etag_matches(etag, if_match)
}

/// Check whether the stored ETag satisfies an `If-None-Match` condition.
///
/// Returns `false` when the ETags match, i.e. the caller already holds the
/// current version.
#[must_use]
pub fn is_valid_if_none_match(etag: &str, if_none_match: &str) -> bool {
    if if_none_match.trim() == "*" {
        return false;
    }
    !etag_matches(etag, if_none_match)
}

/// Compare a stored ETag against a header value that may list several ETags.
fn etag_matches(etag: &str, header: &str) -> bool {
    let stored = normalize_etag(etag);
    header
        .split(',')
        .any(|candidate| normalize_etag(candidate) == stored)
}

/// Normalize an ETag by trimming whitespace and surrounding double quotes.
#[must_use]
pub fn normalize_etag(etag: &str) -> &str {
    let etag = etag.trim();
    etag.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(etag)
}

/// Return the ETag in its quoted form.
#[must_use]
pub fn quote_etag(etag: &str) -> String {
    format!("\"{}\"", normalize_etag(etag))
}
