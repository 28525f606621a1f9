use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

/// Access policy of a container or blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Access {
    /// Only the owner may read (default).
    #[default]
    Private,
    /// Anyone may read.
    PublicRead,
}

impl Access {
    /// Return the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an [`Access`] from a string fails.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown access policy: {0}")]
pub struct ParseAccessError(String);

impl FromStr for Access {
    type Err = ParseAccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "public-read" => Ok(Self::PublicRead),
            _ => Err(ParseAccessError(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// ContainerMetadata
// ---------------------------------------------------------------------------

/// Summary of a container as returned by container listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerMetadata {
    /// The container name.
    pub name: String,
    /// Location hint given at creation, or the configured default.
    pub location: String,
    /// When the container was created.
    pub creation_date: DateTime<Utc>,
    /// The container access policy.
    pub access: Access,
}
