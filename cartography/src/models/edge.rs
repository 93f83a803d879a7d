use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unix time of the hub's timestamp origin (2021-01-01T00:00:00Z).
pub const NETWORK_EPOCH_UNIX: i64 = 1_609_459_200;

/// Convert a hub timestamp (seconds since the network epoch) to wall-clock time.
pub fn network_time(timestamp: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(NETWORK_EPOCH_UNIX.checked_add(timestamp)?, 0)
}

/// Interaction family an edge was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    Follows,
    Liked,
    Recasted,
    Replied,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Follows => "FOLLOWS",
            EdgeType::Liked => "LIKED",
            EdgeType::Recasted => "RECASTED",
            EdgeType::Replied => "REPLIED",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single directed interaction between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    /// Seconds since [`NETWORK_EPOCH_UNIX`].
    pub timestamp: i64,
    pub edge_type: EdgeType,
    /// Hash of the cast a reaction points at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_hash: Option<String>,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        timestamp: i64,
        edge_type: EdgeType,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            timestamp,
            edge_type,
            target_hash: None,
        }
    }

    pub fn with_target_hash(mut self, hash: impl Into<String>) -> Self {
        self.target_hash = Some(hash.into());
        self
    }
}
