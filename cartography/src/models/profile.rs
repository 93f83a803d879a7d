use serde::{Deserialize, Serialize};

/// Display metadata for one user.
///
/// Core profiles come from the hub's user-data messages and carry `bio` and
/// `username`; connection profiles come from the bulk lookup and carry the
/// display fields. Any subset may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "fid")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfp_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follower_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following_count: Option<u64>,
}

impl UserProfile {
    /// Profile with nothing but the identifier.
    pub fn bare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Username when known, the identifier otherwise.
    pub fn label(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.id)
    }
}
