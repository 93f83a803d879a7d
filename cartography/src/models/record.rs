use serde::{Deserialize, Serialize};

use super::{Edge, UserProfile};

/// Everything fetched for one core user, as persisted per user id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub profile: UserProfile,
    #[serde(default)]
    pub likes: Vec<Edge>,
    #[serde(default)]
    pub recasts: Vec<Edge>,
    #[serde(default)]
    pub replies: Vec<Edge>,
    #[serde(default)]
    pub follows: Vec<Edge>,
    /// Inbound follow edges; only collected when follower fetching is enabled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub followers: Vec<Edge>,
    #[serde(default)]
    pub connections_metadata: Vec<UserProfile>,
}

impl UserRecord {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.profile.id
    }

    /// All typed edge lists in a fixed order: likes, recasts, replies, follows, followers.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.likes
            .iter()
            .chain(&self.recasts)
            .chain(&self.replies)
            .chain(&self.follows)
            .chain(&self.followers)
    }

    pub fn edge_count(&self) -> usize {
        self.likes.len()
            + self.recasts.len()
            + self.replies.len()
            + self.follows.len()
            + self.followers.len()
    }
}
