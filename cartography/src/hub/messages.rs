//! Wire types for the hub's "messages by subject" endpoints and the bulk user
//! lookup. Every field the hub may omit is optional; extraction decides what a
//! missing field means.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::UserProfile;

/// User identifier as the hub sends it: a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawFid {
    Number(u64),
    Text(String),
}

impl RawFid {
    /// Decimal string form; blank strings are rejected.
    pub fn normalize(&self) -> Option<String> {
        match self {
            RawFid::Number(n) => Some(n.to_string()),
            RawFid::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }
}

/// One page of a paginated endpoint.
///
/// Messages stay as raw JSON here so one malformed message cannot fail the
/// whole page; they are decoded one by one afterwards.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubPage {
    #[serde(default)]
    pub messages: Option<Vec<Value>>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl HubPage {
    /// Token for the following page, if the hub returned a non-empty one.
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubMessage {
    #[serde(default)]
    pub data: Option<MessageData>,
    #[serde(default)]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageData {
    #[serde(default, rename = "type")]
    pub message_type: Option<String>,
    #[serde(default)]
    pub fid: Option<RawFid>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub link_body: Option<LinkBody>,
    #[serde(default)]
    pub reaction_body: Option<ReactionBody>,
    #[serde(default)]
    pub cast_add_body: Option<CastAddBody>,
    #[serde(default)]
    pub user_data_body: Option<UserDataBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkBody {
    #[serde(default, rename = "type")]
    pub link_type: Option<String>,
    #[serde(default)]
    pub target_fid: Option<RawFid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionBody {
    #[serde(default, rename = "type")]
    pub reaction_type: Option<String>,
    #[serde(default)]
    pub target_cast_id: Option<CastId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CastId {
    #[serde(default)]
    pub fid: Option<RawFid>,
    #[serde(default)]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastAddBody {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub parent_cast_id: Option<CastId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserDataBody {
    #[serde(default, rename = "type")]
    pub data_type: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// One user as returned by the bulk lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUser {
    pub fid: RawFid,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub pfp_url: Option<String>,
    #[serde(default)]
    pub follower_count: Option<u64>,
    #[serde(default)]
    pub following_count: Option<u64>,
}

impl BulkUser {
    /// Connection profile for this user; `None` when the fid is blank.
    pub fn into_profile(self) -> Option<UserProfile> {
        let id = self.fid.normalize()?;
        Some(UserProfile {
            id,
            bio: None,
            username: self.username,
            display_name: self.display_name,
            pfp_url: self.pfp_url,
            follower_count: self.follower_count,
            following_count: self.following_count,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkUsersResponse {
    #[serde(default)]
    pub users: Option<Vec<Value>>,
}
