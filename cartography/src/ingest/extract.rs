//! Pure conversion of hub messages into typed edges and profile fields.
//!
//! A message missing any required field produces nothing; it never fails the
//! surrounding batch.

use crate::hub::{HubMessage, MessageData, RawFid, USER_DATA_TYPE_BIO, USER_DATA_TYPE_USERNAME};
use crate::models::{Edge, EdgeType, UserProfile};

/// Turn one family of messages into edges originating at `subject_id`.
pub fn extract(edge_type: EdgeType, messages: &[HubMessage], subject_id: &str) -> Vec<Edge> {
    messages
        .iter()
        .filter_map(|message| extract_one(edge_type, message.data.as_ref()?, subject_id))
        .collect()
}

fn extract_one(edge_type: EdgeType, data: &MessageData, subject_id: &str) -> Option<Edge> {
    let timestamp = data.timestamp?;

    match edge_type {
        EdgeType::Follows => {
            let target = normalized(data.link_body.as_ref()?.target_fid.as_ref())?;
            Some(Edge::new(subject_id, target, timestamp, edge_type))
        }
        EdgeType::Liked | EdgeType::Recasted => {
            let cast = data.reaction_body.as_ref()?.target_cast_id.as_ref()?;
            let target = normalized(cast.fid.as_ref())?;
            let edge = Edge::new(subject_id, target, timestamp, edge_type);
            Some(match cast.hash {
                Some(ref hash) => edge.with_target_hash(hash.clone()),
                None => edge,
            })
        }
        EdgeType::Replied => {
            let parent = data.cast_add_body.as_ref()?.parent_cast_id.as_ref()?;
            let target = normalized(parent.fid.as_ref())?;
            Some(Edge::new(subject_id, target, timestamp, edge_type))
        }
    }
}

/// Inbound follows: each link message names its author in `data.fid`.
pub fn extract_followers(messages: &[HubMessage], subject_id: &str) -> Vec<Edge> {
    messages
        .iter()
        .filter_map(|message| {
            let data = message.data.as_ref()?;
            data.link_body.as_ref()?;
            let timestamp = data.timestamp?;
            let follower = normalized(data.fid.as_ref())?;
            Some(Edge::new(follower, subject_id, timestamp, EdgeType::Follows))
        })
        .collect()
}

/// Core profile from user-data messages. Stops scanning once both the bio
/// and the username are known; the first value seen for each wins.
pub fn extract_profile(messages: &[HubMessage], subject_id: &str) -> UserProfile {
    let mut profile = UserProfile::bare(subject_id);

    for message in messages {
        let Some(body) = message
            .data
            .as_ref()
            .and_then(|data| data.user_data_body.as_ref())
        else {
            continue;
        };

        match (body.data_type.as_deref(), &body.value) {
            (Some(USER_DATA_TYPE_BIO), Some(value)) if profile.bio.is_none() => {
                profile.bio = Some(value.clone());
            }
            (Some(USER_DATA_TYPE_USERNAME), Some(value)) if profile.username.is_none() => {
                profile.username = Some(value.clone());
            }
            _ => {}
        }

        if profile.bio.is_some() && profile.username.is_some() {
            break;
        }
    }

    profile
}

fn normalized(fid: Option<&RawFid>) -> Option<String> {
    fid?.normalize()
}
