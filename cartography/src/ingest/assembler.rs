use std::collections::BTreeSet;

use super::extract::{extract, extract_followers, extract_profile};
use crate::hub::{
    FetchInterruption, FetchResult, HubClient, CASTS_BY_FID, LINKS_BY_FID, LINKS_BY_TARGET_FID,
    LINK_TYPE_FOLLOW, MAX_BULK_IDS, REACTIONS_BY_FID, REACTION_TYPE_LIKE, REACTION_TYPE_RECAST,
    USER_DATA_BY_FID,
};
use crate::models::{Edge, EdgeType, UserProfile, UserRecord};

/// Result of assembling one core user.
#[derive(Debug)]
pub enum UserOutcome {
    /// Record built. `warnings` lists every fetch that returned partial data.
    Assembled {
        record: UserRecord,
        warnings: Vec<String>,
    },
    Skipped {
        id: String,
        reason: String,
    },
}

impl UserOutcome {
    pub fn id(&self) -> &str {
        match self {
            UserOutcome::Assembled { record, .. } => record.id(),
            UserOutcome::Skipped { id, .. } => id,
        }
    }
}

/// Every identifier a record references, its own included.
pub fn connection_ids(record: &UserRecord) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    ids.insert(record.profile.id.clone());
    for edge in record.edges() {
        ids.insert(edge.source.clone());
        ids.insert(edge.target.clone());
    }
    ids
}

/// Connection profiles gathered for one record.
#[derive(Debug, Default)]
pub struct ConnectionLookup {
    pub profiles: Vec<UserProfile>,
    pub failed_batches: Vec<(usize, FetchInterruption)>,
}

/// Builds one [`UserRecord`] per core id from the hub.
pub struct UserAssembler {
    hub: HubClient,
    batch_size: usize,
    fetch_followers: bool,
}

impl UserAssembler {
    pub fn new(hub: HubClient) -> Self {
        let batch_size = hub.config().bulk_batch_size.clamp(1, MAX_BULK_IDS);
        let fetch_followers = hub.config().fetch_followers;
        Self {
            hub,
            batch_size,
            fetch_followers,
        }
    }

    /// Fetch profile and edges for `id`, then resolve every connection's profile.
    ///
    /// The user is skipped when the profile fetch was interrupted before any
    /// message arrived, or when the build was cancelled part way through.
    pub async fn build_user_record(&self, id: &str) -> UserOutcome {
        let fid = ("fid", id.to_string());
        let mut notes = FetchNotes::default();

        let profile_fetch = self
            .hub
            .fetch_typed(USER_DATA_BY_FID, std::slice::from_ref(&fid))
            .await;
        if profile_fetch.messages.is_empty() {
            if let Some(ref interruption) = profile_fetch.interruption {
                tracing::warn!(fid = id, %interruption, "Profile fetch failed, skipping user");
                return UserOutcome::Skipped {
                    id: id.to_string(),
                    reason: format!("profile fetch failed: {interruption}"),
                };
            }
        }
        notes.record("profile", &profile_fetch);
        let profile = extract_profile(&profile_fetch.messages, id);

        let likes = self
            .fetch_edges(
                EdgeType::Liked,
                REACTIONS_BY_FID,
                &[fid.clone(), ("reaction_type", REACTION_TYPE_LIKE.to_string())],
                id,
                &mut notes,
            )
            .await;
        let recasts = self
            .fetch_edges(
                EdgeType::Recasted,
                REACTIONS_BY_FID,
                &[fid.clone(), ("reaction_type", REACTION_TYPE_RECAST.to_string())],
                id,
                &mut notes,
            )
            .await;
        let replies = self
            .fetch_edges(
                EdgeType::Replied,
                CASTS_BY_FID,
                std::slice::from_ref(&fid),
                id,
                &mut notes,
            )
            .await;
        let follows = self
            .fetch_edges(
                EdgeType::Follows,
                LINKS_BY_FID,
                &[fid.clone(), ("link_type", LINK_TYPE_FOLLOW.to_string())],
                id,
                &mut notes,
            )
            .await;

        let followers = if self.fetch_followers {
            let fetch = self
                .hub
                .fetch_typed(
                    LINKS_BY_TARGET_FID,
                    &[
                        ("target_fid", id.to_string()),
                        ("link_type", LINK_TYPE_FOLLOW.to_string()),
                    ],
                )
                .await;
            notes.record("followers", &fetch);
            extract_followers(&fetch.messages, id)
        } else {
            Vec::new()
        };

        if notes.cancelled {
            return UserOutcome::Skipped {
                id: id.to_string(),
                reason: "build cancelled".to_string(),
            };
        }

        let mut record = UserRecord {
            profile,
            likes,
            recasts,
            replies,
            follows,
            followers,
            connections_metadata: Vec::new(),
        };

        let connections = connection_ids(&record);
        let lookup = self.resolve_connection_profiles(&connections).await;
        for (batch, interruption) in &lookup.failed_batches {
            notes.record_batch(*batch, interruption);
        }
        if notes.cancelled {
            return UserOutcome::Skipped {
                id: id.to_string(),
                reason: "build cancelled".to_string(),
            };
        }
        record.connections_metadata = lookup.profiles;

        tracing::info!(
            fid = id,
            likes = record.likes.len(),
            recasts = record.recasts.len(),
            replies = record.replies.len(),
            follows = record.follows.len(),
            followers = record.followers.len(),
            connections = record.connections_metadata.len(),
            "Assembled user record"
        );

        UserOutcome::Assembled {
            record,
            warnings: notes.warnings,
        }
    }

    /// Profiles for `ids` via the bulk lookup, in sorted-id batches.
    /// Unknown users are absent from the result; failed batches are listed
    /// by their 0-based index.
    pub async fn resolve_connection_profiles(&self, ids: &BTreeSet<String>) -> ConnectionLookup {
        let ids: Vec<String> = ids.iter().cloned().collect();
        let mut lookup = ConnectionLookup {
            profiles: Vec::with_capacity(ids.len()),
            failed_batches: Vec::new(),
        };

        for (index, batch) in ids.chunks(self.batch_size).enumerate() {
            match self.hub.fetch_users_bulk(batch).await {
                Ok(users) => {
                    tracing::debug!(
                        requested = batch.len(),
                        returned = users.len(),
                        "Resolved connection batch"
                    );
                    lookup
                        .profiles
                        .extend(users.into_iter().filter_map(|user| user.into_profile()));
                }
                Err(interruption) => {
                    let cancelled = matches!(interruption, FetchInterruption::Cancelled { .. });
                    lookup.failed_batches.push((index, interruption));
                    if cancelled {
                        break;
                    }
                }
            }
        }

        lookup
    }

    async fn fetch_edges(
        &self,
        edge_type: EdgeType,
        endpoint: &str,
        params: &[(&str, String)],
        id: &str,
        notes: &mut FetchNotes,
    ) -> Vec<Edge> {
        let fetch = self.hub.fetch_typed(endpoint, params).await;
        notes.record(edge_type.as_str(), &fetch);

        let edges = extract(edge_type, &fetch.messages, id);
        let dropped = fetch.messages.len().saturating_sub(edges.len());
        if dropped > 0 {
            tracing::debug!(fid = id, %edge_type, dropped, "Messages without a usable edge");
        }
        edges
    }
}

#[derive(Default)]
struct FetchNotes {
    warnings: Vec<String>,
    cancelled: bool,
}

impl FetchNotes {
    fn record(&mut self, what: &str, fetch: &FetchResult) {
        if let Some(ref interruption) = fetch.interruption {
            if matches!(interruption, FetchInterruption::Cancelled { .. }) {
                self.cancelled = true;
            }
            self.warnings.push(format!("{what}: {interruption}"));
        }
    }

    fn record_batch(&mut self, batch: usize, interruption: &FetchInterruption) {
        if matches!(interruption, FetchInterruption::Cancelled { .. }) {
            self.cancelled = true;
        }
        self.warnings
            .push(format!("connections: batch {batch} failed: {interruption}"));
    }
}
