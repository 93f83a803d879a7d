pub mod client;
pub mod messages;

pub use client::{FetchInterruption, FetchResult, HubClient, MAX_BULK_IDS};
pub use messages::*;

pub const USER_DATA_BY_FID: &str = "userDataByFid";
pub const REACTIONS_BY_FID: &str = "reactionsByFid";
pub const CASTS_BY_FID: &str = "castsByFid";
pub const LINKS_BY_FID: &str = "linksByFid";
pub const LINKS_BY_TARGET_FID: &str = "linksByTargetFid";
pub const BULK_USERS: &str = "user/bulk";

pub const REACTION_TYPE_LIKE: &str = "REACTION_TYPE_LIKE";
pub const REACTION_TYPE_RECAST: &str = "REACTION_TYPE_RECAST";
pub const LINK_TYPE_FOLLOW: &str = "follow";

pub const USER_DATA_TYPE_BIO: &str = "USER_DATA_TYPE_BIO";
pub const USER_DATA_TYPE_USERNAME: &str = "USER_DATA_TYPE_USERNAME";
