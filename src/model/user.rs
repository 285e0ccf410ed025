use derive_new::new;
use serde::{Deserialize, Serialize};

use super::{now, Timestamp, VideoId};
use crate::database::Record;
use crate::table;

pub type UserId = Record<User>;

/// An account record, keyed by an email-like identifier. The credential is an
/// opaque handle; hashing and verification happen in the calling layer.
///
/// Favorites are weak references: entries may point at videos that were
/// deleted later, and such entries are tolerated rather than cleaned up.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, new)]
pub struct User {
    pub id: UserId,
    #[new(value = "now()")]
    pub created_at: Timestamp,
    pub credential: String,
    pub role: String,
    #[new(default)]
    pub favorites: Vec<VideoId>,
}

table!("users": User = id);
