use derive_new::new;
use serde::{Deserialize, Serialize};

use super::{now, Timestamp};
use crate::database::Record;
use crate::table;

pub type VideoId = Record<Video>;

/// A stored video asset. The payload is immutable after creation; the view
/// counter is mutated only through the counter ledger.
///
/// The payload is a plain `Vec<u8>`: the SDK cannot round-trip its `bytes`
/// value through `Response::take`, so the blob is stored as a byte array.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, new)]
pub struct Video {
    #[new(default)]
    pub id: VideoId,
    #[new(value = "now()")]
    pub created_at: Timestamp,
    pub name: String,
    pub category: String,
    pub content_type: String,
    pub payload: Vec<u8>,
    #[new(default)]
    pub views: u64,
}

table!("videos": Video = id);

/// Listing shape: metadata only, never the payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VideoSummary {
    pub id: VideoId,
    pub name: String,
    pub category: String,
}
