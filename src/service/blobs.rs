//! Blob store: persists and retrieves video payloads as a unit with their
//! metadata. `put` is the only mutator; reads never mutate.

use snafu::{OptionExt, ResultExt};
use tracing::instrument;

use super::error::{NotFoundSnafu, StorageSnafu};
use super::Result;
use crate::database::query::QueryFailedSnafu;
use crate::database::Database;
use crate::model::{Video, VideoId};

/// Persists a freshly built [Video] and returns its identifier.
#[instrument(skip(db, video), fields(video.id = %video.id, video.name = %video.name))]
pub async fn put(db: &Database, video: Video) -> Result<VideoId> {
    let id = video.id.clone();

    let created: Option<Video> = db
        .create(id.clone())
        .content(&video)
        .await
        .context(QueryFailedSnafu)
        .context(StorageSnafu)?;

    tracing::debug!(stored = created.is_some(), "persisted video payload");
    Ok(id)
}

/// Returns the stored metadata and payload for an existing identifier.
#[instrument(skip(db))]
pub async fn get(db: &Database, id: &VideoId) -> Result<Video> {
    let video: Option<Video> = db
        .select(id.clone())
        .await
        .context(QueryFailedSnafu)
        .context(StorageSnafu)?;

    video.context(NotFoundSnafu {
        entity: "video",
        id: id.key(),
    })
}
