//! Favorites: a per-user set of video references with flip semantics.
//!
//! The whole toggle is one guarded `UPDATE`, so two concurrent toggles of the
//! same (user, video) pair linearize inside the store instead of racing a
//! read-modify-write here. `array::union`/`array::complement` keep the set
//! free of duplicates by construction.
//!
//! The video is deliberately not required to exist: favorites are weak
//! references, and toggling an id whose video was deleted (or never uploaded)
//! is a supported operation, not corruption.

use snafu::{OptionExt, ResultExt};
use tracing::instrument;

use super::error::{NotFoundSnafu, StorageSnafu};
use super::{with_write_retry, Result};
use crate::database::Database;
use crate::model::{UserId, VideoId, VideoSummary};

const TOGGLE: &str = "
    UPDATE users SET favorites =
        IF $video INSIDE favorites THEN
            array::complement(favorites, [$video])
        ELSE
            array::union(favorites, [$video])
        END
    WHERE id = $user
    RETURN favorites
";

#[derive(Debug, serde::Deserialize)]
struct FavoritesSet {
    favorites: Vec<VideoId>,
}

const RESOLVE: &str = "SELECT id, name, category FROM videos WHERE id INSIDE $favorites";

/// Adds the video to the user's favorites if absent, removes it if present,
/// and returns the resulting set. Fails with `NotFound` only when the user is
/// missing.
#[instrument(skip(db))]
pub async fn toggle(db: &Database, user: &UserId, video: &VideoId) -> Result<Vec<VideoId>> {
    with_write_retry(|| try_toggle(db, user, video)).await
}

async fn try_toggle(db: &Database, user: &UserId, video: &VideoId) -> Result<Vec<VideoId>> {
    let sets: Vec<FavoritesSet> = db
        .sql(TOGGLE)
        .bind(("user", user))
        .bind(("video", video))
        .fetch()
        .await
        .context(StorageSnafu)?;

    sets.into_iter()
        .next()
        .map(|set| set.favorites)
        .context(NotFoundSnafu {
            entity: "user",
            id: user.key(),
        })
}

/// Resolves a user's favorites to video metadata. Dangling references (videos
/// deleted after being favorited) are silently skipped.
#[instrument(skip(db))]
pub async fn resolve(db: &Database, user: &UserId) -> Result<Vec<VideoSummary>> {
    let user = super::users::find(db, user).await?;

    db.sql(RESOLVE)
        .bind(("favorites", user.favorites))
        .fetch()
        .await
        .context(StorageSnafu)
}
