//! Counter ledger: atomic increments for the per-video view counters and the
//! global view counter on the stats singleton.
//!
//! Every increment is a single guarded `UPDATE ... +=` statement, which the
//! store applies atomically per record; there is no read-modify-write in Rust
//! and therefore no window for lost updates. The `WHERE id = ...` form is
//! used deliberately: unlike addressing the record id directly it does not
//! upsert, so a missing record shows up as an empty result instead of a
//! phantom row.

use snafu::{OptionExt, ResultExt};
use tracing::instrument;

use super::error::{NotFoundSnafu, StorageSnafu};
use super::{with_write_retry, Result};
use crate::database::query::QueryFailedSnafu;
use crate::database::Database;
use crate::model::{stats_id, Stats, VideoId};

/// Bumps a video's view counter and the global view counter as one
/// transaction, returning the video's new count. A miss mutates nothing.
const RECORD_VIEW: &str = "
    BEGIN TRANSACTION;
    UPDATE stats SET total_views += 1
        WHERE id = $stats
        AND array::len((SELECT VALUE id FROM videos WHERE id = $video)) > 0;
    UPDATE videos SET views += 1 WHERE id = $video RETURN views;
    COMMIT TRANSACTION;
";

const RECORD_HOMEPAGE_VIEW: &str =
    "UPDATE stats SET total_views += 1 WHERE id = $stats RETURN total_views";

#[derive(Debug, serde::Deserialize)]
struct ViewCount {
    views: u64,
}

#[derive(Debug, serde::Deserialize)]
struct TotalViewCount {
    total_views: u64,
}

/// The stats singleton accessor. Creates the record with zero values exactly
/// once; a lost creation race falls back to reading the winner's record.
#[instrument(skip(db))]
pub async fn stats(db: &Database) -> Result<Stats> {
    if let Some(stats) = select_stats(db).await? {
        return Ok(stats);
    }

    tracing::info!("stats singleton absent, creating it");

    let created: Result<Option<Stats>, surrealdb::Error> =
        db.create(stats_id()).content(Stats::empty()).await;

    match created {
        Ok(Some(stats)) => Ok(stats),
        Ok(None) => existing_stats(db).await,
        Err(error) if error.to_string().contains("already exists") => existing_stats(db).await,
        Err(error) => Err(error)
            .context(QueryFailedSnafu)
            .context(StorageSnafu),
    }
}

async fn select_stats(db: &Database) -> Result<Option<Stats>> {
    db.select(stats_id())
        .await
        .context(QueryFailedSnafu)
        .context(StorageSnafu)
}

async fn existing_stats(db: &Database) -> Result<Stats> {
    select_stats(db).await?.context(NotFoundSnafu {
        entity: "stats",
        id: stats_id().key(),
    })
}

/// Records one view of a video: its own counter and the global counter move
/// together. Returns the video's updated count, or `NotFound` (with no
/// counter movement at all) when the video does not exist.
#[instrument(skip(db))]
pub async fn record_view(db: &Database, id: &VideoId) -> Result<u64> {
    stats(db).await?;
    with_write_retry(|| try_record_view(db, id)).await
}

async fn try_record_view(db: &Database, id: &VideoId) -> Result<u64> {
    let views: Vec<ViewCount> = db
        .sql(RECORD_VIEW)
        .bind(("stats", stats_id()))
        .bind(("video", id))
        .fetch_slot(1)
        .await
        .context(StorageSnafu)?;

    views
        .into_iter()
        .next()
        .map(|count| count.views)
        .context(NotFoundSnafu {
            entity: "video",
            id: id.key(),
        })
}

/// Records a view with no associated video (a homepage visit). Only the
/// global counter moves.
#[instrument(skip(db))]
pub async fn record_homepage_view(db: &Database) -> Result<u64> {
    stats(db).await?;
    with_write_retry(|| try_record_homepage_view(db)).await
}

async fn try_record_homepage_view(db: &Database) -> Result<u64> {
    let totals: Vec<TotalViewCount> = db
        .sql(RECORD_HOMEPAGE_VIEW)
        .bind(("stats", stats_id()))
        .fetch()
        .await
        .context(StorageSnafu)?;

    totals
        .into_iter()
        .next()
        .map(|count| count.total_views)
        .context(NotFoundSnafu {
            entity: "stats",
            id: stats_id().key(),
        })
}
