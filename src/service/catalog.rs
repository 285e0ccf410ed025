//! Catalog query: read-only listing of video metadata. Payloads are never
//! loaded here, which keeps listing cheap regardless of asset sizes.

use snafu::ResultExt;
use tracing::instrument;

use super::error::StorageSnafu;
use super::Result;
use crate::database::Database;
use crate::model::VideoSummary;

const LIST_ALL: &str = "SELECT id, name, category FROM videos";
const LIST_BY_CATEGORY: &str = "SELECT id, name, category FROM videos WHERE category = $category";

/// Lists stored videos, optionally filtered by category. No ordering
/// guarantee beyond stability within a single snapshot.
#[instrument(skip(db))]
pub async fn list(db: &Database, category: Option<&str>) -> Result<Vec<VideoSummary>> {
    let query = match category {
        Some(category) => db.sql(LIST_BY_CATEGORY).bind(("category", category)),
        None => db.sql(LIST_ALL),
    };

    query.fetch().await.context(StorageSnafu)
}
