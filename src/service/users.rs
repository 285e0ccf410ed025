//! User records. The engine owns the durable account shape; credential
//! hashing and session handling live in the calling layer.

use snafu::{OptionExt, ResultExt};
use tracing::instrument;

use super::error::{NotFoundSnafu, StorageSnafu};
use super::Result;
use crate::database::query::QueryFailedSnafu;
use crate::database::Database;
use crate::model::{User, UserId};

/// Persists a new user record. Creating the same identifier twice is a
/// storage-level conflict and surfaces as a failure.
#[instrument(skip(db, user), fields(user.id = %user.id))]
pub async fn create(db: &Database, user: User) -> Result<User> {
    let created: Option<User> = db
        .create(user.id.clone())
        .content(&user)
        .await
        .context(QueryFailedSnafu)
        .context(StorageSnafu)?;

    Ok(created.unwrap_or(user))
}

/// Looks up an existing user.
#[instrument(skip(db))]
pub async fn find(db: &Database, id: &UserId) -> Result<User> {
    let user: Option<User> = db
        .select(id.clone())
        .await
        .context(QueryFailedSnafu)
        .context(StorageSnafu)?;

    user.context(NotFoundSnafu {
        entity: "user",
        id: id.key(),
    })
}
