//! Signup accounting: the global signup counter and the daily histogram move
//! together, as one revision-guarded write.
//!
//! The histogram is a multi-field rewrite (find-or-create an entry, then
//! increment it), so a plain `+=` cannot express it. Instead the current
//! stats record is read, the new history is computed here, and the write is
//! guarded with `WHERE revision = $revision`. An empty result means another
//! signup won the race; the retry wrapper re-reads and tries again, bounded
//! by `MAX_WRITE_ATTEMPTS`.

use chrono::NaiveDate;
use snafu::{OptionExt, ResultExt};
use tracing::instrument;

use super::error::{ConflictSnafu, StorageSnafu};
use super::{ledger, with_write_retry, Result};
use crate::database::Database;
use crate::model::{stats_id, HistogramEntry};

const RECORD_SIGNUP: &str = "
    UPDATE stats SET
        total_signups += 1,
        signup_history = $history,
        revision += 1
    WHERE id = $stats AND revision = $revision
    RETURN total_signups
";

#[derive(Debug, serde::Deserialize)]
struct SignupCount {
    total_signups: u64,
}

/// Records one signup on the given calendar date ("today" comes from the
/// caller's clock): bumps the global signup counter and the date's histogram
/// entry as a unit. Returns the new signup total.
#[instrument(skip(db))]
pub async fn record_signup(db: &Database, today: NaiveDate) -> Result<u64> {
    with_write_retry(|| try_record_signup(db, today)).await
}

async fn try_record_signup(db: &Database, today: NaiveDate) -> Result<u64> {
    let stats = ledger::stats(db).await?;
    let history = bump_entry(stats.signup_history, today);

    let totals: Vec<SignupCount> = db
        .sql(RECORD_SIGNUP)
        .bind(("stats", stats_id()))
        .bind(("revision", stats.revision))
        .bind(("history", history))
        .fetch()
        .await
        .context(StorageSnafu)?;

    // empty result: the revision guard failed, someone else got there first
    totals
        .into_iter()
        .next()
        .map(|count| count.total_signups)
        .context(ConflictSnafu)
}

/// Finds the entry for `today` and increments it, or appends a fresh entry
/// with count 1. Dates only ever grow, so appending keeps the history sorted.
fn bump_entry(mut history: Vec<HistogramEntry>, today: NaiveDate) -> Vec<HistogramEntry> {
    match history.iter_mut().find(|entry| entry.date == today) {
        Some(entry) => entry.count += 1,
        None => history.push(HistogramEntry {
            date: today,
            count: 1,
        }),
    }

    history
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn first_signup_of_the_day_appends() {
        let history = bump_entry(vec![], date("2024-05-01"));

        assert_eq!(
            history,
            vec![HistogramEntry {
                date: date("2024-05-01"),
                count: 1
            }]
        );
    }

    #[test]
    fn same_day_signup_increments_in_place() {
        let history = bump_entry(vec![], date("2024-05-01"));
        let history = bump_entry(history, date("2024-05-01"));

        assert_eq!(history.len(), 1, "one entry per calendar date");
        assert_eq!(history[0].count, 2);
    }

    #[test]
    fn new_day_gets_its_own_entry() {
        let history = bump_entry(vec![], date("2024-05-01"));
        let history = bump_entry(history, date("2024-05-02"));

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].count, 1);
        assert_eq!(history[1].count, 1);
        assert!(history[0].date < history[1].date, "history stays date-ordered");
    }
}
