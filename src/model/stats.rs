use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{now, Timestamp};
use crate::database::Record;
use crate::table;

pub type StatsId = Record<Stats>;

/// Key of the one stats record shared by all callers.
const STATS_KEY: &str = "global";

pub fn stats_id() -> StatsId {
    Record::new(STATS_KEY)
}

/// The singleton engagement aggregate.
///
/// `total_views` counts every successful view-recording call, including
/// homepage visits that have no associated video, so it is not the sum of the
/// per-video counters. `revision` is bumped by every histogram rewrite and
/// guards against concurrent writers clobbering each other.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Stats {
    pub id: StatsId,
    pub created_at: Timestamp,
    pub total_signups: u64,
    pub total_views: u64,
    pub signup_history: Vec<HistogramEntry>,
    pub revision: u64,
}

impl Stats {
    pub fn empty() -> Self {
        Self {
            id: stats_id(),
            created_at: now(),
            total_signups: 0,
            total_views: 0,
            signup_history: Vec::new(),
            revision: 0,
        }
    }
}

table!("stats": Stats = id);

/// Signups recorded on one calendar date. The histogram holds at most one
/// entry per date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HistogramEntry {
    pub date: NaiveDate,
    pub count: u64,
}
