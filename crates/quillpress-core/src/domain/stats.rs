//! Aggregate statistics over the post table.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Post, PostStatus};

/// Days covered by the creation trend, today included.
pub const TREND_DAYS: i64 = 30;
pub const TOP_AUTHORS: u64 = 3;
pub const RECENT_POSTS: u64 = 5;

/// Post counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub draft: u64,
    pub pending: u64,
    pub published: u64,
    pub archived: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.draft + self.pending + self.published + self.archived
    }

    pub fn add(&mut self, status: PostStatus, count: u64) {
        match status {
            PostStatus::Draft => self.draft += count,
            PostStatus::Pending => self.pending += count,
            PostStatus::Published => self.published += count,
            PostStatus::Archived => self.archived += count,
        }
    }

    pub fn get(&self, status: PostStatus) -> u64 {
        match status {
            PostStatus::Draft => self.draft,
            PostStatus::Pending => self.pending,
            PostStatus::Published => self.published,
            PostStatus::Archived => self.archived,
        }
    }
}

/// An author and how many posts they own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorPostCount {
    pub author_id: Uuid,
    pub name: String,
    pub post_count: u64,
}

/// The statistics view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostStats {
    pub total: u64,
    pub by_status: StatusCounts,
    pub created_this_month: u64,
    pub top_authors: Vec<AuthorPostCount>,
    pub recent_posts: Vec<Post>,
    /// Posts created per calendar day (UTC), one entry for each day in the window.
    pub daily_trend: BTreeMap<NaiveDate, u64>,
}

/// Midnight UTC on the first day of `now`'s month.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_else(|| now.naive_utc());
    Utc.from_utc_datetime(&first)
}

/// Midnight UTC on the first day of the trend window ending on `now`'s date.
pub fn trend_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let first_day = now.date_naive() - Duration::days(TREND_DAYS - 1);
    let midnight = first_day.and_hms_opt(0, 0, 0).unwrap_or_else(|| now.naive_utc());
    Utc.from_utc_datetime(&midnight)
}

/// Zero-fill raw per-day counts over the trend window ending on `now`'s date.
pub fn fill_trend(now: DateTime<Utc>, raw: &[(NaiveDate, u64)]) -> BTreeMap<NaiveDate, u64> {
    let today = now.date_naive();
    let first = today - Duration::days(TREND_DAYS - 1);

    let mut trend: BTreeMap<NaiveDate, u64> = first
        .iter_days()
        .take_while(|d| *d <= today)
        .map(|d| (d, 0))
        .collect();
    for (day, count) in raw {
        if let Some(slot) = trend.get_mut(day) {
            *slot += count;
        }
    }
    trend
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts_total() {
        let mut counts = StatusCounts::default();
        counts.add(PostStatus::Published, 3);
        counts.add(PostStatus::Pending, 2);
        counts.add(PostStatus::Archived, 1);

        assert_eq!(counts.total(), 6);
        assert_eq!(counts.get(PostStatus::Draft), 0);
    }

    #[test]
    fn test_month_start() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 15, 30, 0).unwrap();
        assert_eq!(
            month_start(now),
            Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_fill_trend_covers_thirty_days() {
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap();
        let today = now.date_naive();
        let old = today - Duration::days(40);

        let trend = fill_trend(now, &[(today, 2), (old, 9)]);

        assert_eq!(trend.len(), TREND_DAYS as usize);
        assert_eq!(trend[&today], 2);
        assert!(!trend.contains_key(&old));
        assert_eq!(
            *trend.keys().next().unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 4).unwrap()
        );
        assert_eq!(trend_start(now).date_naive(), NaiveDate::from_ymd_opt(2026, 2, 4).unwrap());
    }
}
