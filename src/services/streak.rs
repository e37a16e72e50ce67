//! Streak engine.
//!
//! Turns a user's completion history into streak statistics. Everything here
//! is a pure function of its arguments: no clock reads, no I/O, no shared
//! state. "Today" is always supplied by the caller.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::models::completion::CompletionRecord;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreakError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Distinct calendar days with at least one completion, kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActiveDates(BTreeSet<NaiveDate>);

impl ActiveDates {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ascending iteration.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
        self.0.iter().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.0.last().copied()
    }

    /// Active days in `[start, end]`, ascending.
    pub fn in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, StreakError> {
        if start > end {
            return Err(StreakError::InvalidArgument(format!(
                "range start {start} is after end {end}"
            )));
        }
        Ok(self.0.range(start..=end).copied().collect())
    }
}

impl FromIterator<NaiveDate> for ActiveDates {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completions: u64,
    pub today_logged: bool,
    pub last_active_date: Option<NaiveDate>,
    pub active_dates: ActiveDates,
}

/// Bucket every completion into a calendar day of `tz`.
pub fn compute_active_dates<Tz: TimeZone>(records: &[CompletionRecord], tz: &Tz) -> ActiveDates {
    records
        .iter()
        .map(|r| r.completed_at.with_timezone(tz).date_naive())
        .collect()
}

pub fn compute_streak_summary(
    active_dates: ActiveDates,
    today: NaiveDate,
    total_completions: u64,
) -> StreakSummary {
    StreakSummary {
        current_streak: current_run(&active_dates, today),
        longest_streak: longest_run(&active_dates),
        total_completions,
        today_logged: active_dates.contains(today),
        last_active_date: active_dates.last(),
        active_dates,
    }
}

/// One summary per workout, for records that name a workout.
pub fn summaries_by_workout<Tz: TimeZone>(
    records: &[CompletionRecord],
    tz: &Tz,
    today: NaiveDate,
) -> BTreeMap<i64, StreakSummary> {
    let mut grouped: BTreeMap<i64, Vec<CompletionRecord>> = BTreeMap::new();
    for record in records {
        if let Some(workout_id) = record.workout_id {
            grouped.entry(workout_id).or_default().push(record.clone());
        }
    }

    grouped
        .into_iter()
        .map(|(workout_id, records)| {
            let active = compute_active_dates(&records, tz);
            let summary = compute_streak_summary(active, today, records.len() as u64);
            (workout_id, summary)
        })
        .collect()
}

fn longest_run(dates: &ActiveDates) -> u32 {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;

    for date in dates.iter() {
        run = match prev {
            Some(p) if p.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }

    longest
}

// A streak stays alive through today if yesterday was active: today may
// simply not be logged yet.
fn current_run(dates: &ActiveDates, today: NaiveDate) -> u32 {
    let start = if dates.contains(today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if dates.contains(yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut count = 0u32;
    let mut cursor = Some(start);
    while let Some(day) = cursor.filter(|d| dates.contains(*d)) {
        count += 1;
        cursor = day.pred_opt();
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, Utc};
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dates(days: &[NaiveDate]) -> ActiveDates {
        days.iter().copied().collect()
    }

    fn record(workout_id: Option<i64>, at: &str) -> CompletionRecord {
        CompletionRecord {
            id: 0,
            user_id: Uuid::nil(),
            workout_id,
            completed_at: at.parse::<DateTime<Utc>>().unwrap(),
        }
    }

    // ── compute_active_dates ─────────────────────────────────────────────

    #[test]
    fn test_active_dates_empty() {
        assert!(compute_active_dates(&[], &Utc).is_empty());
    }

    #[test]
    fn test_active_dates_collapse_same_day() {
        let records = vec![
            record(Some(1), "2026-01-05T07:00:00Z"),
            record(Some(2), "2026-01-05T21:30:00Z"),
            record(None, "2026-01-03T12:00:00Z"),
            record(Some(1), "2026-01-05T07:00:00Z"),
        ];
        let active = compute_active_dates(&records, &Utc);
        assert_eq!(active.len(), 2);
        assert_eq!(active.iter().collect::<Vec<_>>(), vec![d(2026, 1, 3), d(2026, 1, 5)]);
    }

    #[test]
    fn test_active_dates_respect_offset() {
        // 23:30 UTC is already the next day at UTC+2.
        let records = vec![record(None, "2026-01-05T23:30:00Z")];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        assert!(compute_active_dates(&records, &Utc).contains(d(2026, 1, 5)));
        assert!(compute_active_dates(&records, &plus_two).contains(d(2026, 1, 6)));
    }

    // ── compute_streak_summary ───────────────────────────────────────────

    #[test]
    fn test_summary_empty() {
        let summary = compute_streak_summary(ActiveDates::default(), d(2026, 1, 10), 0);
        assert_eq!(summary.current_streak, 0);
        assert_eq!(summary.longest_streak, 0);
        assert!(!summary.today_logged);
        assert_eq!(summary.last_active_date, None);
    }

    #[test]
    fn test_summary_only_today() {
        let today = d(2026, 1, 10);
        let summary = compute_streak_summary(dates(&[today]), today, 1);
        assert_eq!(summary.current_streak, 1);
        assert_eq!(summary.longest_streak, 1);
        assert!(summary.today_logged);
    }

    #[test]
    fn test_summary_grace_period_yesterday() {
        let today = d(2026, 1, 10);
        let summary = compute_streak_summary(dates(&[d(2026, 1, 9)]), today, 1);
        assert_eq!(summary.current_streak, 1);
        assert!(!summary.today_logged);
    }

    #[test]
    fn test_summary_gap_before_yesterday_breaks_streak() {
        let today = d(2026, 1, 10);
        let summary = compute_streak_summary(dates(&[d(2026, 1, 8)]), today, 1);
        assert_eq!(summary.current_streak, 0);
        assert_eq!(summary.longest_streak, 1);
    }

    #[test]
    fn test_summary_longest_and_current_differ() {
        let active = dates(&[
            d(2026, 1, 1),
            d(2026, 1, 2),
            d(2026, 1, 3),
            d(2026, 1, 4),
            d(2026, 1, 5),
            d(2026, 1, 10),
        ]);
        let summary = compute_streak_summary(active, d(2026, 1, 10), 9);
        assert_eq!(summary.longest_streak, 5);
        assert_eq!(summary.current_streak, 1);
        assert_eq!(summary.total_completions, 9);
        assert_eq!(summary.last_active_date, Some(d(2026, 1, 10)));
    }

    #[test]
    fn test_summary_chain_through_yesterday() {
        let active = dates(&[d(2026, 1, 7), d(2026, 1, 8), d(2026, 1, 9)]);
        let summary = compute_streak_summary(active, d(2026, 1, 10), 3);
        assert_eq!(summary.current_streak, 3);
        assert!(summary.longest_streak >= summary.current_streak);
    }

    #[test]
    fn test_summary_crosses_month_and_year() {
        let active = dates(&[d(2025, 12, 30), d(2025, 12, 31), d(2026, 1, 1)]);
        let summary = compute_streak_summary(active, d(2026, 1, 1), 3);
        assert_eq!(summary.current_streak, 3);
        assert_eq!(summary.longest_streak, 3);
    }

    #[test]
    fn test_summary_is_idempotent() {
        let active = dates(&[d(2026, 3, 1), d(2026, 3, 2), d(2026, 3, 4)]);
        let today = d(2026, 3, 4);
        let first = compute_streak_summary(active.clone(), today, 4);
        let second = compute_streak_summary(active, today, 4);
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_completions_passes_through() {
        let today = d(2026, 1, 10);
        let summary = compute_streak_summary(dates(&[today]), today, 42);
        assert_eq!(summary.total_completions, 42);
    }

    // ── point and range queries ──────────────────────────────────────────

    #[test]
    fn test_in_range_inclusive() {
        let active = dates(&[d(2026, 1, 1), d(2026, 1, 5), d(2026, 1, 9)]);
        let got = active.in_range(d(2026, 1, 1), d(2026, 1, 5)).unwrap();
        assert_eq!(got, vec![d(2026, 1, 1), d(2026, 1, 5)]);
    }

    #[test]
    fn test_in_range_rejects_inverted_bounds() {
        let active = dates(&[d(2026, 1, 1)]);
        let err = active.in_range(d(2026, 1, 5), d(2026, 1, 1)).unwrap_err();
        assert!(matches!(err, StreakError::InvalidArgument(_)));
    }

    // ── summaries_by_workout ─────────────────────────────────────────────

    #[test]
    fn test_summaries_by_workout_separates_chains() {
        let records = vec![
            record(Some(1), "2026-01-08T10:00:00Z"),
            record(Some(1), "2026-01-09T10:00:00Z"),
            record(Some(1), "2026-01-10T10:00:00Z"),
            record(Some(2), "2026-01-10T18:00:00Z"),
            record(None, "2026-01-07T10:00:00Z"),
        ];
        let by_workout = summaries_by_workout(&records, &Utc, d(2026, 1, 10));

        assert_eq!(by_workout.len(), 2);
        assert_eq!(by_workout[&1].current_streak, 3);
        assert_eq!(by_workout[&1].total_completions, 3);
        assert_eq!(by_workout[&2].current_streak, 1);
        assert!(by_workout[&2].today_logged);
    }
}
