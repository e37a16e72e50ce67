use std::iter::FusedIterator;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::streak::{ActiveDates, StreakError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub active: bool,
    pub is_today: bool,
}

/// The `window_days` days ending at `today`, oldest first.
///
/// Cloning the window restarts it from its current position; a freshly
/// projected window always yields the same entries for the same inputs.
#[derive(Debug, Clone)]
pub struct CalendarWindow<'a> {
    active_dates: &'a ActiveDates,
    today: NaiveDate,
    next: NaiveDate,
    remaining: u32,
}

pub fn project_calendar(
    active_dates: &ActiveDates,
    today: NaiveDate,
    window_days: u32,
) -> Result<CalendarWindow<'_>, StreakError> {
    if window_days == 0 {
        return Err(StreakError::InvalidArgument(
            "window_days must be at least 1".into(),
        ));
    }

    let start = today
        .checked_sub_days(Days::new(u64::from(window_days - 1)))
        .ok_or_else(|| {
            StreakError::InvalidArgument(format!(
                "a {window_days}-day window ending {today} is out of range"
            ))
        })?;

    Ok(CalendarWindow {
        active_dates,
        today,
        next: start,
        remaining: window_days,
    })
}

impl Iterator for CalendarWindow<'_> {
    type Item = CalendarDay;

    fn next(&mut self) -> Option<CalendarDay> {
        if self.remaining == 0 {
            return None;
        }

        let date = self.next;
        self.remaining -= 1;
        if self.remaining > 0 {
            // Never past `today`, so the successor exists.
            self.next = date.succ_opt()?;
        }

        Some(CalendarDay {
            date,
            active: self.active_dates.contains(date),
            is_today: date == self.today,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for CalendarWindow<'_> {}

impl FusedIterator for CalendarWindow<'_> {}
