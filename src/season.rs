// Season identity and the rolling three-calendar-month window.
// A season is anchored to a (year, month); all derived values are pure.

use chrono::{Datelike, Local, NaiveDate};

/// Calendar anchor for one season run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonWindow {
    year: i32,
    month: u32,
}

impl SeasonWindow {
    /// Window anchored to today's local date.
    pub fn current() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Season identifier, e.g. "season_2026_08".
    pub fn season_id(&self) -> String {
        format!("season_{}_{:02}", self.year, self.month)
    }

    /// First day of the season month, e.g. "2026-08-01".
    /// The season always starts on day 01 regardless of when the run fires.
    pub fn start_date(&self) -> String {
        format!("{}-{:02}-01", self.year, self.month)
    }

    /// Total days in the anchor month plus the two preceding months.
    /// Crosses year boundaries (January counts Jan + Dec + Nov).
    pub fn rolling_window_days(&self) -> u32 {
        let mut year = self.year;
        let mut month = self.month;
        let mut days = 0;
        for _ in 0..3 {
            days += days_in_month(year, month);
            if month == 1 {
                year -= 1;
                month = 12;
            } else {
                month -= 1;
            }
        }
        days
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
