//! Rolling date window over which templates are projected.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default number of days projected ahead of the window start.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// A half-open range of calendar dates `[start, start + days)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub days: u32,
}

impl DateWindow {
    pub fn new(start: NaiveDate, days: u32) -> Self {
        Self { start, days }
    }

    /// Window covering exactly one date.
    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, days: 1 }
    }

    /// First date after the window. Saturates at the calendar's upper bound.
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(u64::from(self.days)))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end()
    }

    /// Every date in the window, in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..u64::from(self.days)).map_while(move |offset| start.checked_add_days(Days::new(offset)))
    }
}
