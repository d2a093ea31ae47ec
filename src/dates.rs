// Deterministic "date added" derivation for catalog products

use chrono::{Days, Local, NaiveDate};

/// Width of the window (in days) that derived dates fall into
pub const WINDOW_DAYS: u64 = 180;

const OFFSET_MULTIPLIER: u64 = 137;

/// Maps product ids onto a calendar date within the last [`WINDOW_DAYS`] days.
///
/// The upstream catalog carries no creation date, so one is synthesized from
/// the id. The anchor ("today") is fixed when the deriver is built: the same id
/// always maps to the same date for the lifetime of a deriver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateDeriver {
    today: NaiveDate,
}

impl DateDeriver {
    /// Anchor on the local wall-clock date
    pub fn today() -> Self {
        Self::anchored(Local::now().date_naive())
    }

    /// Anchor on a fixed date (tests, replays)
    pub fn anchored(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.today
    }

    /// Date `(id * 137) mod 180` days before the anchor
    pub fn derive(&self, id: u64) -> NaiveDate {
        let offset = day_offset(id);
        // at most 179 days back, only fails at the very start of the calendar
        self.today.checked_sub_days(Days::new(offset)).unwrap_or(NaiveDate::MIN)
    }
}

/// `(id * 137) mod 180`, computed without overflow for any id
pub fn day_offset(id: u64) -> u64 {
    ((id % WINDOW_DAYS) * OFFSET_MULTIPLIER) % WINDOW_DAYS
}
