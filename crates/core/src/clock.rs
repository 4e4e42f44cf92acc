//! Business calendar: one fixed UTC offset decides what "today" means.
//!
//! The offset is configured once at startup. Every future-date check and
//! every default report date derives the business date through this type,
//! so two requests in the same instant can never disagree about the date.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

/// Fixed-offset business calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessClock {
    offset: FixedOffset,
}

impl BusinessClock {
    /// Calendar pinned to UTC.
    pub fn utc() -> Self {
        Self {
            offset: FixedOffset::east_opt(0).expect("zero offset is valid"),
        }
    }

    /// Build from a whole-minute UTC offset, e.g. `-180` for UTC-3.
    ///
    /// Returns `None` for offsets of a day or more.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(|offset| Self { offset })
    }

    /// The business date at the given instant.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// The business date one day before [`Self::today`].
    pub fn yesterday(&self, now: DateTime<Utc>) -> NaiveDate {
        self.today(now) - Duration::days(1)
    }
}

impl Default for BusinessClock {
    fn default() -> Self {
        Self::utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn utc_clock_uses_the_utc_date() {
        let clock = BusinessClock::utc();
        assert_eq!(
            clock.today(instant(2024, 1, 15, 23)),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn negative_offset_shifts_the_date_back_around_midnight() {
        // 01:00 UTC is still the previous day at UTC-3.
        let clock = BusinessClock::from_offset_minutes(-180).unwrap();
        assert_eq!(
            clock.today(instant(2024, 1, 15, 1)),
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()
        );
    }

    #[test]
    fn positive_offset_shifts_the_date_forward_around_midnight() {
        // 23:00 UTC is already the next day at UTC+2.
        let clock = BusinessClock::from_offset_minutes(120).unwrap();
        assert_eq!(
            clock.today(instant(2024, 1, 15, 23)),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()
        );
    }

    #[test]
    fn yesterday_is_one_day_before_today() {
        let clock = BusinessClock::utc();
        let now = instant(2024, 3, 1, 12);
        assert_eq!(
            clock.yesterday(now),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn rejects_offsets_of_a_day_or_more() {
        assert!(BusinessClock::from_offset_minutes(24 * 60).is_none());
        assert!(BusinessClock::from_offset_minutes(-24 * 60).is_none());
    }
}
