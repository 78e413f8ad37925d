//! Epoch-week calendar.
//!
//! All scheduling happens in whole Monday–Sunday weeks. A week is identified
//! by its *epoch week*: the number of weeks since Monday 1969-12-29, the
//! Monday of the week containing 1970-01-01.
//!
//! ```text
//!      January 1970
//! Mo Tu We Th Fr Sa Su
//! 29 30 31  1  2  3  4   <- epoch week 0
//!  5  6  7  8  9 10 11   <- epoch week 1
//! ```
//!
//! # Clock
//! "Now" is never read globally. Every entry point receives a [`Clock`],
//! so tests pin time with [`FixedClock`].

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Index of a Monday-starting week since the epoch Monday 1969-12-29.
pub type EpochWeek = i64;

/// `NaiveDate::num_days_from_ce()` of Monday 1969-12-29.
const EPOCH_MONDAY_CE_DAYS: i64 = 719_160;

/// Maps a date to the epoch week containing it.
///
/// Dates before the epoch map to negative weeks.
pub fn date_to_epoch_week(date: NaiveDate) -> EpochWeek {
    (i64::from(date.num_days_from_ce()) - EPOCH_MONDAY_CE_DAYS).div_euclid(7)
}

/// Monday of the given epoch week.
///
/// Saturates at the bounds of the representable calendar.
pub fn epoch_week_to_monday(week: EpochWeek) -> NaiveDate {
    let days = week
        .saturating_mul(7)
        .saturating_add(EPOCH_MONDAY_CE_DAYS);
    i32::try_from(days)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .unwrap_or(if week < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Sunday of the given epoch week.
pub fn epoch_week_to_sunday(week: EpochWeek) -> NaiveDate {
    epoch_week_to_day(week, Weekday::Sun)
}

/// The given weekday inside an epoch week.
pub fn epoch_week_to_day(week: EpochWeek, weekday: Weekday) -> NaiveDate {
    let monday = epoch_week_to_monday(week);
    monday
        .checked_add_signed(Duration::days(i64::from(weekday.num_days_from_monday())))
        .unwrap_or(monday)
}

/// Epoch week of "today" according to the clock.
pub fn current_epoch_week(clock: &impl Clock) -> EpochWeek {
    date_to_epoch_week(clock.today())
}

/// Source of the current date.
pub trait Clock: Send + Sync {
    /// Today's date.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock time in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock frozen at a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl FixedClock {
    /// Clock standing on the Monday of the given epoch week.
    pub fn at_week(week: EpochWeek) -> Self {
        Self(epoch_week_to_monday(week))
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// An inclusive interval of epoch weeks `[first, last]`.
///
/// Open-ended intervals use `EpochWeek::MIN` / `EpochWeek::MAX` as bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekSpan {
    /// First week (inclusive).
    pub first: EpochWeek,
    /// Last week (inclusive).
    pub last: EpochWeek,
}

impl WeekSpan {
    /// Creates a new span.
    pub fn new(first: EpochWeek, last: EpochWeek) -> Self {
        Self { first, last }
    }

    /// A span covering a single week.
    pub fn single(week: EpochWeek) -> Self {
        Self::new(week, week)
    }

    /// A span covering every representable week.
    pub fn unbounded() -> Self {
        Self::new(EpochWeek::MIN, EpochWeek::MAX)
    }

    /// A span starting at `first` without an end.
    pub fn starting_at(first: EpochWeek) -> Self {
        Self::new(first, EpochWeek::MAX)
    }

    /// Whether `last < first`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }

    /// Whether the span contains the week.
    #[inline]
    pub fn contains(&self, week: EpochWeek) -> bool {
        week >= self.first && week <= self.last
    }

    /// Whether two spans share at least one week.
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.is_empty() && !other.is_empty() && self.first <= other.last && other.first <= self.last
    }

    /// The weeks both spans share, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let span = Self::new(self.first.max(other.first), self.last.min(other.last));
        (!span.is_empty()).then_some(span)
    }

    /// Restricts the span to weeks strictly after `week`.
    pub fn after(&self, week: EpochWeek) -> Option<Self> {
        let first = week.checked_add(1)?;
        self.intersection(&Self::starting_at(first))
    }

    /// Number of weeks in the span (saturating).
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.last.abs_diff(self.first).saturating_add(1)
        }
    }

    /// Iterates the weeks of the span in ascending order.
    pub fn weeks(&self) -> std::ops::RangeInclusive<EpochWeek> {
        self.first..=self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(1969, 12, 29), 0)]
    #[case(date(1970, 1, 1), 0)]
    #[case(date(1970, 1, 4), 0)]
    #[case(date(1970, 1, 5), 1)]
    #[case(date(1969, 12, 28), -1)]
    #[case(date(2017, 11, 27), 2500)]
    fn test_date_to_epoch_week(#[case] day: NaiveDate, #[case] expected: EpochWeek) {
        assert_eq!(date_to_epoch_week(day), expected);
    }

    #[test]
    fn test_week_boundaries() {
        assert_eq!(epoch_week_to_monday(0), date(1969, 12, 29));
        assert_eq!(epoch_week_to_sunday(0), date(1970, 1, 4));
        assert_eq!(epoch_week_to_monday(1), date(1970, 1, 5));
        assert_eq!(epoch_week_to_monday(-1), date(1969, 12, 22));
        assert_eq!(epoch_week_to_monday(0).weekday(), Weekday::Mon);
    }

    #[test]
    fn test_weekday_in_week() {
        assert_eq!(epoch_week_to_day(1, Weekday::Wed), date(1970, 1, 7));
        assert_eq!(epoch_week_to_day(1, Weekday::Mon), epoch_week_to_monday(1));
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::at_week(2590);
        assert_eq!(current_epoch_week(&clock), 2590);
        assert_eq!(clock.today().weekday(), Weekday::Mon);
    }

    #[test]
    fn test_week_span() {
        let span = WeekSpan::new(10, 20);
        assert_eq!(span.len(), 11);
        assert!(span.contains(10));
        assert!(span.contains(20));
        assert!(!span.contains(21));
        assert!(span.overlaps(&WeekSpan::new(20, 30)));
        assert!(!span.overlaps(&WeekSpan::new(21, 30)));
        assert_eq!(span.intersection(&WeekSpan::new(15, 40)), Some(WeekSpan::new(15, 20)));
        assert_eq!(span.after(18), Some(WeekSpan::new(19, 20)));
        assert_eq!(span.after(20), None);
        assert!(WeekSpan::new(5, 4).is_empty());
        assert_eq!(WeekSpan::new(5, 4).len(), 0);
        assert_eq!(WeekSpan::unbounded().after(EpochWeek::MAX), None);
    }

    proptest! {
        #[test]
        fn monday_round_trips(week in -100_000i64..100_000) {
            prop_assert_eq!(date_to_epoch_week(epoch_week_to_monday(week)), week);
            prop_assert_eq!(date_to_epoch_week(epoch_week_to_sunday(week)), week);
            prop_assert_eq!(epoch_week_to_monday(week).weekday(), Weekday::Mon);
        }

        #[test]
        fn days_of_a_week_share_the_index(days in -700_000i64..700_000) {
            let day = date(1970, 1, 1) + Duration::days(days);
            let week = date_to_epoch_week(day);
            prop_assert!(epoch_week_to_monday(week) <= day);
            prop_assert!(day <= epoch_week_to_sunday(week));
        }
    }
}
