//! Schedule and schedule-group models.
//!
//! A schedule is a recurring duty definition ("kitchen", "bathroom") that
//! occurs on a fixed weekday in every week its [`Recurrence`] admits.
//! Schedules are bundled into [`ScheduleGroup`]s; cleaners join groups, not
//! individual schedules.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::calendar::{epoch_week_to_day, EpochWeek};
use super::ids::{GroupId, ScheduleId};

/// Which epoch weeks a schedule occurs in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    /// Every week.
    #[default]
    Weekly,
    /// Weeks with an even epoch-week index.
    EvenWeeks,
    /// Weeks with an odd epoch-week index.
    OddWeeks,
}

impl Recurrence {
    /// Whether the recurrence admits the given week.
    ///
    /// Parity uses the Euclidean remainder, so negative weeks alternate too.
    #[inline]
    pub fn occurs_in_week(&self, week: EpochWeek) -> bool {
        match self {
            Self::Weekly => true,
            Self::EvenWeeks => week.rem_euclid(2) == 0,
            Self::OddWeeks => week.rem_euclid(2) == 1,
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly => write!(f, "weekly"),
            Self::EvenWeeks => write!(f, "even weeks"),
            Self::OddWeeks => write!(f, "odd weeks"),
        }
    }
}

/// A recurring duty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Store-assigned identifier.
    pub id: ScheduleId,
    /// Human-readable name.
    pub name: String,
    /// URL-safe identifier derived from the name.
    pub slug: String,
    /// Cleaners needed per occurrence (1 or 2).
    pub slots: u8,
    /// Which weeks the duty occurs in.
    pub recurrence: Recurrence,
    /// Day of the week the duty is due.
    pub weekday: Weekday,
    /// Disabled schedules are skipped by batch generation.
    pub enabled: bool,
}

impl Schedule {
    /// Creates a weekly, single-slot schedule due on Sunday.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: ScheduleId::default(),
            slug: slugify(&name),
            name,
            slots: 1,
            recurrence: Recurrence::Weekly,
            weekday: Weekday::Sun,
            enabled: true,
        }
    }

    /// Sets the number of cleaners per occurrence.
    pub fn with_slots(mut self, slots: u8) -> Self {
        self.slots = slots;
        self
    }

    /// Sets the recurrence.
    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    /// Sets the due weekday.
    pub fn with_weekday(mut self, weekday: Weekday) -> Self {
        self.weekday = weekday;
        self
    }

    /// Marks the schedule as disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether the schedule occurs in the given week.
    #[inline]
    pub fn occurs_in_week(&self, week: EpochWeek) -> bool {
        self.recurrence.occurs_in_week(week)
    }

    /// The date the duty is due in the given week.
    pub fn due_date(&self, week: EpochWeek) -> NaiveDate {
        epoch_week_to_day(week, self.weekday)
    }
}

/// A named bundle of schedules that cleaners are affiliated with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleGroup {
    /// Store-assigned identifier.
    pub id: GroupId,
    /// Human-readable name (e.g. "ground floor").
    pub name: String,
    /// Member schedules.
    pub schedules: BTreeSet<ScheduleId>,
}

impl ScheduleGroup {
    /// Creates an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GroupId::default(),
            name: name.into(),
            schedules: BTreeSet::new(),
        }
    }

    /// Adds a schedule to the group.
    pub fn with_schedule(mut self, schedule: ScheduleId) -> Self {
        self.schedules.insert(schedule);
        self
    }

    /// Whether the group contains the schedule.
    pub fn contains(&self, schedule: ScheduleId) -> bool {
        self.schedules.contains(&schedule)
    }
}

/// Lowercase, ASCII-alphanumeric slug with `-` separators.
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_schedule_builder() {
        let s = Schedule::new("Kitchen Floor")
            .with_slots(2)
            .with_recurrence(Recurrence::EvenWeeks)
            .with_weekday(Weekday::Wed);

        assert_eq!(s.slug, "kitchen-floor");
        assert_eq!(s.slots, 2);
        assert_eq!(s.recurrence, Recurrence::EvenWeeks);
        assert!(s.enabled);
        assert!(!s.clone().disabled().enabled);
    }

    #[test]
    fn test_due_date() {
        let s = Schedule::new("Bath").with_weekday(Weekday::Wed);
        // Week 1 runs from Monday 1970-01-05.
        assert_eq!(s.due_date(1), NaiveDate::from_ymd_opt(1970, 1, 7).unwrap());
    }

    #[test]
    fn test_recurrence_examples() {
        assert!(Recurrence::EvenWeeks.occurs_in_week(2500));
        assert!(!Recurrence::EvenWeeks.occurs_in_week(2501));
        assert!(Recurrence::OddWeeks.occurs_in_week(2501));
        assert!(Recurrence::OddWeeks.occurs_in_week(-1));
        assert!(Recurrence::Weekly.occurs_in_week(-7));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Ground floor / Kitchen "), "ground-floor-kitchen");
        assert_eq!(slugify("Müll"), "m-ll");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_group_membership() {
        let g = ScheduleGroup::new("ground floor").with_schedule(ScheduleId(3));
        assert!(g.contains(ScheduleId(3)));
        assert!(!g.contains(ScheduleId(4)));
    }

    #[test]
    fn test_recurrence_serde() {
        let json = serde_json::to_string(&Recurrence::OddWeeks).unwrap();
        assert_eq!(json, "\"odd_weeks\"");
    }

    proptest! {
        #[test]
        fn even_and_odd_alternate(week in -1_000_000i64..1_000_000) {
            let even = Recurrence::EvenWeeks;
            let odd = Recurrence::OddWeeks;
            prop_assert_ne!(even.occurs_in_week(week), even.occurs_in_week(week + 1));
            prop_assert_ne!(even.occurs_in_week(week), odd.occurs_in_week(week));
            prop_assert!(Recurrence::Weekly.occurs_in_week(week));
        }
    }
}
