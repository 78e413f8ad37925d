//! Cleaning weeks and assignments.
//!
//! A [`CleaningWeek`] materializes one occurrence of a schedule in one epoch
//! week. Its [`Assignment`]s record who fills each slot.
//!
//! # Validity
//! `assignments_valid` is cleared when membership of one of the schedule's
//! groups changes in that week. The generator treats an invalid week exactly
//! like an empty one and refills it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::calendar::EpochWeek;
use super::ids::{AssignmentId, CleanerId, CleaningWeekId, ScheduleId};

/// One occurrence of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningWeek {
    /// Store-assigned identifier.
    pub id: CleaningWeekId,
    /// Owning schedule.
    pub schedule: ScheduleId,
    /// Epoch week of the occurrence.
    pub week: EpochWeek,
    /// Whether the assignments reflect current group membership.
    pub assignments_valid: bool,
    /// Cleaners barred from this occurrence (e.g. after swapping out of it).
    pub excluded: BTreeSet<CleanerId>,
}

impl CleaningWeek {
    /// Creates a cleaning week that still needs its assignments.
    pub fn new(schedule: ScheduleId, week: EpochWeek) -> Self {
        Self {
            id: CleaningWeekId::default(),
            schedule,
            week,
            assignments_valid: false,
            excluded: BTreeSet::new(),
        }
    }

    /// Whether the cleaner is barred from this occurrence.
    #[inline]
    pub fn is_excluded(&self, cleaner: CleanerId) -> bool {
        self.excluded.contains(&cleaner)
    }

    /// Bars a cleaner from this occurrence.
    pub fn exclude(&mut self, cleaner: CleanerId) {
        self.excluded.insert(cleaner);
    }
}

/// A cleaner filling one slot of a cleaning week.
///
/// `schedule` and `week` are denormalized from the cleaning week for range
/// queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Store-assigned identifier.
    pub id: AssignmentId,
    /// Assigned cleaner.
    pub cleaner: CleanerId,
    /// Occurrence this assignment belongs to.
    pub cleaning_week: CleaningWeekId,
    /// Schedule of the occurrence.
    pub schedule: ScheduleId,
    /// Epoch week of the occurrence.
    pub week: EpochWeek,
}

impl Assignment {
    /// Creates an assignment of `cleaner` to the cleaning week.
    pub fn new(cleaner: CleanerId, cleaning_week: &CleaningWeek) -> Self {
        Self {
            id: AssignmentId::default(),
            cleaner,
            cleaning_week: cleaning_week.id,
            schedule: cleaning_week.schedule,
            week: cleaning_week.week,
        }
    }
}

/// A cleaning week the allocator could not fully staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingShortfall {
    /// Affected schedule.
    pub schedule: ScheduleId,
    /// Affected week.
    pub week: EpochWeek,
    /// Slots left open.
    pub missing: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion() {
        let mut cw = CleaningWeek::new(ScheduleId(1), 10);
        assert!(!cw.assignments_valid);
        assert!(!cw.is_excluded(CleanerId(7)));
        cw.exclude(CleanerId(7));
        assert!(cw.is_excluded(CleanerId(7)));
    }

    #[test]
    fn test_assignment_denormalizes_week() {
        let mut cw = CleaningWeek::new(ScheduleId(4), 12);
        cw.id = CleaningWeekId(9);
        let a = Assignment::new(CleanerId(2), &cw);
        assert_eq!(a.cleaning_week, CleaningWeekId(9));
        assert_eq!(a.schedule, ScheduleId(4));
        assert_eq!(a.week, 12);
    }
}
