//! Invalidation of assignments after membership changes.
//!
//! When an affiliation is created, moved or deleted, the fairness basis of
//! every occurrence it touches changes. Future cleaning weeks of all
//! schedules in the affected groups are flagged so the generator refills
//! them. Past and current weeks are never touched, and missing cleaning
//! weeks are not created.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{
    Affiliation, AffiliationId, CleaningWeekId, EpochWeek, GroupId, ScheduleId, WeekSpan,
};
use crate::store::Store;

/// Where an affiliation places its cleaner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// The group joined.
    pub group: GroupId,
    /// Membership weeks.
    pub span: WeekSpan,
}

impl From<&Affiliation> for Placement {
    fn from(affiliation: &Affiliation) -> Self {
        Self {
            group: affiliation.group,
            span: affiliation.span(),
        }
    }
}

/// An affiliation write, described by its state before and after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffiliationChange {
    /// The affiliation written, if it was persisted.
    pub affiliation: Option<AffiliationId>,
    /// Placement before the write; `None` for a creation.
    pub before: Option<Placement>,
    /// Placement after the write; `None` for a deletion.
    pub after: Option<Placement>,
}

impl AffiliationChange {
    /// A newly created affiliation.
    pub fn created(affiliation: &Affiliation) -> Self {
        Self {
            affiliation: Some(affiliation.id),
            before: None,
            after: Some(affiliation.into()),
        }
    }

    /// An affiliation whose interval changed, or a cleaner moving from
    /// `previous` to `current`.
    ///
    /// Weeks of both sides are invalidated in the schedules of both groups.
    pub fn updated(previous: &Affiliation, current: &Affiliation) -> Self {
        Self {
            affiliation: Some(current.id),
            before: Some(previous.into()),
            after: Some(current.into()),
        }
    }

    /// A deleted affiliation.
    pub fn deleted(affiliation: &Affiliation) -> Self {
        Self {
            affiliation: Some(affiliation.id),
            before: Some(affiliation.into()),
            after: None,
        }
    }

    fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.before.iter().chain(self.after.iter())
    }

    /// Groups on either side of the change.
    pub fn groups(&self) -> BTreeSet<GroupId> {
        self.placements().map(|p| p.group).collect()
    }
}

/// Weeks of the change strictly after `current_week`, one span per side.
///
/// Identical spans are reported once.
pub fn affected_weeks(change: &AffiliationChange, current_week: EpochWeek) -> Vec<WeekSpan> {
    let mut spans: Vec<WeekSpan> = Vec::new();
    for placement in change.placements() {
        if let Some(future) = placement.span.after(current_week) {
            if !spans.contains(&future) {
                spans.push(future);
            }
        }
    }
    spans
}

/// Flags the future cleaning weeks affected by the change as invalid.
///
/// Returns the cleaning weeks whose flag flipped.
pub fn invalidate_assignments<S: Store>(
    store: &mut S,
    change: &AffiliationChange,
    current_week: EpochWeek,
) -> Vec<CleaningWeekId> {
    let spans = affected_weeks(change, current_week);
    if spans.is_empty() {
        return Vec::new();
    }

    let schedules: BTreeSet<ScheduleId> = change
        .groups()
        .into_iter()
        .filter_map(|g| store.group(g))
        .flat_map(|g| g.schedules)
        .collect();

    let mut invalidated = Vec::new();
    for schedule in schedules {
        for span in &spans {
            for mut cleaning_week in store.cleaning_weeks_in_span(schedule, *span) {
                if !cleaning_week.assignments_valid {
                    continue;
                }
                cleaning_week.assignments_valid = false;
                invalidated.push(cleaning_week.id);
                store.update_cleaning_week(cleaning_week);
            }
        }
    }

    if !invalidated.is_empty() {
        info!(
            affiliation = ?change.affiliation,
            count = invalidated.len(),
            "cleaning weeks invalidated"
        );
    }
    invalidated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Roster;
    use crate::models::{Cleaner, Schedule, ScheduleGroup};
    use crate::scheduler::AssignmentGenerator;

    fn placement(group: u64, first: EpochWeek, last: EpochWeek) -> Placement {
        Placement {
            group: GroupId(group),
            span: WeekSpan::new(first, last),
        }
    }

    #[test]
    fn test_affected_weeks_clip_to_future() {
        let change = AffiliationChange {
            affiliation: None,
            before: Some(placement(1, 2500, 2599)),
            after: Some(placement(2, 2600, EpochWeek::MAX)),
        };
        assert_eq!(
            affected_weeks(&change, 2590),
            vec![WeekSpan::new(2591, 2599), WeekSpan::new(2600, EpochWeek::MAX)]
        );
        assert_eq!(
            affected_weeks(&change, 2700),
            vec![WeekSpan::new(2701, EpochWeek::MAX)]
        );
    }

    #[test]
    fn test_past_change_affects_nothing() {
        let change = AffiliationChange {
            affiliation: None,
            before: None,
            after: Some(placement(1, 10, 20)),
        };
        assert!(affected_weeks(&change, 20).is_empty());
        assert!(affected_weeks(&change, 30).is_empty());
    }

    /// Cleaner moves from one group to another at week 2600; now is week 2590.
    #[test]
    fn test_group_change_invalidates_future_weeks_of_both_groups() {
        let mut roster = Roster::new(Schedule::new("Kitchen"));
        let a = roster.member("A");
        roster.member("B");
        let bathroom = roster.store.insert_schedule(Schedule::new("Bathroom"));
        let upstairs = roster
            .store
            .insert_group(ScheduleGroup::new("Upstairs").with_schedule(bathroom));
        let c = roster.store.insert_cleaner(Cleaner::new("C"));
        roster
            .store
            .insert_affiliation(Affiliation::open_ended(c, upstairs, 0));

        let generator = AssignmentGenerator::new();
        for schedule in [roster.schedule, bathroom] {
            generator
                .create_assignments_over_timespan(&mut roster.store, schedule, WeekSpan::new(2588, 2605))
                .unwrap();
        }

        let mut previous = roster.store.affiliations_of_cleaner(a).remove(0);
        previous.end = 2599;
        roster.store.update_affiliation(previous.clone());
        let mut next = Affiliation::open_ended(a, upstairs, 2600);
        next.id = roster.store.insert_affiliation(next.clone());

        let flipped = invalidate_assignments(
            &mut roster.store,
            &AffiliationChange::updated(&previous, &next),
            2590,
        );
        // Weeks 2591..=2605 of both schedules.
        assert_eq!(flipped.len(), 30);

        for schedule in [roster.schedule, bathroom] {
            for cw in roster
                .store
                .cleaning_weeks_in_span(schedule, WeekSpan::new(2588, 2605))
            {
                assert_eq!(cw.assignments_valid, cw.week <= 2590, "week {}", cw.week);
            }
        }
    }

    #[test]
    fn test_missing_weeks_are_not_created() {
        let mut roster = Roster::new(Schedule::new("Kitchen"));
        let a = roster.member("A");
        let affiliation = roster.store.affiliations_of_cleaner(a).remove(0);

        let flipped = invalidate_assignments(
            &mut roster.store,
            &AffiliationChange::deleted(&affiliation),
            10,
        );
        assert!(flipped.is_empty());
        assert!(roster
            .store
            .cleaning_weeks_in_span(roster.schedule, WeekSpan::unbounded())
            .is_empty());
    }
}
