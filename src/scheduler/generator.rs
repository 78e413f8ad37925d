//! Assignment generator.
//!
//! # Algorithm
//!
//! For one (schedule, week):
//! 1. Skip weeks the recurrence excludes.
//! 2. Get or create the cleaning week; a fresh week gets its tasks.
//! 3. Discard the assignments of a week marked invalid.
//! 4. Stop if the week is valid and every slot is taken.
//! 5. Fill open slots one by one, re-ranking after each pick so a slot
//!    filled earlier counts against its cleaner.
//! 6. Record a staffing shortfall for slots nobody could take.
//!
//! Every week runs in its own [`Store::transaction`]; a failure rolls back
//! only that week.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::tasks::create_missing_tasks;
use crate::allocation::FairnessAllocator;
use crate::error::{PlanError, Result};
use crate::models::{
    Assignment, AssignmentId, EpochWeek, ScheduleId, StaffingShortfall, WeekSpan,
};
use crate::store::Store;
use crate::switching::retire_assignment;

/// What generation did for one (schedule, week).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// The schedule does not occur in the week (or is disabled).
    NotApplicable,
    /// Every slot was already taken.
    AlreadyFilled,
    /// Open slots were filled.
    Filled { created: Vec<AssignmentId> },
    /// Some slots stay open for lack of candidates.
    NoCandidates {
        created: Vec<AssignmentId>,
        missing: usize,
    },
}

impl GenerationOutcome {
    /// Assignments created.
    pub fn created(&self) -> &[AssignmentId] {
        match self {
            Self::Filled { created } | Self::NoCandidates { created, .. } => created,
            Self::NotApplicable | Self::AlreadyFilled => &[],
        }
    }
}

/// Per-week outcomes of a timespan run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Schedule the report is about.
    pub schedule: ScheduleId,
    /// Outcome per week, ascending.
    pub weeks: Vec<(EpochWeek, GenerationOutcome)>,
}

impl GenerationReport {
    /// Total assignments created.
    pub fn created_count(&self) -> usize {
        self.weeks.iter().map(|(_, o)| o.created().len()).sum()
    }

    /// Weeks left understaffed, with the number of open slots.
    pub fn shortfalls(&self) -> Vec<(EpochWeek, usize)> {
        self.weeks
            .iter()
            .filter_map(|(week, outcome)| match outcome {
                GenerationOutcome::NoCandidates { missing, .. } => Some((*week, *missing)),
                _ => None,
            })
            .collect()
    }
}

/// Materializes cleaning weeks and staffs them.
#[derive(Debug, Clone, Default)]
pub struct AssignmentGenerator {
    allocator: FairnessAllocator,
}

impl AssignmentGenerator {
    /// Creates a generator with the default fairness allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the allocator.
    pub fn with_allocator(mut self, allocator: FairnessAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Fills the open slots of one occurrence, atomically.
    pub fn create_assignment<S: Store>(
        &self,
        store: &mut S,
        schedule: ScheduleId,
        week: EpochWeek,
    ) -> Result<GenerationOutcome> {
        store.transaction(|s| self.fill_week(s, schedule, week))
    }

    /// Runs [`create_assignment`](Self::create_assignment) for every week of
    /// the span. Each week commits on its own.
    pub fn create_assignments_over_timespan<S: Store>(
        &self,
        store: &mut S,
        schedule: ScheduleId,
        span: WeekSpan,
    ) -> Result<GenerationReport> {
        let mut report = GenerationReport {
            schedule,
            weeks: Vec::new(),
        };
        if span.is_empty() {
            return Ok(report);
        }
        for week in span.weeks() {
            let outcome = self.create_assignment(store, schedule, week)?;
            report.weeks.push((week, outcome));
        }
        Ok(report)
    }

    fn fill_week<S: Store>(
        &self,
        store: &mut S,
        schedule_id: ScheduleId,
        week: EpochWeek,
    ) -> Result<GenerationOutcome> {
        let schedule = store
            .schedule(schedule_id)
            .ok_or_else(|| PlanError::not_found("schedule", schedule_id))?;
        if !schedule.enabled || !schedule.occurs_in_week(week) {
            return Ok(GenerationOutcome::NotApplicable);
        }

        let (mut cleaning_week, created) = store.get_or_create_cleaning_week(schedule_id, week);
        if created {
            let still_occurs = store
                .schedule(schedule_id)
                .is_some_and(|s| s.occurs_in_week(week));
            if !still_occurs {
                store.delete_cleaning_week(cleaning_week.id);
                return Err(PlanError::RecurrenceMismatch {
                    schedule: schedule_id,
                    week,
                });
            }
            create_missing_tasks(store, &cleaning_week);
        }

        if !cleaning_week.assignments_valid {
            for stale in store.assignments_of_cleaning_week(cleaning_week.id) {
                retire_assignment(store, stale.id);
            }
        }

        let slots = usize::from(schedule.slots);
        let mut taken = store.assignments_of_cleaning_week(cleaning_week.id).len();
        if cleaning_week.assignments_valid && taken >= slots {
            return Ok(GenerationOutcome::AlreadyFilled);
        }

        let mut new_assignments = Vec::new();
        while taken < slots {
            let Some(selection) = self.allocator.select(store, &schedule, &cleaning_week) else {
                break;
            };
            let cleaner = selection.candidate.cleaner;
            let id = store.insert_assignment(Assignment::new(cleaner, &cleaning_week));
            info!(
                schedule = %schedule_id,
                week,
                cleaner = %cleaner,
                assignment = %id,
                ratio = selection.candidate.ratio,
                relaxed = selection.relaxed,
                "assignment created"
            );
            new_assignments.push(id);
            taken += 1;
        }

        cleaning_week.assignments_valid = true;
        store.update_cleaning_week(cleaning_week);

        let missing = slots.saturating_sub(taken);
        if missing > 0 {
            warn!(schedule = %schedule_id, week, missing, "not enough cleaners to fill cleaning week");
            store.record_shortfall(StaffingShortfall {
                schedule: schedule_id,
                week,
                missing,
            });
            Ok(GenerationOutcome::NoCandidates {
                created: new_assignments,
                missing,
            })
        } else {
            store.clear_shortfall(schedule_id, week);
            Ok(GenerationOutcome::Filled {
                created: new_assignments,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Roster;
    use crate::models::{CleanerId, Recurrence, Schedule, TaskTemplate};
    use rstest::rstest;

    #[rstest]
    #[case(2500, true)]
    #[case(2501, false)]
    fn test_even_kitchen(#[case] week: EpochWeek, #[case] occurs: bool) {
        let mut roster = Roster::new(Schedule::new("Kitchen").with_recurrence(Recurrence::EvenWeeks));
        roster.member("A");
        roster.member("B");

        let outcome = AssignmentGenerator::new()
            .create_assignment(&mut roster.store, roster.schedule, week)
            .unwrap();
        if occurs {
            assert_eq!(outcome.created().len(), 1);
            let cw = roster.store.find_cleaning_week(roster.schedule, week).unwrap();
            assert!(cw.assignments_valid);
        } else {
            assert_eq!(outcome, GenerationOutcome::NotApplicable);
            assert!(roster.store.find_cleaning_week(roster.schedule, week).is_none());
        }
    }

    #[test]
    fn test_generation_is_idempotent() {
        let mut roster = Roster::new(Schedule::new("Kitchen").with_slots(2));
        roster.member("A");
        roster.member("B");
        roster.member("C");
        let generator = AssignmentGenerator::new();

        let first = generator
            .create_assignments_over_timespan(&mut roster.store, roster.schedule, WeekSpan::new(1, 6))
            .unwrap();
        assert_eq!(first.created_count(), 12);

        let second = generator
            .create_assignments_over_timespan(&mut roster.store, roster.schedule, WeekSpan::new(1, 6))
            .unwrap();
        assert_eq!(second.created_count(), 0);
        assert!(second
            .weeks
            .iter()
            .all(|(_, o)| *o == GenerationOutcome::AlreadyFilled));
    }

    #[test]
    fn test_rotation_is_fair() {
        let mut roster = Roster::new(Schedule::new("Kitchen"));
        let cleaners = [roster.member("A"), roster.member("B"), roster.member("C")];
        AssignmentGenerator::new()
            .create_assignments_over_timespan(&mut roster.store, roster.schedule, WeekSpan::new(1, 9))
            .unwrap();

        for cleaner in cleaners {
            assert_eq!(
                roster
                    .store
                    .assignments_of_cleaner(cleaner, WeekSpan::unbounded())
                    .len(),
                3
            );
        }
    }

    #[test]
    fn test_two_slots_get_two_cleaners() {
        let mut roster = Roster::new(Schedule::new("Kitchen").with_slots(2));
        roster.member("A");
        roster.member("B");

        AssignmentGenerator::new()
            .create_assignment(&mut roster.store, roster.schedule, 4)
            .unwrap();
        let cw = roster.store.find_cleaning_week(roster.schedule, 4).unwrap();
        let cleaners: Vec<CleanerId> = roster
            .store
            .assignments_of_cleaning_week(cw.id)
            .iter()
            .map(|a| a.cleaner)
            .collect();
        assert_eq!(cleaners.len(), 2);
        assert_ne!(cleaners[0], cleaners[1]);
    }

    #[test]
    fn test_shortfall_recorded_and_cleared() {
        let mut roster = Roster::new(Schedule::new("Kitchen").with_slots(2));
        roster.member("A");
        let generator = AssignmentGenerator::new();

        let outcome = generator
            .create_assignment(&mut roster.store, roster.schedule, 4)
            .unwrap();
        assert!(matches!(
            outcome,
            GenerationOutcome::NoCandidates { ref created, missing: 1 } if created.len() == 1
        ));
        assert_eq!(roster.store.shortfalls().len(), 1);

        roster.member("B");
        let outcome = generator
            .create_assignment(&mut roster.store, roster.schedule, 4)
            .unwrap();
        assert_eq!(outcome.created().len(), 1);
        assert!(roster.store.shortfalls().is_empty());
    }

    #[test]
    fn test_no_cleaners_at_all() {
        let mut roster = Roster::new(Schedule::new("Kitchen"));
        let outcome = AssignmentGenerator::new()
            .create_assignment(&mut roster.store, roster.schedule, 4)
            .unwrap();
        assert_eq!(
            outcome,
            GenerationOutcome::NoCandidates {
                created: vec![],
                missing: 1
            }
        );
    }

    #[test]
    fn test_invalid_week_is_regenerated() {
        let mut roster = Roster::new(Schedule::new("Kitchen"));
        let a = roster.cleaner("A", 0, 9);
        let b = roster.member("B");
        let generator = AssignmentGenerator::new();

        generator
            .create_assignment(&mut roster.store, roster.schedule, 5)
            .unwrap();
        let mut cw = roster.store.find_cleaning_week(roster.schedule, 5).unwrap();
        let before = roster.store.assignments_of_cleaning_week(cw.id);
        assert_eq!(before[0].cleaner, a);

        // A leaves early; the week is invalidated.
        let mut affiliation = roster.store.affiliations_of_cleaner(a).remove(0);
        affiliation.end = 4;
        roster.store.update_affiliation(affiliation);
        cw.assignments_valid = false;
        roster.store.update_cleaning_week(cw.clone());

        let outcome = generator
            .create_assignment(&mut roster.store, roster.schedule, 5)
            .unwrap();
        assert_eq!(outcome.created().len(), 1);
        let after = roster.store.assignments_of_cleaning_week(cw.id);
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].cleaner, b);
        assert!(roster.store.assignment(before[0].id).is_none());
    }

    #[test]
    fn test_fresh_week_gets_tasks() {
        let mut roster = Roster::new(Schedule::new("Kitchen"));
        roster.member("A");
        roster
            .store
            .insert_task_template(TaskTemplate::new(roster.schedule, "Mop floor"));
        roster
            .store
            .insert_task_template(TaskTemplate::new(roster.schedule, "Old").disabled());

        AssignmentGenerator::new()
            .create_assignment(&mut roster.store, roster.schedule, 4)
            .unwrap();
        let cw = roster.store.find_cleaning_week(roster.schedule, 4).unwrap();
        assert_eq!(roster.store.tasks_of_cleaning_week(cw.id).len(), 1);
    }

    #[test]
    fn test_disabled_schedule_is_not_applicable() {
        let mut roster = Roster::new(Schedule::new("Kitchen").disabled());
        roster.member("A");
        let outcome = AssignmentGenerator::new()
            .create_assignment(&mut roster.store, roster.schedule, 4)
            .unwrap();
        assert_eq!(outcome, GenerationOutcome::NotApplicable);
    }

    #[test]
    fn test_unknown_schedule() {
        let mut roster = Roster::new(Schedule::new("Kitchen"));
        let err = AssignmentGenerator::new()
            .create_assignment(&mut roster.store, ScheduleId(999), 4)
            .unwrap_err();
        assert!(matches!(err, PlanError::NotFound { entity: "schedule", .. }));
    }
}
