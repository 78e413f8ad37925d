//! Fairness allocator.
//!
//! # Algorithm
//!
//! 1. Collect cleaners affiliated in the target week with any group
//!    containing the schedule, dropping inactive cleaners.
//! 2. Compute the constant affiliation timespan around the week and count
//!    the schedule's assignments inside it.
//! 3. Rank candidates with the rule engine.
//! 4. Walk the ranking, skipping cleaners excluded from the cleaning week,
//!    cleaners already holding one of its slots, and cleaners with another
//!    duty on the same due date.
//! 5. If nobody survives, take the best cleaner that is merely busy on the
//!    due date and flag the selection as relaxed.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::{constant_affiliation_timespan, AllocationContext, Candidate, RuleEngine};
use crate::models::{CleanerId, CleaningWeek, EpochWeek, Schedule, WeekSpan};
use crate::store::Store;

/// The allocator's pick for one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// The ranked candidate picked.
    pub candidate: Candidate,
    /// Whether the due-date conflict rule had to be relaxed.
    pub relaxed: bool,
}

/// Ranks eligible cleaners and picks one per open slot.
#[derive(Debug, Clone, Default)]
pub struct FairnessAllocator {
    engine: RuleEngine,
}

impl FairnessAllocator {
    /// Creates an allocator with the fairness ordering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator with a custom rule engine.
    pub fn with_engine(engine: RuleEngine) -> Self {
        Self { engine }
    }

    /// Active cleaners affiliated with a group of the schedule in the week.
    pub fn eligible_cleaners<S: Store>(
        &self,
        store: &S,
        schedule: &Schedule,
        week: EpochWeek,
    ) -> BTreeSet<CleanerId> {
        let groups = store.groups_of_schedule(schedule.id);
        store
            .affiliations_in_groups(&groups)
            .into_iter()
            .filter(|a| a.is_active_in(week))
            .map(|a| a.cleaner)
            .filter(|&c| store.cleaner(c).is_some_and(|c| c.active))
            .collect()
    }

    /// Eligible cleaners in priority order, with the context they were
    /// ranked in.
    pub fn rank<S: Store>(
        &self,
        store: &S,
        schedule: &Schedule,
        week: EpochWeek,
    ) -> (Vec<Candidate>, AllocationContext) {
        let groups = store.groups_of_schedule(schedule.id);
        let affiliations = store.affiliations_in_groups(&groups);
        let span = constant_affiliation_timespan(&affiliations, week);

        let assignments = store.assignments_in_span(schedule.id, span);
        let mut per_cleaner: BTreeMap<CleanerId, usize> = BTreeMap::new();
        for assignment in &assignments {
            *per_cleaner.entry(assignment.cleaner).or_default() += 1;
        }

        let context = AllocationContext::new(week, schedule.due_date(week), span)
            .with_total_assignments(assignments.len());

        let candidates: Vec<Candidate> = self
            .eligible_cleaners(store, schedule, week)
            .into_iter()
            .map(|cleaner| {
                let own = per_cleaner.get(&cleaner).copied().unwrap_or(0);
                Candidate {
                    cleaner,
                    assignments_in_span: own,
                    ratio: context.ratio_of(own),
                }
            })
            .collect();

        (self.engine.rank(candidates, &context), context)
    }

    /// Picks the cleaner for the next open slot of the cleaning week.
    ///
    /// Returns `None` when no eligible cleaner remains.
    pub fn select<S: Store>(
        &self,
        store: &S,
        schedule: &Schedule,
        cleaning_week: &CleaningWeek,
    ) -> Option<Selection> {
        let (ranked, context) = self.rank(store, schedule, cleaning_week.week);
        let holding: BTreeSet<CleanerId> = store
            .assignments_of_cleaning_week(cleaning_week.id)
            .into_iter()
            .map(|a| a.cleaner)
            .collect();

        let mut fallback: Option<&Candidate> = None;
        for candidate in &ranked {
            if cleaning_week.is_excluded(candidate.cleaner) {
                debug!(cleaner = %candidate.cleaner, week = cleaning_week.week, "skipped: excluded");
                continue;
            }
            if holding.contains(&candidate.cleaner) {
                continue;
            }
            if self.busy_on_due_date(store, candidate.cleaner, cleaning_week, &context) {
                debug!(cleaner = %candidate.cleaner, due = %context.due_date, "skipped: busy on due date");
                fallback.get_or_insert(candidate);
                continue;
            }
            debug!(cleaner = %candidate.cleaner, ratio = candidate.ratio, "selected");
            return Some(Selection {
                candidate: candidate.clone(),
                relaxed: false,
            });
        }

        fallback.map(|candidate| {
            debug!(cleaner = %candidate.cleaner, ratio = candidate.ratio, "selected with relaxed due-date rule");
            Selection {
                candidate: candidate.clone(),
                relaxed: true,
            }
        })
    }

    fn busy_on_due_date<S: Store>(
        &self,
        store: &S,
        cleaner: CleanerId,
        cleaning_week: &CleaningWeek,
        context: &AllocationContext,
    ) -> bool {
        store
            .assignments_of_cleaner(cleaner, WeekSpan::single(cleaning_week.week))
            .into_iter()
            .filter(|a| a.cleaning_week != cleaning_week.id)
            .any(|a| {
                store
                    .schedule(a.schedule)
                    .is_some_and(|s| s.due_date(a.week) == context.due_date)
            })
    }
}
