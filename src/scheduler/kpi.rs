//! Roster quality metrics (KPIs).
//!
//! Computes staffing indicators for one schedule over a span of weeks from
//! the materialized cleaning weeks.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Occurrences | Cleaning weeks in the span |
//! | Filled | Valid weeks with every slot taken |
//! | Understaffed | Weeks with fewer assignments than slots |
//! | Invalid | Weeks awaiting regeneration |
//! | Fill Rate | Filled / occurrences |
//! | Spread | Most minus fewest assignments of any cleaner eligible in the span |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::allocation::FairnessAllocator;
use crate::error::{PlanError, Result};
use crate::models::{CleanerId, ScheduleId, WeekSpan};
use crate::store::Store;

/// Staffing indicators of one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Schedule measured.
    pub schedule: ScheduleId,
    /// Weeks measured.
    pub span: WeekSpan,
    /// Cleaning weeks in the span.
    pub occurrences: usize,
    /// Valid weeks with every slot taken.
    pub filled: usize,
    /// Weeks with open slots.
    pub understaffed: usize,
    /// Weeks marked for regeneration.
    pub invalid: usize,
    /// Fraction of filled weeks (0.0..1.0); 1.0 without occurrences.
    pub fill_rate: f64,
    /// Assignments per cleaner, including eligible cleaners with none.
    pub assignments_by_cleaner: BTreeMap<CleanerId, usize>,
}

impl ScheduleKpi {
    /// Computes KPIs of a schedule over the span.
    pub fn calculate<S: Store>(store: &S, schedule: ScheduleId, span: WeekSpan) -> Result<Self> {
        let record = store
            .schedule(schedule)
            .ok_or_else(|| PlanError::not_found("schedule", schedule))?;
        let slots = usize::from(record.slots);
        let allocator = FairnessAllocator::new();

        let mut filled = 0;
        let mut understaffed = 0;
        let mut invalid = 0;
        let mut assignments_by_cleaner: BTreeMap<CleanerId, usize> = BTreeMap::new();

        let cleaning_weeks = store.cleaning_weeks_in_span(schedule, span);
        for cleaning_week in &cleaning_weeks {
            // Eligible cleaners without a duty still count towards the spread.
            for cleaner in allocator.eligible_cleaners(store, &record, cleaning_week.week) {
                assignments_by_cleaner.entry(cleaner).or_default();
            }
            let assignments = store.assignments_of_cleaning_week(cleaning_week.id);
            for assignment in &assignments {
                *assignments_by_cleaner.entry(assignment.cleaner).or_default() += 1;
            }

            if !cleaning_week.assignments_valid {
                invalid += 1;
            }
            if assignments.len() < slots {
                understaffed += 1;
            } else if cleaning_week.assignments_valid {
                filled += 1;
            }
        }

        let occurrences = cleaning_weeks.len();
        let fill_rate = if occurrences == 0 {
            1.0
        } else {
            filled as f64 / occurrences as f64
        };

        Ok(Self {
            schedule,
            span,
            occurrences,
            filled,
            understaffed,
            invalid,
            fill_rate,
            assignments_by_cleaner,
        })
    }

    /// Difference between the busiest and the least busy cleaner.
    pub fn spread(&self) -> usize {
        let max = self.assignments_by_cleaner.values().max().copied().unwrap_or(0);
        let min = self.assignments_by_cleaner.values().min().copied().unwrap_or(0);
        max - min
    }

    /// Whether the roster meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_fill_rate: f64, max_spread: usize) -> bool {
        self.fill_rate >= min_fill_rate && self.spread() <= max_spread
    }
}
