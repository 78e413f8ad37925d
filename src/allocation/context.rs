//! Allocation context for rule evaluation.

use chrono::NaiveDate;

use crate::models::{EpochWeek, WeekSpan};

/// The slot being filled and the fairness window it is judged over.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationContext {
    /// Week of the occurrence.
    pub week: EpochWeek,
    /// Due date of the occurrence.
    pub due_date: NaiveDate,
    /// Constant affiliation timespan around `week`.
    pub span: WeekSpan,
    /// All assignments of the schedule within `span`.
    pub total_assignments: usize,
}

impl AllocationContext {
    /// Creates a context for an occurrence with an empty history.
    pub fn new(week: EpochWeek, due_date: NaiveDate, span: WeekSpan) -> Self {
        Self {
            week,
            due_date,
            span,
            total_assignments: 0,
        }
    }

    /// Sets the number of assignments within the span.
    pub fn with_total_assignments(mut self, total: usize) -> Self {
        self.total_assignments = total;
        self
    }

    /// Share of `own` in the span's assignments; 0 for an empty span.
    pub fn ratio_of(&self, own: usize) -> f64 {
        if self.total_assignments == 0 {
            0.0
        } else {
            own as f64 / self.total_assignments as f64
        }
    }
}
