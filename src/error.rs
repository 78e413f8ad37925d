//! Crate error type.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{
    AssignmentId, CleanerId, CleaningWeekId, DutySwitchId, EpochWeek, ScheduleId, SwitchStatus,
    TaskId,
};
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("validation failed: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    #[error("schedule {schedule} does not occur in week {week}")]
    RecurrenceMismatch { schedule: ScheduleId, week: EpochWeek },

    #[error("duty switch {0} is already resolved")]
    AlreadyResolved(DutySwitchId),

    #[error("duty switch {switch} is {status}, cannot {action}")]
    InvalidTransition {
        switch: DutySwitchId,
        status: SwitchStatus,
        action: &'static str,
    },

    #[error("assignment {destination} is not a queued destination of duty switch {switch}")]
    UnknownDestination {
        switch: DutySwitchId,
        destination: AssignmentId,
    },

    #[error("assignment {destination} no longer qualifies for duty switch {switch}; proposal rejected")]
    StaleProposal {
        switch: DutySwitchId,
        destination: AssignmentId,
    },

    #[error("assignment {assignment} in week {week} is not in the future")]
    PastAssignment {
        assignment: AssignmentId,
        week: EpochWeek,
    },

    #[error("cleaner {cleaner} is not assigned to cleaning week {cleaning_week}")]
    NotAssigned {
        cleaner: CleanerId,
        cleaning_week: CleaningWeekId,
    },

    #[error("task {task} can only be completed between {opens} and {closes}")]
    OutsideTaskWindow {
        task: TaskId,
        opens: NaiveDate,
        closes: NaiveDate,
    },
}

impl PlanError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<u64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<Vec<ValidationError>> for PlanError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_validation_display_joins_messages() {
        let err = PlanError::from(vec![
            ValidationError {
                kind: ValidationErrorKind::InvertedInterval,
                message: "first".into(),
            },
            ValidationError {
                kind: ValidationErrorKind::EmptyName,
                message: "second".into(),
            },
        ]);
        assert_eq!(err.to_string(), "validation failed: first; second");
    }

    #[test]
    fn test_not_found_display() {
        let err = PlanError::not_found("schedule", ScheduleId(4));
        assert_eq!(err.to_string(), "schedule 4 not found");
    }
}
