//! Input validation for roster writes.
//!
//! Checks records before they are persisted. Detects:
//! - Overlapping affiliations of the same cleaner
//! - Affiliations ending before they begin
//! - In-place changes of an affiliation's cleaner or group
//! - Duplicate or empty cleaner slugs
//! - Schedules with an unsupported slot count
//!
//! All problems are collected, so a caller can fix everything in one pass.

use thiserror::Error;

use crate::models::{Affiliation, Cleaner, Schedule};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description naming the entity and interval.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two affiliations of one cleaner share a week.
    OverlappingAffiliation,
    /// An affiliation ends before it begins.
    InvertedInterval,
    /// The cleaner or group of an existing affiliation was changed.
    IdentityMutation,
    /// Two cleaners share a slug.
    DuplicateSlug,
    /// A name or slug is empty.
    EmptyName,
    /// A schedule needs a number of cleaners other than 1 or 2.
    InvalidSlotCount,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Maximum cleaners per occurrence.
pub const MAX_SLOTS: u8 = 2;

/// Validates a new or changed affiliation against the cleaner's others.
///
/// `siblings` may contain the affiliation itself (matched by id); it is
/// skipped.
pub fn validate_affiliation(affiliation: &Affiliation, siblings: &[Affiliation]) -> ValidationResult {
    let mut errors = Vec::new();

    if affiliation.end < affiliation.beginning {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvertedInterval,
            format!(
                "Affiliation of cleaner {} ends in week {} before it begins in week {}",
                affiliation.cleaner, affiliation.end, affiliation.beginning
            ),
        ));
    }

    for other in siblings {
        if other.id == affiliation.id || other.cleaner != affiliation.cleaner {
            continue;
        }
        if affiliation.overlaps(other) {
            errors.push(ValidationError::new(
                ValidationErrorKind::OverlappingAffiliation,
                format!(
                    "Affiliation of cleaner {} over weeks [{}, {}] overlaps affiliation {} over weeks [{}, {}]",
                    affiliation.cleaner,
                    affiliation.beginning,
                    affiliation.end,
                    other.id,
                    other.beginning,
                    other.end
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates an update of a persisted affiliation.
///
/// Only the interval may change; everything else is checked like a new
/// affiliation.
pub fn validate_affiliation_update(
    previous: &Affiliation,
    updated: &Affiliation,
    siblings: &[Affiliation],
) -> ValidationResult {
    let mut errors = Vec::new();

    if previous.cleaner != updated.cleaner {
        errors.push(ValidationError::new(
            ValidationErrorKind::IdentityMutation,
            format!(
                "Affiliation {} cannot move from cleaner {} to cleaner {}; delete it and create a new one",
                previous.id, previous.cleaner, updated.cleaner
            ),
        ));
    }
    if previous.group != updated.group {
        errors.push(ValidationError::new(
            ValidationErrorKind::IdentityMutation,
            format!(
                "Affiliation {} cannot move from group {} to group {}; end it and create a new one",
                previous.id, previous.group, updated.group
            ),
        ));
    }

    if let Err(mut interval_errors) = validate_affiliation(updated, siblings) {
        errors.append(&mut interval_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a cleaner against the already registered ones.
pub fn validate_cleaner(cleaner: &Cleaner, existing: &[Cleaner]) -> ValidationResult {
    let mut errors = Vec::new();

    if cleaner.name.trim().is_empty() || cleaner.slug.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyName,
            format!("Cleaner '{}' needs a non-empty name and slug", cleaner.name),
        ));
    }

    if existing
        .iter()
        .any(|c| c.id != cleaner.id && c.slug == cleaner.slug)
    {
        errors.push(ValidationError::new(
            ValidationErrorKind::DuplicateSlug,
            format!("Duplicate cleaner slug: {}", cleaner.slug),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a schedule definition.
pub fn validate_schedule(schedule: &Schedule) -> ValidationResult {
    let mut errors = Vec::new();

    if schedule.name.trim().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyName,
            "Schedule needs a non-empty name",
        ));
    }

    if schedule.slots == 0 || schedule.slots > MAX_SLOTS {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSlotCount,
            format!(
                "Schedule '{}' needs 1 to {} cleaners per occurrence, got {}",
                schedule.name, MAX_SLOTS, schedule.slots
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AffiliationId, CleanerId, GroupId};

    fn affiliation(id: u64, cleaner: u64, group: u64, beginning: i64, end: i64) -> Affiliation {
        let mut a = Affiliation::new(CleanerId(cleaner), GroupId(group), beginning, end);
        a.id = AffiliationId(id);
        a
    }

    #[test]
    fn test_valid_affiliation() {
        let existing = vec![affiliation(1, 1, 1, 0, 9)];
        let candidate = affiliation(2, 1, 2, 10, 20);
        assert!(validate_affiliation(&candidate, &existing).is_ok());
    }

    #[test]
    fn test_overlapping_affiliation() {
        let existing = vec![affiliation(1, 1, 1, 0, 10)];
        let candidate = affiliation(2, 1, 2, 10, 20);

        let errors = validate_affiliation(&candidate, &existing).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::OverlappingAffiliation);
        assert!(errors[0].message.contains("[10, 20]"));
    }

    #[test]
    fn test_other_cleaners_do_not_overlap() {
        let existing = vec![affiliation(1, 2, 1, 0, 100)];
        let candidate = affiliation(2, 1, 1, 10, 20);
        assert!(validate_affiliation(&candidate, &existing).is_ok());
    }

    #[test]
    fn test_self_is_skipped() {
        let a = affiliation(1, 1, 1, 0, 10);
        assert!(validate_affiliation(&a, std::slice::from_ref(&a)).is_ok());
    }

    #[test]
    fn test_inverted_interval() {
        let candidate = affiliation(1, 1, 1, 20, 10);
        let errors = validate_affiliation(&candidate, &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvertedInterval));
    }

    #[test]
    fn test_identity_mutation() {
        let previous = affiliation(1, 1, 1, 0, 10);
        let moved = affiliation(1, 2, 3, 0, 10);

        let errors = validate_affiliation_update(&previous, &moved, &[]).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::IdentityMutation)
                .count(),
            2
        );
    }

    #[test]
    fn test_update_collects_all_errors() {
        let previous = affiliation(1, 1, 1, 0, 10);
        let sibling = affiliation(2, 1, 2, 11, 30);
        let updated = affiliation(1, 1, 2, 5, 12);

        let errors = validate_affiliation_update(&previous, &updated, &[sibling]).unwrap_err();
        assert!(errors.len() >= 2);
    }

    #[test]
    fn test_duplicate_slug() {
        let mut existing = Cleaner::new("Anna");
        existing.id = CleanerId(1);
        let errors = validate_cleaner(&Cleaner::new("anna"), &[existing]).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateSlug);
    }

    #[test]
    fn test_empty_cleaner_name() {
        let errors = validate_cleaner(&Cleaner::new("  "), &[]).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyName);
    }

    #[test]
    fn test_slot_count() {
        assert!(validate_schedule(&Schedule::new("Kitchen").with_slots(2)).is_ok());
        let errors = validate_schedule(&Schedule::new("Kitchen").with_slots(3)).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidSlotCount);
        assert!(validate_schedule(&Schedule::new("Kitchen").with_slots(0)).is_err());
    }
}
