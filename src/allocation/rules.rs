//! Built-in allocation rules.
//!
//! # Score Convention
//! All rules return lower scores for candidates that should be picked first.

use super::{AllocationContext, AllocationRule, Candidate, RuleScore};

/// Lowest deployment ratio first.
///
/// A cleaner who carried a smaller share of the schedule's assignments since
/// membership last changed is picked before one who carried more.
#[derive(Debug, Clone, Copy)]
pub struct DeploymentRatio;

impl AllocationRule for DeploymentRatio {
    fn name(&self) -> &'static str {
        "RATIO"
    }

    fn evaluate(&self, candidate: &Candidate, _context: &AllocationContext) -> RuleScore {
        candidate.ratio
    }

    fn description(&self) -> &'static str {
        "Lowest Deployment Ratio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CleanerId, WeekSpan};
    use chrono::NaiveDate;

    #[test]
    fn test_rule_scores() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let ctx = AllocationContext::new(1, due, WeekSpan::unbounded()).with_total_assignments(5);
        let c = Candidate {
            cleaner: CleanerId(1),
            assignments_in_span: 4,
            ratio: 0.8,
        };

        assert!((DeploymentRatio.evaluate(&c, &ctx) - 0.8).abs() < 1e-10);
        assert_eq!(DeploymentRatio.description(), "Lowest Deployment Ratio");
    }
}
