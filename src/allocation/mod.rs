//! Fair allocation of cleaners to open slots.
//!
//! Candidates are ranked by a rule engine. The default engine orders by
//! deployment ratio (the share of a schedule's assignments a cleaner
//! carried while group membership stayed unchanged), breaking ties by
//! cleaner id.
//!
//! # Usage
//!
//! ```
//! use duty_roster::allocation::{FairnessAllocator, RuleEngine};
//!
//! let engine = RuleEngine::fairness();
//! assert_eq!(engine.rule_names(), vec!["RATIO"]);
//! let allocator = FairnessAllocator::with_engine(engine);
//! # let _ = allocator;
//! ```

mod allocator;
mod context;
mod engine;
pub mod rules;
mod timespan;

pub use allocator::{FairnessAllocator, Selection};
pub use context::AllocationContext;
pub use engine::{RuleEngine, SCORE_EPSILON};
pub use timespan::constant_affiliation_timespan;

use crate::models::CleanerId;
use std::fmt::Debug;

/// Score returned by an allocation rule.
///
/// Lower scores = higher priority (allocated first).
pub type RuleScore = f64;

/// An eligible cleaner with the figures rules evaluate.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The cleaner.
    pub cleaner: CleanerId,
    /// Assignments of this cleaner within the span.
    pub assignments_in_span: usize,
    /// `assignments_in_span / context.total_assignments`, 0 when the span is empty.
    pub ratio: f64,
}

/// A rule ranking candidates for a slot.
///
/// # Score Convention
/// **Lower score = higher priority.**
pub trait AllocationRule: Send + Sync + Debug {
    /// Rule name.
    fn name(&self) -> &'static str;

    /// Evaluates a candidate for the slot described by `context`.
    fn evaluate(&self, candidate: &Candidate, context: &AllocationContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
