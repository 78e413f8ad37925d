//! Rule engine for candidate ranking.
//!
//! # Algorithm
//!
//! Each candidate is scored by every rule, in the order the rules were
//! added. Candidates compare by their score lists lexicographically; scores
//! closer than [`SCORE_EPSILON`] count as equal. Candidates equal on every
//! rule are ordered by cleaner id, so a ranking never depends on the order
//! candidates were collected in.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::{rules, AllocationContext, AllocationRule, Candidate, RuleScore};

/// Scores closer than this are treated as equal.
pub const SCORE_EPSILON: f64 = 1e-9;

/// An ordered list of allocation rules.
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn AllocationRule>>,
}

impl RuleEngine {
    /// Creates an engine without rules; it orders by cleaner id alone.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The fairness ordering: ascending deployment ratio, then cleaner id.
    pub fn fairness() -> Self {
        Self::new().with_rule(rules::DeploymentRatio)
    }

    /// Appends a rule consulted when all earlier rules tie.
    pub fn with_rule<R: AllocationRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Names of the rules in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Returns candidates in priority order, highest priority first.
    pub fn rank(&self, candidates: Vec<Candidate>, context: &AllocationContext) -> Vec<Candidate> {
        let mut scored: Vec<(Vec<RuleScore>, Candidate)> = candidates
            .into_iter()
            .map(|c| (self.scores(&c, context), c))
            .collect();
        scored.sort_by(|(score_a, a), (score_b, b)| {
            compare_scores(score_a, score_b).then_with(|| a.cleaner.cmp(&b.cleaner))
        });
        scored.into_iter().map(|(_, c)| c).collect()
    }

    fn scores(&self, candidate: &Candidate, context: &AllocationContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|rule| rule.evaluate(candidate, context))
            .collect()
    }
}

fn compare_scores(a: &[RuleScore], b: &[RuleScore]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            if (x - y).abs() <= SCORE_EPSILON {
                Ordering::Equal
            } else {
                x.total_cmp(y)
            }
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::fairness()
    }
}

impl fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}
