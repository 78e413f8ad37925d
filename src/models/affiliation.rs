//! Affiliation model: a cleaner's time-bounded membership in a group.

use serde::{Deserialize, Serialize};

use super::calendar::{EpochWeek, WeekSpan};
use super::ids::{AffiliationId, CleanerId, GroupId};

/// Binds a cleaner to a schedule group for the inclusive weeks
/// `[beginning, end]`.
///
/// Affiliations of the same cleaner never overlap, and the cleaner and group
/// of an existing affiliation are immutable: moving a cleaner to another
/// group means ending one affiliation and creating the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation {
    /// Store-assigned identifier.
    pub id: AffiliationId,
    /// The affiliated cleaner.
    pub cleaner: CleanerId,
    /// The group joined.
    pub group: GroupId,
    /// First week of membership (inclusive).
    pub beginning: EpochWeek,
    /// Last week of membership (inclusive).
    pub end: EpochWeek,
}

impl Affiliation {
    /// Creates an affiliation over `[beginning, end]`.
    pub fn new(cleaner: CleanerId, group: GroupId, beginning: EpochWeek, end: EpochWeek) -> Self {
        Self {
            id: AffiliationId::default(),
            cleaner,
            group,
            beginning,
            end,
        }
    }

    /// Creates an affiliation without an end week.
    pub fn open_ended(cleaner: CleanerId, group: GroupId, beginning: EpochWeek) -> Self {
        Self::new(cleaner, group, beginning, EpochWeek::MAX)
    }

    /// Membership weeks.
    #[inline]
    pub fn span(&self) -> WeekSpan {
        WeekSpan::new(self.beginning, self.end)
    }

    /// Whether the cleaner is a member in the given week.
    #[inline]
    pub fn is_active_in(&self, week: EpochWeek) -> bool {
        self.span().contains(week)
    }

    /// Whether two affiliations share a week.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.span().overlaps(&other.span())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affiliation_span() {
        let a = Affiliation::new(CleanerId(1), GroupId(1), 10, 20);
        assert!(a.is_active_in(10));
        assert!(a.is_active_in(20));
        assert!(!a.is_active_in(21));

        let b = Affiliation::open_ended(CleanerId(1), GroupId(2), 20);
        assert!(a.overlaps(&b));
        assert!(b.is_active_in(1_000_000));

        let c = Affiliation::new(CleanerId(1), GroupId(2), 21, 30);
        assert!(!a.overlaps(&c));
    }
}
