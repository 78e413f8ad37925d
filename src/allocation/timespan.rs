//! Constant affiliation timespan.
//!
//! The fairness window of an occurrence is the longest run of weeks around
//! it in which the set of affiliated cleaners stays the same. Membership can
//! only change where an affiliation begins or right after one ends, so only
//! those weeks are inspected.

use std::collections::BTreeSet;

use crate::models::{Affiliation, CleanerId, EpochWeek, WeekSpan};

fn members_in(affiliations: &[Affiliation], week: EpochWeek) -> BTreeSet<CleanerId> {
    affiliations
        .iter()
        .filter(|a| a.is_active_in(week))
        .map(|a| a.cleaner)
        .collect()
}

/// Maximal inclusive span around `week` over which the set of cleaners
/// affiliated through `affiliations` equals the set in `week`.
///
/// Weeks where several affiliations change at once but the set of cleaners
/// ends up identical (a cleaner moving between two groups of the same
/// schedule) are not boundaries. Sides without a change stay unbounded.
pub fn constant_affiliation_timespan(affiliations: &[Affiliation], week: EpochWeek) -> WeekSpan {
    let mut change_points: BTreeSet<EpochWeek> = BTreeSet::new();
    for affiliation in affiliations {
        change_points.insert(affiliation.beginning);
        if let Some(after_end) = affiliation.end.checked_add(1) {
            change_points.insert(after_end);
        }
    }

    let current = members_in(affiliations, week);

    let mut first = EpochWeek::MIN;
    for &point in change_points.range(..=week).rev() {
        let Some(before) = point.checked_sub(1) else {
            break;
        };
        if members_in(affiliations, before) != current {
            first = point;
            break;
        }
    }

    let mut last = EpochWeek::MAX;
    if let Some(next) = week.checked_add(1) {
        for &point in change_points.range(next..) {
            if members_in(affiliations, point) != current {
                last = point - 1;
                break;
            }
        }
    }

    WeekSpan::new(first, last)
}
