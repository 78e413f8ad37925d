//! Time-driven escalation of duty switches.
//!
//! Open switches that waited long enough get their oldest destination
//! proposed; proposals nobody answered in time are executed.

use chrono::{Duration, NaiveDate};
use tracing::info;

use super::{AcceptOutcome, Negotiator};
use crate::error::Result;
use crate::models::{AssignmentId, DutySwitch, DutySwitchId, SwitchStatus};
use crate::store::Store;

fn elapsed(since: NaiveDate, days: u32, today: NaiveDate) -> bool {
    since
        .checked_add_signed(Duration::days(i64::from(days)))
        .is_some_and(|deadline| deadline <= today)
}

/// Open switches without a selection that were requested at least `days` ago.
pub fn waiting_for_proposal<S: Store>(store: &S, today: NaiveDate, days: u32) -> Vec<DutySwitchId> {
    store
        .duty_switches()
        .into_iter()
        .filter(|s| s.status == SwitchStatus::Open && s.selected.is_none())
        .filter(|s| elapsed(s.created, days, today))
        .map(|s| s.id)
        .collect()
}

/// Pending switches whose selection was made at least `days` ago.
pub fn elapsed_proposals<S: Store>(store: &S, today: NaiveDate, days: u32) -> Vec<DutySwitchId> {
    store
        .duty_switches()
        .into_iter()
        .filter(|s| s.status == SwitchStatus::Pending)
        .filter(|s| s.selected_at.is_some_and(|at| elapsed(at, days, today)))
        .map(|s| s.id)
        .collect()
}

/// Refreshes the queue of an open switch and proposes its head.
///
/// Returns the proposed destination, or `None` if the queue is empty.
pub fn propose_next_destination<S: Store>(
    negotiator: &mut Negotiator,
    store: &mut S,
    switch: DutySwitchId,
) -> Result<Option<AssignmentId>> {
    negotiator.look_for_destinations(store, switch)?;
    let head = store
        .duty_switch(switch)
        .and_then(|s: DutySwitch| s.destinations.front().copied());
    match head {
        Some(destination) => {
            negotiator.set_selected(store, switch, destination)?;
            Ok(Some(destination))
        }
        None => Ok(None),
    }
}

/// Executes a proposal whose answer period ran out.
pub fn execute_proposal<S: Store>(
    negotiator: &mut Negotiator,
    store: &mut S,
    switch: DutySwitchId,
) -> Result<AcceptOutcome> {
    let outcome = negotiator.selected_was_accepted(store, switch)?;
    if let AcceptOutcome::Executed(_) = &outcome {
        info!(switch = %switch, "unanswered proposal executed");
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Roster;
    use crate::models::{epoch_week_to_monday, Assignment, Resolution, Schedule};

    fn day(offset: i64) -> NaiveDate {
        epoch_week_to_monday(5) + Duration::days(offset)
    }

    fn roster_with_switch() -> (Roster, DutySwitchId, AssignmentId) {
        let mut roster = Roster::new(Schedule::new("Kitchen"));
        let a = roster.member("A");
        let b = roster.member("B");
        let (cw10, _) = roster.store.get_or_create_cleaning_week(roster.schedule, 10);
        let week_10 = roster.store.insert_assignment(Assignment::new(a, &cw10));
        let (cw20, _) = roster.store.get_or_create_cleaning_week(roster.schedule, 20);
        let week_20 = roster.store.insert_assignment(Assignment::new(b, &cw20));

        let switch = Negotiator::new(day(0))
            .request_switch(&mut roster.store, week_10)
            .unwrap();
        (roster, switch.id, week_20)
    }

    #[test]
    fn test_waiting_for_proposal_respects_delay() {
        let (roster, switch, _) = roster_with_switch();
        assert!(waiting_for_proposal(&roster.store, day(2), 3).is_empty());
        assert_eq!(waiting_for_proposal(&roster.store, day(3), 3), vec![switch]);
    }

    #[test]
    fn test_proposal_then_execution() {
        let (mut roster, switch, week_20) = roster_with_switch();

        let mut n = Negotiator::new(day(3));
        let proposed = propose_next_destination(&mut n, &mut roster.store, switch).unwrap();
        assert_eq!(proposed, Some(week_20));
        assert!(waiting_for_proposal(&roster.store, day(3), 3).is_empty());

        assert!(elapsed_proposals(&roster.store, day(5), 3).is_empty());
        assert_eq!(elapsed_proposals(&roster.store, day(6), 3), vec![switch]);

        let mut n = Negotiator::new(day(6));
        let outcome = execute_proposal(&mut n, &mut roster.store, switch).unwrap();
        let AcceptOutcome::Executed(done) = outcome else {
            panic!("expected execution");
        };
        assert_eq!(done.status, SwitchStatus::Closed(Resolution::Executed));
    }

    #[test]
    fn test_nothing_to_propose() {
        let (mut roster, switch, week_20) = roster_with_switch();
        let mut n = Negotiator::new(day(3));
        n.set_selected(&mut roster.store, switch, week_20).unwrap();
        n.selected_was_rejected(&mut roster.store, switch).unwrap();

        let proposed = propose_next_destination(&mut n, &mut roster.store, switch).unwrap();
        assert_eq!(proposed, None);
    }
}
