//! Duty switch negotiation.
//!
//! A cleaner who cannot make an assignment asks to trade it. The negotiator
//! queues every future assignment of the same schedule the two cleaners
//! could exchange, offers them one at a time, and carries out the trade
//! when an offer is accepted.
//!
//! # Qualifying destinations
//!
//! A destination qualifies for a requester assignment when it
//! - belongs to the same schedule and lies in a future week,
//! - belongs to another cleaning week and another cleaner,
//! - leaves both cleaners free on the due date they take over,
//! - does not put either cleaner into a week they are excluded from.
//!
//! The negotiator does not open transactions; callers wrap each operation
//! in [`Store::transaction`] and publish [`Negotiator::take_notifications`]
//! only after a commit.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{PlanError, Result};
use crate::models::{
    date_to_epoch_week, Assignment, AssignmentId, CleanerId, DutySwitch, DutySwitchId,
    EpochWeek, Resolution, SwitchStatus, WeekSpan,
};
use crate::notify::Notification;
use crate::store::Store;

/// Result of accepting a proposal.
#[derive(Debug, Clone, PartialEq)]
pub enum AcceptOutcome {
    /// The assignments were swapped.
    Executed(DutySwitch),
    /// The selected destination no longer qualified; it was rejected and
    /// the queue refreshed.
    Stale {
        switch: DutySwitchId,
        destination: AssignmentId,
    },
}

/// Drives duty switches through their states.
#[derive(Debug, Clone)]
pub struct Negotiator {
    today: NaiveDate,
    current_week: EpochWeek,
    notifications: Vec<Notification>,
}

impl Negotiator {
    /// Creates a negotiator acting on the given day.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            current_week: date_to_epoch_week(today),
            notifications: Vec::new(),
        }
    }

    /// Day the negotiator acts on.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Drains the notifications produced so far.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Opens a switch for a future assignment and queues its destinations.
    ///
    /// Requesting a switch for an assignment that already has a live one
    /// returns the existing switch.
    pub fn request_switch<S: Store>(
        &mut self,
        store: &mut S,
        requester: AssignmentId,
    ) -> Result<DutySwitch> {
        let assignment = store
            .assignment(requester)
            .ok_or_else(|| PlanError::not_found("assignment", requester))?;
        if assignment.week <= self.current_week {
            return Err(PlanError::PastAssignment {
                assignment: requester,
                week: assignment.week,
            });
        }

        if let Some(existing) = store
            .duty_switches()
            .into_iter()
            .find(|s| s.requester == requester && s.is_live())
        {
            return Ok(existing);
        }

        let id = store.insert_duty_switch(DutySwitch::new(requester, self.today));
        info!(switch = %id, assignment = %requester, cleaner = %assignment.cleaner, "duty switch requested");

        self.look_for_destinations(store, id)?;
        load_switch(store, id)
    }

    /// Queues every qualifying destination not seen before.
    ///
    /// Returns the destinations appended by this call, in (week, id) order.
    pub fn look_for_destinations<S: Store>(
        &mut self,
        store: &mut S,
        switch: DutySwitchId,
    ) -> Result<Vec<AssignmentId>> {
        let mut duty_switch = live_switch(store, switch)?;
        let requester = load_assignment(store, duty_switch.requester)?;

        let Some(future) = WeekSpan::unbounded().after(self.current_week) else {
            return Ok(Vec::new());
        };

        let mut appended = Vec::new();
        for destination in store.assignments_in_span(requester.schedule, future) {
            if duty_switch.is_queued(destination.id)
                || duty_switch.rejected.contains(&destination.id)
                || !self.qualifies(store, &requester, &destination)
            {
                continue;
            }
            duty_switch.destinations.push_back(destination.id);
            appended.push(destination.id);
            self.notifications.push(Notification::DestinationAvailable {
                switch,
                destination: destination.id,
            });
        }

        if !appended.is_empty() {
            debug!(switch = %switch, count = appended.len(), "destinations queued");
            store.update_duty_switch(duty_switch);
        }
        Ok(appended)
    }

    /// Offers a queued destination: `Open` → `Pending`.
    pub fn set_selected<S: Store>(
        &mut self,
        store: &mut S,
        switch: DutySwitchId,
        destination: AssignmentId,
    ) -> Result<DutySwitch> {
        let mut duty_switch = live_switch(store, switch)?;
        expect_status(&duty_switch, SwitchStatus::Open, "select a destination")?;
        if !duty_switch.is_queued(destination) {
            return Err(PlanError::UnknownDestination {
                switch,
                destination,
            });
        }

        duty_switch.selected = Some(destination);
        duty_switch.selected_at = Some(self.today);
        duty_switch.status = SwitchStatus::Pending;
        store.update_duty_switch(duty_switch.clone());
        info!(switch = %switch, destination = %destination, "destination proposed");
        Ok(duty_switch)
    }

    /// The offered cleaner declined: `Pending` → `Open`.
    ///
    /// The destination leaves the queue for good.
    pub fn selected_was_rejected<S: Store>(
        &mut self,
        store: &mut S,
        switch: DutySwitchId,
    ) -> Result<DutySwitch> {
        let mut duty_switch = live_switch(store, switch)?;
        let destination = selected_destination(&duty_switch, "reject the proposal")?;

        duty_switch.dequeue(destination);
        duty_switch.rejected.insert(destination);
        store.update_duty_switch(duty_switch.clone());
        info!(switch = %switch, destination = %destination, "proposal rejected");
        Ok(duty_switch)
    }

    /// The requester withdrew the current offer: `Pending` → `Open`.
    ///
    /// The destination stays queued and may be offered again. An `Open`
    /// switch has no offer to withdraw and is returned unchanged.
    pub fn selected_was_cancelled<S: Store>(
        &mut self,
        store: &mut S,
        switch: DutySwitchId,
    ) -> Result<DutySwitch> {
        let mut duty_switch = live_switch(store, switch)?;
        if duty_switch.status == SwitchStatus::Open {
            return Ok(duty_switch);
        }
        let destination = selected_destination(&duty_switch, "cancel the proposal")?;

        duty_switch.clear_selection();
        store.update_duty_switch(duty_switch.clone());
        info!(switch = %switch, destination = %destination, "proposal cancelled");
        Ok(duty_switch)
    }

    /// The requester withdrew the whole request.
    pub fn abandon<S: Store>(&mut self, store: &mut S, switch: DutySwitchId) -> Result<DutySwitch> {
        let mut duty_switch = live_switch(store, switch)?;
        duty_switch.clear_selection();
        duty_switch.status = SwitchStatus::Closed(Resolution::Abandoned);
        store.update_duty_switch(duty_switch.clone());
        info!(switch = %switch, "duty switch abandoned");
        Ok(duty_switch)
    }

    /// The offered cleaner agreed: swap the assignments.
    ///
    /// Besides the swap, the original requester is excluded from the week
    /// they left, switches offering either assignment are closed as
    /// rejected, switches requested for either assignment are deleted, and
    /// both assignments leave every other queue.
    ///
    /// A destination that stopped qualifying is rejected instead and
    /// [`AcceptOutcome::Stale`] is returned; nothing is swapped.
    pub fn selected_was_accepted<S: Store>(
        &mut self,
        store: &mut S,
        switch: DutySwitchId,
    ) -> Result<AcceptOutcome> {
        let mut duty_switch = live_switch(store, switch)?;
        let destination_id = selected_destination(&duty_switch, "accept the proposal")?;
        let mut requester = load_assignment(store, duty_switch.requester)?;

        let destination = store
            .assignment(destination_id)
            .filter(|d| self.qualifies(store, &requester, d));
        let Some(mut destination) = destination else {
            duty_switch.dequeue(destination_id);
            duty_switch.rejected.insert(destination_id);
            store.update_duty_switch(duty_switch);
            warn!(switch = %switch, destination = %destination_id, "proposal is stale, rejected");
            self.look_for_destinations(store, switch)?;
            return Ok(AcceptOutcome::Stale {
                switch,
                destination: destination_id,
            });
        };

        let mut left_week = store
            .cleaning_week(requester.cleaning_week)
            .ok_or_else(|| PlanError::not_found("cleaning week", requester.cleaning_week))?;

        let leaving = requester.cleaner;
        requester.cleaner = destination.cleaner;
        destination.cleaner = leaving;
        store.update_assignment(requester.clone());
        store.update_assignment(destination.clone());

        left_week.exclude(leaving);
        store.update_cleaning_week(left_week);

        duty_switch.status = SwitchStatus::Closed(Resolution::Executed);
        store.update_duty_switch(duty_switch.clone());

        self.settle_others(store, switch, [requester.id, destination.id]);

        info!(
            switch = %switch,
            requester = %requester.id,
            destination = %destination.id,
            week_from = requester.week,
            week_to = destination.week,
            "duty switch executed"
        );
        self.notifications.push(Notification::SwitchAccepted {
            switch,
            requester: requester.id,
            destination: destination.id,
        });
        Ok(AcceptOutcome::Executed(duty_switch))
    }

    fn settle_others<S: Store>(&self, store: &mut S, executed: DutySwitchId, traded: [AssignmentId; 2]) {
        for mut other in store.duty_switches() {
            if other.id == executed {
                continue;
            }
            if traded.contains(&other.requester) {
                store.delete_duty_switch(other.id);
                debug!(switch = %other.id, "duty switch dropped: requester assignment traded");
                continue;
            }
            if !other.is_live() {
                continue;
            }

            let offered_traded = traded.iter().any(|&a| other.has_selected(a));
            let mut changed = false;
            for assignment in traded {
                changed |= other.dequeue(assignment);
            }
            if offered_traded {
                other.status = SwitchStatus::Closed(Resolution::Rejected);
                debug!(switch = %other.id, "duty switch closed: offered assignment traded");
            }
            if changed || offered_traded {
                store.update_duty_switch(other);
            }
        }
    }

    /// Whether `destination` can be traded for `requester` today.
    pub fn qualifies<S: Store>(&self, store: &S, requester: &Assignment, destination: &Assignment) -> bool {
        if destination.id == requester.id
            || destination.schedule != requester.schedule
            || destination.cleaning_week == requester.cleaning_week
            || destination.cleaner == requester.cleaner
            || destination.week <= self.current_week
            || requester.week <= self.current_week
        {
            return false;
        }

        let (Some(requester_week), Some(destination_week)) = (
            store.cleaning_week(requester.cleaning_week),
            store.cleaning_week(destination.cleaning_week),
        ) else {
            return false;
        };
        if destination_week.is_excluded(requester.cleaner)
            || requester_week.is_excluded(destination.cleaner)
        {
            return false;
        }

        let (Some(requester_due), Some(destination_due)) =
            (due_date_of(store, requester), due_date_of(store, destination))
        else {
            return false;
        };
        is_free_on(store, destination.cleaner, requester_due, destination.id)
            && is_free_on(store, requester.cleaner, destination_due, requester.id)
    }
}

/// Deletes an assignment and every trace of it in duty switches.
///
/// Switches requested for the assignment are deleted; other switches drop
/// it from their queue, returning to `Open` if it was on offer.
pub(crate) fn retire_assignment<S: Store>(store: &mut S, assignment: AssignmentId) -> Option<Assignment> {
    for mut duty_switch in store.duty_switches() {
        if duty_switch.requester == assignment {
            store.delete_duty_switch(duty_switch.id);
        } else if duty_switch.is_live() && duty_switch.dequeue(assignment) {
            store.update_duty_switch(duty_switch);
        }
    }
    store.delete_assignment(assignment)
}

fn due_date_of<S: Store>(store: &S, assignment: &Assignment) -> Option<NaiveDate> {
    store
        .schedule(assignment.schedule)
        .map(|s| s.due_date(assignment.week))
}

fn is_free_on<S: Store>(store: &S, cleaner: CleanerId, date: NaiveDate, ignoring: AssignmentId) -> bool {
    !store
        .assignments_of_cleaner(cleaner, WeekSpan::single(date_to_epoch_week(date)))
        .iter()
        .filter(|a| a.id != ignoring)
        .any(|a| due_date_of(store, a) == Some(date))
}

fn load_assignment<S: Store>(store: &S, id: AssignmentId) -> Result<Assignment> {
    store
        .assignment(id)
        .ok_or_else(|| PlanError::not_found("assignment", id))
}

fn load_switch<S: Store>(store: &S, id: DutySwitchId) -> Result<DutySwitch> {
    store
        .duty_switch(id)
        .ok_or_else(|| PlanError::not_found("duty switch", id))
}

fn live_switch<S: Store>(store: &S, id: DutySwitchId) -> Result<DutySwitch> {
    let duty_switch = load_switch(store, id)?;
    if duty_switch.is_live() {
        Ok(duty_switch)
    } else {
        Err(PlanError::AlreadyResolved(id))
    }
}

fn expect_status(duty_switch: &DutySwitch, expected: SwitchStatus, action: &'static str) -> Result<()> {
    if duty_switch.status == expected {
        Ok(())
    } else {
        Err(PlanError::InvalidTransition {
            switch: duty_switch.id,
            status: duty_switch.status,
            action,
        })
    }
}

fn selected_destination(duty_switch: &DutySwitch, action: &'static str) -> Result<AssignmentId> {
    expect_status(duty_switch, SwitchStatus::Pending, action)?;
    duty_switch.selected.ok_or(PlanError::InvalidTransition {
        switch: duty_switch.id,
        status: duty_switch.status,
        action,
    })
}
