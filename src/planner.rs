//! The roster facade.
//!
//! [`Planner`] owns the store behind a mutex and exposes every top-level
//! operation. Each operation runs inside one [`Store::transaction`];
//! notifications raised by an operation reach the outbox only when its
//! transaction commits.
//!
//! # Usage
//!
//! ```
//! use duty_roster::models::{Affiliation, Cleaner, FixedClock, Schedule, ScheduleGroup, WeekSpan};
//! use duty_roster::store::InMemoryStore;
//! use duty_roster::Planner;
//!
//! let planner = Planner::new(InMemoryStore::new(), FixedClock::at_week(2500));
//! let kitchen = planner.add_schedule(Schedule::new("Kitchen")).unwrap();
//! let floor = planner.add_group(ScheduleGroup::new("Ground floor").with_schedule(kitchen));
//! let anna = planner.add_cleaner(Cleaner::new("Anna")).unwrap();
//! planner.add_affiliation(Affiliation::open_ended(anna, floor, 2500)).unwrap();
//!
//! let reports = planner.generate_upcoming_assignments().unwrap();
//! assert_eq!(reports[0].created_count(), 7);
//! ```

use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::PlannerConfig;
use crate::error::{PlanError, Result};
use crate::models::{
    date_to_epoch_week, Affiliation, AffiliationId, AssignmentId, Cleaner, CleanerId,
    CleaningWeekId, Clock, DutySwitch, DutySwitchId, EpochWeek, GroupId, Schedule,
    ScheduleGroup, ScheduleId, StaffingShortfall, SystemClock, Task, TaskId, TaskTemplate,
    TaskTemplateId, WeekSpan,
};
use crate::notify::{upcoming_assignments, Notification};
use crate::scheduler::{
    self, invalidate_assignments, AffiliationChange, AssignmentGenerator, GenerationOutcome,
    GenerationReport, ScheduleKpi,
};
use crate::store::Store;
use crate::switching::{escalation, AcceptOutcome, Negotiator};
use crate::validation;

struct State<S> {
    store: S,
    outbox: Vec<Notification>,
}

/// Rostering engine over a store and a clock.
pub struct Planner<S: Store, C: Clock = SystemClock> {
    state: Mutex<State<S>>,
    clock: C,
    config: PlannerConfig,
    generator: AssignmentGenerator,
}

impl<S: Store, C: Clock> Planner<S, C> {
    /// Creates a planner with the default configuration.
    pub fn new(store: S, clock: C) -> Self {
        Self {
            state: Mutex::new(State {
                store,
                outbox: Vec::new(),
            }),
            clock,
            config: PlannerConfig::default(),
            generator: AssignmentGenerator::new(),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the assignment generator.
    pub fn with_generator(mut self, generator: AssignmentGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Today according to the clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Current epoch week according to the clock.
    pub fn current_week(&self) -> EpochWeek {
        date_to_epoch_week(self.today())
    }

    /// Runs a read-only query against the store.
    pub fn read<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        self.with_state(|state| f(&state.store))
    }

    /// Drains committed notifications.
    pub fn take_notifications(&self) -> Vec<Notification> {
        self.with_state(|state| std::mem::take(&mut state.outbox))
    }

    /// Consumes the planner, returning the store.
    pub fn into_store(self) -> S {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .store
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State<S>) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn transact<T>(&self, f: impl FnOnce(&mut S, &mut Negotiator) -> Result<T>) -> Result<T> {
        let mut negotiator = Negotiator::new(self.today());
        self.with_state(|state| {
            let result = state.store.transaction(|s| f(s, &mut negotiator));
            if result.is_ok() {
                state.outbox.extend(negotiator.take_notifications());
            }
            result
        })
    }

    // ---- cleaners ----

    /// Registers a cleaner.
    pub fn add_cleaner(&self, cleaner: Cleaner) -> Result<CleanerId> {
        self.transact(|store, _| {
            validation::validate_cleaner(&cleaner, &store.cleaners())?;
            let id = store.insert_cleaner(cleaner);
            info!(cleaner = %id, "cleaner added");
            Ok(id)
        })
    }

    /// Takes a cleaner out of every future allocation.
    ///
    /// Future weeks the cleaner is assigned to are invalidated so the next
    /// generation run replaces them.
    pub fn deactivate_cleaner(&self, cleaner: CleanerId) -> Result<()> {
        let current_week = self.current_week();
        self.transact(|store, _| {
            let record = store
                .cleaner(cleaner)
                .ok_or_else(|| PlanError::not_found("cleaner", cleaner))?;
            store.update_cleaner(record.deactivated());

            let future = WeekSpan::unbounded().after(current_week);
            for assignment in future
                .map(|span| store.assignments_of_cleaner(cleaner, span))
                .unwrap_or_default()
            {
                if let Some(mut cleaning_week) = store.cleaning_week(assignment.cleaning_week) {
                    cleaning_week.assignments_valid = false;
                    store.update_cleaning_week(cleaning_week);
                }
            }
            info!(cleaner = %cleaner, "cleaner deactivated");
            Ok(())
        })
    }

    /// The cleaner's affiliation in the current week.
    pub fn current_affiliation(&self, cleaner: CleanerId) -> Option<Affiliation> {
        let week = self.current_week();
        self.read(|store| {
            store
                .affiliations_of_cleaner(cleaner)
                .into_iter()
                .find(|a| a.is_active_in(week))
        })
    }

    // ---- schedules & groups ----

    /// Registers a schedule.
    pub fn add_schedule(&self, schedule: Schedule) -> Result<ScheduleId> {
        self.transact(|store, _| {
            validation::validate_schedule(&schedule)?;
            Ok(store.insert_schedule(schedule))
        })
    }

    /// Enables or disables a schedule. Disabled schedules are not generated.
    pub fn set_schedule_enabled(&self, schedule: ScheduleId, enabled: bool) -> Result<()> {
        self.transact(|store, _| {
            let mut record = store
                .schedule(schedule)
                .ok_or_else(|| PlanError::not_found("schedule", schedule))?;
            record.enabled = enabled;
            store.update_schedule(record);
            info!(schedule = %schedule, enabled, "schedule toggled");
            Ok(())
        })
    }

    /// Registers a schedule group.
    pub fn add_group(&self, group: ScheduleGroup) -> GroupId {
        self.with_state(|state| state.store.insert_group(group))
    }

    /// Adds a schedule to a group.
    pub fn attach_schedule(&self, group: GroupId, schedule: ScheduleId) -> Result<()> {
        self.transact(|store, _| {
            if store.schedule(schedule).is_none() {
                return Err(PlanError::not_found("schedule", schedule));
            }
            let mut record = store
                .group(group)
                .ok_or_else(|| PlanError::not_found("group", group))?;
            record.schedules.insert(schedule);
            store.update_group(record);
            Ok(())
        })
    }

    /// Registers a task template.
    pub fn add_task_template(&self, template: TaskTemplate) -> Result<TaskTemplateId> {
        self.transact(|store, _| {
            if store.schedule(template.schedule).is_none() {
                return Err(PlanError::not_found("schedule", template.schedule));
            }
            Ok(store.insert_task_template(template))
        })
    }

    // ---- affiliations ----

    /// Creates an affiliation and invalidates the future weeks it touches.
    pub fn add_affiliation(&self, affiliation: Affiliation) -> Result<AffiliationId> {
        let current_week = self.current_week();
        self.transact(|store, _| {
            ensure_affiliation_refs(store, &affiliation)?;
            validation::validate_affiliation(
                &affiliation,
                &store.affiliations_of_cleaner(affiliation.cleaner),
            )?;
            let mut affiliation = affiliation;
            affiliation.id = store.insert_affiliation(affiliation.clone());
            invalidate_assignments(store, &AffiliationChange::created(&affiliation), current_week);
            Ok(affiliation.id)
        })
    }

    /// Changes the interval of an affiliation.
    pub fn update_affiliation(&self, affiliation: Affiliation) -> Result<()> {
        let current_week = self.current_week();
        self.transact(|store, _| {
            let previous = store
                .affiliation(affiliation.id)
                .ok_or_else(|| PlanError::not_found("affiliation", affiliation.id))?;
            validation::validate_affiliation_update(
                &previous,
                &affiliation,
                &store.affiliations_of_cleaner(affiliation.cleaner),
            )?;
            store.update_affiliation(affiliation.clone());
            invalidate_assignments(
                store,
                &AffiliationChange::updated(&previous, &affiliation),
                current_week,
            );
            Ok(())
        })
    }

    /// Deletes an affiliation.
    pub fn delete_affiliation(&self, affiliation: AffiliationId) -> Result<Affiliation> {
        let current_week = self.current_week();
        self.transact(|store, _| {
            let removed = store
                .delete_affiliation(affiliation)
                .ok_or_else(|| PlanError::not_found("affiliation", affiliation))?;
            invalidate_assignments(store, &AffiliationChange::deleted(&removed), current_week);
            Ok(removed)
        })
    }

    /// Moves a cleaner to another group starting with `from_week`.
    ///
    /// The affiliation active in `from_week` ends the week before (or is
    /// removed if it starts in `from_week`) and an open-ended affiliation
    /// with the new group begins. Future weeks of both groups are
    /// invalidated.
    pub fn move_cleaner(
        &self,
        cleaner: CleanerId,
        group: GroupId,
        from_week: EpochWeek,
    ) -> Result<AffiliationId> {
        let current_week = self.current_week();
        self.transact(|store, _| {
            let mut next = Affiliation::open_ended(cleaner, group, from_week);
            ensure_affiliation_refs(store, &next)?;

            let previous = store
                .affiliations_of_cleaner(cleaner)
                .into_iter()
                .find(|a| a.is_active_in(from_week));
            if let Some(previous) = &previous {
                if previous.beginning == from_week {
                    store.delete_affiliation(previous.id);
                } else {
                    let mut ended = previous.clone();
                    ended.end = from_week - 1;
                    store.update_affiliation(ended);
                }
            }

            validation::validate_affiliation(&next, &store.affiliations_of_cleaner(cleaner))?;
            next.id = store.insert_affiliation(next.clone());

            let change = match &previous {
                Some(previous) => AffiliationChange::updated(previous, &next),
                None => AffiliationChange::created(&next),
            };
            invalidate_assignments(store, &change, current_week);
            info!(cleaner = %cleaner, group = %group, from_week, "cleaner moved");
            Ok(next.id)
        })
    }

    // ---- generation ----

    /// Fills the open slots of one occurrence.
    pub fn create_assignment(&self, schedule: ScheduleId, week: EpochWeek) -> Result<GenerationOutcome> {
        self.with_state(|state| self.generator.create_assignment(&mut state.store, schedule, week))
    }

    /// Fills every occurrence of the schedule in the span.
    pub fn create_assignments_over_timespan(
        &self,
        schedule: ScheduleId,
        span: WeekSpan,
    ) -> Result<GenerationReport> {
        self.with_state(|state| {
            self.generator
                .create_assignments_over_timespan(&mut state.store, schedule, span)
        })
    }

    /// Batch job: fills all enabled schedules from the current week to the
    /// generation horizon.
    pub fn generate_upcoming_assignments(&self) -> Result<Vec<GenerationReport>> {
        let first = self.current_week();
        let span = WeekSpan::new(
            first,
            first.saturating_add(i64::from(self.config.generation_horizon())),
        );
        let schedules = self.read(|store| store.schedules());

        let mut reports = Vec::new();
        for schedule in schedules.into_iter().filter(|s| s.enabled) {
            reports.push(self.create_assignments_over_timespan(schedule.id, span)?);
        }
        info!(
            schedules = reports.len(),
            created = reports.iter().map(GenerationReport::created_count).sum::<usize>(),
            first = span.first,
            last = span.last,
            "upcoming assignments generated"
        );
        Ok(reports)
    }

    /// Staffing problems within the warning window.
    ///
    /// Lists recorded shortfalls and occurrences that were never generated,
    /// from the current week to `warn_weeks_in_advance` weeks ahead.
    pub fn schedules_needing_attention(&self) -> Vec<StaffingShortfall> {
        let first = self.current_week();
        let window = WeekSpan::new(
            first,
            first.saturating_add(i64::from(self.config.warn_weeks_in_advance)),
        );
        self.read(|store| {
            let mut attention: Vec<StaffingShortfall> = store
                .shortfalls()
                .into_iter()
                .filter(|s| window.contains(s.week))
                .collect();
            for schedule in store.schedules().into_iter().filter(|s| s.enabled) {
                for week in window.weeks() {
                    if schedule.occurs_in_week(week)
                        && store.find_cleaning_week(schedule.id, week).is_none()
                    {
                        attention.push(StaffingShortfall {
                            schedule: schedule.id,
                            week,
                            missing: usize::from(schedule.slots),
                        });
                    }
                }
            }
            attention.sort_by_key(|s| (s.schedule, s.week));
            attention
        })
    }

    /// Staffing indicators of a schedule over the span.
    pub fn schedule_kpi(&self, schedule: ScheduleId, span: WeekSpan) -> Result<ScheduleKpi> {
        self.read(|store| ScheduleKpi::calculate(store, schedule, span))
    }

    // ---- tasks ----

    /// Marks a task as done by the cleaner today.
    pub fn mark_task_cleaned(&self, task: TaskId, cleaner: CleanerId) -> Result<Task> {
        let today = self.today();
        self.transact(|store, _| scheduler::mark_task_cleaned(store, task, cleaner, today))
    }

    /// Share of done tasks of a cleaning week.
    pub fn task_completion(&self, cleaning_week: CleaningWeekId) -> Option<f64> {
        self.read(|store| scheduler::completion_ratio(store, cleaning_week))
    }

    // ---- duty switches ----

    /// Opens a duty switch for a future assignment.
    pub fn request_switch(&self, assignment: AssignmentId) -> Result<DutySwitch> {
        self.transact(|store, n| n.request_switch(store, assignment))
    }

    /// Queues destinations found since the last scan.
    pub fn look_for_destinations(&self, switch: DutySwitchId) -> Result<Vec<AssignmentId>> {
        self.transact(|store, n| n.look_for_destinations(store, switch))
    }

    /// Offers a queued destination.
    pub fn set_selected(&self, switch: DutySwitchId, destination: AssignmentId) -> Result<DutySwitch> {
        self.transact(|store, n| n.set_selected(store, switch, destination))
    }

    /// Records that the offered cleaner declined.
    pub fn selected_was_rejected(&self, switch: DutySwitchId) -> Result<DutySwitch> {
        self.transact(|store, n| n.selected_was_rejected(store, switch))
    }

    /// Withdraws the current offer.
    pub fn selected_was_cancelled(&self, switch: DutySwitchId) -> Result<DutySwitch> {
        self.transact(|store, n| n.selected_was_cancelled(store, switch))
    }

    /// Withdraws the whole request.
    pub fn abandon(&self, switch: DutySwitchId) -> Result<DutySwitch> {
        self.transact(|store, n| n.abandon(store, switch))
    }

    /// Carries out the offered trade.
    ///
    /// Fails with [`PlanError::StaleProposal`] when the destination no
    /// longer qualifies; the rejection and the refreshed queue are kept.
    pub fn selected_was_accepted(&self, switch: DutySwitchId) -> Result<DutySwitch> {
        match self.transact(|store, n| n.selected_was_accepted(store, switch))? {
            AcceptOutcome::Executed(done) => Ok(done),
            AcceptOutcome::Stale {
                switch,
                destination,
            } => Err(PlanError::StaleProposal {
                switch,
                destination,
            }),
        }
    }

    /// Batch job: proposes the queue head of switches that waited
    /// `days_until_proposal` days.
    pub fn escalate_switch_proposals(&self) -> Result<Vec<(DutySwitchId, AssignmentId)>> {
        let today = self.today();
        let waiting = self.read(|store| {
            escalation::waiting_for_proposal(store, today, self.config.days_until_proposal)
        });

        let mut proposed = Vec::new();
        for switch in waiting {
            match self.transact(|store, n| escalation::propose_next_destination(n, store, switch)) {
                Ok(Some(destination)) => proposed.push((switch, destination)),
                Ok(None) => {}
                Err(err) if settled_earlier(&err) => {
                    warn!(switch = %switch, error = %err, "switch settled before its proposal");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(proposed)
    }

    /// Batch job: executes proposals unanswered for `days_until_execution`
    /// days. Stale proposals are rejected and skipped, as are switches an
    /// earlier execution of the same run already closed or deleted.
    pub fn execute_elapsed_proposals(&self) -> Result<Vec<DutySwitchId>> {
        let today = self.today();
        let elapsed = self.read(|store| {
            escalation::elapsed_proposals(store, today, self.config.days_until_execution)
        });

        let mut executed = Vec::new();
        for switch in elapsed {
            match self.transact(|store, n| escalation::execute_proposal(n, store, switch)) {
                Ok(AcceptOutcome::Executed(_)) => executed.push(switch),
                Ok(AcceptOutcome::Stale { destination, .. }) => {
                    warn!(switch = %switch, destination = %destination, "elapsed proposal was stale");
                }
                Err(err) if settled_earlier(&err) => {
                    warn!(switch = %switch, error = %err, "elapsed proposal settled by an earlier switch");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(executed)
    }

    /// Batch job: queues reminders for assignments due in `reminder_days`
    /// days. Returns the number of reminders queued.
    pub fn upcoming_assignment_reminders(&self) -> usize {
        let today = self.today();
        let days = self.config.reminder_days;
        self.with_state(|state| {
            let reminders = upcoming_assignments(&state.store, today, days);
            let count = reminders.len();
            state.outbox.extend(reminders);
            count
        })
    }
}

/// Whether a batch item failed because an earlier item of the same run
/// already closed or deleted its switch.
fn settled_earlier(err: &PlanError) -> bool {
    matches!(
        err,
        PlanError::AlreadyResolved(_) | PlanError::NotFound { entity: "duty switch", .. }
    )
}

fn ensure_affiliation_refs<S: Store>(store: &S, affiliation: &Affiliation) -> Result<()> {
    if store.cleaner(affiliation.cleaner).is_none() {
        return Err(PlanError::not_found("cleaner", affiliation.cleaner));
    }
    if store.group(affiliation.group).is_none() {
        return Err(PlanError::not_found("group", affiliation.group));
    }
    Ok(())
}
