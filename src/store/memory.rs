//! In-memory [`Store`] implementation.
//!
//! Records live in ordered maps keyed by id. A secondary index on
//! (schedule, week) keeps cleaning weeks unique, which is what serializes
//! concurrent generation of the same occurrence.
//!
//! # Transactions
//! `transaction` snapshots the whole store and restores it when the closure
//! fails. Cost is proportional to the store size, which is fine for the
//! record counts a roster deals with.

use std::collections::{BTreeMap, BTreeSet};

use super::Store;
use crate::models::{
    Affiliation, AffiliationId, Assignment, AssignmentId, Cleaner, CleanerId, CleaningWeek,
    CleaningWeekId, DutySwitch, DutySwitchId, EpochWeek, GroupId, Schedule, ScheduleGroup,
    ScheduleId, StaffingShortfall, Task, TaskId, TaskTemplate, TaskTemplateId, WeekSpan,
};

/// A [`Store`] kept entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    next_id: u64,
    cleaners: BTreeMap<CleanerId, Cleaner>,
    groups: BTreeMap<GroupId, ScheduleGroup>,
    schedules: BTreeMap<ScheduleId, Schedule>,
    affiliations: BTreeMap<AffiliationId, Affiliation>,
    cleaning_weeks: BTreeMap<CleaningWeekId, CleaningWeek>,
    cleaning_week_index: BTreeMap<(ScheduleId, EpochWeek), CleaningWeekId>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    task_templates: BTreeMap<TaskTemplateId, TaskTemplate>,
    tasks: BTreeMap<TaskId, Task>,
    duty_switches: BTreeMap<DutySwitchId, DutySwitch>,
    shortfalls: BTreeMap<(ScheduleId, EpochWeek), StaffingShortfall>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

fn replace<K: Ord, V>(map: &mut BTreeMap<K, V>, key: K, value: V) -> bool {
    match map.get_mut(&key) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

impl Store for InMemoryStore {
    fn transaction<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    fn insert_cleaner(&mut self, mut cleaner: Cleaner) -> CleanerId {
        let id = CleanerId(self.allocate_id());
        cleaner.id = id;
        self.cleaners.insert(id, cleaner);
        id
    }

    fn cleaner(&self, id: CleanerId) -> Option<Cleaner> {
        self.cleaners.get(&id).cloned()
    }

    fn update_cleaner(&mut self, cleaner: Cleaner) -> bool {
        replace(&mut self.cleaners, cleaner.id, cleaner)
    }

    fn cleaners(&self) -> Vec<Cleaner> {
        self.cleaners.values().cloned().collect()
    }

    fn insert_group(&mut self, mut group: ScheduleGroup) -> GroupId {
        let id = GroupId(self.allocate_id());
        group.id = id;
        self.groups.insert(id, group);
        id
    }

    fn group(&self, id: GroupId) -> Option<ScheduleGroup> {
        self.groups.get(&id).cloned()
    }

    fn update_group(&mut self, group: ScheduleGroup) -> bool {
        replace(&mut self.groups, group.id, group)
    }

    fn groups_of_schedule(&self, schedule: ScheduleId) -> BTreeSet<GroupId> {
        self.groups
            .values()
            .filter(|g| g.contains(schedule))
            .map(|g| g.id)
            .collect()
    }

    fn insert_schedule(&mut self, mut schedule: Schedule) -> ScheduleId {
        let id = ScheduleId(self.allocate_id());
        schedule.id = id;
        self.schedules.insert(id, schedule);
        id
    }

    fn schedule(&self, id: ScheduleId) -> Option<Schedule> {
        self.schedules.get(&id).cloned()
    }

    fn update_schedule(&mut self, schedule: Schedule) -> bool {
        replace(&mut self.schedules, schedule.id, schedule)
    }

    fn schedules(&self) -> Vec<Schedule> {
        self.schedules.values().cloned().collect()
    }

    fn insert_affiliation(&mut self, mut affiliation: Affiliation) -> AffiliationId {
        let id = AffiliationId(self.allocate_id());
        affiliation.id = id;
        self.affiliations.insert(id, affiliation);
        id
    }

    fn affiliation(&self, id: AffiliationId) -> Option<Affiliation> {
        self.affiliations.get(&id).cloned()
    }

    fn update_affiliation(&mut self, affiliation: Affiliation) -> bool {
        replace(&mut self.affiliations, affiliation.id, affiliation)
    }

    fn delete_affiliation(&mut self, id: AffiliationId) -> Option<Affiliation> {
        self.affiliations.remove(&id)
    }

    fn affiliations_of_cleaner(&self, cleaner: CleanerId) -> Vec<Affiliation> {
        let mut found: Vec<Affiliation> = self
            .affiliations
            .values()
            .filter(|a| a.cleaner == cleaner)
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.beginning, a.id));
        found
    }

    fn affiliations_in_groups(&self, groups: &BTreeSet<GroupId>) -> Vec<Affiliation> {
        let mut found: Vec<Affiliation> = self
            .affiliations
            .values()
            .filter(|a| groups.contains(&a.group))
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.beginning, a.id));
        found
    }

    fn cleaning_week(&self, id: CleaningWeekId) -> Option<CleaningWeek> {
        self.cleaning_weeks.get(&id).cloned()
    }

    fn find_cleaning_week(&self, schedule: ScheduleId, week: EpochWeek) -> Option<CleaningWeek> {
        self.cleaning_week_index
            .get(&(schedule, week))
            .and_then(|id| self.cleaning_weeks.get(id))
            .cloned()
    }

    fn get_or_create_cleaning_week(
        &mut self,
        schedule: ScheduleId,
        week: EpochWeek,
    ) -> (CleaningWeek, bool) {
        if let Some(existing) = self.find_cleaning_week(schedule, week) {
            return (existing, false);
        }
        let mut cleaning_week = CleaningWeek::new(schedule, week);
        cleaning_week.id = CleaningWeekId(self.allocate_id());
        self.cleaning_week_index
            .insert((schedule, week), cleaning_week.id);
        self.cleaning_weeks
            .insert(cleaning_week.id, cleaning_week.clone());
        (cleaning_week, true)
    }

    fn update_cleaning_week(&mut self, cleaning_week: CleaningWeek) -> bool {
        replace(&mut self.cleaning_weeks, cleaning_week.id, cleaning_week)
    }

    fn delete_cleaning_week(&mut self, id: CleaningWeekId) -> Option<CleaningWeek> {
        let removed = self.cleaning_weeks.remove(&id)?;
        self.cleaning_week_index
            .remove(&(removed.schedule, removed.week));
        self.assignments.retain(|_, a| a.cleaning_week != id);
        self.tasks.retain(|_, t| t.cleaning_week != id);
        Some(removed)
    }

    fn cleaning_weeks_in_span(&self, schedule: ScheduleId, span: WeekSpan) -> Vec<CleaningWeek> {
        if span.is_empty() {
            return Vec::new();
        }
        self.cleaning_week_index
            .range((schedule, span.first)..=(schedule, span.last))
            .filter_map(|(_, id)| self.cleaning_weeks.get(id))
            .cloned()
            .collect()
    }

    fn insert_assignment(&mut self, mut assignment: Assignment) -> AssignmentId {
        let id = AssignmentId(self.allocate_id());
        assignment.id = id;
        self.assignments.insert(id, assignment);
        id
    }

    fn assignment(&self, id: AssignmentId) -> Option<Assignment> {
        self.assignments.get(&id).cloned()
    }

    fn update_assignment(&mut self, assignment: Assignment) -> bool {
        replace(&mut self.assignments, assignment.id, assignment)
    }

    fn delete_assignment(&mut self, id: AssignmentId) -> Option<Assignment> {
        self.assignments.remove(&id)
    }

    fn assignments_of_cleaning_week(&self, cleaning_week: CleaningWeekId) -> Vec<Assignment> {
        self.assignments
            .values()
            .filter(|a| a.cleaning_week == cleaning_week)
            .cloned()
            .collect()
    }

    fn assignments_in_span(&self, schedule: ScheduleId, span: WeekSpan) -> Vec<Assignment> {
        let mut found: Vec<Assignment> = self
            .assignments
            .values()
            .filter(|a| a.schedule == schedule && span.contains(a.week))
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.week, a.id));
        found
    }

    fn assignments_of_cleaner(&self, cleaner: CleanerId, span: WeekSpan) -> Vec<Assignment> {
        let mut found: Vec<Assignment> = self
            .assignments
            .values()
            .filter(|a| a.cleaner == cleaner && span.contains(a.week))
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.week, a.id));
        found
    }

    fn insert_task_template(&mut self, mut template: TaskTemplate) -> TaskTemplateId {
        let id = TaskTemplateId(self.allocate_id());
        template.id = id;
        self.task_templates.insert(id, template);
        id
    }

    fn task_template(&self, id: TaskTemplateId) -> Option<TaskTemplate> {
        self.task_templates.get(&id).cloned()
    }

    fn task_templates(&self, schedule: ScheduleId) -> Vec<TaskTemplate> {
        self.task_templates
            .values()
            .filter(|t| t.schedule == schedule)
            .cloned()
            .collect()
    }

    fn insert_task(&mut self, mut task: Task) -> TaskId {
        let id = TaskId(self.allocate_id());
        task.id = id;
        self.tasks.insert(id, task);
        id
    }

    fn task(&self, id: TaskId) -> Option<Task> {
        self.tasks.get(&id).cloned()
    }

    fn update_task(&mut self, task: Task) -> bool {
        replace(&mut self.tasks, task.id, task)
    }

    fn tasks_of_cleaning_week(&self, cleaning_week: CleaningWeekId) -> Vec<Task> {
        self.tasks
            .values()
            .filter(|t| t.cleaning_week == cleaning_week)
            .cloned()
            .collect()
    }

    fn insert_duty_switch(&mut self, mut switch: DutySwitch) -> DutySwitchId {
        let id = DutySwitchId(self.allocate_id());
        switch.id = id;
        self.duty_switches.insert(id, switch);
        id
    }

    fn duty_switch(&self, id: DutySwitchId) -> Option<DutySwitch> {
        self.duty_switches.get(&id).cloned()
    }

    fn update_duty_switch(&mut self, switch: DutySwitch) -> bool {
        replace(&mut self.duty_switches, switch.id, switch)
    }

    fn delete_duty_switch(&mut self, id: DutySwitchId) -> Option<DutySwitch> {
        self.duty_switches.remove(&id)
    }

    fn duty_switches(&self) -> Vec<DutySwitch> {
        self.duty_switches.values().cloned().collect()
    }

    fn record_shortfall(&mut self, shortfall: StaffingShortfall) {
        self.shortfalls
            .insert((shortfall.schedule, shortfall.week), shortfall);
    }

    fn clear_shortfall(&mut self, schedule: ScheduleId, week: EpochWeek) -> bool {
        self.shortfalls.remove(&(schedule, week)).is_some()
    }

    fn shortfalls(&self) -> Vec<StaffingShortfall> {
        self.shortfalls.values().cloned().collect()
    }
}
