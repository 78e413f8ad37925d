//! Persistence contract.
//!
//! The roster logic talks to its storage exclusively through [`Store`]:
//! plain CRUD per record type, get-or-create for cleaning weeks, range
//! queries by epoch week, and [`Store::transaction`] for multi-record
//! writes. Reads return owned records so implementations backed by a
//! relational database fit the same shape.
//!
//! [`InMemoryStore`] is the bundled implementation.

mod memory;

pub use memory::InMemoryStore;

use std::collections::BTreeSet;

use crate::models::{
    Affiliation, AffiliationId, Assignment, AssignmentId, Cleaner, CleanerId, CleaningWeek,
    CleaningWeekId, DutySwitch, DutySwitchId, EpochWeek, GroupId, Schedule, ScheduleGroup,
    ScheduleId, StaffingShortfall, Task, TaskId, TaskTemplate, TaskTemplateId, WeekSpan,
};

/// Storage backend for the roster.
///
/// `insert_*` assigns and returns a fresh id, ignoring the id of the passed
/// record. `update_*` returns `false` when the record does not exist.
pub trait Store {
    /// Runs `f` atomically: on `Err` every write made by `f` is undone.
    fn transaction<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>;

    // ---- cleaners ----

    /// Stores a new cleaner.
    fn insert_cleaner(&mut self, cleaner: Cleaner) -> CleanerId;
    /// The cleaner with the id, if any.
    fn cleaner(&self, id: CleanerId) -> Option<Cleaner>;
    /// Replaces the stored cleaner with the same id.
    fn update_cleaner(&mut self, cleaner: Cleaner) -> bool;
    /// All cleaners, ordered by id.
    fn cleaners(&self) -> Vec<Cleaner>;

    // ---- groups & schedules ----

    /// Stores a new schedule group.
    fn insert_group(&mut self, group: ScheduleGroup) -> GroupId;
    /// The group with the id, if any.
    fn group(&self, id: GroupId) -> Option<ScheduleGroup>;
    /// Replaces the stored group with the same id.
    fn update_group(&mut self, group: ScheduleGroup) -> bool;
    /// Groups containing the schedule.
    fn groups_of_schedule(&self, schedule: ScheduleId) -> BTreeSet<GroupId>;

    /// Stores a new schedule.
    fn insert_schedule(&mut self, schedule: Schedule) -> ScheduleId;
    /// The schedule with the id, if any.
    fn schedule(&self, id: ScheduleId) -> Option<Schedule>;
    /// Replaces the stored schedule with the same id.
    fn update_schedule(&mut self, schedule: Schedule) -> bool;
    /// All schedules, ordered by id.
    fn schedules(&self) -> Vec<Schedule>;

    // ---- affiliations ----

    /// Stores a new affiliation without checking for overlaps.
    fn insert_affiliation(&mut self, affiliation: Affiliation) -> AffiliationId;
    /// The affiliation with the id, if any.
    fn affiliation(&self, id: AffiliationId) -> Option<Affiliation>;
    /// Replaces the stored affiliation with the same id.
    fn update_affiliation(&mut self, affiliation: Affiliation) -> bool;
    /// Removes the affiliation and returns it.
    fn delete_affiliation(&mut self, id: AffiliationId) -> Option<Affiliation>;
    /// Affiliations of the cleaner, ordered by beginning.
    fn affiliations_of_cleaner(&self, cleaner: CleanerId) -> Vec<Affiliation>;
    /// Affiliations with any of the groups, ordered by beginning.
    fn affiliations_in_groups(&self, groups: &BTreeSet<GroupId>) -> Vec<Affiliation>;

    // ---- cleaning weeks ----

    /// The cleaning week with the id, if any.
    fn cleaning_week(&self, id: CleaningWeekId) -> Option<CleaningWeek>;
    /// The cleaning week of (schedule, week), if materialized.
    fn find_cleaning_week(&self, schedule: ScheduleId, week: EpochWeek) -> Option<CleaningWeek>;
    /// Returns the cleaning week of (schedule, week), creating it if absent.
    /// The flag tells whether it was created by this call.
    fn get_or_create_cleaning_week(
        &mut self,
        schedule: ScheduleId,
        week: EpochWeek,
    ) -> (CleaningWeek, bool);
    /// Replaces the stored cleaning week with the same id.
    fn update_cleaning_week(&mut self, cleaning_week: CleaningWeek) -> bool;
    /// Deletes the cleaning week with its assignments and tasks.
    fn delete_cleaning_week(&mut self, id: CleaningWeekId) -> Option<CleaningWeek>;
    /// Cleaning weeks of the schedule within the span, ordered by week.
    fn cleaning_weeks_in_span(&self, schedule: ScheduleId, span: WeekSpan) -> Vec<CleaningWeek>;

    // ---- assignments ----

    /// Stores a new assignment.
    fn insert_assignment(&mut self, assignment: Assignment) -> AssignmentId;
    /// The assignment with the id, if any.
    fn assignment(&self, id: AssignmentId) -> Option<Assignment>;
    /// Replaces the stored assignment with the same id.
    fn update_assignment(&mut self, assignment: Assignment) -> bool;
    /// Removes the assignment and returns it.
    fn delete_assignment(&mut self, id: AssignmentId) -> Option<Assignment>;
    /// Assignments of one cleaning week, ordered by id.
    fn assignments_of_cleaning_week(&self, cleaning_week: CleaningWeekId) -> Vec<Assignment>;
    /// Assignments of the schedule within the span, ordered by (week, id).
    fn assignments_in_span(&self, schedule: ScheduleId, span: WeekSpan) -> Vec<Assignment>;
    /// Assignments of the cleaner (any schedule) within the span.
    fn assignments_of_cleaner(&self, cleaner: CleanerId, span: WeekSpan) -> Vec<Assignment>;

    // ---- tasks ----

    /// Stores a new task template.
    fn insert_task_template(&mut self, template: TaskTemplate) -> TaskTemplateId;
    /// The task template with the id, if any.
    fn task_template(&self, id: TaskTemplateId) -> Option<TaskTemplate>;
    /// Task templates of the schedule, ordered by id.
    fn task_templates(&self, schedule: ScheduleId) -> Vec<TaskTemplate>;
    /// Stores a new task.
    fn insert_task(&mut self, task: Task) -> TaskId;
    /// The task with the id, if any.
    fn task(&self, id: TaskId) -> Option<Task>;
    /// Replaces the stored task with the same id.
    fn update_task(&mut self, task: Task) -> bool;
    /// Tasks of one cleaning week, ordered by id.
    fn tasks_of_cleaning_week(&self, cleaning_week: CleaningWeekId) -> Vec<Task>;

    // ---- duty switches ----

    /// Stores a new duty switch.
    fn insert_duty_switch(&mut self, switch: DutySwitch) -> DutySwitchId;
    /// The duty switch with the id, if any.
    fn duty_switch(&self, id: DutySwitchId) -> Option<DutySwitch>;
    /// Replaces the stored duty switch with the same id.
    fn update_duty_switch(&mut self, switch: DutySwitch) -> bool;
    /// Removes the switch and returns it.
    fn delete_duty_switch(&mut self, id: DutySwitchId) -> Option<DutySwitch>;
    /// All duty switches, open and closed, ordered by id.
    fn duty_switches(&self) -> Vec<DutySwitch>;

    // ---- staffing shortfalls ----

    /// Records (or replaces) the shortfall of (schedule, week).
    fn record_shortfall(&mut self, shortfall: StaffingShortfall);
    /// Removes the shortfall of (schedule, week); `false` if none was recorded.
    fn clear_shortfall(&mut self, schedule: ScheduleId, week: EpochWeek) -> bool;
    /// All shortfalls, ordered by (schedule, week).
    fn shortfalls(&self) -> Vec<StaffingShortfall>;
}
