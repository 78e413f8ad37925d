//! Cleaning week checklists.

use chrono::NaiveDate;
use tracing::info;

use crate::error::{PlanError, Result};
use crate::models::{CleanerId, CleaningWeek, CleaningWeekId, Task, TaskId};
use crate::store::Store;

/// Creates a task for every enabled template of the week's schedule that
/// has none yet. Returns the created tasks.
pub fn create_missing_tasks<S: Store>(store: &mut S, cleaning_week: &CleaningWeek) -> Vec<TaskId> {
    let existing: Vec<Task> = store.tasks_of_cleaning_week(cleaning_week.id);
    store
        .task_templates(cleaning_week.schedule)
        .into_iter()
        .filter(|t| t.enabled && !existing.iter().any(|task| task.template == t.id))
        .map(|t| store.insert_task(Task::new(cleaning_week.id, t.id)))
        .collect()
}

/// Marks a task as done by `cleaner` on `today`.
///
/// Only a cleaner assigned to the task's week may do so, and only inside
/// the template's activity window around the due date.
pub fn mark_task_cleaned<S: Store>(
    store: &mut S,
    task: TaskId,
    cleaner: CleanerId,
    today: NaiveDate,
) -> Result<Task> {
    let mut record = store
        .task(task)
        .ok_or_else(|| PlanError::not_found("task", task))?;
    let cleaning_week = store
        .cleaning_week(record.cleaning_week)
        .ok_or_else(|| PlanError::not_found("cleaning week", record.cleaning_week))?;
    let template = store
        .task_template(record.template)
        .ok_or_else(|| PlanError::not_found("task template", record.template))?;
    let schedule = store
        .schedule(cleaning_week.schedule)
        .ok_or_else(|| PlanError::not_found("schedule", cleaning_week.schedule))?;

    let assigned = store
        .assignments_of_cleaning_week(cleaning_week.id)
        .iter()
        .any(|a| a.cleaner == cleaner);
    if !assigned {
        return Err(PlanError::NotAssigned {
            cleaner,
            cleaning_week: cleaning_week.id,
        });
    }

    let due = schedule.due_date(cleaning_week.week);
    if !template.is_open_on(due, today) {
        let (opens, closes) = template.window(due);
        return Err(PlanError::OutsideTaskWindow {
            task,
            opens,
            closes,
        });
    }

    record.cleaned_by = Some(cleaner);
    store.update_task(record.clone());
    info!(task = %task, cleaner = %cleaner, template = %template.name, "task cleaned");
    Ok(record)
}

/// Share of the week's tasks that are done; `None` for a week without tasks.
pub fn completion_ratio<S: Store>(store: &S, cleaning_week: CleaningWeekId) -> Option<f64> {
    let tasks = store.tasks_of_cleaning_week(cleaning_week);
    if tasks.is_empty() {
        return None;
    }
    let done = tasks.iter().filter(|t| t.is_done()).count();
    Some(done as f64 / tasks.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Roster;
    use crate::models::{epoch_week_to_day, Assignment, Schedule, TaskTemplate};
    use chrono::Weekday;

    fn setup() -> (Roster, CleanerId, CleaningWeek) {
        let mut roster = Roster::new(Schedule::new("Kitchen").with_weekday(Weekday::Sun));
        let a = roster.member("A");
        roster.store.insert_task_template(
            TaskTemplate::new(roster.schedule, "Wipe counters").with_window(2, 1),
        );
        roster
            .store
            .insert_task_template(TaskTemplate::new(roster.schedule, "Take out bins"));
        let (cw, _) = roster.store.get_or_create_cleaning_week(roster.schedule, 50);
        roster.store.insert_assignment(Assignment::new(a, &cw));
        (roster, a, cw)
    }

    #[test]
    fn test_create_missing_tasks_once() {
        let (mut roster, _, cw) = setup();
        assert_eq!(create_missing_tasks(&mut roster.store, &cw).len(), 2);
        assert!(create_missing_tasks(&mut roster.store, &cw).is_empty());
        assert_eq!(completion_ratio(&roster.store, cw.id), Some(0.0));
    }

    #[test]
    fn test_mark_cleaned_inside_window() {
        let (mut roster, a, cw) = setup();
        let tasks = create_missing_tasks(&mut roster.store, &cw);
        let friday = epoch_week_to_day(50, Weekday::Fri);

        let task = mark_task_cleaned(&mut roster.store, tasks[0], a, friday).unwrap();
        assert_eq!(task.cleaned_by, Some(a));
        assert_eq!(completion_ratio(&roster.store, cw.id), Some(0.5));
    }

    #[test]
    fn test_mark_cleaned_outside_window() {
        let (mut roster, a, cw) = setup();
        let tasks = create_missing_tasks(&mut roster.store, &cw);
        let thursday = epoch_week_to_day(50, Weekday::Thu);

        let err = mark_task_cleaned(&mut roster.store, tasks[0], a, thursday).unwrap_err();
        assert!(matches!(err, PlanError::OutsideTaskWindow { .. }));
    }

    #[test]
    fn test_only_assigned_cleaner_marks() {
        let (mut roster, _, cw) = setup();
        let b = roster.member("B");
        let tasks = create_missing_tasks(&mut roster.store, &cw);
        let sunday = epoch_week_to_day(50, Weekday::Sun);

        let err = mark_task_cleaned(&mut roster.store, tasks[1], b, sunday).unwrap_err();
        assert!(matches!(err, PlanError::NotAssigned { cleaner, .. } if cleaner == b));
    }

    #[test]
    fn test_no_tasks_no_ratio() {
        let (roster, _, cw) = setup();
        assert_eq!(completion_ratio(&roster.store, cw.id), None);
    }
}
