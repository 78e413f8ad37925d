//! Task checklist models.
//!
//! A [`TaskTemplate`] describes one checklist item of a schedule ("wipe the
//! counters"). When a cleaning week is created, every enabled template is
//! materialized as a [`Task`] of that week.
//!
//! # Activity window
//! A task can be ticked off from `start_days_before` the due date until
//! `end_days_after` it, both inclusive.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::ids::{CleanerId, CleaningWeekId, ScheduleId, TaskId, TaskTemplateId};

/// A checklist item of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    /// Store-assigned identifier.
    pub id: TaskTemplateId,
    /// Owning schedule.
    pub schedule: ScheduleId,
    /// Short task name.
    pub name: String,
    /// Instructions shown to the cleaner.
    pub help_text: String,
    /// Days before the due date the task opens.
    pub start_days_before: u8,
    /// Days after the due date the task stays open.
    pub end_days_after: u8,
    /// Disabled templates produce no new tasks.
    pub enabled: bool,
}

impl TaskTemplate {
    /// Creates an enabled template open on the due date only.
    pub fn new(schedule: ScheduleId, name: impl Into<String>) -> Self {
        Self {
            id: TaskTemplateId::default(),
            schedule,
            name: name.into(),
            help_text: String::new(),
            start_days_before: 0,
            end_days_after: 0,
            enabled: true,
        }
    }

    /// Sets the help text.
    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = help_text.into();
        self
    }

    /// Sets the activity window around the due date.
    pub fn with_window(mut self, start_days_before: u8, end_days_after: u8) -> Self {
        self.start_days_before = start_days_before;
        self.end_days_after = end_days_after;
        self
    }

    /// Marks the template as disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// First and last day the task can be completed for a given due date.
    pub fn window(&self, due: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = due
            .checked_sub_signed(Duration::days(i64::from(self.start_days_before)))
            .unwrap_or(NaiveDate::MIN);
        let end = due
            .checked_add_signed(Duration::days(i64::from(self.end_days_after)))
            .unwrap_or(NaiveDate::MAX);
        (start, end)
    }

    /// Whether `today` lies in the activity window for the due date.
    pub fn is_open_on(&self, due: NaiveDate, today: NaiveDate) -> bool {
        let (start, end) = self.window(due);
        today >= start && today <= end
    }
}

/// A checklist item of one cleaning week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Cleaning week the task belongs to.
    pub cleaning_week: CleaningWeekId,
    /// Template the task was created from.
    pub template: TaskTemplateId,
    /// Who completed the task.
    pub cleaned_by: Option<CleanerId>,
}

impl Task {
    /// Creates an open task.
    pub fn new(cleaning_week: CleaningWeekId, template: TaskTemplateId) -> Self {
        Self {
            id: TaskId::default(),
            cleaning_week,
            template,
            cleaned_by: None,
        }
    }

    /// Whether somebody completed the task.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.cleaned_by.is_some()
    }
}
