//! Rostering domain models.
//!
//! Plain data types for the roster: who cleans ([`Cleaner`]), what is
//! cleaned ([`Schedule`], [`ScheduleGroup`]), who belongs where and when
//! ([`Affiliation`]), and the materialized occurrences with their
//! [`Assignment`]s, [`Task`]s and [`DutySwitch`] negotiations.
//!
//! # Domain Mappings
//!
//! | duty-roster | Shared flat | Office | Club house |
//! |-------------|-------------|--------|------------|
//! | Schedule | Kitchen duty | Coffee machine | Bar shift |
//! | ScheduleGroup | Floor | Department | Team |
//! | Cleaner | Flatmate | Employee | Member |
//! | CleaningWeek | Kitchen, week 12 | Coffee, week 12 | Bar, week 12 |

pub mod calendar;
mod affiliation;
mod cleaner;
mod cleaning_week;
mod duty_switch;
mod ids;
mod schedule;
mod task;

pub use affiliation::Affiliation;
pub use calendar::{
    current_epoch_week, date_to_epoch_week, epoch_week_to_day, epoch_week_to_monday,
    epoch_week_to_sunday, Clock, EpochWeek, FixedClock, SystemClock, WeekSpan,
};
pub use cleaner::{Cleaner, NotificationPreference};
pub use cleaning_week::{Assignment, CleaningWeek, StaffingShortfall};
pub use duty_switch::{DutySwitch, Resolution, SwitchStatus};
pub use ids::{
    AffiliationId, AssignmentId, CleanerId, CleaningWeekId, DutySwitchId, GroupId, ScheduleId,
    TaskId, TaskTemplateId,
};
pub use schedule::{Recurrence, Schedule, ScheduleGroup};
pub use task::{Task, TaskTemplate};
