//! Outbound notifications.
//!
//! Operations queue [`Notification`]s in memory; the [`Planner`](crate::Planner)
//! keeps only those produced by committed transactions and hands them out
//! through `take_notifications`. Delivery (mail, chat, push) is up to the
//! caller, which can consult each cleaner's
//! [`NotificationPreference`](crate::models::NotificationPreference).

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{date_to_epoch_week, AssignmentId, CleanerId, DutySwitchId, WeekSpan};
use crate::store::Store;

/// An event somebody should hear about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A new destination was queued for a duty switch; its cleaner may be asked.
    DestinationAvailable {
        switch: DutySwitchId,
        destination: AssignmentId,
    },
    /// A duty switch was carried out.
    SwitchAccepted {
        switch: DutySwitchId,
        requester: AssignmentId,
        destination: AssignmentId,
    },
    /// An assignment is due soon.
    AssignmentUpcoming {
        assignment: AssignmentId,
        cleaner: CleanerId,
        due_date: NaiveDate,
    },
}

impl Notification {
    /// Assignments the notification concerns.
    pub fn assignments(&self) -> Vec<AssignmentId> {
        match self {
            Self::DestinationAvailable { destination, .. } => vec![*destination],
            Self::SwitchAccepted {
                requester,
                destination,
                ..
            } => vec![*requester, *destination],
            Self::AssignmentUpcoming { assignment, .. } => vec![*assignment],
        }
    }
}

/// Reminders for assignments due exactly `days` after `today`.
///
/// Assignments of disabled schedules are skipped.
pub fn upcoming_assignments<S: Store>(store: &S, today: NaiveDate, days: u32) -> Vec<Notification> {
    let Some(due) = today.checked_add_signed(Duration::days(i64::from(days))) else {
        return Vec::new();
    };
    let week = date_to_epoch_week(due);

    let mut reminders = Vec::new();
    for schedule in store.schedules() {
        if !schedule.enabled || schedule.due_date(week) != due {
            continue;
        }
        for assignment in store.assignments_in_span(schedule.id, WeekSpan::single(week)) {
            reminders.push(Notification::AssignmentUpcoming {
                assignment: assignment.id,
                cleaner: assignment.cleaner,
                due_date: due,
            });
        }
    }
    reminders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Roster;
    use crate::models::{epoch_week_to_day, Assignment, Schedule};
    use chrono::Weekday;

    #[test]
    fn test_reminder_only_on_exact_day() {
        let mut roster = Roster::new(Schedule::new("Kitchen").with_weekday(Weekday::Fri));
        let a = roster.member("A");
        let (cw, _) = roster.store.get_or_create_cleaning_week(roster.schedule, 100);
        let assignment = roster.store.insert_assignment(Assignment::new(a, &cw));

        let friday = epoch_week_to_day(100, Weekday::Fri);
        let wednesday = epoch_week_to_day(100, Weekday::Wed);

        let reminders = upcoming_assignments(&roster.store, wednesday, 2);
        assert_eq!(
            reminders,
            vec![Notification::AssignmentUpcoming {
                assignment,
                cleaner: a,
                due_date: friday,
            }]
        );
        assert!(upcoming_assignments(&roster.store, wednesday, 1).is_empty());
        assert!(upcoming_assignments(&roster.store, wednesday, 3).is_empty());
    }

    #[test]
    fn test_notification_serde_tag() {
        let n = Notification::DestinationAvailable {
            switch: DutySwitchId(1),
            destination: AssignmentId(2),
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "destination_available");
        assert_eq!(json["destination"], 2);
        assert_eq!(n.assignments(), vec![AssignmentId(2)]);
    }
}
