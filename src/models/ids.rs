//! Typed record identifiers.
//!
//! Identifiers are assigned by the [`Store`](crate::store::Store) on insert.
//! A freshly built model carries the default id `0` until it is persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
                Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub u64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<$name> for u64 {
                fn from(id: $name) -> u64 {
                    id.0
                }
            }
        )+
    };
}

define_id! {
    /// Identifies a [`Cleaner`](super::Cleaner).
    CleanerId;
    /// Identifies a [`ScheduleGroup`](super::ScheduleGroup).
    GroupId;
    /// Identifies a [`Schedule`](super::Schedule).
    ScheduleId;
    /// Identifies an [`Affiliation`](super::Affiliation).
    AffiliationId;
    /// Identifies a [`CleaningWeek`](super::CleaningWeek).
    CleaningWeekId;
    /// Identifies an [`Assignment`](super::Assignment).
    AssignmentId;
    /// Identifies a [`TaskTemplate`](super::TaskTemplate).
    TaskTemplateId;
    /// Identifies a [`Task`](super::Task).
    TaskId;
    /// Identifies a [`DutySwitch`](super::DutySwitch).
    DutySwitchId;
}
