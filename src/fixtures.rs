//! Test fixtures shared by the unit tests.

use crate::models::{
    Affiliation, Cleaner, CleanerId, EpochWeek, GroupId, Schedule, ScheduleGroup, ScheduleId,
};
use crate::store::{InMemoryStore, Store};

/// A store with one schedule in one group.
pub(crate) struct Roster {
    pub store: InMemoryStore,
    pub schedule: ScheduleId,
    pub group: GroupId,
}

impl Roster {
    pub fn new(schedule: Schedule) -> Self {
        let mut store = InMemoryStore::new();
        let schedule = store.insert_schedule(schedule);
        let group = store.insert_group(ScheduleGroup::new("Floor").with_schedule(schedule));
        Self {
            store,
            schedule,
            group,
        }
    }

    /// Adds a cleaner affiliated with the roster's group over `[beginning, end]`.
    pub fn cleaner(&mut self, name: &str, beginning: EpochWeek, end: EpochWeek) -> CleanerId {
        let id = self.store.insert_cleaner(Cleaner::new(name));
        self.store
            .insert_affiliation(Affiliation::new(id, self.group, beginning, end));
        id
    }

    /// Adds a cleaner affiliated with the roster's group from week 0 on.
    pub fn member(&mut self, name: &str) -> CleanerId {
        self.cleaner(name, 0, EpochWeek::MAX)
    }
}
