//! Cleaner model.
//!
//! Cleaners are the people duties get assigned to. A cleaner is never
//! removed while assignments reference it; instead it is deactivated,
//! which takes it out of every future allocation.

use serde::{Deserialize, Serialize};

use super::ids::CleanerId;
use super::schedule::slugify;

/// How a cleaner wants to hear about duties and swaps.
///
/// Delivery itself happens outside this crate; the preference is carried so
/// the delivery layer can filter [`Notification`](crate::notify::Notification)s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPreference {
    /// Every event as it happens.
    #[default]
    Immediate,
    /// A weekly digest.
    WeeklyDigest,
    /// No notifications.
    Silent,
}

/// A person who takes on duties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cleaner {
    /// Store-assigned identifier.
    pub id: CleanerId,
    /// Display name.
    pub name: String,
    /// Unique, URL-safe identifier.
    pub slug: String,
    /// Notification preference.
    pub preference: NotificationPreference,
    /// Inactive cleaners are never allocated.
    pub active: bool,
}

impl Cleaner {
    /// Creates an active cleaner with a slug derived from the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: CleanerId::default(),
            slug: slugify(&name),
            name,
            preference: NotificationPreference::Immediate,
            active: true,
        }
    }

    /// Overrides the derived slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    /// Sets the notification preference.
    pub fn with_preference(mut self, preference: NotificationPreference) -> Self {
        self.preference = preference;
        self
    }

    /// Marks the cleaner as inactive.
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether the cleaner wants immediate notifications.
    pub fn wants_immediate_notifications(&self) -> bool {
        self.preference == NotificationPreference::Immediate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaner_builder() {
        let c = Cleaner::new("Anna Lena")
            .with_preference(NotificationPreference::WeeklyDigest);

        assert_eq!(c.slug, "anna-lena");
        assert!(c.active);
        assert!(!c.wants_immediate_notifications());
        assert!(!c.clone().deactivated().active);
        assert_eq!(c.with_slug("al").slug, "al");
    }

    #[test]
    fn test_cleaner_serde() {
        let c = Cleaner::new("Bo");
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["preference"], "immediate");
        let back: Cleaner = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);
    }
}
