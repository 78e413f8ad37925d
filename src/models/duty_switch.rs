//! Duty switch negotiation record.
//!
//! # State machine
//!
//! ```text
//!            set_selected             accepted
//!   Open ─────────────────▶ Pending ───────────▶ Closed(Executed)
//!    ▲  │                     │
//!    │  │ abandon             │ rejected / cancelled
//!    │  ▼                     │
//!    │ Closed(Abandoned)      │
//!    └────────────────────────┘
//! ```
//!
//! A switch whose selected destination is swapped away by another switch
//! ends in `Closed(Rejected)`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use super::ids::{AssignmentId, DutySwitchId};

/// How a closed switch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The trade was carried out.
    Executed,
    /// The requester withdrew the request.
    Abandoned,
    /// The selected destination was traded away by another switch.
    Rejected,
}

/// Negotiation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchStatus {
    /// No destination is currently offered.
    Open,
    /// A destination is offered and awaits the other cleaner's answer.
    Pending,
    /// Terminal.
    Closed(Resolution),
}

impl SwitchStatus {
    /// Whether the switch reached a terminal state.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

impl fmt::Display for SwitchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Pending => write!(f, "pending"),
            Self::Closed(Resolution::Executed) => write!(f, "closed (executed)"),
            Self::Closed(Resolution::Abandoned) => write!(f, "closed (abandoned)"),
            Self::Closed(Resolution::Rejected) => write!(f, "closed (rejected)"),
        }
    }
}

/// A cleaner's request to trade one of their assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutySwitch {
    /// Store-assigned identifier.
    pub id: DutySwitchId,
    /// The assignment the requester wants to get rid of.
    pub requester: AssignmentId,
    /// Candidate assignments to trade with, in discovery order.
    pub destinations: VecDeque<AssignmentId>,
    /// Destinations that declined; never queued again.
    pub rejected: BTreeSet<AssignmentId>,
    /// Destination currently offered.
    pub selected: Option<AssignmentId>,
    /// Negotiation state.
    pub status: SwitchStatus,
    /// Day the request was made.
    pub created: NaiveDate,
    /// Day the current selection was made.
    pub selected_at: Option<NaiveDate>,
}

impl DutySwitch {
    /// Creates an open switch without destinations.
    pub fn new(requester: AssignmentId, created: NaiveDate) -> Self {
        Self {
            id: DutySwitchId::default(),
            requester,
            destinations: VecDeque::new(),
            rejected: BTreeSet::new(),
            selected: None,
            status: SwitchStatus::Open,
            created,
            selected_at: None,
        }
    }

    /// Whether the switch is still being negotiated.
    #[inline]
    pub fn is_live(&self) -> bool {
        !self.status.is_closed()
    }

    /// Whether any destination is queued.
    #[inline]
    pub fn has_destinations(&self) -> bool {
        !self.destinations.is_empty()
    }

    /// Whether the assignment is queued as a destination.
    pub fn is_queued(&self, assignment: AssignmentId) -> bool {
        self.destinations.contains(&assignment)
    }

    /// Whether the switch currently offers the assignment.
    pub fn has_selected(&self, assignment: AssignmentId) -> bool {
        self.is_live() && self.selected == Some(assignment)
    }

    /// Removes a destination from the queue (and the selection).
    pub(crate) fn dequeue(&mut self, assignment: AssignmentId) -> bool {
        let before = self.destinations.len();
        self.destinations.retain(|d| *d != assignment);
        if self.selected == Some(assignment) {
            self.clear_selection();
        }
        before != self.destinations.len()
    }

    /// Drops the current selection and returns to `Open`.
    pub(crate) fn clear_selection(&mut self) {
        self.selected = None;
        self.selected_at = None;
        if self.status == SwitchStatus::Pending {
            self.status = SwitchStatus::Open;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DutySwitch {
        let mut s = DutySwitch::new(AssignmentId(1), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        s.destinations.extend([AssignmentId(2), AssignmentId(3)]);
        s
    }

    #[test]
    fn test_new_switch_is_open() {
        let s = sample();
        assert_eq!(s.status, SwitchStatus::Open);
        assert!(s.is_live());
        assert!(s.has_destinations());
        assert!(s.is_queued(AssignmentId(3)));
    }

    #[test]
    fn test_dequeue_clears_selection() {
        let mut s = sample();
        s.selected = Some(AssignmentId(2));
        s.status = SwitchStatus::Pending;
        assert!(s.has_selected(AssignmentId(2)));

        assert!(s.dequeue(AssignmentId(2)));
        assert_eq!(s.status, SwitchStatus::Open);
        assert_eq!(s.selected, None);
        assert_eq!(s.destinations, VecDeque::from([AssignmentId(3)]));
        assert!(!s.dequeue(AssignmentId(2)));
    }

    #[test]
    fn test_closed_switch_selects_nothing() {
        let mut s = sample();
        s.selected = Some(AssignmentId(2));
        s.status = SwitchStatus::Closed(Resolution::Executed);
        assert!(!s.has_selected(AssignmentId(2)));
        assert_eq!(s.status.to_string(), "closed (executed)");
    }
}
