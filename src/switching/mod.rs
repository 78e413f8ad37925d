//! Duty switches: trading assignments between cleaners.
//!
//! [`Negotiator`] implements the request/propose/answer state machine of a
//! [`DutySwitch`](crate::models::DutySwitch); [`escalation`] moves switches
//! along when nobody acts in time.

pub mod escalation;
mod negotiator;

pub use negotiator::{AcceptOutcome, Negotiator};

pub(crate) use negotiator::retire_assignment;
