//! Recurring duty rostering.
//!
//! Plans who takes which recurring duty (kitchen, bathroom, bins...) in
//! which week, keeps the rotation fair as people join and leave groups,
//! and lets cleaners trade duties with each other.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Cleaner`, `Schedule`, `ScheduleGroup`,
//!   `Affiliation`, `CleaningWeek`, `Assignment`, `Task`, `DutySwitch`,
//!   and the epoch-week calendar
//! - **`allocation`**: Fairness ranking of candidate cleaners (rule engine)
//! - **`scheduler`**: Assignment generation, invalidation, tasks and KPIs
//! - **`switching`**: Duty switch negotiation and time-driven escalation
//! - **`store`**: Persistence contract and the in-memory store
//! - **`notify`**: Outbound notification events
//! - **`validation`**: Input integrity checks
//! - **`planner`**: The facade tying it all together
//!
//! # Fairness
//!
//! Within the weeks during which a group's membership stays constant,
//! the cleaner with the lowest share of a schedule's assignments takes
//! the next slot. Membership changes restart the comparison so newcomers
//! are not flooded with duties to "catch up".

pub mod allocation;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod planner;
pub mod scheduler;
pub mod store;
pub mod switching;
pub mod validation;

#[cfg(test)]
mod fixtures;

pub use config::PlannerConfig;
pub use error::{PlanError, Result};
pub use planner::Planner;
