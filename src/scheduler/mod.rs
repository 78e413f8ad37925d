//! Assignment generation, invalidation and KPI evaluation.
//!
//! # Generation
//!
//! `AssignmentGenerator` materializes cleaning weeks and staffs them with
//! the fairness allocator, one week per transaction. Running it again over
//! the same weeks changes nothing.
//!
//! # Invalidation
//!
//! `invalidate_assignments` flags future weeks touched by an affiliation
//! change; the next generation run refills them.
//!
//! # KPI
//!
//! `ScheduleKpi` reports fill rate, understaffed weeks and how evenly work
//! is spread across cleaners.

mod generator;
mod invalidation;
mod kpi;
mod tasks;

pub use generator::{AssignmentGenerator, GenerationOutcome, GenerationReport};
pub use invalidation::{affected_weeks, invalidate_assignments, AffiliationChange, Placement};
pub use kpi::ScheduleKpi;
pub use tasks::{completion_ratio, create_missing_tasks, mark_task_cleaned};
