//! Day allocation and plan evaluation.
//!
//! # Algorithm
//!
//! [`DayAllocator`] is a greedy, priority-driven, earliest-day packer: each
//! day takes work from the front of the prioritized queue until the daily
//! cap is reached. It is not optimal, but it is deterministic and never
//! splits work more than the cap forces.
//!
//! # Evaluation
//!
//! [`summarize`] turns allocated days into a [`FullPlan`](crate::models::FullPlan)
//! and re-checks its invariants. [`PlanKpi`] reports workload metrics:
//! peak load, cap utilization, per-course hours, and chapter fragmentation.

mod allocator;
mod kpi;
mod summary;

pub use allocator::{allocate, must_rest, Allocation, DayAllocator};
pub use kpi::PlanKpi;
pub use summary::{check_plan, summarize};
