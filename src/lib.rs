//! Deterministic study-plan construction.
//!
//! Turns per-course textbook structures (chapters, page counts, complexity,
//! exam dates) into a day-by-day study calendar that respects a daily time
//! cap, guarantees weekly rest, prioritizes courses by exam proximity, and
//! inserts short reviews before exams.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `CourseStructure`, `Chapter`, `WorkItem`,
//!   `StudyDay`, `StudySession`, `FullPlan`
//! - **`effort`**: Pages × complexity → minutes
//! - **`priority`**: Work item aggregation and ordering
//! - **`scheduler`**: Day allocation, summary checks, workload KPIs
//! - **`planner`**: The validate → aggregate → allocate → summarize pipeline
//! - **`validation`**: Input integrity checks (duplicate names, empty courses, zero pages)
//! - **`config`**: Constraints and effort settings, loadable from TOML
//! - **`render`**: Markdown and CSV output
//!
//! Identical inputs always produce identical plans; the engine performs no
//! I/O.

pub mod config;
pub mod effort;
pub mod error;
pub mod models;
pub mod planner;
pub mod priority;
pub mod render;
pub mod scheduler;
pub mod validation;

pub use error::PlanError;
pub use planner::{plan, PlanRequest, StudyPlanner};
