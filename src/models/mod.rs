//! Study planning domain models.
//!
//! Provides the data types flowing through the planning pipeline:
//! course input, the engine's internal work items, and the resulting plan.
//!
//! # Domain Mappings
//!
//! | study-planner | Job-shop scheduling |
//! |---------------|---------------------|
//! | CourseStructure | Job family with a due date |
//! | WorkItem | Job (preemptible) |
//! | StudyDay | One period of a single capacitated resource |
//! | FullPlan | Schedule |

mod course;
mod plan;
mod work_item;

pub use course::{Chapter, Complexity, CourseStructure};
pub use plan::{
    format_chapter_range, BreakReason, ConstraintWarning, FullPlan, Infeasibility, SessionKind,
    StudyDay, StudySession, WarningKind,
};
pub use work_item::WorkItem;

pub(crate) use plan::round_hours;
pub(crate) use work_item::MINUTE_EPSILON;
