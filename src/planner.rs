//! End-to-end planning pipeline.
//!
//! validate → aggregate → allocate → summarize.

use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::config::{PlannerConfig, PlanningConstraints};
use crate::effort::EffortModel;
use crate::error::PlanError;
use crate::models::{ConstraintWarning, CourseStructure, FullPlan, WarningKind};
use crate::priority::aggregate;
use crate::scheduler::{summarize, DayAllocator};
use crate::validation::validate_request;

/// Courses to plan and the first study date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub courses: Vec<CourseStructure>,
    pub start_date: NaiveDate,
}

impl PlanRequest {
    /// Creates an empty request starting on `start_date`.
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            courses: Vec::new(),
            start_date,
        }
    }

    /// Adds a course.
    pub fn with_course(mut self, course: CourseStructure) -> Self {
        self.courses.push(course);
        self
    }

    /// Adds several courses.
    pub fn with_courses(mut self, courses: impl IntoIterator<Item = CourseStructure>) -> Self {
        self.courses.extend(courses);
        self
    }
}

/// Builds study plans.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use study_planner::models::{Chapter, Complexity, CourseStructure};
/// use study_planner::planner::{PlanRequest, StudyPlanner};
///
/// let start = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
/// let request = PlanRequest::new(start).with_course(
///     CourseStructure::new("Math135")
///         .with_exam_date(NaiveDate::from_ymd_opt(2026, 2, 23).unwrap())
///         .with_chapter(Chapter::new("Logic", 20).with_complexity(Complexity::High)),
/// );
///
/// let plan = StudyPlanner::default().plan(&request).unwrap();
/// assert_eq!(plan.days[0].date, start);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StudyPlanner {
    config: PlannerConfig,
    cancel: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl StudyPlanner {
    /// Creates a planner with the given configuration.
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            cancel: None,
            deadline: None,
        }
    }

    /// Replaces the scheduling constraints.
    pub fn with_constraints(mut self, constraints: PlanningConstraints) -> Self {
        self.config.constraints = constraints;
        self
    }

    /// Replaces the effort model.
    pub fn with_effort(mut self, effort: EffortModel) -> Self {
        self.config.effort = effort;
        self
    }

    /// Aborts planning when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Aborts planning once `deadline` passes.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Builds a plan for `request`.
    ///
    /// # Errors
    /// - [`PlanError::InvalidInput`] with every validation problem found.
    /// - [`PlanError::ScheduleInfeasible`] with the partial plan when an exam
    ///   cannot be met.
    /// - [`PlanError::Cancelled`] / [`PlanError::HorizonExceeded`] from the
    ///   allocator.
    #[instrument(skip_all, fields(courses = request.courses.len(), start = %request.start_date))]
    pub fn plan(&self, request: &PlanRequest) -> Result<FullPlan, PlanError> {
        validate_request(&request.courses, request.start_date, &self.config)
            .map_err(PlanError::InvalidInput)?;

        let queue = aggregate(&request.courses, request.start_date, &self.config.effort)?;

        let mut allocator = DayAllocator::new(self.config.constraints.clone());
        if let Some(token) = &self.cancel {
            allocator = allocator.with_cancellation(token.clone());
        }
        if let Some(deadline) = self.deadline {
            allocator = allocator.with_deadline(deadline);
        }
        let allocation = allocator.allocate(queue, request.start_date)?;

        let mut plan = summarize(allocation.days, &self.config.constraints);
        plan.warnings.extend(page_total_warnings(&request.courses));

        match allocation.infeasibility {
            Some(diagnostic) => Err(PlanError::ScheduleInfeasible {
                partial: Box::new(plan),
                diagnostic,
            }),
            None => {
                info!(
                    days = plan.days.len(),
                    study_days = plan.total_study_days,
                    total_hours = plan.total_hours,
                    "plan complete"
                );
                Ok(plan)
            }
        }
    }
}

/// Plans `courses` from `start_date` with the default effort model.
pub fn plan(
    courses: &[CourseStructure],
    start_date: NaiveDate,
    constraints: &PlanningConstraints,
) -> Result<FullPlan, PlanError> {
    let request = PlanRequest::new(start_date).with_courses(courses.iter().cloned());
    StudyPlanner::default()
        .with_constraints(constraints.clone())
        .plan(&request)
}

fn page_total_warnings(courses: &[CourseStructure]) -> Vec<ConstraintWarning> {
    courses
        .iter()
        .filter(|c| !c.total_pages_consistent())
        .map(|c| {
            let message = format!(
                "'{}' declares {} pages but its chapters sum to {}",
                c.course_name,
                c.total_pages,
                c.chapter_pages()
            );
            warn!(course = %c.course_name, "{message}");
            ConstraintWarning::new(WarningKind::TotalPagesMismatch, None, &c.course_name, message)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chapter, Complexity};
    use crate::validation::ValidationErrorKind;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn math() -> CourseStructure {
        CourseStructure::new("Math135")
            .with_exam_date(date(23))
            .with_chapter(Chapter::new("Logic", 20).with_complexity(Complexity::High))
            .with_chapter(Chapter::new("Proofs", 30).with_complexity(Complexity::High))
    }

    #[test]
    fn test_plan_success() {
        let request = PlanRequest::new(date(9)).with_course(math());
        let plan = StudyPlanner::default().plan(&request).unwrap();
        assert_eq!(plan.days[0].date, date(9));
        assert_eq!(plan.end_date(), Some(date(22)));
        assert!(plan.is_clean());
        // 50 pages high: 5 × 50 × 1.4 = 350 minutes, plus one review.
        assert!((plan.total_hours - 410.0 / 60.0).abs() < 0.01);
        assert_eq!(plan.reviews_for("Math135").len(), 1);
    }

    #[test]
    fn test_invalid_input_fails_fast() {
        let request = PlanRequest::new(date(9))
            .with_course(math())
            .with_course(math())
            .with_course(CourseStructure::new("Empty"));
        let err = StudyPlanner::default().plan(&request).unwrap_err();
        match err {
            PlanError::InvalidInput(errors) => {
                let kinds: Vec<_> = errors.iter().map(|e| e.kind.clone()).collect();
                assert!(kinds.contains(&ValidationErrorKind::DuplicateCourse));
                assert!(kinds.contains(&ValidationErrorKind::EmptyCourse));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_infeasible_returns_partial_plan() {
        let course = CourseStructure::new("Math135")
            .with_exam_date(date(10))
            .with_chapter(Chapter::new("Everything", 120).with_complexity(Complexity::High));
        let planner = StudyPlanner::default().with_effort(EffortModel::default().with_practice_buffer(0.0));
        let err = planner
            .plan(&PlanRequest::new(date(9)).with_course(course))
            .unwrap_err();

        let diagnostic = err.infeasibility().unwrap();
        assert_eq!(diagnostic.course, "Math135");
        assert_eq!(diagnostic.detected_on, date(10));
        assert!((diagnostic.shortfall_minutes - 360.0).abs() < 1e-6);

        let partial = err.partial_plan().unwrap();
        assert_eq!(partial.days.len(), 1);
        assert!((partial.total_hours - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_page_total_mismatch_is_warning() {
        let request = PlanRequest::new(date(9)).with_course(math().with_total_pages(999));
        let plan = StudyPlanner::default().plan(&request).unwrap();
        assert_eq!(plan.warnings.len(), 1);
        assert_eq!(plan.warnings[0].kind, WarningKind::TotalPagesMismatch);
        assert_eq!(plan.warnings[0].entity, "Math135");
    }

    #[test]
    fn test_cancelled_planner() {
        let token = CancellationToken::new();
        token.cancel();
        let err = StudyPlanner::default()
            .with_cancellation(token)
            .plan(&PlanRequest::new(date(9)).with_course(math()))
            .unwrap_err();
        assert!(matches!(err, PlanError::Cancelled { .. }));
    }

    #[test]
    fn test_free_function_matches_planner() {
        let constraints = PlanningConstraints::new().with_daily_cap_minutes(120.0);
        let a = plan(&[math()], date(9), &constraints).unwrap();
        let b = StudyPlanner::default()
            .with_constraints(constraints)
            .plan(&PlanRequest::new(date(9)).with_course(math()))
            .unwrap();
        assert_eq!(a, b);
        assert!(a.days.iter().all(|d| d.minutes() <= 120.0 + 1e-9));
    }
}
