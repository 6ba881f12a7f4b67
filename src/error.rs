//! Planner error types.

use thiserror::Error;

use crate::effort::EffortError;
use crate::models::{FullPlan, Infeasibility};
use crate::validation::ValidationError;

/// Errors from the planning pipeline.
///
/// `InvalidInput` and `ScheduleInfeasible` are expected outcomes a caller
/// should branch on; the infeasible variant still carries the plan built up
/// to the point of failure.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The request was rejected before allocation.
    #[error("invalid input: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),

    /// An exam deadline cannot be met under the configured constraints.
    #[error(
        "schedule infeasible: '{}' is {:.0} minutes short, detected on {}",
        .diagnostic.course,
        .diagnostic.shortfall_minutes,
        .diagnostic.detected_on
    )]
    ScheduleInfeasible {
        partial: Box<FullPlan>,
        diagnostic: Infeasibility,
    },

    /// The caller cancelled planning or its deadline passed.
    #[error("planning cancelled at day {day_index}")]
    Cancelled { day_index: u32 },

    /// The plan would run past the configured horizon bound.
    #[error("plan would exceed {max_days} days")]
    HorizonExceeded { max_days: u32 },

    #[error(transparent)]
    Effort(#[from] EffortError),
}

impl PlanError {
    /// The partial plan, if this is an infeasibility.
    pub fn partial_plan(&self) -> Option<&FullPlan> {
        match self {
            PlanError::ScheduleInfeasible { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// The infeasibility diagnostic, if any.
    pub fn infeasibility(&self) -> Option<&Infeasibility> {
        match self {
            PlanError::ScheduleInfeasible { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;
    use chrono::NaiveDate;

    #[test]
    fn test_invalid_input_message() {
        let err = PlanError::InvalidInput(vec![
            ValidationError {
                kind: ValidationErrorKind::NoCourses,
                message: "Request contains no courses".into(),
            },
            ValidationError {
                kind: ValidationErrorKind::InvalidConstraint,
                message: "daily_cap_minutes must be positive, got 0".into(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "invalid input: Request contains no courses; daily_cap_minutes must be positive, got 0"
        );
        assert!(err.partial_plan().is_none());
    }

    #[test]
    fn test_infeasible_message() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let err = PlanError::ScheduleInfeasible {
            partial: Box::new(FullPlan {
                days: Vec::new(),
                total_study_days: 0,
                total_hours: 0.0,
                warnings: Vec::new(),
            }),
            diagnostic: Infeasibility {
                course: "Math135".into(),
                shortfall_minutes: 360.0,
                detected_on: date,
                exam_date: date,
            },
        };
        assert_eq!(
            err.to_string(),
            "schedule infeasible: 'Math135' is 360 minutes short, detected on 2026-02-10"
        );
        assert_eq!(err.infeasibility().unwrap().course, "Math135");
        assert!(err.partial_plan().is_some());
    }
}
