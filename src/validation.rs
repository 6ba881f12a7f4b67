//! Input validation for planning requests.
//!
//! Checks structural integrity of course structures and configuration
//! before any work items are built. Detects:
//! - Missing or duplicate course names
//! - Courses without chapters
//! - Zero page counts
//! - Exams dated before the plan starts
//! - Unusable constraints or effort rates
//!
//! All problems are collected, so a caller sees every defect at once.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::config::PlannerConfig;
use crate::models::{Complexity, CourseStructure};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The request contains no courses.
    NoCourses,
    /// A course has a blank name.
    EmptyCourseName,
    /// Two courses share the same name.
    DuplicateCourse,
    /// A course has no chapters.
    EmptyCourse,
    /// A chapter has zero pages.
    ZeroPageCount,
    /// An exam is dated before the plan start.
    ExamBeforeStart,
    /// A constraint or effort setting is unusable.
    InvalidConstraint,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates courses against the plan start date.
///
/// Checks:
/// 1. At least one course
/// 2. No blank course names
/// 3. No duplicate course names
/// 4. Every course has at least one chapter
/// 5. Every chapter has a positive page count
/// 6. No exam dated before `start_date`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_courses(courses: &[CourseStructure], start_date: NaiveDate) -> ValidationResult {
    let mut errors = Vec::new();

    if courses.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoCourses,
            "Request contains no courses",
        ));
    }

    let mut names = HashSet::new();
    for course in courses {
        let name = course.course_name.trim();
        if name.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyCourseName,
                "Course with blank name",
            ));
        } else if !names.insert(name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateCourse,
                format!("Duplicate course name: {name}"),
            ));
        }

        if course.chapters.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyCourse,
                format!("Course '{}' has no chapters", course.course_name),
            ));
        }

        for (i, chapter) in course.chapters.iter().enumerate() {
            if chapter.page_count == 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ZeroPageCount,
                    format!(
                        "Chapter {} ('{}') of '{}' has zero pages",
                        i + 1,
                        chapter.name,
                        course.course_name
                    ),
                ));
            }
        }

        if let Some(exam) = course.exam_date {
            if exam < start_date {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ExamBeforeStart,
                    format!(
                        "Exam for '{}' on {exam} is before the plan start {start_date}",
                        course.course_name
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates constraint and effort settings.
///
/// Checks:
/// 1. Daily cap is positive and finite
/// 2. Required break days fit in a week with at least one study day
/// 3. Review length is non-negative and finite
/// 4. Horizon bound is positive
/// 5. Every effort rate range is positive and ordered
/// 6. Practice buffer is non-negative and finite
pub fn validate_config(config: &PlannerConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let c = &config.constraints;

    if !(c.daily_cap_minutes.is_finite() && c.daily_cap_minutes > 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidConstraint,
            format!("daily_cap_minutes must be positive, got {}", c.daily_cap_minutes),
        ));
    }

    if c.min_break_days_per_week > 6 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidConstraint,
            format!(
                "min_break_days_per_week must be at most 6, got {}",
                c.min_break_days_per_week
            ),
        ));
    }

    if !(c.review_session_cap_minutes.is_finite() && c.review_session_cap_minutes >= 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidConstraint,
            format!(
                "review_session_cap_minutes must be non-negative, got {}",
                c.review_session_cap_minutes
            ),
        ));
    }

    if c.max_horizon_days == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidConstraint,
            "max_horizon_days must be positive",
        ));
    }

    for complexity in [Complexity::Low, Complexity::Medium, Complexity::High] {
        let range = config.effort.range(complexity);
        if !range.is_valid() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidConstraint,
                format!(
                    "effort rate for {complexity} must satisfy 0 < min <= max, got {}..{}",
                    range.min, range.max
                ),
            ));
        }
    }

    let buffer = config.effort.practice_buffer;
    if !(buffer.is_finite() && buffer >= 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidConstraint,
            format!("practice_buffer must be non-negative, got {buffer}"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates courses and configuration together.
pub fn validate_request(
    courses: &[CourseStructure],
    start_date: NaiveDate,
    config: &PlannerConfig,
) -> ValidationResult {
    let mut errors = Vec::new();
    if let Err(mut e) = validate_courses(courses, start_date) {
        errors.append(&mut e);
    }
    if let Err(mut e) = validate_config(config) {
        errors.append(&mut e);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
