//! Work item model.
//!
//! A work item is the engine's unit of schedulable effort, derived 1:1
//! from a chapter. Everything except `remaining_minutes` is fixed at
//! aggregation time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Complexity;

/// Remaining work at or below this many minutes counts as done.
pub(crate) const MINUTE_EPSILON: f64 = 1e-6;

/// Schedulable effort for one chapter of one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Owning course.
    pub course_name: String,
    /// Position of the chapter in its textbook (0-indexed).
    pub chapter_index: usize,
    /// Chapter title.
    pub chapter_name: String,
    /// Chapter topics, copied for task descriptions.
    pub topics: Vec<String>,
    /// Difficulty label.
    pub complexity: Complexity,
    /// Estimated study time (minutes).
    pub estimated_minutes: f64,
    /// Exam date of the owning course.
    pub exam_date: Option<NaiveDate>,
    /// `exam_date - start_date` in days. `None` = no exam (infinitely far).
    pub days_until_exam: Option<i64>,
    /// Work not yet scheduled (minutes).
    pub remaining_minutes: f64,
}

impl WorkItem {
    /// Creates a work item with all of its estimate remaining.
    pub fn new(
        course_name: impl Into<String>,
        chapter_index: usize,
        chapter_name: impl Into<String>,
        estimated_minutes: f64,
    ) -> Self {
        Self {
            course_name: course_name.into(),
            chapter_index,
            chapter_name: chapter_name.into(),
            topics: Vec::new(),
            complexity: Complexity::Medium,
            estimated_minutes,
            exam_date: None,
            days_until_exam: None,
            remaining_minutes: estimated_minutes,
        }
    }

    /// Sets the complexity.
    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    /// Sets the topics.
    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    /// Sets the exam date and derives `days_until_exam` from `start_date`.
    pub fn with_exam(mut self, exam_date: Option<NaiveDate>, start_date: NaiveDate) -> Self {
        self.exam_date = exam_date;
        self.days_until_exam = exam_date.map(|d| (d - start_date).num_days());
        self
    }

    /// 1-based chapter number, as shown to students.
    #[inline]
    pub fn chapter_number(&self) -> u32 {
        self.chapter_index as u32 + 1
    }

    /// Whether all work has been scheduled.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.remaining_minutes <= MINUTE_EPSILON
    }

    /// Whether some, but not all, of the work has been scheduled.
    #[inline]
    pub fn is_started(&self) -> bool {
        self.remaining_minutes < self.estimated_minutes - MINUTE_EPSILON
    }

    /// Consumes up to `available` minutes of remaining work.
    ///
    /// Returns the minutes actually consumed. Remaining work snaps to
    /// exactly zero once it falls below the epsilon.
    pub fn consume(&mut self, available: f64) -> f64 {
        let take = available.max(0.0).min(self.remaining_minutes);
        self.remaining_minutes -= take;
        if self.remaining_minutes <= MINUTE_EPSILON {
            self.remaining_minutes = 0.0;
        }
        take
    }

    /// Whether the exam has been reached on `date` with work outstanding.
    pub fn is_overdue_on(&self, date: NaiveDate) -> bool {
        !self.is_complete() && self.exam_date.is_some_and(|exam| date >= exam)
    }
}
