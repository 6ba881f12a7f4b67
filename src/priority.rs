//! Work item aggregation and prioritization.
//!
//! Merges every course's chapters into one queue of [`WorkItem`]s and orders
//! it with a sequential multi-key comparison: each key is consulted only when
//! all earlier keys tie.
//!
//! | Order | Key | Direction |
//! |-------|-----|-----------|
//! | 1 | days until exam (no exam = last) | ascending |
//! | 2 | complexity | high → low |
//! | 3 | textbook chapter position | ascending |
//! | 4 | course name | ascending |
//!
//! The result is a total order, so aggregation is deterministic regardless
//! of input course order.

use std::cmp::Ordering;
use std::collections::VecDeque;

use chrono::NaiveDate;
use tracing::debug;

use crate::effort::{EffortError, EffortModel};
use crate::models::{CourseStructure, WorkItem};

/// Urgency key: courses without an exam sort after all dated ones.
fn urgency(item: &WorkItem) -> (bool, i64) {
    match item.days_until_exam {
        Some(days) => (false, days),
        None => (true, i64::MAX),
    }
}

/// Compares two work items by scheduling priority (earlier = `Less`).
pub fn compare(a: &WorkItem, b: &WorkItem) -> Ordering {
    urgency(a)
        .cmp(&urgency(b))
        .then_with(|| b.complexity.cmp(&a.complexity))
        .then_with(|| a.chapter_index.cmp(&b.chapter_index))
        .then_with(|| a.course_name.cmp(&b.course_name))
}

/// Prioritized queue of work items. The front is the most urgent item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkQueue {
    items: VecDeque<WorkItem>,
}

impl WorkQueue {
    /// Builds a queue, sorting `items` by [`compare`].
    pub fn from_items(items: Vec<WorkItem>) -> Self {
        let mut items = items;
        items.sort_by(compare);
        Self {
            items: items.into(),
        }
    }

    /// Number of items not yet fully scheduled.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether every item has been scheduled.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The most urgent item.
    pub fn front(&self) -> Option<&WorkItem> {
        self.items.front()
    }

    /// Mutable access to the most urgent item.
    pub fn front_mut(&mut self) -> Option<&mut WorkItem> {
        self.items.front_mut()
    }

    /// Removes and returns the most urgent item.
    pub fn pop_front(&mut self) -> Option<WorkItem> {
        self.items.pop_front()
    }

    /// Items in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.iter()
    }

    /// Whether `course` still has unscheduled work.
    pub fn has_course(&self, course: &str) -> bool {
        self.items.iter().any(|i| i.course_name == course)
    }

    /// Unscheduled minutes for `course`.
    pub fn remaining_minutes_for(&self, course: &str) -> f64 {
        self.items
            .iter()
            .filter(|i| i.course_name == course)
            .map(|i| i.remaining_minutes)
            .sum()
    }

    /// Unscheduled minutes across all courses.
    pub fn total_remaining_minutes(&self) -> f64 {
        self.items.iter().map(|i| i.remaining_minutes).sum()
    }

    /// The most urgent item whose exam is on or before `date` with work left.
    pub fn first_overdue(&self, date: NaiveDate) -> Option<&WorkItem> {
        self.items.iter().find(|i| i.is_overdue_on(date))
    }
}

/// Builds the prioritized work queue for all courses.
///
/// One work item per chapter; `days_until_exam` is measured from
/// `start_date`.
///
/// # Errors
/// [`EffortError`] if a chapter cannot be estimated (zero pages).
pub fn aggregate(
    courses: &[CourseStructure],
    start_date: NaiveDate,
    effort: &EffortModel,
) -> Result<WorkQueue, EffortError> {
    let mut items = Vec::new();

    for course in courses {
        for (index, chapter) in course.chapters.iter().enumerate() {
            let minutes = effort.estimate(chapter.page_count, chapter.complexity)?;
            items.push(
                WorkItem::new(&course.course_name, index, &chapter.name, minutes)
                    .with_complexity(chapter.complexity)
                    .with_topics(chapter.topics.clone())
                    .with_exam(course.exam_date, start_date),
            );
        }
    }

    let queue = WorkQueue::from_items(items);
    debug!(
        items = queue.len(),
        total_minutes = queue.total_remaining_minutes(),
        "aggregated work queue"
    );
    Ok(queue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chapter, Complexity};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn order(queue: &WorkQueue) -> Vec<(String, u32)> {
        queue
            .iter()
            .map(|i| (i.course_name.clone(), i.chapter_number()))
            .collect()
    }

    #[test]
    fn test_exam_urgency_first() {
        let courses = vec![
            CourseStructure::new("Late")
                .with_exam_date(date(25))
                .with_chapter(Chapter::new("L1", 10).with_complexity(Complexity::High)),
            CourseStructure::new("Early")
                .with_exam_date(date(20))
                .with_chapter(Chapter::new("E1", 10).with_complexity(Complexity::Low)),
            CourseStructure::new("Undated")
                .with_chapter(Chapter::new("U1", 10).with_complexity(Complexity::High)),
        ];

        let queue = aggregate(&courses, date(9), &EffortModel::default()).unwrap();
        let names: Vec<_> = queue.iter().map(|i| i.course_name.as_str()).collect();
        assert_eq!(names, vec!["Early", "Late", "Undated"]);
        assert_eq!(queue.front().unwrap().days_until_exam, Some(11));
    }

    #[test]
    fn test_complexity_before_textbook_order() {
        let courses = vec![CourseStructure::new("Math135")
            .with_exam_date(date(23))
            .with_chapter(Chapter::new("Sets", 10).with_complexity(Complexity::Low))
            .with_chapter(Chapter::new("Proofs", 10).with_complexity(Complexity::High))
            .with_chapter(Chapter::new("Functions", 10).with_complexity(Complexity::Medium))
            .with_chapter(Chapter::new("Induction", 10).with_complexity(Complexity::High))];

        let queue = aggregate(&courses, date(9), &EffortModel::default()).unwrap();
        let chapters: Vec<u32> = queue.iter().map(|i| i.chapter_number()).collect();
        assert_eq!(chapters, vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_course_name_breaks_final_ties() {
        let courses = vec![
            CourseStructure::new("B").with_chapter(Chapter::new("b1", 10)),
            CourseStructure::new("A").with_chapter(Chapter::new("a1", 10)),
        ];
        let queue = aggregate(&courses, date(9), &EffortModel::default()).unwrap();
        assert_eq!(
            order(&queue),
            vec![("A".to_string(), 1), ("B".to_string(), 1)]
        );
    }

    #[test]
    fn test_input_order_irrelevant() {
        let a = CourseStructure::new("A")
            .with_exam_date(date(20))
            .with_chapter(Chapter::new("a1", 10))
            .with_chapter(Chapter::new("a2", 30).with_complexity(Complexity::High));
        let b = CourseStructure::new("B")
            .with_exam_date(date(20))
            .with_chapter(Chapter::new("b1", 20));

        let q1 = aggregate(&[a.clone(), b.clone()], date(9), &EffortModel::default()).unwrap();
        let q2 = aggregate(&[b, a], date(9), &EffortModel::default()).unwrap();
        assert_eq!(q1, q2);
    }

    #[test]
    fn test_estimates_attached() {
        let courses = vec![CourseStructure::new("A").with_chapter(
            Chapter::new("a1", 100)
                .with_complexity(Complexity::High)
                .with_topic("Limits"),
        )];
        let effort = EffortModel::default().with_practice_buffer(0.0);
        let queue = aggregate(&courses, date(9), &effort).unwrap();
        let item = queue.front().unwrap();
        assert!((item.estimated_minutes - 500.0).abs() < 1e-10);
        assert_eq!(item.remaining_minutes, item.estimated_minutes);
        assert_eq!(item.topics, vec!["Limits".to_string()]);
        assert_eq!(item.days_until_exam, None);
    }

    #[test]
    fn test_zero_pages_propagates() {
        let courses = vec![CourseStructure::new("A").with_chapter(Chapter::new("a1", 0))];
        assert_eq!(
            aggregate(&courses, date(9), &EffortModel::default()),
            Err(EffortError::ZeroPages)
        );
    }

    #[test]
    fn test_queue_queries() {
        let exam = date(10);
        let mut queue = WorkQueue::from_items(vec![
            WorkItem::new("A", 0, "a1", 100.0).with_exam(Some(exam), date(9)),
            WorkItem::new("B", 0, "b1", 50.0),
        ]);
        assert_eq!(queue.len(), 2);
        assert!(queue.has_course("A"));
        assert!((queue.remaining_minutes_for("A") - 100.0).abs() < 1e-10);
        assert!((queue.total_remaining_minutes() - 150.0).abs() < 1e-10);
        assert!(queue.first_overdue(date(9)).is_none());
        assert_eq!(queue.first_overdue(exam).unwrap().course_name, "A");

        queue.front_mut().unwrap().consume(100.0);
        let done = queue.pop_front().unwrap();
        assert!(done.is_complete());
        assert!(!queue.has_course("A"));
    }
}
