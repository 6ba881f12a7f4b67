//! Day-by-day allocation of work items.
//!
//! # Algorithm
//!
//! Pass 1 walks calendar days from the start date:
//! 1. Stop with a diagnostic if any course reached its exam with work left.
//! 2. Rest if the weekly rule demands it (see [`must_rest`]).
//! 3. Otherwise fill up to the daily cap from the front of the queue,
//!    spanning several items if the front one is small and carrying a
//!    large item's remainder into the next study day.
//! 4. A day with nothing to do is an idle rest day.
//!
//! Pass 2 inserts one review per finished course on the latest day before
//! its exam that has spare capacity, or on an idle rest day whose
//! conversion keeps every 7-day window rested.
//!
//! Because pass 1 packs contiguously, an item spans at most
//! `ceil(estimate / cap) + 1` study days.
//!
//! # Complexity
//! O(d × n) where d = plan days and n = work items.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{Days, NaiveDate};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::config::PlanningConstraints;
use crate::error::PlanError;
use crate::models::{
    format_chapter_range, BreakReason, Infeasibility, StudyDay, StudySession, MINUTE_EPSILON,
};
use crate::priority::WorkQueue;

/// Length of the rolling rest window (days).
const WEEK: usize = 7;

/// Output of allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Days in chronological order.
    pub days: Vec<StudyDay>,
    /// Set when an exam deadline was missed; `days` then ends the day before
    /// detection.
    pub infeasibility: Option<Infeasibility>,
}

/// A course whose last chapter has been scheduled.
#[derive(Debug, Clone)]
struct Completion {
    course: String,
    completed_on: NaiveDate,
    exam_date: Option<NaiveDate>,
}

/// Whether the next day must be a rest day.
///
/// `rest_flags` holds one entry per day already planned (`true` = rest).
/// A day must rest when the previous six days already contain the maximum
/// number of study days a 7-day window allows (`7 - min_rest`).
pub fn must_rest(rest_flags: &[bool], min_rest: usize) -> bool {
    if min_rest == 0 {
        return false;
    }
    let window = &rest_flags[rest_flags.len().saturating_sub(WEEK - 1)..];
    let study_days = window.iter().filter(|rest| !**rest).count();
    study_days >= WEEK.saturating_sub(min_rest)
}

/// Whether every full 7-day window touching `index` holds `min_rest` rests.
fn windows_rested_around(rest_flags: &[bool], index: usize, min_rest: usize) -> bool {
    if rest_flags.len() < WEEK {
        return true;
    }
    let first = index.saturating_sub(WEEK - 1);
    let last = index.min(rest_flags.len() - WEEK);
    (first..=last).all(|start| {
        rest_flags[start..start + WEEK]
            .iter()
            .filter(|rest| **rest)
            .count()
            >= min_rest
    })
}

/// Allocates work items to calendar days.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use study_planner::config::PlanningConstraints;
/// use study_planner::models::WorkItem;
/// use study_planner::priority::WorkQueue;
/// use study_planner::scheduler::DayAllocator;
///
/// let start = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
/// let queue = WorkQueue::from_items(vec![WorkItem::new("Math135", 0, "Logic", 500.0)]);
///
/// let allocation = DayAllocator::new(PlanningConstraints::default())
///     .allocate(queue, start)
///     .unwrap();
/// assert_eq!(allocation.days.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct DayAllocator {
    constraints: PlanningConstraints,
    cancel: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl DayAllocator {
    /// Creates an allocator.
    pub fn new(constraints: PlanningConstraints) -> Self {
        Self {
            constraints,
            cancel: None,
            deadline: None,
        }
    }

    /// Stops allocation when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Stops allocation once `deadline` passes.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Walks the calendar from `start_date`, assigning queued work.
    ///
    /// # Errors
    /// - [`PlanError::Cancelled`] if the token fires or the deadline passes.
    /// - [`PlanError::HorizonExceeded`] if the plan outgrows `max_horizon_days`.
    ///
    /// A missed exam is not an error here: it is reported through
    /// [`Allocation::infeasibility`] alongside the days built so far.
    #[instrument(skip_all, fields(start = %start_date, items = queue.len()))]
    pub fn allocate(
        &self,
        queue: WorkQueue,
        start_date: NaiveDate,
    ) -> Result<Allocation, PlanError> {
        let mut queue = queue;
        let min_rest = self.constraints.min_break_days_per_week as usize;
        let cap = self.constraints.daily_cap_minutes;
        let max_days = self.constraints.max_horizon_days;

        let last_study_date = queue
            .iter()
            .filter_map(|i| i.exam_date)
            .max()
            .and_then(|exam| exam.pred_opt());

        let mut chapters_by_course: BTreeMap<String, Vec<(u32, bool)>> = BTreeMap::new();
        for item in queue.iter() {
            chapters_by_course
                .entry(item.course_name.clone())
                .or_default()
                .push((item.chapter_number(), false));
        }

        let mut days: Vec<StudyDay> = Vec::new();
        let mut rest_flags: Vec<bool> = Vec::new();
        let mut completions: Vec<Completion> = Vec::new();
        let mut offset: u32 = 0;

        loop {
            let date = start_date
                .checked_add_days(Days::new(offset as u64))
                .ok_or(PlanError::HorizonExceeded { max_days })?;

            if queue.is_empty() && last_study_date.map_or(true, |end| date > end) {
                break;
            }
            if offset >= max_days {
                return Err(PlanError::HorizonExceeded { max_days });
            }

            let day_index = offset + 1;
            self.check_interrupt(day_index)?;

            if let Some(item) = queue.first_overdue(date) {
                let course = item.course_name.clone();
                let exam_date = item.exam_date.unwrap_or(date);
                let shortfall_minutes = queue.remaining_minutes_for(&course);
                warn!(
                    course = %course,
                    shortfall_minutes,
                    detected_on = %date,
                    "exam deadline cannot be met"
                );
                return Ok(Allocation {
                    days,
                    infeasibility: Some(Infeasibility {
                        course,
                        shortfall_minutes,
                        detected_on: date,
                        exam_date,
                    }),
                });
            }

            if must_rest(&rest_flags, min_rest) {
                debug!(day = day_index, %date, "weekly rest");
                days.push(StudyDay::rest(day_index, date, BreakReason::WeeklyRest));
                rest_flags.push(true);
                offset += 1;
                continue;
            }

            let mut capacity = cap;
            let mut sessions = Vec::new();
            while capacity > MINUTE_EPSILON {
                let Some(item) = queue.front_mut() else {
                    break;
                };
                let continuation = item.is_started();
                let taken = item.consume(capacity);
                capacity -= taken;
                sessions.push(StudySession::study(item, taken, continuation));

                if item.is_complete() {
                    if let Some(done) = queue.pop_front() {
                        if !queue.has_course(&done.course_name) {
                            debug!(course = %done.course_name, %date, "course content complete");
                            completions.push(Completion {
                                course: done.course_name,
                                completed_on: date,
                                exam_date: done.exam_date,
                            });
                        }
                    }
                }
            }

            let day = if sessions.is_empty() {
                StudyDay::rest(day_index, date, BreakReason::Idle)
            } else {
                StudyDay::with_sessions(day_index, date, sessions)
            };
            debug!(
                day = day_index,
                %date,
                hours = day.estimated_hours,
                label = %day.chapter_label,
                "planned day"
            );
            rest_flags.push(day.is_break);
            days.push(day);
            offset += 1;
        }

        self.insert_reviews(&mut days, &mut rest_flags, &completions, &chapters_by_course);

        Ok(Allocation {
            days,
            infeasibility: None,
        })
    }

    fn check_interrupt(&self, day_index: u32) -> Result<(), PlanError> {
        let cancelled = self.cancel.as_ref().is_some_and(|t| t.is_cancelled());
        let expired = self.deadline.is_some_and(|d| Instant::now() >= d);
        if cancelled || expired {
            return Err(PlanError::Cancelled { day_index });
        }
        Ok(())
    }

    /// Places one review per finished course, as late before its exam as
    /// capacity and the weekly rest rule allow.
    fn insert_reviews(
        &self,
        days: &mut [StudyDay],
        rest_flags: &mut [bool],
        completions: &[Completion],
        chapters_by_course: &BTreeMap<String, Vec<(u32, bool)>>,
    ) {
        let minutes = self.constraints.review_minutes();
        if minutes <= MINUTE_EPSILON {
            return;
        }
        let cap = self.constraints.daily_cap_minutes;
        let min_rest = self.constraints.min_break_days_per_week as usize;

        for completion in completions {
            let Some(exam) = completion.exam_date else {
                continue;
            };
            let lead = (exam - completion.completed_on).num_days();
            if lead < self.constraints.review_min_lead_days {
                debug!(course = %completion.course, lead, "too close to exam for a review");
                continue;
            }

            let label = chapters_by_course
                .get(&completion.course)
                .map(|parts| {
                    let mut parts = parts.clone();
                    parts.sort_unstable();
                    format_chapter_range(&parts)
                })
                .unwrap_or_default();

            let slot = (0..days.len()).rev().find(|&idx| {
                let day = &days[idx];
                if day.date >= exam || day.date < completion.completed_on {
                    return false;
                }
                match day.break_reason {
                    Some(BreakReason::WeeklyRest) => false,
                    Some(BreakReason::Idle) => {
                        let mut trial = rest_flags.to_vec();
                        trial[idx] = false;
                        windows_rested_around(&trial, idx, min_rest)
                    }
                    None => cap - day.minutes() + MINUTE_EPSILON >= minutes,
                }
            });

            match slot {
                Some(idx) => {
                    debug!(course = %completion.course, date = %days[idx].date, "review scheduled");
                    days[idx].push_session(StudySession::review(&completion.course, minutes, &label));
                    rest_flags[idx] = false;
                }
                None => {
                    debug!(course = %completion.course, "no capacity for a review before the exam");
                }
            }
        }
    }
}

/// Allocates `queue` from `start_date` under `constraints`.
///
/// Shorthand for [`DayAllocator::allocate`] without cancellation.
pub fn allocate(
    queue: WorkQueue,
    start_date: NaiveDate,
    constraints: &PlanningConstraints,
) -> Result<Allocation, PlanError> {
    DayAllocator::new(constraints.clone()).allocate(queue, start_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionKind, WorkItem};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn start() -> NaiveDate {
        date(9)
    }

    fn item(course: &str, index: usize, minutes: f64, exam: Option<NaiveDate>) -> WorkItem {
        WorkItem::new(course, index, format!("Chapter {}", index + 1), minutes).with_exam(exam, start())
    }

    fn run(items: Vec<WorkItem>, constraints: &PlanningConstraints) -> Allocation {
        allocate(WorkQueue::from_items(items), start(), constraints).unwrap()
    }

    #[test]
    fn test_must_rest_rule() {
        assert!(!must_rest(&[], 1));
        assert!(!must_rest(&[false; 5], 1));
        assert!(must_rest(&[false; 6], 1));
        assert!(!must_rest(&[false, false, true, false, false, false], 1));
        assert!(!must_rest(&[false; 6], 0));
        // Two rests per week: after five study days, rest twice.
        assert!(must_rest(&[false; 5], 2));
        assert!(must_rest(&[false, false, false, false, false, true], 2));
        assert!(!must_rest(&[false, false, false, false, true, true], 2));
    }

    #[test]
    fn test_windows_rested_around() {
        let flags = [false, false, false, false, false, false, true, false];
        assert!(windows_rested_around(&flags, 7, 1));
        let flags = [false; 8];
        assert!(!windows_rested_around(&flags, 3, 1));
        assert!(windows_rested_around(&[false; 6], 2, 1));
    }

    #[test]
    fn test_large_item_spans_days() {
        let allocation = run(vec![item("A", 0, 500.0, None)], &PlanningConstraints::default());
        assert!(allocation.infeasibility.is_none());
        assert_eq!(allocation.days.len(), 3);

        let minutes: Vec<f64> = allocation.days.iter().map(|d| d.minutes()).collect();
        assert_eq!(minutes, vec![240.0, 240.0, 20.0]);
        assert_eq!(allocation.days[1].chapter_label, "Ch 1 (cont.)");
        assert!(allocation.days[2].minutes() < 240.0);
    }

    #[test]
    fn test_small_items_share_day() {
        let allocation = run(
            vec![
                item("A", 0, 60.0, None),
                item("A", 1, 90.0, None),
                item("A", 2, 200.0, None),
            ],
            &PlanningConstraints::default(),
        );
        assert_eq!(allocation.days.len(), 2);
        assert_eq!(allocation.days[0].sessions.len(), 3);
        assert_eq!(allocation.days[0].chapter_label, "Ch 1-3");
        assert!((allocation.days[0].minutes() - 240.0).abs() < 1e-9);
        assert_eq!(allocation.days[1].chapter_label, "Ch 3 (cont.)");
        assert!((allocation.days[1].minutes() - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_rest_inserted() {
        // 10 full days of work.
        let allocation = run(vec![item("A", 0, 2400.0, None)], &PlanningConstraints::default());
        let breaks: Vec<u32> = allocation
            .days
            .iter()
            .filter(|d| d.is_break)
            .map(|d| d.day_index)
            .collect();
        assert_eq!(breaks, vec![7]);
        assert_eq!(allocation.days.len(), 11);
        assert_eq!(
            allocation.days[6].break_reason,
            Some(BreakReason::WeeklyRest)
        );
    }

    #[test]
    fn test_no_rest_when_disabled() {
        let constraints = PlanningConstraints::new().with_min_break_days_per_week(0);
        let allocation = run(vec![item("A", 0, 2400.0, None)], &constraints);
        assert_eq!(allocation.days.len(), 10);
        assert!(allocation.days.iter().all(|d| !d.is_break));
    }

    #[test]
    fn test_idle_days_until_last_exam() {
        let allocation = run(
            vec![item("A", 0, 100.0, Some(date(14)))],
            &PlanningConstraints::new().with_review_session_cap_minutes(0.0),
        );
        // Feb 9 .. Feb 13 (day before exam).
        assert_eq!(allocation.days.len(), 5);
        assert!(!allocation.days[0].is_break);
        assert!(allocation.days[1..]
            .iter()
            .all(|d| d.break_reason == Some(BreakReason::Idle)));
    }

    #[test]
    fn test_infeasible_exam() {
        let allocation = run(
            vec![item("A", 0, 600.0, Some(date(10)))],
            &PlanningConstraints::default(),
        );
        let diag = allocation.infeasibility.unwrap();
        assert_eq!(diag.course, "A");
        assert_eq!(diag.detected_on, date(10));
        assert_eq!(diag.exam_date, date(10));
        assert!((diag.shortfall_minutes - 360.0).abs() < 1e-9);
        assert_eq!(allocation.days.len(), 1);
    }

    #[test]
    fn test_exam_on_start_date_is_infeasible() {
        let allocation = run(
            vec![item("A", 0, 30.0, Some(start()))],
            &PlanningConstraints::default(),
        );
        assert!(allocation.days.is_empty());
        assert!((allocation.infeasibility.unwrap().shortfall_minutes - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_review_placed_day_before_exam() {
        let allocation = run(
            vec![item("A", 0, 120.0, Some(date(14)))],
            &PlanningConstraints::default(),
        );
        let review_days: Vec<&StudyDay> = allocation
            .days
            .iter()
            .filter(|d| d.sessions.iter().any(|s| s.kind == SessionKind::Review))
            .collect();
        assert_eq!(review_days.len(), 1);
        assert_eq!(review_days[0].date, date(13));
        assert!((review_days[0].minutes() - 60.0).abs() < 1e-9);
        assert_eq!(review_days[0].task, "Review A: Ch 1 summary and practice problems");
    }

    #[test]
    fn test_no_review_when_exam_too_close() {
        // Finishes Feb 9, exam Feb 10: lead of one day.
        let allocation = run(
            vec![item("A", 0, 120.0, Some(date(10)))],
            &PlanningConstraints::default(),
        );
        assert!(allocation.infeasibility.is_none());
        assert!(allocation
            .days
            .iter()
            .flat_map(|d| &d.sessions)
            .all(|s| s.kind == SessionKind::Study));
    }

    #[test]
    fn test_review_uses_spare_capacity() {
        // A finishes day 1 (exam Feb 12); B keeps Feb 10-11 busy but leaves room on Feb 11.
        let allocation = run(
            vec![
                item("A", 0, 100.0, Some(date(12))),
                item("B", 0, 140.0 + 240.0 + 100.0, None),
            ],
            &PlanningConstraints::default(),
        );
        let feb11 = allocation.days.iter().find(|d| d.date == date(11)).unwrap();
        assert!(feb11.sessions.iter().any(|s| s.kind == SessionKind::Review && s.course == "A"));
        assert!(feb11.minutes() <= 240.0 + 1e-9);
    }

    #[test]
    fn test_review_never_on_weekly_rest() {
        // Six full days then weekly rest on Feb 15; exam Feb 16.
        let allocation = run(
            vec![item("A", 0, 1300.0, Some(date(16)))],
            &PlanningConstraints::default(),
        );
        let rest = allocation.days.iter().find(|d| d.date == date(15)).unwrap();
        assert!(rest.is_break);
        assert!(rest.sessions.is_empty());
    }

    #[test]
    fn test_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let err = DayAllocator::new(PlanningConstraints::default())
            .with_cancellation(token)
            .allocate(WorkQueue::from_items(vec![item("A", 0, 100.0, None)]), start())
            .unwrap_err();
        assert!(matches!(err, PlanError::Cancelled { day_index: 1 }));
    }

    #[test]
    fn test_expired_deadline() {
        let err = DayAllocator::new(PlanningConstraints::default())
            .with_deadline(Instant::now())
            .allocate(WorkQueue::from_items(vec![item("A", 0, 100.0, None)]), start())
            .unwrap_err();
        assert!(matches!(err, PlanError::Cancelled { .. }));
    }

    #[test]
    fn test_horizon_exceeded() {
        let constraints = PlanningConstraints::new().with_max_horizon_days(3);
        let err = allocate(
            WorkQueue::from_items(vec![item("A", 0, 2000.0, None)]),
            start(),
            &constraints,
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::HorizonExceeded { max_days: 3 }));
    }

    #[test]
    fn test_empty_queue() {
        let allocation = run(Vec::new(), &PlanningConstraints::default());
        assert!(allocation.days.is_empty());
        assert!(allocation.infeasibility.is_none());
    }
}
