//! Study plan (solution) model.
//!
//! A plan is one [`StudyDay`] per calendar date, each holding the study
//! sessions scheduled that day. Day-level labels (course, chapter range,
//! task, hours) are derived from the sessions and kept in sync by
//! [`StudyDay::push_session`].
//!
//! Hours are carried exactly (minutes / 60, to two decimals). Half-hour
//! rounding is a presentation concern, see [`StudyDay::display_hours`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::work_item::{WorkItem, MINUTE_EPSILON};

/// What a session is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// Primary reading of a chapter slice.
    Study,
    /// Low-effort review shortly before an exam.
    Review,
}

/// Why a day carries no study load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakReason {
    /// Required by the weekly rest rule.
    WeeklyRest,
    /// Nothing left to schedule that day.
    Idle,
}

/// One (day, work-item slice) pairing, or a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    /// Course studied.
    pub course: String,
    /// Textbook position of the chapter (0-indexed). `None` for reviews.
    pub chapter_index: Option<usize>,
    /// Chapter title. `None` for reviews.
    pub chapter_name: Option<String>,
    /// Session purpose.
    pub kind: SessionKind,
    /// Whether this slice continues a chapter started on an earlier day.
    pub continuation: bool,
    /// Scheduled minutes.
    pub minutes: f64,
    /// Short task description.
    pub task: String,
}

impl StudySession {
    /// A slice of `minutes` taken from `item`.
    pub fn study(item: &WorkItem, minutes: f64, continuation: bool) -> Self {
        let verb = if continuation { "Continue" } else { "Study" };
        let task = if item.topics.is_empty() {
            format!("{verb} {}", item.chapter_name)
        } else {
            format!("{verb} {}: {}", item.chapter_name, item.topics.join(", "))
        };
        Self {
            course: item.course_name.clone(),
            chapter_index: Some(item.chapter_index),
            chapter_name: Some(item.chapter_name.clone()),
            kind: SessionKind::Study,
            continuation,
            minutes,
            task,
        }
    }

    /// A review of `course`, covering `chapter_label` (e.g. "Ch 1-10").
    pub fn review(course: impl Into<String>, minutes: f64, chapter_label: &str) -> Self {
        let course = course.into();
        let task = if chapter_label.is_empty() {
            format!("Review {course}: practice problems")
        } else {
            format!("Review {course}: {chapter_label} summary and practice problems")
        };
        Self {
            course,
            chapter_index: None,
            chapter_name: None,
            kind: SessionKind::Review,
            continuation: false,
            minutes,
            task,
        }
    }

    /// 1-based chapter number, if this is a study slice.
    pub fn chapter_number(&self) -> Option<u32> {
        self.chapter_index.map(|i| i as u32 + 1)
    }

    /// Scheduled hours (unrounded).
    #[inline]
    pub fn hours(&self) -> f64 {
        self.minutes / 60.0
    }
}

/// One calendar day of the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyDay {
    /// 1-based position in the plan.
    pub day_index: u32,
    /// Calendar date (`start_date + day_index - 1`).
    pub date: NaiveDate,
    /// Course(s) studied, joined with " / ". `None` on break days.
    pub course: Option<String>,
    /// Human-readable chapter range, e.g. "Ch 1-2".
    pub chapter_label: String,
    /// Short description of the day's work.
    pub task: String,
    /// Exact study hours, to two decimals.
    pub estimated_hours: f64,
    /// Whether this is a zero-load rest day.
    pub is_break: bool,
    /// Why the day is a break, if it is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_reason: Option<BreakReason>,
    /// Sessions in scheduling order.
    #[serde(default)]
    pub sessions: Vec<StudySession>,
}

impl StudyDay {
    /// A break day with no sessions.
    pub fn rest(day_index: u32, date: NaiveDate, reason: BreakReason) -> Self {
        let task = match reason {
            BreakReason::WeeklyRest => "Break day",
            BreakReason::Idle => "Rest day",
        };
        Self {
            day_index,
            date,
            course: None,
            chapter_label: "-".to_string(),
            task: task.to_string(),
            estimated_hours: 0.0,
            is_break: true,
            break_reason: Some(reason),
            sessions: Vec::new(),
        }
    }

    /// A study day from the given sessions.
    ///
    /// An empty session list yields an idle rest day.
    pub fn with_sessions(day_index: u32, date: NaiveDate, sessions: Vec<StudySession>) -> Self {
        let mut day = Self::rest(day_index, date, BreakReason::Idle);
        for session in sessions {
            day.push_session(session);
        }
        day
    }

    /// Appends a session and refreshes the derived labels.
    ///
    /// A break day receiving a session becomes a study day.
    pub fn push_session(&mut self, session: StudySession) {
        self.sessions.push(session);
        self.refresh();
    }

    /// Scheduled minutes across all sessions.
    pub fn minutes(&self) -> f64 {
        self.sessions.iter().map(|s| s.minutes).sum()
    }

    /// Hours rounded to the nearest half hour, with a half-hour minimum
    /// for any day that has study load.
    pub fn display_hours(&self) -> f64 {
        let minutes = self.minutes();
        if minutes <= MINUTE_EPSILON {
            return 0.0;
        }
        ((minutes / 60.0) * 2.0).round().max(1.0) / 2.0
    }

    /// Whether the day carries study load.
    pub fn is_study_day(&self) -> bool {
        !self.is_break && self.minutes() > MINUTE_EPSILON
    }

    /// Whether any session on this day belongs to `course`.
    pub fn has_course(&self, course: &str) -> bool {
        self.sessions.iter().any(|s| s.course == course)
    }

    fn refresh(&mut self) {
        if self.sessions.is_empty() {
            return;
        }
        self.is_break = false;
        self.break_reason = None;

        let mut courses: Vec<&str> = Vec::new();
        for s in &self.sessions {
            if !courses.contains(&s.course.as_str()) {
                courses.push(&s.course);
            }
        }

        let labels: Vec<String> = courses
            .iter()
            .map(|course| {
                let mut parts: Vec<(u32, bool)> = self
                    .sessions
                    .iter()
                    .filter(|s| s.course == *course)
                    .filter_map(|s| s.chapter_number().map(|n| (n, s.continuation)))
                    .collect();
                if parts.is_empty() {
                    "Review".to_string()
                } else {
                    parts.sort_unstable();
                    parts.dedup_by_key(|p| p.0);
                    format_chapter_range(&parts)
                }
            })
            .collect();

        self.course = Some(courses.join(" / "));
        self.chapter_label = labels.join(" / ");
        self.task = self
            .sessions
            .iter()
            .map(|s| s.task.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        self.estimated_hours = round_hours(self.minutes());
    }
}

/// Formats sorted `(chapter_number, continuation)` pairs as "Ch 1-2, 4".
///
/// Continuation chapters are marked "(cont.)" and never merged into a run.
pub fn format_chapter_range(parts: &[(u32, bool)]) -> String {
    fn flush(run: &mut Option<(u32, u32)>, segments: &mut Vec<String>) {
        if let Some((lo, hi)) = run.take() {
            if lo == hi {
                segments.push(lo.to_string());
            } else {
                segments.push(format!("{lo}-{hi}"));
            }
        }
    }

    let mut segments: Vec<String> = Vec::new();
    let mut run: Option<(u32, u32)> = None;

    for &(number, continuation) in parts {
        if continuation {
            flush(&mut run, &mut segments);
            segments.push(format!("{number} (cont.)"));
            continue;
        }
        match run.as_mut() {
            Some((_, hi)) if number == *hi + 1 => *hi = number,
            _ => {
                flush(&mut run, &mut segments);
                run = Some((number, number));
            }
        }
    }
    flush(&mut run, &mut segments);

    if segments.is_empty() {
        String::new()
    } else {
        format!("Ch {}", segments.join(", "))
    }
}

/// Minutes to hours, rounded to two decimals.
pub(crate) fn round_hours(minutes: f64) -> f64 {
    (minutes / 60.0 * 100.0).round() / 100.0
}

/// A soft constraint violation found after allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintWarning {
    /// Warning category.
    pub kind: WarningKind,
    /// Date the warning refers to, if any.
    pub date: Option<NaiveDate>,
    /// Related entity (course name, or empty).
    pub entity: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of plan warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Scheduled minutes exceed the daily cap.
    DailyCapExceeded,
    /// Half-hour rounding pushes displayed hours above the cap.
    RoundedAboveCap,
    /// Consecutive days are not consecutive dates.
    DateGap,
    /// A 7-day window lacks the required break days.
    MissingWeeklyBreak,
    /// A course's declared page total disagrees with its chapters.
    TotalPagesMismatch,
}

impl ConstraintWarning {
    /// Creates a warning.
    pub fn new(
        kind: WarningKind,
        date: Option<NaiveDate>,
        entity: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let severity = match kind {
            WarningKind::DailyCapExceeded => 70,
            WarningKind::MissingWeeklyBreak => 60,
            WarningKind::DateGap => 90,
            WarningKind::RoundedAboveCap => 20,
            WarningKind::TotalPagesMismatch => 10,
        };
        Self {
            kind,
            date,
            entity: entity.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Diagnostic for an exam deadline that cannot be met.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Infeasibility {
    /// Course whose exam cannot be met.
    pub course: String,
    /// Unscheduled work for that course (minutes).
    pub shortfall_minutes: f64,
    /// Date on which the shortfall was detected.
    pub detected_on: NaiveDate,
    /// The course's exam date.
    pub exam_date: NaiveDate,
}

/// A complete study plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullPlan {
    /// Days in chronological order, one per calendar date.
    pub days: Vec<StudyDay>,
    /// Days with `is_break == false` and positive hours.
    pub total_study_days: u32,
    /// Sum of hours across all days, to two decimals.
    pub total_hours: f64,
    /// Soft violations detected after allocation.
    #[serde(default)]
    pub warnings: Vec<ConstraintWarning>,
}

impl FullPlan {
    /// First date of the plan.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.date)
    }

    /// Last date of the plan.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|d| d.date)
    }

    /// The day scheduled on `date`.
    pub fn day_on(&self, date: NaiveDate) -> Option<&StudyDay> {
        self.days.iter().find(|d| d.date == date)
    }

    /// Whether no warnings were raised.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Break days in order.
    pub fn break_days(&self) -> impl Iterator<Item = &StudyDay> {
        self.days.iter().filter(|d| d.is_break)
    }

    /// All sessions in chronological order, paired with their date.
    pub fn sessions(&self) -> impl Iterator<Item = (NaiveDate, &StudySession)> {
        self.days
            .iter()
            .flat_map(|d| d.sessions.iter().map(move |s| (d.date, s)))
    }

    /// Minutes scheduled for one chapter of one course.
    pub fn minutes_for_chapter(&self, course: &str, chapter_index: usize) -> f64 {
        self.sessions()
            .filter(|(_, s)| s.course == course && s.chapter_index == Some(chapter_index))
            .map(|(_, s)| s.minutes)
            .sum()
    }

    /// Number of distinct days on which one chapter is studied.
    pub fn days_for_chapter(&self, course: &str, chapter_index: usize) -> usize {
        self.days
            .iter()
            .filter(|d| {
                d.sessions
                    .iter()
                    .any(|s| s.course == course && s.chapter_index == Some(chapter_index))
            })
            .count()
    }

    /// Last date on which `course` has a session.
    pub fn last_session_date(&self, course: &str) -> Option<NaiveDate> {
        self.sessions()
            .filter(|(_, s)| s.course == course)
            .map(|(d, _)| d)
            .max()
    }

    /// Review sessions for `course`, with their dates.
    pub fn reviews_for(&self, course: &str) -> Vec<(NaiveDate, &StudySession)> {
        self.sessions()
            .filter(|(_, s)| s.course == course && s.kind == SessionKind::Review)
            .collect()
    }
}
