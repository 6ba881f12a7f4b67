//! Plan quality metrics (KPIs).
//!
//! Computes workload indicators from a finished plan.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Study / break days | Days with and without study load |
//! | Peak day | Largest single-day load |
//! | Avg study day | Mean hours over study days |
//! | Cap utilization | Scheduled minutes / (study days × cap) |
//! | Hours by course | Study and review hours per course |
//! | Finish date | Last study session per course |
//! | Fragmentation | Max distinct days any one chapter spans |

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::PlanningConstraints;
use crate::models::{round_hours, FullPlan, SessionKind};

/// Plan workload indicators.
///
/// Per-course maps are ordered by course name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanKpi {
    pub study_days: u32,
    pub break_days: u32,
    pub review_sessions: usize,
    pub total_hours: f64,
    /// Largest single-day load (hours).
    pub peak_day_hours: f64,
    /// Mean load over study days (hours).
    pub avg_study_day_hours: f64,
    /// Fraction of available study-day capacity used (0.0..1.0).
    pub cap_utilization: f64,
    /// Scheduled hours per course, reviews included.
    pub hours_by_course: BTreeMap<String, f64>,
    /// Date of each course's last study (not review) session.
    pub finish_dates: BTreeMap<String, NaiveDate>,
    /// Most distinct days any single chapter is spread across.
    pub max_chapter_span_days: usize,
}

impl PlanKpi {
    /// Computes KPIs from a plan.
    pub fn calculate(plan: &FullPlan, constraints: &PlanningConstraints) -> Self {
        let study_days = plan.days.iter().filter(|d| d.is_study_day()).count() as u32;
        let break_days = plan.break_days().count() as u32;

        let mut minutes_by_course: BTreeMap<String, f64> = BTreeMap::new();
        let mut finish_dates: BTreeMap<String, NaiveDate> = BTreeMap::new();
        let mut chapter_days: BTreeMap<(&str, usize), usize> = BTreeMap::new();
        let mut review_sessions = 0;

        for day in &plan.days {
            for session in &day.sessions {
                *minutes_by_course.entry(session.course.clone()).or_default() += session.minutes;
                match session.kind {
                    SessionKind::Review => review_sessions += 1,
                    SessionKind::Study => {
                        let last = finish_dates.entry(session.course.clone()).or_insert(day.date);
                        *last = (*last).max(day.date);
                    }
                }
                if let Some(index) = session.chapter_index {
                    *chapter_days.entry((session.course.as_str(), index)).or_default() += 1;
                }
            }
        }

        let total_minutes: f64 = minutes_by_course.values().sum();
        let peak_minutes = plan.days.iter().map(|d| d.minutes()).fold(0.0, f64::max);

        let avg_study_day_hours = if study_days == 0 {
            0.0
        } else {
            round_hours(total_minutes / study_days as f64)
        };

        let capacity = study_days as f64 * constraints.daily_cap_minutes;
        let cap_utilization = if capacity > 0.0 {
            total_minutes / capacity
        } else {
            0.0
        };

        Self {
            study_days,
            break_days,
            review_sessions,
            total_hours: round_hours(total_minutes),
            peak_day_hours: round_hours(peak_minutes),
            avg_study_day_hours,
            cap_utilization,
            hours_by_course: minutes_by_course
                .into_iter()
                .map(|(course, minutes)| (course, round_hours(minutes)))
                .collect(),
            finish_dates,
            max_chapter_span_days: chapter_days.values().copied().max().unwrap_or(0),
        }
    }

    /// Whether the plan stays within the given load thresholds.
    pub fn meets_thresholds(&self, max_peak_hours: f64, min_utilization: f64) -> bool {
        self.peak_day_hours <= max_peak_hours && self.cap_utilization >= min_utilization
    }
}
