//! Plan totals and post-allocation checks.
//!
//! [`summarize`] wraps allocated days into a [`FullPlan`], computing totals
//! and re-checking the plan invariants. The allocator should never produce
//! a violation; anything found here is reported as a [`ConstraintWarning`]
//! rather than rejected, so callers still get a usable plan.

use tracing::warn;

use crate::config::PlanningConstraints;
use crate::models::{round_hours, ConstraintWarning, FullPlan, StudyDay, WarningKind, MINUTE_EPSILON};

const WEEK: usize = 7;

/// Builds the final plan from allocated days.
pub fn summarize(days: Vec<StudyDay>, constraints: &PlanningConstraints) -> FullPlan {
    let total_study_days = days.iter().filter(|d| d.is_study_day()).count() as u32;
    let total_minutes: f64 = days.iter().map(|d| d.minutes()).sum();
    let warnings = check_plan(&days, constraints);

    for w in &warnings {
        warn!(kind = ?w.kind, date = ?w.date, "{}", w.message);
    }

    FullPlan {
        days,
        total_study_days,
        total_hours: round_hours(total_minutes),
        warnings,
    }
}

/// Checks allocated days against the daily cap, date continuity and the
/// weekly rest rule.
pub fn check_plan(days: &[StudyDay], constraints: &PlanningConstraints) -> Vec<ConstraintWarning> {
    let mut warnings = Vec::new();
    let cap = constraints.daily_cap_minutes;
    let cap_hours = constraints.daily_cap_hours();

    for pair in days.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let contiguous = prev.date.succ_opt() == Some(next.date) && next.day_index == prev.day_index + 1;
        if !contiguous {
            warnings.push(ConstraintWarning::new(
                WarningKind::DateGap,
                Some(next.date),
                "",
                format!(
                    "Day {} ({}) does not follow day {} ({})",
                    next.day_index, next.date, prev.day_index, prev.date
                ),
            ));
        }
    }

    for day in days {
        let minutes = day.minutes();
        if minutes > cap + MINUTE_EPSILON {
            warnings.push(ConstraintWarning::new(
                WarningKind::DailyCapExceeded,
                Some(day.date),
                day.course.clone().unwrap_or_default(),
                format!("{:.0} minutes scheduled, cap is {:.0}", minutes, cap),
            ));
        } else if day.display_hours() > cap_hours + MINUTE_EPSILON {
            warnings.push(ConstraintWarning::new(
                WarningKind::RoundedAboveCap,
                Some(day.date),
                day.course.clone().unwrap_or_default(),
                format!(
                    "{:.1} displayed hours exceed the {:.2} hour cap",
                    day.display_hours(),
                    cap_hours
                ),
            ));
        }
    }

    let min_rest = constraints.min_break_days_per_week as usize;
    if min_rest > 0 && days.len() >= WEEK {
        for window in days.windows(WEEK) {
            let breaks = window.iter().filter(|d| d.is_break).count();
            if breaks < min_rest {
                warnings.push(ConstraintWarning::new(
                    WarningKind::MissingWeeklyBreak,
                    Some(window[0].date),
                    "",
                    format!(
                        "{} to {} has {} break day(s), {} required",
                        window[0].date,
                        window[WEEK - 1].date,
                        breaks,
                        min_rest
                    ),
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BreakReason, StudySession, WorkItem};
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn study(index: u32, d: u32, minutes: f64) -> StudyDay {
        let item = WorkItem::new("A", 0, "Logic", minutes);
        StudyDay::with_sessions(index, date(d), vec![StudySession::study(&item, minutes, false)])
    }

    fn rest(index: u32, d: u32) -> StudyDay {
        StudyDay::rest(index, date(d), BreakReason::WeeklyRest)
    }

    fn week(study_minutes: f64) -> Vec<StudyDay> {
        let mut days: Vec<StudyDay> = (1..=6).map(|i| study(i, 8 + i, study_minutes)).collect();
        days.push(rest(7, 15));
        days
    }

    #[test]
    fn test_totals() {
        let plan = summarize(week(240.0), &PlanningConstraints::default());
        assert_eq!(plan.total_study_days, 6);
        assert!((plan.total_hours - 24.0).abs() < 1e-10);
        assert!(plan.is_clean());
    }

    #[test]
    fn test_total_hours_rounded() {
        let days = vec![study(1, 9, 13.0), study(2, 10, 20.0)];
        let plan = summarize(days, &PlanningConstraints::default());
        assert!((plan.total_hours - 0.55).abs() < 1e-10);
    }

    #[test]
    fn test_cap_exceeded() {
        let days = vec![study(1, 9, 300.0)];
        let warnings = check_plan(&days, &PlanningConstraints::default());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::DailyCapExceeded);
        assert_eq!(warnings[0].date, Some(date(9)));
    }

    #[test]
    fn test_rounding_above_cap() {
        let constraints = PlanningConstraints::new().with_daily_cap_minutes(110.0);
        let warnings = check_plan(&[study(1, 9, 108.0)], &constraints);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::RoundedAboveCap);
    }

    #[test]
    fn test_date_gap() {
        let days = vec![study(1, 9, 60.0), study(2, 11, 60.0)];
        let warnings = check_plan(&days, &PlanningConstraints::default());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::DateGap);
    }

    #[test]
    fn test_missing_weekly_break() {
        let days: Vec<StudyDay> = (1..=7).map(|i| study(i, 8 + i, 60.0)).collect();
        let warnings = check_plan(&days, &PlanningConstraints::default());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::MissingWeeklyBreak);

        let relaxed = PlanningConstraints::new().with_min_break_days_per_week(0);
        assert!(check_plan(&days, &relaxed).is_empty());
    }

    #[test]
    fn test_short_plan_skips_weekly_check() {
        let days: Vec<StudyDay> = (1..=6).map(|i| study(i, 8 + i, 60.0)).collect();
        assert!(check_plan(&days, &PlanningConstraints::default()).is_empty());
    }

    #[test]
    fn test_empty_plan() {
        let plan = summarize(Vec::new(), &PlanningConstraints::default());
        assert_eq!(plan.total_study_days, 0);
        assert_eq!(plan.total_hours, 0.0);
        assert!(plan.is_clean());
    }
}
