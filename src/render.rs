//! Plan rendering.
//!
//! Both formats use the columns Day, Date, Course, Chapter, Task, Hours, with
//! hours rounded to the half hour for display.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::{FullPlan, StudyDay};
use crate::scheduler::PlanKpi;

/// Errors producing CSV output.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv flush failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv output is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    #[serde(rename = "Day")]
    day: u32,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Course")]
    course: &'a str,
    #[serde(rename = "Chapter")]
    chapter: &'a str,
    #[serde(rename = "Task")]
    task: &'a str,
    #[serde(rename = "Hours")]
    hours: f64,
}

impl<'a> From<&'a StudyDay> for Row<'a> {
    fn from(day: &'a StudyDay) -> Self {
        Self {
            day: day.day_index,
            date: day.date,
            course: day.course.as_deref().unwrap_or("-"),
            chapter: &day.chapter_label,
            task: &day.task,
            hours: day.display_hours(),
        }
    }
}

/// Renders the plan as a Markdown table followed by a summary.
pub fn to_markdown(plan: &FullPlan) -> String {
    let mut out = String::new();
    out.push_str("| Day | Date | Course | Chapter | Task | Hours |\n");
    out.push_str("|-----|------|--------|---------|------|-------|\n");

    for day in &plan.days {
        let row = Row::from(day);
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {:.1} |\n",
            row.day,
            row.date,
            escape(row.course),
            escape(row.chapter),
            escape(row.task),
            row.hours
        ));
    }

    out.push_str(&format!(
        "\n**Total:** {} study days, {:.2} hours\n",
        plan.total_study_days, plan.total_hours
    ));

    if !plan.warnings.is_empty() {
        out.push_str("\n**Warnings:**\n");
        for w in &plan.warnings {
            match w.date {
                Some(date) => out.push_str(&format!("- {date}: {}\n", w.message)),
                None => out.push_str(&format!("- {}\n", w.message)),
            }
        }
    }
    out
}

/// Renders workload metrics as a Markdown section.
pub fn kpi_markdown(kpi: &PlanKpi) -> String {
    let mut out = String::from("\n**Per course:**\n");
    for (course, hours) in &kpi.hours_by_course {
        match kpi.finish_dates.get(course) {
            Some(done) => out.push_str(&format!("- {course}: {hours:.2} hours, content finished {done}\n")),
            None => out.push_str(&format!("- {course}: {hours:.2} hours\n")),
        }
    }
    out.push_str(&format!(
        "\nPeak day {:.2} h, average study day {:.2} h, {:.0}% of capacity used, {} review session(s)\n",
        kpi.peak_day_hours,
        kpi.avg_study_day_hours,
        kpi.cap_utilization * 100.0,
        kpi.review_sessions
    ));
    out
}

/// Renders the plan as CSV with a header row.
pub fn to_csv(plan: &FullPlan) -> Result<String, RenderError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for day in &plan.days {
        writer.serialize(Row::from(day))?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|")
}
