use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use study_planner::config::PlannerConfig;
use study_planner::error::PlanError;
use study_planner::models::{CourseStructure, FullPlan};
use study_planner::planner::{PlanRequest, StudyPlanner};
use study_planner::render;
use study_planner::scheduler::PlanKpi;

#[derive(Parser)]
#[command(
    name = "study-plan",
    version,
    about = "Build a day-by-day study plan from course structures"
)]
struct Cli {
    /// Request file (.json or .toml) with `courses` and an optional `start_date`
    #[arg(short, long)]
    request: PathBuf,

    /// Planner config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Markdown)]
    format: Format,

    /// First study date, YYYY-MM-DD (overrides the request; defaults to today)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Daily study cap in minutes (overrides the config)
    #[arg(long)]
    daily_cap_minutes: Option<f64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Markdown,
    Csv,
    Json,
}

#[derive(Deserialize)]
struct RequestFile {
    #[serde(default)]
    start_date: Option<NaiveDate>,
    courses: Vec<CourseStructure>,
}

fn load_request(path: &Path, start: Option<NaiveDate>) -> anyhow::Result<PlanRequest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request {}", path.display()))?;

    let file: RequestFile = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?,
        Some("json") | None => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?,
        Some(other) => bail!("unsupported request format '.{other}' (expected .json or .toml)"),
    };

    let start_date = start
        .or(file.start_date)
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    Ok(PlanRequest::new(start_date).with_courses(file.courses))
}

fn render(plan: &FullPlan, config: &PlannerConfig, format: Format) -> anyhow::Result<String> {
    Ok(match format {
        Format::Markdown => {
            let kpi = PlanKpi::calculate(plan, &config.constraints);
            format!("{}{}", render::to_markdown(plan), render::kpi_markdown(&kpi))
        }
        Format::Csv => render::to_csv(plan).context("failed to render CSV")?,
        Format::Json => serde_json::to_string_pretty(plan).context("failed to serialize plan")?,
    })
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    if let Some(cap) = cli.daily_cap_minutes {
        config.constraints.daily_cap_minutes = cap;
    }

    let request = load_request(&cli.request, cli.start)?;
    tracing::info!(
        courses = request.courses.len(),
        start = %request.start_date,
        "planning"
    );

    match StudyPlanner::new(config.clone()).plan(&request) {
        Ok(plan) => {
            print!("{}", render(&plan, &config, cli.format)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(PlanError::ScheduleInfeasible { partial, diagnostic }) => {
            print!("{}", render(&partial, &config, cli.format)?);
            eprintln!(
                "cannot finish '{}' before its exam on {}: {:.0} minutes left on {}",
                diagnostic.course,
                diagnostic.exam_date,
                diagnostic.shortfall_minutes,
                diagnostic.detected_on
            );
            eprintln!("try a higher --daily-cap-minutes or an earlier --start");
            Ok(ExitCode::from(2))
        }
        Err(PlanError::InvalidInput(errors)) => {
            eprintln!("invalid request:");
            for e in &errors {
                eprintln!("  - {e}");
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
