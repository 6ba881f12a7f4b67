//! Planner configuration.
//!
//! [`PlanningConstraints`] holds the daily and weekly limits the allocator
//! enforces; [`PlannerConfig`] bundles them with the effort model and can be
//! loaded from a TOML file:
//!
//! ```toml
//! [constraints]
//! daily_cap_minutes = 180.0
//! min_break_days_per_week = 1
//!
//! [effort]
//! practice_buffer = 0.25
//! high = { min = 45.0, max = 55.0 }
//! ```
//!
//! Every field has a default, so partial files are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effort::EffortModel;

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`PlannerConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Scheduling limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConstraints {
    /// Maximum study minutes on any day.
    pub daily_cap_minutes: f64,
    /// Break days required in every 7-day window.
    pub min_break_days_per_week: u32,
    /// Length of a review session (minutes). `0` disables reviews.
    pub review_session_cap_minutes: f64,
    /// Days that must remain before an exam, counted from the day a course's
    /// last chapter is finished, for a review session to be inserted.
    pub review_min_lead_days: i64,
    /// Upper bound on plan length (days).
    pub max_horizon_days: u32,
}

impl Default for PlanningConstraints {
    fn default() -> Self {
        Self {
            daily_cap_minutes: 240.0,
            min_break_days_per_week: 1,
            review_session_cap_minutes: 60.0,
            review_min_lead_days: 2,
            max_horizon_days: 366,
        }
    }
}

impl PlanningConstraints {
    /// Creates the default constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the daily cap (minutes).
    pub fn with_daily_cap_minutes(mut self, minutes: f64) -> Self {
        self.daily_cap_minutes = minutes;
        self
    }

    /// Sets the required break days per 7-day window.
    pub fn with_min_break_days_per_week(mut self, days: u32) -> Self {
        self.min_break_days_per_week = days;
        self
    }

    /// Sets the review session length (minutes).
    pub fn with_review_session_cap_minutes(mut self, minutes: f64) -> Self {
        self.review_session_cap_minutes = minutes;
        self
    }

    /// Sets the minimum exam lead time for reviews (days).
    pub fn with_review_min_lead_days(mut self, days: i64) -> Self {
        self.review_min_lead_days = days;
        self
    }

    /// Sets the horizon bound (days).
    pub fn with_max_horizon_days(mut self, days: u32) -> Self {
        self.max_horizon_days = days;
        self
    }

    /// Daily cap in hours.
    #[inline]
    pub fn daily_cap_hours(&self) -> f64 {
        self.daily_cap_minutes / 60.0
    }

    /// Effective review length: never more than a full day.
    pub fn review_minutes(&self) -> f64 {
        self.review_session_cap_minutes
            .min(self.daily_cap_minutes)
            .max(0.0)
    }
}

/// Full planner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub constraints: PlanningConstraints,
    pub effort: EffortModel,
}

impl PlannerConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}
