//! Effort estimation.
//!
//! Converts a chapter's page count and complexity into study minutes.
//!
//! # Model
//!
//! ```text
//! minutes = page_count / 10 × rate(complexity) × (1 + practice_buffer)
//! ```
//!
//! `rate` is configured as a range of minutes per 10 pages for each
//! complexity tier. The midpoint of the range is used so that identical
//! inputs always produce identical estimates.
//!
//! | Tier | Range (min / 10 pp) | Point |
//! |------|---------------------|-------|
//! | low | 15–20 | 17.5 |
//! | medium | 25–35 | 30.0 |
//! | high | 40–60 | 50.0 |
//!
//! `practice_buffer` adds time for problem sets and self-testing on top
//! of the reading rate. Set it to `0.0` to estimate reading time only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Complexity;

/// Default extra fraction of reading time for problem sets.
pub const DEFAULT_PRACTICE_BUFFER: f64 = 0.4;

/// Errors from effort estimation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffortError {
    /// Page count of zero.
    #[error("page count must be positive")]
    ZeroPages,
}

/// A range of study minutes per 10 pages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateRange {
    /// Lower bound (minutes per 10 pages).
    pub min: f64,
    /// Upper bound (minutes per 10 pages).
    pub max: f64,
}

impl RateRange {
    /// Creates a range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The deterministic point used for estimates.
    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Whether the range is positive, finite, and ordered.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }
}

/// Per-tier reading rates plus a practice buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffortModel {
    pub low: RateRange,
    pub medium: RateRange,
    pub high: RateRange,
    /// Extra fraction of reading time (0.4 = +40%).
    pub practice_buffer: f64,
}

impl Default for EffortModel {
    fn default() -> Self {
        Self {
            low: RateRange::new(15.0, 20.0),
            medium: RateRange::new(25.0, 35.0),
            high: RateRange::new(40.0, 60.0),
            practice_buffer: DEFAULT_PRACTICE_BUFFER,
        }
    }
}

impl EffortModel {
    /// Creates the default model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the practice buffer.
    pub fn with_practice_buffer(mut self, practice_buffer: f64) -> Self {
        self.practice_buffer = practice_buffer;
        self
    }

    /// Replaces the rate range for one tier.
    pub fn with_rate(mut self, complexity: Complexity, range: RateRange) -> Self {
        match complexity {
            Complexity::Low => self.low = range,
            Complexity::Medium => self.medium = range,
            Complexity::High => self.high = range,
        }
        self
    }

    /// The range configured for a tier.
    pub fn range(&self, complexity: Complexity) -> RateRange {
        match complexity {
            Complexity::Low => self.low,
            Complexity::Medium => self.medium,
            Complexity::High => self.high,
        }
    }

    /// Minutes per 10 pages for a tier.
    #[inline]
    pub fn rate(&self, complexity: Complexity) -> f64 {
        self.range(complexity).midpoint()
    }

    /// Estimated study minutes for a chapter.
    ///
    /// # Errors
    /// [`EffortError::ZeroPages`] if `page_count` is zero.
    pub fn estimate(&self, page_count: u32, complexity: Complexity) -> Result<f64, EffortError> {
        if page_count == 0 {
            return Err(EffortError::ZeroPages);
        }
        let reading = page_count as f64 / 10.0 * self.rate(complexity);
        Ok(reading * (1.0 + self.practice_buffer))
    }
}

/// Estimates study minutes with the default model.
pub fn estimate(page_count: u32, complexity: Complexity) -> Result<f64, EffortError> {
    EffortModel::default().estimate(page_count, complexity)
}
