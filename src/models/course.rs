//! Course structure model.
//!
//! A course is one textbook's worth of material: an ordered list of
//! chapters plus an optional exam date. Chapters are the unit the
//! effort estimator and the aggregator work on.
//!
//! Course structures are produced by an upstream extraction step and are
//! treated as immutable input by the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Qualitative difficulty of a chapter.
///
/// Ordered `Low < Medium < High`. Upstream labels are free-form strings;
/// anything unrecognized maps to [`Complexity::Medium`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    #[default]
    Medium,
    High,
}

impl Complexity {
    /// Parses a complexity label, falling back to `Medium`.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" | "easy" => Complexity::Low,
            "medium" | "moderate" => Complexity::Medium,
            "high" | "hard" => Complexity::High,
            other => {
                tracing::debug!(label = other, "unknown complexity label, using medium");
                Complexity::Medium
            }
        }
    }

    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }
}

impl FromStr for Complexity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Complexity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// A textbook chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter title or number.
    pub name: String,
    /// Number of pages (must be positive).
    pub page_count: u32,
    /// Key topics, in textbook order.
    #[serde(default)]
    pub topics: Vec<String>,
    /// Difficulty label.
    #[serde(default, alias = "estimated_complexity")]
    pub complexity: Complexity,
}

impl Chapter {
    /// Creates a medium-complexity chapter with no topics.
    pub fn new(name: impl Into<String>, page_count: u32) -> Self {
        Self {
            name: name.into(),
            page_count,
            topics: Vec::new(),
            complexity: Complexity::Medium,
        }
    }

    /// Sets the complexity.
    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    /// Adds a topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topics.push(topic.into());
        self
    }

    /// Replaces the topic list.
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }
}

/// One course's material and exam deadline.
///
/// `chapters` is in textbook order, not priority order. `total_pages` is
/// informational; the engine only checks it against the chapter sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseStructure {
    /// Course name (unique within a request).
    pub course_name: String,
    /// Declared page total. `0` means not provided.
    #[serde(default)]
    pub total_pages: u32,
    /// Chapters in textbook order.
    pub chapters: Vec<Chapter>,
    /// Exam date. `None` = no deadline pressure.
    #[serde(default)]
    pub exam_date: Option<NaiveDate>,
    /// Topics likely to appear on the exam.
    #[serde(default)]
    pub exam_topics: Vec<String>,
}

impl CourseStructure {
    /// Creates a course with no chapters and no exam.
    pub fn new(course_name: impl Into<String>) -> Self {
        Self {
            course_name: course_name.into(),
            total_pages: 0,
            chapters: Vec::new(),
            exam_date: None,
            exam_topics: Vec::new(),
        }
    }

    /// Adds a chapter.
    pub fn with_chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    /// Sets the exam date.
    pub fn with_exam_date(mut self, exam_date: NaiveDate) -> Self {
        self.exam_date = Some(exam_date);
        self
    }

    /// Sets the declared page total.
    pub fn with_total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = total_pages;
        self
    }

    /// Adds an exam topic.
    pub fn with_exam_topic(mut self, topic: impl Into<String>) -> Self {
        self.exam_topics.push(topic.into());
        self
    }

    /// Sum of chapter page counts.
    pub fn chapter_pages(&self) -> u64 {
        self.chapters.iter().map(|c| c.page_count as u64).sum()
    }

    /// Whether the declared total matches the chapter sum.
    ///
    /// An undeclared total (`0`) is always consistent.
    pub fn total_pages_consistent(&self) -> bool {
        self.total_pages == 0 || self.total_pages as u64 == self.chapter_pages()
    }

    /// Number of chapters.
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }
}
