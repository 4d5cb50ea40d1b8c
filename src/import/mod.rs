//! Import parsing for externally supplied goal/task text.
//!
//! Three formats are accepted: JSON, Markdown, and CSV. Each parser is a
//! pure function from text to an [`ImportBatch`] of goal and task records
//! ready for the store's import action; nothing is dispatched unless the
//! whole parse succeeds. Field aliases are resolved through explicit
//! ordered key tables (first present alias wins) so the accepted inputs
//! stay auditable.

mod csv;
mod json;
mod markdown;

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::models::{Goal, Task, Urgency, default_deadline};
use crate::{Error, Result};

/// Default name for an imported goal missing one.
pub(crate) const DEFAULT_GOAL_NAME: &str = "Meta Importada";
/// Default description for an imported goal missing one.
pub(crate) const DEFAULT_GOAL_DESCRIPTION: &str = "Descri\u{e7}\u{e3}o importada";
/// Default category for imported goals.
pub(crate) const DEFAULT_CATEGORY: &str = "Importado";
/// Default title for an imported task missing one.
pub(crate) const DEFAULT_TASK_TITLE: &str = "Tarefa Importada";

/// A parsed batch of goals and tasks, merged into the store in one action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportBatch {
    pub goals: Vec<Goal>,
    pub tasks: Vec<Task>,
}

impl ImportBatch {
    pub fn is_empty(&self) -> bool {
        self.goals.is_empty() && self.tasks.is_empty()
    }
}

/// Supported import formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Markdown,
    Csv,
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImportFormat::Json => "json",
            ImportFormat::Markdown => "markdown",
            ImportFormat::Csv => "csv",
        };
        write!(f, "{}", s)
    }
}

impl ImportFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(ImportFormat::Json),
            "md" | "markdown" | "txt" => Some(ImportFormat::Markdown),
            "csv" => Some(ImportFormat::Csv),
            _ => None,
        }
    }
}

/// Parse a format name.
pub fn parse_format(s: &str) -> Result<ImportFormat> {
    match s.to_lowercase().as_str() {
        "json" => Ok(ImportFormat::Json),
        "markdown" | "md" => Ok(ImportFormat::Markdown),
        "csv" => Ok(ImportFormat::Csv),
        _ => Err(Error::InvalidInput(format!(
            "Invalid import format: {} (expected json, markdown, csv)",
            s
        ))),
    }
}

/// Convert raw text in the given format into an import batch.
///
/// `now` stamps creation times and anchors the default deadline; parsing
/// is otherwise a pure function of the text.
pub fn parse(text: &str, format: ImportFormat, now: DateTime<Utc>) -> Result<ImportBatch> {
    match format {
        ImportFormat::Json => json::parse(text, now),
        ImportFormat::Markdown => Ok(markdown::parse(text, now)),
        ImportFormat::Csv => csv::parse(text, now),
    }
}

/// A goal built up by a parser; unset fields take the import defaults.
#[derive(Debug, Default)]
pub(crate) struct PartialGoal {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<Urgency>,
    pub deadline: Option<chrono::NaiveDate>,
    pub steps: Vec<String>,
    pub progress: Option<u8>,
    pub tags: Vec<String>,
}

impl PartialGoal {
    /// Apply import defaults and produce the goal record.
    pub fn build(self, id: String, now: DateTime<Utc>) -> Goal {
        Goal {
            id,
            name: self.name.unwrap_or_else(|| DEFAULT_GOAL_NAME.to_string()),
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_GOAL_DESCRIPTION.to_string()),
            category: self.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            urgency: self.urgency.unwrap_or_default(),
            deadline: self.deadline.unwrap_or_else(|| default_deadline(now)),
            steps: self.steps,
            progress: self.progress.unwrap_or(0),
            created_at: now,
            tags: self.tags,
        }
    }
}

/// Parse a deadline value: a plain date, or a full timestamp whose date
/// prefix is taken.
pub(crate) fn parse_deadline(value: &str) -> Option<chrono::NaiveDate> {
    let value = value.trim();
    if let Ok(date) = value.parse::<chrono::NaiveDate>() {
        return Some(date);
    }
    value.get(..10)?.parse::<chrono::NaiveDate>().ok()
}

/// Parse an urgency value, falling back to the default on anything
/// unrecognized so an odd value never fails a whole import.
pub(crate) fn lenient_urgency(value: &str) -> Urgency {
    crate::models::parse_urgency(value).unwrap_or_default()
}
