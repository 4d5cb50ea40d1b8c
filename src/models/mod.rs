//! Data models for Sprintly entities.
//!
//! This module defines the core data structures:
//! - `Goal` - Top-level objectives with deadline, urgency, and step labels
//! - `Task` - Kanban work items linked to a goal
//! - `Sprint` - Time-boxed commitment periods covering a set of goals
//! - `Achievement` - Fixed catalog of permanently unlockable badges
//! - `Settings` - User preferences stored inside the state record
//!
//! All entities are flat value records identified by an opaque string id;
//! updates replace records wholesale. Serde renames preserve the wire
//! field names of the persisted document so existing backups round-trip.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Task status in the kanban pipeline.
///
/// The pipeline is ordered backlog → todo → doing → done, but progression
/// is not enforced: any transition is legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Backlog,
    Todo,
    Doing,
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Backlog => "backlog",
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        };
        write!(f, "{}", s)
    }
}

/// Goal urgency. Wire values are the persisted document's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    #[serde(rename = "baixa")]
    Low,
    #[default]
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Urgency::Low => "baixa",
            Urgency::Medium => "media",
            Urgency::High => "alta",
        };
        write!(f, "{}", s)
    }
}

/// A top-level user objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier (e.g., "meta-1722950000000-0-a1b2c3d")
    pub id: String,

    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "descricao", default)]
    pub description: String,

    #[serde(rename = "categoria", default)]
    pub category: String,

    #[serde(rename = "urgencia", default)]
    pub urgency: Urgency,

    /// Target completion date
    #[serde(rename = "prazo")]
    pub deadline: NaiveDate,

    /// Ordered step labels; plain text, no identity of their own
    #[serde(rename = "etapas", default)]
    pub steps: Vec<String>,

    /// Progress percentage (0-100), settable independently of steps
    #[serde(rename = "progresso", default)]
    pub progress: u8,

    #[serde(rename = "criadaEm")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl Goal {
    /// Create a new goal with the given id and name, defaulting everything
    /// else (deadline 30 days out, medium urgency, zero progress).
    pub fn new(id: String, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            description: String::new(),
            category: String::new(),
            urgency: Urgency::default(),
            deadline: default_deadline(now),
            steps: Vec::new(),
            progress: 0,
            created_at: now,
            tags: Vec::new(),
        }
    }
}

/// Default goal deadline: 30 days from `now`.
pub fn default_deadline(now: DateTime<Utc>) -> NaiveDate {
    (now + chrono::Duration::days(30)).date_naive()
}

/// An actionable work item linked to a goal.
///
/// The goal link is a foreign reference, not ownership: many tasks may
/// reference the same goal, and a dangling reference is legal (it renders
/// as "goal not found" downstream).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,

    #[serde(rename = "metaId")]
    pub goal_id: String,

    #[serde(rename = "titulo")]
    pub title: String,

    #[serde(rename = "descricao", default)]
    pub description: String,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(rename = "criadaEm")]
    pub created_at: DateTime<Utc>,

    /// Set exactly when status becomes done, cleared otherwise
    #[serde(rename = "concluidaEm", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new backlog task linked to the given goal.
    pub fn new(id: String, goal_id: String, title: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            goal_id,
            title,
            description: String::new(),
            status: TaskStatus::default(),
            created_at: now,
            completed_at: None,
        }
    }
}

/// A time-boxed commitment period covering a subset of goals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: String,

    #[serde(rename = "nome")]
    pub name: String,

    /// Duration in days
    #[serde(rename = "duracao")]
    pub duration_days: u32,

    #[serde(rename = "inicioEm")]
    pub started_at: DateTime<Utc>,

    #[serde(rename = "fimEm")]
    pub ends_at: DateTime<Utc>,

    #[serde(rename = "ativo")]
    pub active: bool,

    /// Goal ids this sprint covers
    #[serde(rename = "metas", default)]
    pub goal_ids: Vec<String>,
}

impl Sprint {
    /// Create an active sprint starting at `now` and ending
    /// `duration_days` later.
    pub fn new(id: String, name: String, duration_days: u32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            duration_days,
            started_at: now,
            ends_at: now + chrono::Duration::days(i64::from(duration_days)),
            active: true,
            goal_ids: Vec::new(),
        }
    }
}

/// A badge unlocked permanently once its condition is met.
///
/// The catalog is fixed at four entries seeded at initialization; entries
/// are never created or deleted at runtime, only stamped with an unlock
/// time. Stamping is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,

    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "descricao")]
    pub description: String,

    #[serde(rename = "icone")]
    pub icon: String,

    /// Absent while locked
    #[serde(rename = "desbloqueadoEm", skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    /// Unlocked by creating the first goal.
    pub const FIRST_GOAL: &'static str = "primeira-meta";
    /// Unlocked when five tasks are done at once.
    pub const FIVE_TASKS: &'static str = "cinco-tarefas";
    /// Unlocked by starting a sprint.
    pub const SPRINT_MASTER: &'static str = "sprint-master";
    /// Unlocked after two hours of accumulated focus time.
    pub const TOTAL_FOCUS: &'static str = "foco-total";

    /// The fixed achievement catalog, all locked.
    pub fn catalog() -> Vec<Achievement> {
        let entry = |id: &str, name: &str, description: &str, icon: &str| Achievement {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            unlocked_at: None,
        };
        vec![
            entry(
                Self::FIRST_GOAL,
                "Primeira Meta",
                "Criou sua primeira meta",
                "\u{1F3AF}",
            ),
            entry(
                Self::FIVE_TASKS,
                "Consistente",
                "Completou 5 tarefas",
                "\u{1F525}",
            ),
            entry(
                Self::SPRINT_MASTER,
                "Sprint Master",
                "Completou seu primeiro sprint",
                "\u{1F3C3}\u{200D}\u{2642}\u{FE0F}",
            ),
            entry(
                Self::TOTAL_FOCUS,
                "Foco Total",
                "Acumulou 2 horas de Pomodoro",
                "\u{1F345}",
            ),
        ]
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

/// Color theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        };
        write!(f, "{}", s)
    }
}

/// User preferences, always present with defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub pomodoro_sound: bool,
    /// Accepted and stored but not acted on anywhere yet
    pub auto_start_breaks: bool,
    pub show_completed_tasks: bool,
    pub auto_update_progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            pomodoro_sound: true,
            auto_start_breaks: false,
            show_completed_tasks: true,
            auto_update_progress: true,
        }
    }
}

/// Partial settings update; only present fields change on merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub pomodoro_sound: Option<bool>,
    pub auto_start_breaks: Option<bool>,
    pub show_completed_tasks: Option<bool>,
    pub auto_update_progress: Option<bool>,
}

impl Settings {
    /// Shallow-merge a patch into these settings.
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(v) = patch.pomodoro_sound {
            self.pomodoro_sound = v;
        }
        if let Some(v) = patch.auto_start_breaks {
            self.auto_start_breaks = v;
        }
        if let Some(v) = patch.show_completed_tasks {
            self.show_completed_tasks = v;
        }
        if let Some(v) = patch.auto_update_progress {
            self.auto_update_progress = v;
        }
    }
}

/// Parse a status string into TaskStatus.
pub fn parse_status(s: &str) -> Result<TaskStatus> {
    match s.to_lowercase().as_str() {
        "backlog" => Ok(TaskStatus::Backlog),
        "todo" => Ok(TaskStatus::Todo),
        "doing" => Ok(TaskStatus::Doing),
        "done" => Ok(TaskStatus::Done),
        _ => Err(Error::InvalidInput(format!(
            "Invalid status: {} (expected backlog, todo, doing, done)",
            s
        ))),
    }
}

/// Parse an urgency string. Accepts wire values and English aliases.
pub fn parse_urgency(s: &str) -> Result<Urgency> {
    match s.to_lowercase().as_str() {
        "baixa" | "low" => Ok(Urgency::Low),
        "media" | "medium" => Ok(Urgency::Medium),
        "alta" | "high" => Ok(Urgency::High),
        _ => Err(Error::InvalidInput(format!(
            "Invalid urgency: {} (expected baixa, media, alta)",
            s
        ))),
    }
}

/// Parse a theme string.
pub fn parse_theme(s: &str) -> Result<Theme> {
    match s.to_lowercase().as_str() {
        "light" => Ok(Theme::Light),
        "dark" => Ok(Theme::Dark),
        "auto" => Ok(Theme::Auto),
        _ => Err(Error::InvalidInput(format!(
            "Invalid theme: {} (expected light, dark, auto)",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_goal_wire_field_names() {
        let goal = Goal::new("meta-1".to_string(), "Learn Rust".to_string(), now());
        let json = serde_json::to_value(&goal).unwrap();

        assert_eq!(json["nome"], "Learn Rust");
        assert_eq!(json["urgencia"], "media");
        assert_eq!(json["progresso"], 0);
        assert_eq!(json["prazo"], "2025-07-01");
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_task_omits_completion_when_open() {
        let task = Task::new(
            "task-1".to_string(),
            "meta-1".to_string(),
            "Read the book".to_string(),
            now(),
        );
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["metaId"], "meta-1");
        assert_eq!(json["status"], "backlog");
        assert!(json.get("concluidaEm").is_none());
    }

    #[test]
    fn test_task_roundtrip_with_completion() {
        let mut task = Task::new(
            "task-1".to_string(),
            "meta-1".to_string(),
            "Read the book".to_string(),
            now(),
        );
        task.status = TaskStatus::Done;
        task.completed_at = Some(now());

        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_sprint_end_date() {
        let sprint = Sprint::new("sprint-1".to_string(), "Q3 push".to_string(), 14, now());
        assert_eq!(sprint.ends_at - sprint.started_at, chrono::Duration::days(14));
        assert!(sprint.active);
    }

    #[test]
    fn test_achievement_catalog_seeded_locked() {
        let catalog = Achievement::catalog();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.iter().all(|a| !a.is_unlocked()));

        let ids: Vec<&str> = catalog.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                Achievement::FIRST_GOAL,
                Achievement::FIVE_TASKS,
                Achievement::SPRINT_MASTER,
                Achievement::TOTAL_FOCUS,
            ]
        );
    }

    #[test]
    fn test_settings_camel_case_wire_names() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["theme"], "light");
        assert_eq!(json["pomodoroSound"], true);
        assert_eq!(json["autoStartBreaks"], false);
        assert_eq!(json["showCompletedTasks"], true);
        assert_eq!(json["autoUpdateProgress"], true);
    }

    #[test]
    fn test_settings_merge_is_shallow() {
        let mut settings = Settings::default();
        let before = settings.clone();

        settings.merge(SettingsPatch {
            theme: Some(Theme::Dark),
            ..Default::default()
        });

        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.pomodoro_sound, before.pomodoro_sound);
        assert_eq!(settings.auto_start_breaks, before.auto_start_breaks);
        assert_eq!(settings.show_completed_tasks, before.show_completed_tasks);
        assert_eq!(settings.auto_update_progress, before.auto_update_progress);
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("doing").unwrap(), TaskStatus::Doing);
        assert_eq!(parse_status("DONE").unwrap(), TaskStatus::Done);
        assert!(parse_status("archived").is_err());
    }

    #[test]
    fn test_parse_urgency_aliases() {
        assert_eq!(parse_urgency("alta").unwrap(), Urgency::High);
        assert_eq!(parse_urgency("high").unwrap(), Urgency::High);
        assert!(parse_urgency("urgent").is_err());
    }
}
