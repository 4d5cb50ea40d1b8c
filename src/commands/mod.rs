//! Command implementations for the Sprintly CLI.
//!
//! This module contains the business logic for each CLI command, organized
//! by entity:
//! - `goal` - Goal CRUD, selection
//! - `task` - Task CRUD and kanban moves
//! - `sprint` - Sprint lifecycle
//! - `pomodoro` - Focus timer control
//! - `progress` - Points and achievements
//! - `settings` - Preference updates
//! - `transfer` - Import, export, restore
//!
//! Commands open the store, dispatch actions, and return result structs
//! that render as single-line JSON (default) or human-readable text.
//! Point awards mirror the application's long-standing conventions:
//! +10 per goal, +2 per task, +5 per task done, +20 per sprint, +10 per
//! finished focus session, and 5/2 per imported goal/task.

pub mod goal;
pub mod pomodoro;
pub mod progress;
pub mod settings;
pub mod sprint;
pub mod task;
pub mod transfer;

use serde::Serialize;
use std::path::Path;

use crate::models::TaskStatus;
use crate::storage::Storage;
use crate::store::Store;
use crate::{Error, Result};

/// Points awarded for creating a goal.
pub const POINTS_GOAL_CREATED: u32 = 10;
/// Points awarded for creating a task.
pub const POINTS_TASK_CREATED: u32 = 2;
/// Points awarded for moving a task to done.
pub const POINTS_TASK_DONE: u32 = 5;
/// Points awarded for starting a sprint.
pub const POINTS_SPRINT_STARTED: u32 = 20;
/// Points awarded for a focus session that ran to completion.
pub const POINTS_FOCUS_FINISHED: u32 = 10;
/// Points awarded per imported goal.
pub const POINTS_PER_IMPORTED_GOAL: u32 = 5;
/// Points awarded per imported task.
pub const POINTS_PER_IMPORTED_TASK: u32 = 2;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Serialize a result struct to a single JSON line.
pub(crate) fn json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

/// Open the store for a command, failing with `NotInitialized` when
/// `spry system init` has not run yet.
pub(crate) fn open_store(data_dir: &Path) -> Result<Store> {
    let storage = Storage::open(data_dir)?;
    Store::open(storage)
}

/// Result of `spry system init`.
#[derive(Debug, Serialize)]
pub struct InitResult {
    pub initialized: bool,
    pub path: String,
}

impl Output for InitResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        if self.initialized {
            format!("Initialized sprintly data at {}", self.path)
        } else {
            format!("Already initialized at {}", self.path)
        }
    }
}

/// Initialize the data directory and seed the default state slot.
pub fn system_init(data_dir: &Path) -> Result<InitResult> {
    let already = Storage::exists(data_dir);
    Storage::init(data_dir)?;
    Ok(InitResult {
        initialized: !already,
        path: data_dir.display().to_string(),
    })
}

/// Result of `spry system clear`.
#[derive(Debug, Serialize)]
pub struct ClearResult {
    pub cleared: bool,
}

impl Output for ClearResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        "All data erased; state reset to defaults".to_string()
    }
}

/// Erase all persisted data. Irreversible, so `--force` is required.
pub fn system_clear(data_dir: &Path, force: bool) -> Result<ClearResult> {
    if !force {
        return Err(Error::InvalidInput(
            "this erases all goals, tasks, and progress; pass --force to confirm".to_string(),
        ));
    }
    let storage = Storage::open(data_dir)?;
    storage.clear()?;
    Ok(ClearResult { cleared: true })
}

/// Result of `spry system version`.
#[derive(Debug, Serialize)]
pub struct VersionResult {
    pub version: String,
    pub build_timestamp: String,
    pub git_commit: String,
}

impl Output for VersionResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        format!(
            "spry {} (built {}, commit {})",
            self.version, self.build_timestamp, self.git_commit
        )
    }
}

/// Report the binary version and build information.
pub fn system_version() -> VersionResult {
    VersionResult {
        version: env!("CARGO_PKG_VERSION").to_string(),
        build_timestamp: env!("SPRY_BUILD_TIMESTAMP").to_string(),
        git_commit: env!("SPRY_GIT_COMMIT").to_string(),
    }
}

/// Per-status task counts for the status summary.
#[derive(Debug, Serialize)]
pub struct TaskCounts {
    pub backlog: usize,
    pub todo: usize,
    pub doing: usize,
    pub done: usize,
}

/// Status summary shown by bare `spry`.
#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub goals: usize,
    pub tasks: TaskCounts,
    pub points: u32,
    pub level: u32,
    pub achievements_unlocked: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_sprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_goal: Option<String>,
    pub pomodoro_active: bool,
    pub focus_total_secs: u64,
}

impl Output for StatusSummary {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!(
                "Goals: {}  Tasks: {} backlog / {} todo / {} doing / {} done",
                self.goals, self.tasks.backlog, self.tasks.todo, self.tasks.doing, self.tasks.done
            ),
            format!(
                "Level {} ({} points), {}/4 achievements",
                self.level, self.points, self.achievements_unlocked
            ),
        ];
        if let Some(sprint) = &self.active_sprint {
            lines.push(format!("Active sprint: {}", sprint));
        }
        if let Some(goal) = &self.selected_goal {
            lines.push(format!("Selected goal: {}", goal));
        }
        lines.push(if self.pomodoro_active {
            "Pomodoro: running".to_string()
        } else {
            format!(
                "Pomodoro: idle ({} min focused in total)",
                self.focus_total_secs / 60
            )
        });
        lines.join("\n")
    }
}

/// Summarize the current state.
pub fn status(data_dir: &Path) -> Result<StatusSummary> {
    let store = open_store(data_dir)?;
    let state = store.state()?;

    let count = |status: TaskStatus| state.tasks.iter().filter(|t| t.status == status).count();

    Ok(StatusSummary {
        goals: state.goals.len(),
        tasks: TaskCounts {
            backlog: count(TaskStatus::Backlog),
            todo: count(TaskStatus::Todo),
            doing: count(TaskStatus::Doing),
            done: count(TaskStatus::Done),
        },
        points: state.points,
        level: state.level,
        achievements_unlocked: state.achievements.iter().filter(|a| a.is_unlocked()).count(),
        active_sprint: state.active_sprint.as_ref().map(|s| s.name.clone()),
        selected_goal: state.selected_goal_id.clone(),
        pomodoro_active: state.pomodoro.active,
        focus_total_secs: state.pomodoro.total_focus_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    #[test]
    fn test_init_then_reinit() {
        let env = TestEnv::new();
        let first = system_init(env.data_path()).unwrap();
        assert!(first.initialized);

        let second = system_init(env.data_path()).unwrap();
        assert!(!second.initialized);
    }

    #[test]
    fn test_clear_requires_force() {
        let env = TestEnv::new();
        env.init_storage();

        assert!(matches!(
            system_clear(env.data_path(), false),
            Err(Error::InvalidInput(_))
        ));
        assert!(system_clear(env.data_path(), true).unwrap().cleared);
    }

    #[test]
    fn test_status_requires_init() {
        let env = TestEnv::new();
        assert!(matches!(status(env.data_path()), Err(Error::NotInitialized)));
    }

    #[test]
    fn test_status_of_fresh_state() {
        let env = TestEnv::new();
        env.init_storage();

        let summary = status(env.data_path()).unwrap();
        assert_eq!(summary.goals, 0);
        assert_eq!(summary.level, 1);
        assert_eq!(summary.achievements_unlocked, 0);
        assert!(!summary.pomodoro_active);
    }
}
