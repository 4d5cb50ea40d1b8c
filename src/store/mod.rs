//! The Sprintly state store.
//!
//! A single [`AppState`] record holds everything the application tracks.
//! It is mutated only through the closed [`Action`] set processed by
//! [`reducer::reduce`], and only via [`Store::dispatch`], which serializes
//! writers behind a mutex and persists the snapshot after every change.
//!
//! The store keeps an owning index from goal id to the set of task ids
//! referencing it, so cascade deletes are an index lookup rather than a
//! scan. The index is derived data: it is rebuilt whenever the whole
//! state is replaced and maintained incrementally by task actions.

pub mod reducer;

pub use reducer::{Action, reduce};

use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::models::{Achievement, Goal, Settings, Sprint, Task};
use crate::storage::Storage;
use crate::{Error, Result};

/// Canonical focus session length in seconds.
pub const FOCUS_SECS: u32 = 25 * 60;
/// Break session length in seconds.
pub const BREAK_SECS: u32 = 5 * 60;
/// Accumulated focus time that unlocks the total-focus achievement.
pub const FOCUS_ACHIEVEMENT_SECS: u64 = 2 * 60 * 60;

/// Pomodoro timer state. Only the focus total survives reload; the
/// countdown and flags reset to idle defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pomodoro {
    pub active: bool,
    pub remaining_secs: u32,
    /// Cumulative focus seconds, monotonically increasing, never counted
    /// while on break
    pub total_focus_secs: u64,
    pub is_break: bool,
}

impl Default for Pomodoro {
    fn default() -> Self {
        Self {
            active: false,
            remaining_secs: FOCUS_SECS,
            total_focus_secs: 0,
            is_break: false,
        }
    }
}

/// The whole application state.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub goals: Vec<Goal>,
    pub tasks: Vec<Task>,
    pub sprints: Vec<Sprint>,
    pub achievements: Vec<Achievement>,
    /// At most one sprint is tracked as active at a time; ending a sprint
    /// clears this but leaves the record in `sprints`
    pub active_sprint: Option<Sprint>,
    pub pomodoro: Pomodoro,
    pub points: u32,
    /// Derived: `points / 100 + 1`
    pub level: u32,
    pub selected_goal_id: Option<String>,
    pub settings: Settings,

    /// Owning index: goal id -> ids of tasks referencing it
    tasks_by_goal: HashMap<String, HashSet<String>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            goals: Vec::new(),
            tasks: Vec::new(),
            sprints: Vec::new(),
            achievements: Achievement::catalog(),
            active_sprint: None,
            pomodoro: Pomodoro::default(),
            points: 0,
            level: 1,
            selected_goal_id: None,
            settings: Settings::default(),
            tasks_by_goal: HashMap::new(),
        }
    }
}

impl AppState {
    /// Ids of the tasks referencing the given goal.
    pub fn task_ids_for_goal(&self, goal_id: &str) -> Vec<String> {
        self.tasks_by_goal
            .get(goal_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Count of tasks with done status.
    pub fn done_task_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == crate::models::TaskStatus::Done)
            .count()
    }

    /// Rebuild the goal -> task index from scratch.
    pub(crate) fn rebuild_task_index(&mut self) {
        self.tasks_by_goal.clear();
        for task in &self.tasks {
            self.tasks_by_goal
                .entry(task.goal_id.clone())
                .or_default()
                .insert(task.id.clone());
        }
    }

    pub(crate) fn index_task(&mut self, task: &Task) {
        self.tasks_by_goal
            .entry(task.goal_id.clone())
            .or_default()
            .insert(task.id.clone());
    }

    pub(crate) fn unindex_task(&mut self, goal_id: &str, task_id: &str) {
        if let Some(ids) = self.tasks_by_goal.get_mut(goal_id) {
            ids.remove(task_id);
            if ids.is_empty() {
                self.tasks_by_goal.remove(goal_id);
            }
        }
    }

    /// Remove the index entry for a goal, returning the task ids that
    /// referenced it.
    pub(crate) fn take_goal_index(&mut self, goal_id: &str) -> HashSet<String> {
        self.tasks_by_goal.remove(goal_id).unwrap_or_default()
    }
}

/// Coordinator owning the state record.
///
/// External callers never mutate fields directly: they submit immutable
/// [`Action`] values through [`Store::dispatch`], the single serialized
/// entry point. Each dispatch applies the transition function and writes
/// the snapshot back to storage before returning.
pub struct Store {
    state: Mutex<AppState>,
    storage: Storage,
}

impl Store {
    /// Open the store, rehydrating state from storage (merged over
    /// defaults when fields are missing).
    pub fn open(storage: Storage) -> Result<Self> {
        let state = storage.load_state()?;
        Ok(Self {
            state: Mutex::new(state),
            storage,
        })
    }

    /// Apply an action and persist the resulting state.
    pub fn dispatch(&self, action: Action) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::Other("state lock poisoned".to_string()))?;
        reduce(&mut state, action, Utc::now());
        self.storage.save_state(&state)
    }

    /// A snapshot clone of the current state for reads.
    pub fn state(&self) -> Result<AppState> {
        let state = self
            .state
            .lock()
            .map_err(|_| Error::Other("state lock poisoned".to_string()))?;
        Ok(state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;
    use chrono::TimeZone;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_default_state_seeds_catalog() {
        let state = AppState::default();
        assert_eq!(state.achievements.len(), 4);
        assert_eq!(state.level, 1);
        assert_eq!(state.pomodoro.remaining_secs, FOCUS_SECS);
        assert!(!state.pomodoro.active);
    }

    #[test]
    fn test_dispatch_persists_across_reopen() {
        let env = TestEnv::new();
        let store = Store::open(env.init_storage()).unwrap();

        let goal = Goal::new("meta-1".to_string(), "Ship it".to_string(), now());
        store.dispatch(Action::AddGoal(goal)).unwrap();
        store.dispatch(Action::AddPoints(42)).unwrap();

        let reopened = Store::open(env.open_storage()).unwrap();
        let state = reopened.state().unwrap();
        assert_eq!(state.goals.len(), 1);
        assert_eq!(state.goals[0].name, "Ship it");
        assert_eq!(state.points, 42);
    }

    #[test]
    fn test_index_rebuilt_on_reopen() {
        let env = TestEnv::new();
        let store = Store::open(env.init_storage()).unwrap();
        store
            .dispatch(Action::AddGoal(Goal::new(
                "meta-1".to_string(),
                "Ship it".to_string(),
                now(),
            )))
            .unwrap();
        store
            .dispatch(Action::AddTask(Task::new(
                "task-1".to_string(),
                "meta-1".to_string(),
                "Write docs".to_string(),
                now(),
            )))
            .unwrap();

        let reopened = Store::open(env.open_storage()).unwrap();
        let state = reopened.state().unwrap();
        assert_eq!(state.task_ids_for_goal("meta-1"), vec!["task-1".to_string()]);
    }

    #[test]
    fn test_running_timer_survives_reopen() {
        let env = TestEnv::new();
        let store = Store::open(env.init_storage()).unwrap();
        store
            .dispatch(Action::StartPomodoro { is_break: false })
            .unwrap();
        store.dispatch(Action::TickPomodoro).unwrap();

        let reopened = Store::open(env.open_storage()).unwrap();
        let state = reopened.state().unwrap();
        assert!(state.pomodoro.active);
        assert_eq!(state.pomodoro.remaining_secs, FOCUS_SECS - 1);
        assert_eq!(state.pomodoro.total_focus_secs, 1);
    }
}
