//! The state transition function.
//!
//! `reduce` is deterministic given the injected `now` timestamp, performs
//! no I/O, and is total over the closed [`Action`] set. Update, delete,
//! move, and unlock actions with unknown ids are no-ops rather than
//! errors. Achievement stamping happens inside the transitions that can
//! trigger it, so no caller can observe a state where the condition holds
//! but the badge is still locked.

use chrono::{DateTime, Utc};

use crate::import::ImportBatch;
use crate::models::{Achievement, Goal, SettingsPatch, Sprint, Task, TaskStatus};
use crate::storage::generate_id;
use crate::store::{AppState, BREAK_SECS, FOCUS_ACHIEVEMENT_SECS, FOCUS_SECS};

/// Tasks done at once required for the five-tasks achievement.
const FIVE_TASKS_THRESHOLD: usize = 5;

/// The closed set of state mutations.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the whole state verbatim (load-from-storage, restore).
    /// Validation of the record is the caller's responsibility.
    Replace(Box<AppState>),
    AddGoal(Goal),
    UpdateGoal(Goal),
    DeleteGoal(String),
    AddTask(Task),
    UpdateTask(Task),
    DeleteTask(String),
    MoveTask {
        task_id: String,
        status: TaskStatus,
    },
    StartSprint(Sprint),
    EndSprint(String),
    /// Begins a session or switches mode while one is running.
    StartPomodoro {
        is_break: bool,
    },
    StopPomodoro,
    TickPomodoro,
    AddPoints(u32),
    UnlockAchievement(String),
    Import(ImportBatch),
    SelectGoal(Option<String>),
    UpdateSettings(SettingsPatch),
}

/// Apply `action` to `state`, stamping times with `now`.
pub fn reduce(state: &mut AppState, action: Action, now: DateTime<Utc>) {
    match action {
        Action::Replace(new_state) => {
            *state = *new_state;
            state.rebuild_task_index();
        }

        Action::AddGoal(goal) => {
            // Append, insertion order preserved, no dedup by id
            state.goals.push(goal);
            unlock(state, Achievement::FIRST_GOAL, now);
        }

        Action::UpdateGoal(goal) => {
            if let Some(slot) = state.goals.iter_mut().find(|g| g.id == goal.id) {
                *slot = goal;
            }
        }

        Action::DeleteGoal(id) => {
            state.goals.retain(|g| g.id != id);
            let doomed = state.take_goal_index(&id);
            if !doomed.is_empty() {
                state.tasks.retain(|t| !doomed.contains(&t.id));
            }
        }

        Action::AddTask(task) => {
            state.index_task(&task);
            state.tasks.push(task);
        }

        Action::UpdateTask(task) => {
            if let Some(pos) = state.tasks.iter().position(|t| t.id == task.id) {
                if state.tasks[pos].goal_id != task.goal_id {
                    let old_goal = state.tasks[pos].goal_id.clone();
                    state.unindex_task(&old_goal, &task.id);
                    state.index_task(&task);
                }
                state.tasks[pos] = task;
            }
        }

        Action::DeleteTask(id) => {
            if let Some(pos) = state.tasks.iter().position(|t| t.id == id) {
                let task = state.tasks.remove(pos);
                state.unindex_task(&task.goal_id, &task.id);
            }
        }

        Action::MoveTask { task_id, status } => {
            if let Some(task) = state.tasks.iter_mut().find(|t| t.id == task_id) {
                task.status = status;
                task.completed_at = if status == TaskStatus::Done {
                    Some(now)
                } else {
                    None
                };
            }
            // Threshold is inclusive and evaluated against the post-move
            // full task list
            if state.done_task_count() >= FIVE_TASKS_THRESHOLD {
                unlock(state, Achievement::FIVE_TASKS, now);
            }
        }

        Action::StartSprint(sprint) => {
            state.sprints.push(sprint.clone());
            state.active_sprint = Some(sprint);
            unlock(state, Achievement::SPRINT_MASTER, now);
        }

        Action::EndSprint(id) => {
            if let Some(sprint) = state.sprints.iter_mut().find(|s| s.id == id) {
                sprint.active = false;
            }
            // Cleared regardless of whether `id` matches the tracked
            // sprint; ending a historical sprint drops the pointer too
            state.active_sprint = None;
        }

        Action::StartPomodoro { is_break } => {
            state.pomodoro.active = true;
            state.pomodoro.is_break = is_break;
            state.pomodoro.remaining_secs = if is_break { BREAK_SECS } else { FOCUS_SECS };
        }

        Action::StopPomodoro => {
            // Always resets to the canonical focus duration, even when a
            // break was stopped
            state.pomodoro.active = false;
            state.pomodoro.remaining_secs = FOCUS_SECS;
            state.pomodoro.is_break = false;
        }

        Action::TickPomodoro => {
            state.pomodoro.remaining_secs = state.pomodoro.remaining_secs.saturating_sub(1);
            if !state.pomodoro.is_break {
                state.pomodoro.total_focus_secs += 1;
            }
            // Reaching zero deactivates on the same transition
            state.pomodoro.active = state.pomodoro.remaining_secs > 0;
            if state.pomodoro.total_focus_secs >= FOCUS_ACHIEVEMENT_SECS {
                unlock(state, Achievement::TOTAL_FOCUS, now);
            }
        }

        Action::AddPoints(amount) => {
            state.points = state.points.saturating_add(amount);
            state.level = state.points / 100 + 1;
        }

        Action::UnlockAchievement(id) => {
            unlock(state, &id, now);
        }

        Action::Import(batch) => {
            for (index, mut goal) in batch.goals.into_iter().enumerate() {
                if goal.id.is_empty() {
                    goal.id = generate_id("meta", index);
                }
                state.goals.push(goal);
            }
            for (index, mut task) in batch.tasks.into_iter().enumerate() {
                if task.id.is_empty() {
                    task.id = generate_id("task", index);
                }
                state.index_task(&task);
                state.tasks.push(task);
            }
        }

        Action::SelectGoal(goal_id) => {
            state.selected_goal_id = goal_id;
        }

        Action::UpdateSettings(patch) => {
            state.settings.merge(patch);
        }
    }
}

/// Stamp an achievement's unlock time if it is still locked. Unknown ids
/// and already-unlocked achievements are no-ops.
fn unlock(state: &mut AppState, id: &str, now: DateTime<Utc>) {
    if let Some(achievement) = state.achievements.iter_mut().find(|a| a.id == id) {
        if achievement.unlocked_at.is_none() {
            achievement.unlocked_at = Some(now);
        }
    }
}
