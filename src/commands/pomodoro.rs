//! Pomodoro focus timer control.
//!
//! The reducer's tick is exactly one second. `tick` applies a run of
//! them, stopping early when the timer deactivates - the CLI analogue of
//! the one-second interval being cancelled when the active flag drops.

use serde::Serialize;
use std::path::Path;

use super::{Output, POINTS_FOCUS_FINISHED, json_line, open_store};
use crate::Result;
use crate::store::{Action, AppState};

/// Timer snapshot returned by every pomodoro command.
#[derive(Debug, Serialize)]
pub struct PomodoroStatus {
    pub active: bool,
    pub is_break: bool,
    pub remaining_secs: u32,
    pub focus_total_secs: u64,
}

impl PomodoroStatus {
    fn from_state(state: &AppState) -> Self {
        Self {
            active: state.pomodoro.active,
            is_break: state.pomodoro.is_break,
            remaining_secs: state.pomodoro.remaining_secs,
            focus_total_secs: state.pomodoro.total_focus_secs,
        }
    }

    fn clock(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}

impl Output for PomodoroStatus {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mode = if self.is_break { "break" } else { "focus" };
        if self.active {
            format!(
                "Pomodoro running: {} session, {} remaining",
                mode,
                self.clock()
            )
        } else {
            format!(
                "Pomodoro idle ({} min focused in total)",
                self.focus_total_secs / 60
            )
        }
    }
}

/// Start a focus session, or a break; switches mode if already running.
pub fn start(data_dir: &Path, is_break: bool) -> Result<PomodoroStatus> {
    let store = open_store(data_dir)?;
    store.dispatch(Action::StartPomodoro { is_break })?;
    Ok(PomodoroStatus::from_state(&store.state()?))
}

#[derive(Debug, Serialize)]
pub struct PomodoroStopped {
    pub points_awarded: u32,
    #[serde(flatten)]
    pub status: PomodoroStatus,
}

impl Output for PomodoroStopped {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        if self.points_awarded > 0 {
            format!("Pomodoro stopped (+{} points for a full session)", self.points_awarded)
        } else {
            "Pomodoro stopped".to_string()
        }
    }
}

/// Stop the timer. A focus session that had run to zero earns points.
pub fn stop(data_dir: &Path) -> Result<PomodoroStopped> {
    let store = open_store(data_dir)?;
    let before = store.state()?;
    let finished_focus = before.pomodoro.remaining_secs == 0 && !before.pomodoro.is_break;

    store.dispatch(Action::StopPomodoro)?;
    let points_awarded = if finished_focus {
        store.dispatch(Action::AddPoints(POINTS_FOCUS_FINISHED))?;
        POINTS_FOCUS_FINISHED
    } else {
        0
    };

    Ok(PomodoroStopped {
        points_awarded,
        status: PomodoroStatus::from_state(&store.state()?),
    })
}

#[derive(Debug, Serialize)]
pub struct PomodoroTicked {
    pub applied: u32,
    #[serde(flatten)]
    pub status: PomodoroStatus,
}

impl Output for PomodoroTicked {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        format!("Applied {} tick(s); {}", self.applied, self.status.to_human())
    }
}

/// Advance the timer by up to `count` seconds while it stays active.
pub fn tick(data_dir: &Path, count: u32) -> Result<PomodoroTicked> {
    let store = open_store(data_dir)?;
    let mut applied = 0;
    for _ in 0..count {
        if !store.state()?.pomodoro.active {
            break;
        }
        store.dispatch(Action::TickPomodoro)?;
        applied += 1;
    }

    Ok(PomodoroTicked {
        applied,
        status: PomodoroStatus::from_state(&store.state()?),
    })
}

/// Report the timer state.
pub fn status(data_dir: &Path) -> Result<PomodoroStatus> {
    let store = open_store(data_dir)?;
    Ok(PomodoroStatus::from_state(&store.state()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BREAK_SECS, FOCUS_SECS};
    use crate::test_utils::TestEnv;

    fn setup() -> TestEnv {
        let env = TestEnv::new();
        env.init_storage();
        env
    }

    #[test]
    fn test_start_focus_then_switch_to_break() {
        let env = setup();
        let started = start(env.data_path(), false).unwrap();
        assert!(started.active);
        assert_eq!(started.remaining_secs, FOCUS_SECS);

        let switched = start(env.data_path(), true).unwrap();
        assert!(switched.active);
        assert!(switched.is_break);
        assert_eq!(switched.remaining_secs, BREAK_SECS);
    }

    #[test]
    fn test_tick_requires_active_timer() {
        let env = setup();
        let ticked = tick(env.data_path(), 10).unwrap();
        assert_eq!(ticked.applied, 0);
        assert_eq!(ticked.status.remaining_secs, FOCUS_SECS);
    }

    #[test]
    fn test_tick_counts_focus_and_stops_at_zero() {
        let env = setup();
        start(env.data_path(), false).unwrap();

        let ticked = tick(env.data_path(), 3).unwrap();
        assert_eq!(ticked.applied, 3);
        assert_eq!(ticked.status.remaining_secs, FOCUS_SECS - 3);
        assert_eq!(ticked.status.focus_total_secs, 3);

        // Run the timer down; extra requested ticks stop at deactivation
        let ticked = tick(env.data_path(), FOCUS_SECS).unwrap();
        assert_eq!(ticked.applied, FOCUS_SECS - 3);
        assert_eq!(ticked.status.remaining_secs, 0);
        assert!(!ticked.status.active);
    }

    #[test]
    fn test_stop_after_finished_focus_awards_points() {
        let env = setup();
        start(env.data_path(), false).unwrap();
        tick(env.data_path(), FOCUS_SECS).unwrap();

        let stopped = stop(env.data_path()).unwrap();
        assert_eq!(stopped.points_awarded, POINTS_FOCUS_FINISHED);
        assert_eq!(stopped.status.remaining_secs, FOCUS_SECS);

        let store = open_store(env.data_path()).unwrap();
        assert_eq!(store.state().unwrap().points, POINTS_FOCUS_FINISHED);
    }

    #[test]
    fn test_stop_midway_awards_nothing() {
        let env = setup();
        start(env.data_path(), false).unwrap();
        tick(env.data_path(), 5).unwrap();

        let stopped = stop(env.data_path()).unwrap();
        assert_eq!(stopped.points_awarded, 0);
    }

    #[test]
    fn test_finished_break_awards_nothing() {
        let env = setup();
        start(env.data_path(), true).unwrap();
        tick(env.data_path(), BREAK_SECS).unwrap();

        let stopped = stop(env.data_path()).unwrap();
        assert_eq!(stopped.points_awarded, 0);
        // Break time never counts toward the focus total
        assert_eq!(stopped.status.focus_total_secs, 0);
    }
}
