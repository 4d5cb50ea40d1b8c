//! Sprint lifecycle operations.

use serde::Serialize;
use std::path::Path;

use super::{Output, POINTS_SPRINT_STARTED, json_line, open_store};
use crate::models::Sprint;
use crate::storage::generate_id;
use crate::store::Action;
use crate::{Error, Result};

#[derive(Debug, Serialize)]
pub struct SprintStarted {
    pub id: String,
    pub name: String,
    pub ends_at: chrono::DateTime<chrono::Utc>,
    pub points_awarded: u32,
}

impl Output for SprintStarted {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Started sprint {} \"{}\" ending {} (+{} points)",
            self.id,
            self.name,
            self.ends_at.format("%Y-%m-%d"),
            self.points_awarded
        )
    }
}

/// Start a sprint covering the given goals. The new sprint becomes the
/// tracked active sprint.
pub fn start(
    data_dir: &Path,
    name: String,
    duration_days: u32,
    goal_ids: Vec<String>,
) -> Result<SprintStarted> {
    if duration_days == 0 {
        return Err(Error::InvalidInput(
            "sprint duration must be at least one day".to_string(),
        ));
    }

    let store = open_store(data_dir)?;
    let state = store.state()?;
    for goal_id in &goal_ids {
        if !state.goals.iter().any(|g| g.id == *goal_id) {
            return Err(Error::NotFound(goal_id.clone()));
        }
    }

    let mut sprint = Sprint::new(
        generate_id("sprint", 0),
        name,
        duration_days,
        chrono::Utc::now(),
    );
    sprint.goal_ids = goal_ids;

    let result = SprintStarted {
        id: sprint.id.clone(),
        name: sprint.name.clone(),
        ends_at: sprint.ends_at,
        points_awarded: POINTS_SPRINT_STARTED,
    };
    store.dispatch(Action::StartSprint(sprint))?;
    store.dispatch(Action::AddPoints(POINTS_SPRINT_STARTED))?;
    Ok(result)
}

#[derive(Debug, Serialize)]
pub struct SprintEnded {
    pub id: String,
}

impl Output for SprintEnded {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        format!("Ended sprint {}", self.id)
    }
}

/// End a sprint. The record stays in history with its active flag
/// cleared, and the tracked active sprint is dropped.
pub fn end(data_dir: &Path, id: &str) -> Result<SprintEnded> {
    let store = open_store(data_dir)?;
    let state = store.state()?;
    if !state.sprints.iter().any(|s| s.id == id) {
        return Err(Error::NotFound(id.to_string()));
    }

    store.dispatch(Action::EndSprint(id.to_string()))?;
    Ok(SprintEnded { id: id.to_string() })
}

#[derive(Debug, Serialize)]
pub struct SprintList {
    pub count: usize,
    pub sprints: Vec<Sprint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_sprint_id: Option<String>,
}

impl Output for SprintList {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        if self.sprints.is_empty() {
            return "No sprints".to_string();
        }
        self.sprints
            .iter()
            .map(|s| {
                format!(
                    "{}  {} ({} days, {} goal(s)){}",
                    s.id,
                    s.name,
                    s.duration_days,
                    s.goal_ids.len(),
                    if s.active { "  [active]" } else { "" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// List sprint history.
pub fn list(data_dir: &Path) -> Result<SprintList> {
    let store = open_store(data_dir)?;
    let state = store.state()?;

    Ok(SprintList {
        count: state.sprints.len(),
        active_sprint_id: state.active_sprint.as_ref().map(|s| s.id.clone()),
        sprints: state.sprints,
    })
}
