//! Goal CRUD operations.

use serde::Serialize;
use std::path::Path;

use super::{Output, POINTS_GOAL_CREATED, json_line, open_store};
use crate::models::{Goal, Task, parse_urgency};
use crate::storage::generate_id;
use crate::store::Action;
use crate::{Error, Result};

/// Fields accepted when creating a goal.
#[derive(Debug, Default)]
pub struct GoalDraft {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub deadline: Option<String>,
    pub steps: Vec<String>,
    pub tags: Vec<String>,
}

/// Fields accepted when updating a goal; absent fields keep their value.
#[derive(Debug, Default)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub deadline: Option<String>,
    pub progress: Option<u8>,
    pub add_steps: Vec<String>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GoalCreated {
    pub id: String,
    pub name: String,
    pub points_awarded: u32,
}

impl Output for GoalCreated {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Created goal {} \"{}\" (+{} points)",
            self.id, self.name, self.points_awarded
        )
    }
}

/// Create a goal and award creation points.
pub fn create(data_dir: &Path, draft: GoalDraft) -> Result<GoalCreated> {
    let store = open_store(data_dir)?;
    let now = chrono::Utc::now();

    let mut goal = Goal::new(generate_id("meta", 0), draft.name, now);
    if let Some(description) = draft.description {
        goal.description = description;
    }
    if let Some(category) = draft.category {
        goal.category = category;
    }
    if let Some(urgency) = draft.urgency {
        goal.urgency = parse_urgency(&urgency)?;
    }
    if let Some(deadline) = draft.deadline {
        goal.deadline = parse_deadline_strict(&deadline)?;
    }
    goal.steps = draft.steps;
    goal.tags = draft.tags;

    let result = GoalCreated {
        id: goal.id.clone(),
        name: goal.name.clone(),
        points_awarded: POINTS_GOAL_CREATED,
    };
    store.dispatch(Action::AddGoal(goal))?;
    store.dispatch(Action::AddPoints(POINTS_GOAL_CREATED))?;
    Ok(result)
}

#[derive(Debug, Serialize)]
pub struct GoalList {
    pub count: usize,
    pub goals: Vec<Goal>,
}

impl Output for GoalList {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        if self.goals.is_empty() {
            return "No goals".to_string();
        }
        self.goals
            .iter()
            .map(|g| {
                format!(
                    "{}  {} [{}] {}  due {}  {}%",
                    g.id, g.name, g.category, g.urgency, g.deadline, g.progress
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// List goals, optionally filtered by category or tag.
pub fn list(data_dir: &Path, category: Option<String>, tag: Option<String>) -> Result<GoalList> {
    let store = open_store(data_dir)?;
    let state = store.state()?;

    let category = category.map(|c| c.to_lowercase());
    let goals: Vec<Goal> = state
        .goals
        .into_iter()
        .filter(|g| {
            category
                .as_ref()
                .is_none_or(|c| g.category.to_lowercase() == *c)
        })
        .filter(|g| tag.as_ref().is_none_or(|t| g.tags.contains(t)))
        .collect();

    Ok(GoalList {
        count: goals.len(),
        goals,
    })
}

#[derive(Debug, Serialize)]
pub struct GoalDetail {
    pub goal: Goal,
    pub tasks: Vec<Task>,
}

impl Output for GoalDetail {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let g = &self.goal;
        let mut lines = vec![
            format!("{} \"{}\"", g.id, g.name),
            format!(
                "  {} [{}] {} urgency, due {}, {}% done",
                g.description, g.category, g.urgency, g.deadline, g.progress
            ),
        ];
        if !g.tags.is_empty() {
            lines.push(format!("  tags: {}", g.tags.join(", ")));
        }
        for step in &g.steps {
            lines.push(format!("  - {}", step));
        }
        if !self.tasks.is_empty() {
            lines.push(format!("  {} task(s):", self.tasks.len()));
            for task in &self.tasks {
                lines.push(format!("    {} [{}] {}", task.id, task.status, task.title));
            }
        }
        lines.join("\n")
    }
}

/// Show a goal and the tasks referencing it.
pub fn show(data_dir: &Path, id: &str) -> Result<GoalDetail> {
    let store = open_store(data_dir)?;
    let state = store.state()?;

    let goal = state
        .goals
        .iter()
        .find(|g| g.id == id)
        .cloned()
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    let tasks: Vec<Task> = state
        .tasks
        .iter()
        .filter(|t| t.goal_id == id)
        .cloned()
        .collect();

    Ok(GoalDetail { goal, tasks })
}

#[derive(Debug, Serialize)]
pub struct GoalUpdated {
    pub id: String,
}

impl Output for GoalUpdated {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        format!("Updated goal {}", self.id)
    }
}

/// Update a goal by whole-record replacement.
pub fn update(data_dir: &Path, id: &str, patch: GoalPatch) -> Result<GoalUpdated> {
    let store = open_store(data_dir)?;
    let state = store.state()?;

    let mut goal = state
        .goals
        .iter()
        .find(|g| g.id == id)
        .cloned()
        .ok_or_else(|| Error::NotFound(id.to_string()))?;

    if let Some(name) = patch.name {
        goal.name = name;
    }
    if let Some(description) = patch.description {
        goal.description = description;
    }
    if let Some(category) = patch.category {
        goal.category = category;
    }
    if let Some(urgency) = patch.urgency {
        goal.urgency = parse_urgency(&urgency)?;
    }
    if let Some(deadline) = patch.deadline {
        goal.deadline = parse_deadline_strict(&deadline)?;
    }
    if let Some(progress) = patch.progress {
        if progress > 100 {
            return Err(Error::InvalidInput(format!(
                "progress must be 0-100, got {}",
                progress
            )));
        }
        goal.progress = progress;
    }
    goal.steps.extend(patch.add_steps);
    goal.tags.extend(patch.add_tags);
    goal.tags.retain(|t| !patch.remove_tags.contains(t));

    store.dispatch(Action::UpdateGoal(goal))?;
    Ok(GoalUpdated { id: id.to_string() })
}

#[derive(Debug, Serialize)]
pub struct GoalDeleted {
    pub id: String,
    pub tasks_removed: usize,
}

impl Output for GoalDeleted {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Deleted goal {} and {} task(s) referencing it",
            self.id, self.tasks_removed
        )
    }
}

/// Delete a goal; its tasks are removed with it.
pub fn delete(data_dir: &Path, id: &str) -> Result<GoalDeleted> {
    let store = open_store(data_dir)?;
    let state = store.state()?;

    if !state.goals.iter().any(|g| g.id == id) {
        return Err(Error::NotFound(id.to_string()));
    }
    let tasks_removed = state.task_ids_for_goal(id).len();

    store.dispatch(Action::DeleteGoal(id.to_string()))?;
    Ok(GoalDeleted {
        id: id.to_string(),
        tasks_removed,
    })
}

#[derive(Debug, Serialize)]
pub struct GoalSelected {
    pub selected: Option<String>,
}

impl Output for GoalSelected {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        match &self.selected {
            Some(id) => format!("Selected goal {}", id),
            None => "Cleared goal selection".to_string(),
        }
    }
}

/// Set or clear the selected-goal filter.
pub fn select(data_dir: &Path, id: Option<String>) -> Result<GoalSelected> {
    let store = open_store(data_dir)?;

    if let Some(id) = &id {
        let state = store.state()?;
        if !state.goals.iter().any(|g| g.id == *id) {
            return Err(Error::NotFound(id.clone()));
        }
    }

    store.dispatch(Action::SelectGoal(id.clone()))?;
    Ok(GoalSelected { selected: id })
}

/// Parse a deadline argument, rejecting anything that is not a date.
fn parse_deadline_strict(value: &str) -> Result<chrono::NaiveDate> {
    crate::import::parse_deadline(value).ok_or_else(|| {
        Error::InvalidInput(format!(
            "invalid deadline: {} (expected YYYY-MM-DD)",
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Urgency;
    use crate::test_utils::TestEnv;

    fn draft(name: &str) -> GoalDraft {
        GoalDraft {
            name: name.to_string(),
            ..GoalDraft::default()
        }
    }

    #[test]
    fn test_create_awards_points_and_unlocks_first_goal() {
        let env = TestEnv::new();
        env.init_storage();

        let created = create(env.data_path(), draft("Ship it")).unwrap();
        assert_eq!(created.points_awarded, POINTS_GOAL_CREATED);

        let store = open_store(env.data_path()).unwrap();
        let state = store.state().unwrap();
        assert_eq!(state.points, POINTS_GOAL_CREATED);
        assert!(
            state
                .achievements
                .iter()
                .find(|a| a.id == crate::models::Achievement::FIRST_GOAL)
                .unwrap()
                .is_unlocked()
        );
    }

    #[test]
    fn test_create_with_fields() {
        let env = TestEnv::new();
        env.init_storage();

        let created = create(
            env.data_path(),
            GoalDraft {
                name: "Learn".to_string(),
                urgency: Some("alta".to_string()),
                deadline: Some("2025-12-01".to_string()),
                steps: vec!["read".to_string()],
                tags: vec!["study".to_string()],
                ..GoalDraft::default()
            },
        )
        .unwrap();

        let detail = show(env.data_path(), &created.id).unwrap();
        assert_eq!(detail.goal.urgency, Urgency::High);
        assert_eq!(detail.goal.deadline.to_string(), "2025-12-01");
        assert_eq!(detail.goal.steps, vec!["read"]);
    }

    #[test]
    fn test_create_rejects_bad_deadline() {
        let env = TestEnv::new();
        env.init_storage();

        let mut bad = draft("X");
        bad.deadline = Some("whenever".to_string());
        assert!(matches!(
            create(env.data_path(), bad),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_update_unknown_goal_not_found() {
        let env = TestEnv::new();
        env.init_storage();

        assert!(matches!(
            update(env.data_path(), "meta-404", GoalPatch::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_update_progress_bounds() {
        let env = TestEnv::new();
        env.init_storage();
        let created = create(env.data_path(), draft("X")).unwrap();

        let ok = GoalPatch {
            progress: Some(100),
            ..GoalPatch::default()
        };
        update(env.data_path(), &created.id, ok).unwrap();

        let over = GoalPatch {
            progress: Some(101),
            ..GoalPatch::default()
        };
        assert!(matches!(
            update(env.data_path(), &created.id, over),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_delete_reports_cascade_count() {
        let env = TestEnv::new();
        env.init_storage();
        let created = create(env.data_path(), draft("X")).unwrap();
        crate::commands::task::create(
            env.data_path(),
            "one".to_string(),
            created.id.clone(),
            None,
        )
        .unwrap();
        crate::commands::task::create(
            env.data_path(),
            "two".to_string(),
            created.id.clone(),
            None,
        )
        .unwrap();

        let deleted = delete(env.data_path(), &created.id).unwrap();
        assert_eq!(deleted.tasks_removed, 2);

        let store = open_store(env.data_path()).unwrap();
        assert!(store.state().unwrap().tasks.is_empty());
    }

    #[test]
    fn test_list_filters() {
        let env = TestEnv::new();
        env.init_storage();
        create(
            env.data_path(),
            GoalDraft {
                name: "A".to_string(),
                category: Some("Estudos".to_string()),
                ..GoalDraft::default()
            },
        )
        .unwrap();
        create(
            env.data_path(),
            GoalDraft {
                name: "B".to_string(),
                category: Some("Projetos".to_string()),
                tags: vec!["dev".to_string()],
                ..GoalDraft::default()
            },
        )
        .unwrap();

        let all = list(env.data_path(), None, None).unwrap();
        assert_eq!(all.count, 2);

        let estudos = list(env.data_path(), Some("estudos".to_string()), None).unwrap();
        assert_eq!(estudos.count, 1);
        assert_eq!(estudos.goals[0].name, "A");

        let tagged = list(env.data_path(), None, Some("dev".to_string())).unwrap();
        assert_eq!(tagged.count, 1);
        assert_eq!(tagged.goals[0].name, "B");
    }

    #[test]
    fn test_select_and_clear() {
        let env = TestEnv::new();
        env.init_storage();
        let created = create(env.data_path(), draft("X")).unwrap();

        select(env.data_path(), Some(created.id.clone())).unwrap();
        let store = open_store(env.data_path()).unwrap();
        assert_eq!(
            store.state().unwrap().selected_goal_id,
            Some(created.id.clone())
        );

        select(env.data_path(), None).unwrap();
        let store = open_store(env.data_path()).unwrap();
        assert_eq!(store.state().unwrap().selected_goal_id, None);

        assert!(matches!(
            select(env.data_path(), Some("meta-404".to_string())),
            Err(Error::NotFound(_))
        ));
    }
}
