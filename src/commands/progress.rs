//! Points and achievements.

use serde::Serialize;
use std::path::Path;

use super::{Output, json_line, open_store};
use crate::models::Achievement;
use crate::store::Action;
use crate::{Error, Result};

#[derive(Debug, Serialize)]
pub struct PointsAdded {
    pub added: u32,
    pub points: u32,
    pub level: u32,
}

impl Output for PointsAdded {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        format!(
            "+{} points ({} total, level {})",
            self.added, self.points, self.level
        )
    }
}

/// Add points to the running total.
pub fn points_add(data_dir: &Path, amount: u32) -> Result<PointsAdded> {
    let store = open_store(data_dir)?;
    store.dispatch(Action::AddPoints(amount))?;

    let state = store.state()?;
    Ok(PointsAdded {
        added: amount,
        points: state.points,
        level: state.level,
    })
}

#[derive(Debug, Serialize)]
pub struct AchievementList {
    pub unlocked: usize,
    pub achievements: Vec<Achievement>,
}

impl Output for AchievementList {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        self.achievements
            .iter()
            .map(|a| {
                let status = match a.unlocked_at {
                    Some(at) => format!("unlocked {}", at.format("%Y-%m-%d")),
                    None => "locked".to_string(),
                };
                format!("{} {} - {} ({})", a.icon, a.name, a.description, status)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// List the achievement catalog with unlock states.
pub fn achievement_list(data_dir: &Path) -> Result<AchievementList> {
    let store = open_store(data_dir)?;
    let state = store.state()?;

    Ok(AchievementList {
        unlocked: state.achievements.iter().filter(|a| a.is_unlocked()).count(),
        achievements: state.achievements,
    })
}

#[derive(Debug, Serialize)]
pub struct AchievementUnlocked {
    pub id: String,
    pub already_unlocked: bool,
}

impl Output for AchievementUnlocked {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        if self.already_unlocked {
            format!("Achievement {} was already unlocked", self.id)
        } else {
            format!("Unlocked achievement {}", self.id)
        }
    }
}

/// Unlock an achievement by id. Re-unlocking is a no-op.
pub fn achievement_unlock(data_dir: &Path, id: &str) -> Result<AchievementUnlocked> {
    let store = open_store(data_dir)?;
    let state = store.state()?;

    let achievement = state
        .achievements
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    let already_unlocked = achievement.is_unlocked();

    store.dispatch(Action::UnlockAchievement(id.to_string()))?;
    Ok(AchievementUnlocked {
        id: id.to_string(),
        already_unlocked,
    })
}
