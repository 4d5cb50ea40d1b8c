//! Storage layer for Sprintly data.
//!
//! State lives in a single JSON document, the `sprintly-data.json` slot
//! inside the data directory. The document carries exactly the top-level
//! fields `metas`, `tasks`, `sprints`, `pontuacao`, `nivel`,
//! `achievements`, `pomodoroTotalFoco`, and `settings`, so documents
//! written by earlier releases round-trip unchanged. It is rewritten
//! atomically after every dispatch and read once at startup, merged over
//! defaults field by field.
//!
//! Backups are the same document plus `exportedAt` and `version`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::models::{Achievement, Goal, Settings, Sprint, Task};
use crate::store::AppState;
use crate::{Error, Result};

/// File name of the persisted state slot.
pub const STATE_FILE: &str = "sprintly-data.json";

/// File name of the session sidecar carrying runtime-only state between
/// CLI invocations (running pomodoro, tracked sprint, goal selection).
/// Kept separate so the slot's field set stays fixed.
pub const SESSION_FILE: &str = "session.json";

/// Backup document format version.
pub const BACKUP_VERSION: &str = "1.0.0";

/// Top-level keys a file must carry to be accepted as a full-state
/// restore.
const REQUIRED_BACKUP_KEYS: &[&str] = &["metas", "tasks", "achievements", "settings"];

/// Storage manager for a single data directory.
pub struct Storage {
    /// Root directory holding the state slot and the action log
    root: PathBuf,
}

impl Storage {
    /// Open existing storage rooted at `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        if !data_dir.join(STATE_FILE).exists() {
            return Err(Error::NotInitialized);
        }
        Ok(Self {
            root: data_dir.to_path_buf(),
        })
    }

    /// Initialize storage at `data_dir`, seeding the default state slot.
    /// Re-initializing existing storage leaves the slot untouched.
    pub fn init(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        let storage = Self {
            root: data_dir.to_path_buf(),
        };
        if !storage.state_path().exists() {
            storage.save_state(&AppState::default())?;
        }
        Ok(storage)
    }

    /// Check whether storage exists at `data_dir`.
    pub fn exists(data_dir: &Path) -> bool {
        data_dir.join(STATE_FILE).exists()
    }

    /// Root directory of this storage.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    fn session_path(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }

    /// Load the persisted state, merged over defaults. A missing slot
    /// yields the default state; the session sidecar, when readable,
    /// overlays the runtime-only fields.
    pub fn load_state(&self) -> Result<AppState> {
        let text = match fs::read_to_string(self.state_path()) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AppState::default());
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: Snapshot = serde_json::from_str(&text)?;
        let mut state = snapshot.into_state();

        // A missing or corrupt sidecar just means an idle session
        if let Ok(text) = fs::read_to_string(self.session_path()) {
            if let Ok(session) = serde_json::from_str::<SessionState>(&text) {
                session.apply(&mut state);
            }
        }
        Ok(state)
    }

    /// Persist the state snapshot, atomically replacing the slot and the
    /// session sidecar.
    pub fn save_state(&self, state: &AppState) -> Result<()> {
        self.write_atomic(&self.state_path(), &serde_json::to_string(&Snapshot::from_state(state))?)?;
        self.write_atomic(
            &self.session_path(),
            &serde_json::to_string(&SessionState::from_state(state))?,
        )
    }

    fn write_atomic(&self, path: &Path, json: &str) -> Result<()> {
        let mut file = tempfile::NamedTempFile::new_in(&self.root)?;
        file.write_all(json.as_bytes())?;
        file.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Erase the slot and the session sidecar, then re-seed defaults.
    /// Irreversible.
    pub fn clear(&self) -> Result<()> {
        for path in [self.state_path(), self.session_path()] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        self.save_state(&AppState::default())
    }
}

/// Runtime-only state carried between CLI invocations. The original
/// document format never includes these fields, so they live in a
/// sidecar file instead of the slot.
#[derive(Debug, Serialize, Deserialize)]
struct SessionState {
    #[serde(rename = "pomodoroAtivo", default)]
    pomodoro_active: bool,

    #[serde(rename = "pomodoroTempo", default = "default_focus_secs")]
    pomodoro_remaining: u32,

    #[serde(rename = "pomodoroIsBreak", default)]
    pomodoro_is_break: bool,

    #[serde(rename = "sprintAtivo", default, skip_serializing_if = "Option::is_none")]
    active_sprint: Option<Sprint>,

    #[serde(rename = "selectedMetaId", default, skip_serializing_if = "Option::is_none")]
    selected_goal_id: Option<String>,
}

fn default_focus_secs() -> u32 {
    crate::store::FOCUS_SECS
}

impl SessionState {
    fn from_state(state: &AppState) -> Self {
        Self {
            pomodoro_active: state.pomodoro.active,
            pomodoro_remaining: state.pomodoro.remaining_secs,
            pomodoro_is_break: state.pomodoro.is_break,
            active_sprint: state.active_sprint.clone(),
            selected_goal_id: state.selected_goal_id.clone(),
        }
    }

    fn apply(self, state: &mut AppState) {
        state.pomodoro.active = self.pomodoro_active;
        state.pomodoro.remaining_secs = self.pomodoro_remaining;
        state.pomodoro.is_break = self.pomodoro_is_break;
        state.active_sprint = self.active_sprint;
        state.selected_goal_id = self.selected_goal_id;
    }
}

/// Default data directory: the platform data dir plus `sprintly`.
/// The CLI layers an `SPRY_DATA_DIR` override on top of this.
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("sprintly"))
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))
}

/// Generate a synthetic id: `<prefix>-<millis>-<index>-<random suffix>`.
///
/// Unique within an import batch by construction; collisions beyond that
/// are left to the random suffix, which is plenty for interactive use.
pub fn generate_id(prefix: &str, index: usize) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}-{}",
        prefix,
        Utc::now().timestamp_millis(),
        index,
        &suffix[..7]
    )
}

/// The persisted state document. Every field defaults independently so
/// partial or older documents still load.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "metas", default)]
    pub goals: Vec<Goal>,

    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub sprints: Vec<Sprint>,

    #[serde(rename = "pontuacao", default)]
    pub points: u32,

    #[serde(rename = "nivel", default = "default_level")]
    pub level: u32,

    #[serde(default = "Achievement::catalog")]
    pub achievements: Vec<Achievement>,

    #[serde(rename = "pomodoroTotalFoco", default)]
    pub pomodoro_total_focus: u64,

    #[serde(default)]
    pub settings: Settings,
}

fn default_level() -> u32 {
    1
}

impl Snapshot {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            goals: state.goals.clone(),
            tasks: state.tasks.clone(),
            sprints: state.sprints.clone(),
            points: state.points,
            level: state.level,
            achievements: state.achievements.clone(),
            pomodoro_total_focus: state.pomodoro.total_focus_secs,
            settings: state.settings.clone(),
        }
    }

    /// Rehydrate a state record. Fields outside the document (countdown,
    /// active flags, sprint pointer, selection) take their defaults.
    pub fn into_state(self) -> AppState {
        let mut state = AppState::default();
        state.goals = self.goals;
        state.tasks = self.tasks;
        state.sprints = self.sprints;
        state.points = self.points;
        state.level = self.level;
        state.achievements = self.achievements;
        state.pomodoro.total_focus_secs = self.pomodoro_total_focus;
        state.settings = self.settings;
        state.rebuild_task_index();
        state
    }
}

/// A downloadable backup: the state document plus export metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct Backup {
    #[serde(flatten)]
    pub snapshot: Snapshot,

    #[serde(rename = "exportedAt")]
    pub exported_at: DateTime<Utc>,

    pub version: String,
}

/// Write a pretty-printed backup of `state` to `path`.
pub fn write_backup(state: &AppState, path: &Path, now: DateTime<Utc>) -> Result<()> {
    let backup = Backup {
        snapshot: Snapshot::from_state(state),
        exported_at: now,
        version: BACKUP_VERSION.to_string(),
    };
    fs::write(path, serde_json::to_string_pretty(&backup)?)?;
    Ok(())
}

/// Read a backup file and rehydrate the full state it describes.
///
/// The file is accepted only if every required top-level key is present;
/// anything else is rejected before any state changes.
pub fn read_backup(path: &Path) -> Result<AppState> {
    let text = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| Error::InvalidBackup(format!("not valid JSON: {}", e)))?;

    let Some(object) = value.as_object() else {
        return Err(Error::InvalidBackup("not a JSON object".to_string()));
    };
    for key in REQUIRED_BACKUP_KEYS {
        if !object.contains_key(*key) {
            return Err(Error::InvalidBackup(format!(
                "missing required field `{}`",
                key
            )));
        }
    }

    let snapshot: Snapshot = serde_json::from_value(value)
        .map_err(|e| Error::InvalidBackup(e.to_string()))?;
    Ok(snapshot.into_state())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Theme, Urgency};
    use crate::test_utils::TestEnv;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn sample_state() -> AppState {
        let mut state = AppState::default();
        let mut goal = Goal::new("meta-1".to_string(), "Ship".to_string(), now());
        goal.urgency = Urgency::High;
        goal.steps = vec!["draft".to_string(), "review".to_string()];
        state.goals.push(goal);
        state
            .tasks
            .push(Task::new("task-1".to_string(), "meta-1".to_string(), "Write".to_string(), now()));
        state.points = 150;
        state.level = 2;
        state.pomodoro.total_focus_secs = 90;
        state.settings.theme = Theme::Dark;
        state.rebuild_task_index();
        state
    }

    #[test]
    fn test_open_uninitialized_fails() {
        let env = TestEnv::new();
        assert!(matches!(
            Storage::open(env.data_path()),
            Err(Error::NotInitialized)
        ));
        assert!(!Storage::exists(env.data_path()));
    }

    #[test]
    fn test_init_seeds_default_slot() {
        let env = TestEnv::new();
        let storage = env.init_storage();

        assert!(Storage::exists(env.data_path()));
        let state = storage.load_state().unwrap();
        assert!(state.goals.is_empty());
        assert_eq!(state.achievements.len(), 4);
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_reinit_preserves_existing_slot() {
        let env = TestEnv::new();
        let storage = env.init_storage();
        storage.save_state(&sample_state()).unwrap();

        let storage = env.init_storage();
        assert_eq!(storage.load_state().unwrap().points, 150);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let env = TestEnv::new();
        let storage = env.init_storage();
        let state = sample_state();
        storage.save_state(&state).unwrap();

        let loaded = storage.load_state().unwrap();
        assert_eq!(loaded.goals, state.goals);
        assert_eq!(loaded.tasks, state.tasks);
        assert_eq!(loaded.points, 150);
        assert_eq!(loaded.level, 2);
        assert_eq!(loaded.pomodoro.total_focus_secs, 90);
        assert_eq!(loaded.settings.theme, Theme::Dark);
        assert_eq!(loaded.task_ids_for_goal("meta-1"), vec!["task-1".to_string()]);
    }

    #[test]
    fn test_slot_uses_wire_field_names() {
        let env = TestEnv::new();
        let storage = env.init_storage();
        storage.save_state(&sample_state()).unwrap();

        let text = std::fs::read_to_string(env.data_path().join(STATE_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let keys: HashSet<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        let expected: HashSet<&str> = [
            "metas",
            "tasks",
            "sprints",
            "pontuacao",
            "nivel",
            "achievements",
            "pomodoroTotalFoco",
            "settings",
        ]
        .into_iter()
        .collect();
        assert_eq!(keys, expected);
        assert_eq!(value["metas"][0]["nome"], "Ship");
    }

    #[test]
    fn test_partial_document_merges_over_defaults() {
        let env = TestEnv::new();
        std::fs::write(
            env.data_path().join(STATE_FILE),
            r#"{"metas":[],"pontuacao":50}"#,
        )
        .unwrap();

        let storage = env.open_storage();
        let state = storage.load_state().unwrap();
        assert_eq!(state.points, 50);
        assert_eq!(state.level, 1);
        assert_eq!(state.achievements.len(), 4);
        assert_eq!(state.settings, Settings::default());
    }

    #[test]
    fn test_session_sidecar_keeps_runtime_state() {
        let env = TestEnv::new();
        let storage = env.init_storage();
        let mut state = sample_state();
        state.pomodoro.active = true;
        state.pomodoro.remaining_secs = 1200;
        state.selected_goal_id = Some("meta-1".to_string());
        storage.save_state(&state).unwrap();

        let loaded = storage.load_state().unwrap();
        assert!(loaded.pomodoro.active);
        assert_eq!(loaded.pomodoro.remaining_secs, 1200);
        assert_eq!(loaded.selected_goal_id.as_deref(), Some("meta-1"));
    }

    #[test]
    fn test_corrupt_session_sidecar_is_ignored() {
        let env = TestEnv::new();
        let storage = env.init_storage();
        storage.save_state(&sample_state()).unwrap();
        std::fs::write(env.data_path().join(SESSION_FILE), "{broken").unwrap();

        let loaded = storage.load_state().unwrap();
        assert!(!loaded.pomodoro.active);
        assert_eq!(loaded.points, 150);
    }

    #[test]
    fn test_clear_resets_to_defaults() {
        let env = TestEnv::new();
        let storage = env.init_storage();
        storage.save_state(&sample_state()).unwrap();

        storage.clear().unwrap();
        let state = storage.load_state().unwrap();
        assert!(state.goals.is_empty());
        assert_eq!(state.points, 0);
        assert!(Storage::exists(env.data_path()));
    }

    #[test]
    fn test_backup_roundtrip() {
        let env = TestEnv::new();
        let path = env.data_path().join("backup.json");
        write_backup(&sample_state(), &path, now()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["version"], BACKUP_VERSION);
        assert!(value.get("exportedAt").is_some());

        let restored = read_backup(&path).unwrap();
        assert_eq!(restored.points, 150);
        assert_eq!(restored.goals.len(), 1);
        // Runtime-only fields reset on restore
        assert!(!restored.pomodoro.active);
        assert_eq!(restored.active_sprint, None);
    }

    #[test]
    fn test_backup_missing_required_key_rejected() {
        let env = TestEnv::new();
        let path = env.data_path().join("bad.json");
        std::fs::write(&path, r#"{"metas":[],"tasks":[],"achievements":[]}"#).unwrap();

        let err = read_backup(&path).unwrap_err();
        match err {
            Error::InvalidBackup(msg) => assert!(msg.contains("settings"), "msg: {}", msg),
            other => panic!("expected InvalidBackup, got {:?}", other),
        }
    }

    #[test]
    fn test_backup_non_object_rejected() {
        let env = TestEnv::new();
        let path = env.data_path().join("bad.json");
        std::fs::write(&path, "[1,2,3]").unwrap();
        assert!(matches!(read_backup(&path), Err(Error::InvalidBackup(_))));
    }

    #[test]
    fn test_generate_id_shape_and_uniqueness() {
        let ids: HashSet<String> = (0..100).map(|i| generate_id("meta", i)).collect();
        assert_eq!(ids.len(), 100);
        assert!(ids.iter().all(|id| id.starts_with("meta-")));

        let id = generate_id("task", 3);
        assert_eq!(id.split('-').count(), 4);
        assert_eq!(id.split('-').nth(2), Some("3"));
    }
}
