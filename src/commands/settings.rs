//! Preference updates.

use serde::Serialize;
use std::path::Path;

use super::{Output, json_line, open_store};
use crate::models::{Settings, SettingsPatch, parse_theme};
use crate::store::Action;
use crate::{Error, Result};

#[derive(Debug, Serialize)]
pub struct SettingsView {
    #[serde(flatten)]
    pub settings: Settings,
}

impl Output for SettingsView {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let s = &self.settings;
        [
            format!("theme: {}", s.theme),
            format!("pomodoro sound: {}", s.pomodoro_sound),
            format!("auto-start breaks: {}", s.auto_start_breaks),
            format!("show completed tasks: {}", s.show_completed_tasks),
            format!("auto-update progress: {}", s.auto_update_progress),
        ]
        .join("\n")
    }
}

/// Show current settings.
pub fn show(data_dir: &Path) -> Result<SettingsView> {
    let store = open_store(data_dir)?;
    Ok(SettingsView {
        settings: store.state()?.settings,
    })
}

/// Options accepted by `settings set`; only given fields change.
#[derive(Debug, Default)]
pub struct SettingsUpdate {
    pub theme: Option<String>,
    pub sound: Option<bool>,
    pub auto_start_breaks: Option<bool>,
    pub show_completed: Option<bool>,
    pub auto_progress: Option<bool>,
}

/// Shallow-merge the given fields into settings.
pub fn set(data_dir: &Path, update: SettingsUpdate) -> Result<SettingsView> {
    let patch = SettingsPatch {
        theme: update.theme.as_deref().map(parse_theme).transpose()?,
        pomodoro_sound: update.sound,
        auto_start_breaks: update.auto_start_breaks,
        show_completed_tasks: update.show_completed,
        auto_update_progress: update.auto_progress,
    };
    if patch == SettingsPatch::default() {
        return Err(Error::InvalidInput(
            "nothing to update; pass at least one settings flag".to_string(),
        ));
    }

    let store = open_store(data_dir)?;
    store.dispatch(Action::UpdateSettings(patch))?;
    Ok(SettingsView {
        settings: store.state()?.settings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Theme;
    use crate::test_utils::TestEnv;

    fn setup() -> TestEnv {
        let env = TestEnv::new();
        env.init_storage();
        env
    }

    #[test]
    fn test_set_theme_leaves_other_fields() {
        let env = setup();
        let before = show(env.data_path()).unwrap().settings;

        let after = set(
            env.data_path(),
            SettingsUpdate {
                theme: Some("dark".to_string()),
                ..SettingsUpdate::default()
            },
        )
        .unwrap()
        .settings;

        assert_eq!(after.theme, Theme::Dark);
        assert_eq!(after.pomodoro_sound, before.pomodoro_sound);
        assert_eq!(after.auto_start_breaks, before.auto_start_breaks);
        assert_eq!(after.show_completed_tasks, before.show_completed_tasks);
        assert_eq!(after.auto_update_progress, before.auto_update_progress);
    }

    #[test]
    fn test_set_persists() {
        let env = setup();
        set(
            env.data_path(),
            SettingsUpdate {
                sound: Some(false),
                ..SettingsUpdate::default()
            },
        )
        .unwrap();

        assert!(!show(env.data_path()).unwrap().settings.pomodoro_sound);
    }

    #[test]
    fn test_set_rejects_empty_update_and_bad_theme() {
        let env = setup();
        assert!(matches!(
            set(env.data_path(), SettingsUpdate::default()),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            set(
                env.data_path(),
                SettingsUpdate {
                    theme: Some("sepia".to_string()),
                    ..SettingsUpdate::default()
                }
            ),
            Err(Error::InvalidInput(_))
        ));
    }
}
