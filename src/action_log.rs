//! Action logging for Sprintly commands.
//!
//! Every CLI invocation is appended to `action.log` (JSONL) in the data
//! directory: what ran, with which arguments, whether it succeeded, and
//! how long it took. Logging failures never break commands; they warn on
//! stderr and move on. Set `SPRY_ACTION_LOG=0` to disable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the audit log inside the data directory.
pub const LOG_FILE: &str = "action.log";

/// Represents a single action log entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionLog {
    /// ISO 8601 timestamp when the action occurred
    pub timestamp: DateTime<Utc>,

    /// Command name (e.g., "goal create", "pomodoro tick")
    pub command: String,

    /// Command arguments as JSON
    pub args: serde_json::Value,

    /// Whether the command succeeded
    pub success: bool,

    /// Error message if the command failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Command execution duration in milliseconds
    pub duration_ms: u64,

    /// User who executed the command
    pub user: String,
}

/// Log an action to the audit log in `data_dir`.
///
/// This function never fails - it silently falls back on errors to avoid
/// breaking commands due to logging issues.
pub fn log_action(
    data_dir: &Path,
    command: &str,
    args: serde_json::Value,
    success: bool,
    error: Option<String>,
    duration_ms: u64,
) {
    if !enabled() {
        return;
    }

    let entry = ActionLog {
        timestamp: Utc::now(),
        command: command.to_string(),
        args: sanitize_args(&args),
        success,
        error,
        duration_ms,
        user: current_user(),
    };

    if let Err(e) = write_log_entry(&log_path(data_dir), &entry) {
        eprintln!("Warning: Failed to write action log: {}", e);
    }
}

/// Path of the audit log inside the data directory.
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE)
}

fn enabled() -> bool {
    match std::env::var("SPRY_ACTION_LOG") {
        Ok(value) => {
            let value = value.to_lowercase();
            !(value == "0" || value == "false" || value == "no")
        }
        Err(_) => true,
    }
}

/// Write a log entry to the log file.
fn write_log_entry(path: &Path, entry: &ActionLog) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(entry)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", json)?;

    Ok(())
}

/// Sanitize arguments so the log stays compact: long strings are
/// truncated and large arrays summarized.
fn sanitize_args(args: &serde_json::Value) -> serde_json::Value {
    match args {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), sanitize_args(value)))
                .collect(),
        ),
        serde_json::Value::Array(arr) => {
            if arr.len() > 10 {
                serde_json::Value::String(format!("[Array with {} items]", arr.len()))
            } else {
                serde_json::Value::Array(arr.iter().map(sanitize_args).collect())
            }
        }
        serde_json::Value::String(s) => {
            if s.len() > 100 {
                let cut: String = s.chars().take(97).collect();
                serde_json::Value::String(format!("{}... ({} chars)", cut, s.len()))
            } else {
                args.clone()
            }
        }
        _ => args.clone(),
    }
}

/// Get the current user's username.
fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
