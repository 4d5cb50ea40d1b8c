//! Sprintly - a goal tracking library for focused humans.
//!
//! This library provides the core functionality for the `spry` CLI tool:
//! goals broken into steps, tasks on a kanban pipeline, time-boxed sprints,
//! a pomodoro focus timer, points/levels, and a fixed achievement catalog.
//!
//! All mutations flow through [`store::Store::dispatch`], which applies a
//! deterministic transition function and persists the state snapshot.

pub mod action_log;
pub mod cli;
pub mod commands;
pub mod import;
pub mod models;
pub mod storage;
pub mod store;


/// Library-level error type for Sprintly operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not initialized: run `spry system init` first")]
    NotInitialized,

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Import failed: {0}")]
    ImportFormat(String),

    #[error("Invalid backup: {0}")]
    InvalidBackup(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Sprintly operations.
pub type Result<T> = std::result::Result<T, Error>;
