//! CLI argument definitions for Sprintly.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sprintly - a goal tracker for focused humans.
///
/// Run bare `spry` for a status summary, `spry goal create` to add your
/// first goal, and `spry pomodoro start` to begin a focus session.
#[derive(Parser, Debug)]
#[command(name = "spry")]
#[command(author, version, about = "A CLI goal tracker: kanban tasks, sprints, and pomodoro focus sessions", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Directory holding sprintly data (defaults to the platform data
    /// directory). Can also be set via SPRY_DATA_DIR.
    #[arg(long = "data-dir", global = true, env = "SPRY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Goal management commands
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },

    /// Task management commands (kanban pipeline: backlog, todo, doing, done)
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Sprint management commands
    Sprint {
        #[command(subcommand)]
        command: SprintCommands,
    },

    /// Pomodoro focus timer commands
    Pomodoro {
        #[command(subcommand)]
        command: PomodoroCommands,
    },

    /// Points commands
    Points {
        #[command(subcommand)]
        command: PointsCommands,
    },

    /// Achievement commands
    Achievement {
        #[command(subcommand)]
        command: AchievementCommands,
    },

    /// Settings commands
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Import goals and tasks from a JSON, Markdown, or CSV file
    Import {
        /// File to import
        file: PathBuf,

        /// Input format (json, markdown, csv); inferred from the file
        /// extension when omitted
        #[arg(long)]
        format: Option<String>,
    },

    /// Export a full backup to a JSON file
    Export {
        /// Destination file
        file: PathBuf,
    },

    /// Restore the full state from a backup file (replaces everything)
    Restore {
        /// Backup file to restore
        file: PathBuf,
    },

    /// System administration commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

/// Goal subcommands
#[derive(Subcommand, Debug)]
pub enum GoalCommands {
    /// Create a new goal
    Create {
        /// Goal name
        name: String,

        /// Goal description
        #[arg(short, long)]
        description: Option<String>,

        /// Category (free text, e.g. Estudos, Projetos)
        #[arg(short, long)]
        category: Option<String>,

        /// Urgency (baixa, media, alta)
        #[arg(short, long)]
        urgency: Option<String>,

        /// Deadline (YYYY-MM-DD); defaults to 30 days from now
        #[arg(long)]
        deadline: Option<String>,

        /// Step label; repeat for multiple steps
        #[arg(short, long = "step")]
        steps: Vec<String>,

        /// Tag; repeat for multiple tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// List goals
    List {
        /// Filter by category (case-insensitive)
        #[arg(long)]
        category: Option<String>,

        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show a goal and the tasks referencing it
    Show {
        /// Goal id
        id: String,
    },

    /// Update a goal
    Update {
        /// Goal id
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// New urgency (baixa, media, alta)
        #[arg(long)]
        urgency: Option<String>,

        /// New deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,

        /// New progress percentage (0-100)
        #[arg(long)]
        progress: Option<u8>,

        /// Append a step
        #[arg(long)]
        add_step: Vec<String>,

        /// Add a tag
        #[arg(long)]
        add_tag: Vec<String>,

        /// Remove a tag
        #[arg(long)]
        remove_tag: Vec<String>,
    },

    /// Delete a goal and every task referencing it
    Delete {
        /// Goal id
        id: String,
    },

    /// Select a goal as the current filter, or clear the selection
    Select {
        /// Goal id to select
        #[arg(conflicts_with = "none")]
        id: Option<String>,

        /// Clear the selection
        #[arg(long)]
        none: bool,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a new backlog task on a goal
    Create {
        /// Task title
        title: String,

        /// Owning goal id
        #[arg(short, long)]
        goal: String,

        /// Task description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List tasks
    List {
        /// Filter by status (backlog, todo, doing, done)
        #[arg(long)]
        status: Option<String>,

        /// Filter by goal id
        #[arg(long)]
        goal: Option<String>,
    },

    /// Show task details
    Show {
        /// Task id
        id: String,
    },

    /// Update a task
    Update {
        /// Task id
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// Move to a different goal
        #[arg(long)]
        goal: Option<String>,
    },

    /// Move a task to a new status column
    Move {
        /// Task id
        id: String,

        /// New status (backlog, todo, doing, done)
        status: String,
    },

    /// Delete a task
    Delete {
        /// Task id
        id: String,
    },
}

/// Sprint subcommands
#[derive(Subcommand, Debug)]
pub enum SprintCommands {
    /// Start a sprint; it becomes the tracked active sprint
    Start {
        /// Sprint name
        name: String,

        /// Duration in days
        #[arg(long, default_value = "7")]
        days: u32,

        /// Goal id this sprint covers; repeat for multiple goals
        #[arg(short, long = "goal")]
        goals: Vec<String>,
    },

    /// End a sprint (keeps it in history, drops the active pointer)
    End {
        /// Sprint id
        id: String,
    },

    /// List sprint history
    List,
}

/// Pomodoro subcommands
#[derive(Subcommand, Debug)]
pub enum PomodoroCommands {
    /// Start a 25-minute focus session, or a 5-minute break
    Start {
        /// Start a break instead of a focus session
        #[arg(long = "break")]
        is_break: bool,
    },

    /// Stop the timer and reset it
    Stop,

    /// Advance the timer by one-second ticks while it stays active
    Tick {
        /// Number of ticks to apply
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,
    },

    /// Show timer state
    Status,
}

/// Points subcommands
#[derive(Subcommand, Debug)]
pub enum PointsCommands {
    /// Add points to the running total
    Add {
        /// Points to add
        amount: u32,
    },
}

/// Achievement subcommands
#[derive(Subcommand, Debug)]
pub enum AchievementCommands {
    /// List the achievement catalog with unlock states
    List,

    /// Unlock an achievement by id
    Unlock {
        /// Achievement id (e.g. primeira-meta)
        id: String,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show current settings
    Show,

    /// Update settings; only the given flags change
    Set {
        /// Theme (light, dark, auto)
        #[arg(long)]
        theme: Option<String>,

        /// Play a sound when the pomodoro finishes
        #[arg(long)]
        sound: Option<bool>,

        /// Automatically start breaks after focus sessions
        #[arg(long)]
        auto_start_breaks: Option<bool>,

        /// Show completed tasks in listings
        #[arg(long)]
        show_completed: Option<bool>,

        /// Update goal progress automatically from task completion
        #[arg(long)]
        auto_progress: Option<bool>,
    },
}

/// System administration commands
#[derive(Subcommand, Debug)]
pub enum SystemCommands {
    /// Initialize the data directory
    Init,

    /// Erase all data and reset to defaults (irreversible)
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        force: bool,
    },

    /// Show version and build information
    Version,
}
