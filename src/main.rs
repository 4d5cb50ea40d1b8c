//! Sprintly CLI - a goal tracker for focused humans.

use clap::Parser;
use sprintly::action_log;
use sprintly::cli::{
    AchievementCommands, Cli, Commands, GoalCommands, PointsCommands, PomodoroCommands,
    SettingsCommands, SprintCommands, SystemCommands, TaskCommands,
};
use sprintly::commands::{self, Output, goal, pomodoro, progress, settings, sprint, task, transfer};
use sprintly::storage::default_data_dir;
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    // Determine data dir: --data-dir flag > SPRY_DATA_DIR env > platform default
    let data_dir = resolve_data_dir(cli.data_dir, human);

    let cmd_name = command_name(&cli.command);
    let args_json = serde_json::json!(env::args().skip(1).collect::<Vec<String>>());

    // Start timing
    let start = Instant::now();

    // Execute command
    let result = run_command(cli.command, &data_dir, human);

    // Calculate duration
    let duration = start.elapsed().as_millis() as u64;

    // Determine success/error
    let (success, error) = match &result {
        Ok(()) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };

    // Log the action (warns and moves on if logging fails)
    action_log::log_action(&data_dir, &cmd_name, args_json, success, error, duration);

    // Handle result
    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!(r#"{{"error": "{}"}}"#, e);
        }
        process::exit(1);
    }
}

/// Resolve the data directory from the explicit flag/env or the platform
/// default.
fn resolve_data_dir(explicit: Option<PathBuf>, human: bool) -> PathBuf {
    match explicit {
        Some(path) => path,
        None => match default_data_dir() {
            Ok(path) => path,
            Err(e) => {
                if human {
                    eprintln!("Error: {}", e);
                } else {
                    eprintln!(r#"{{"error": "{}"}}"#, e);
                }
                process::exit(1);
            }
        },
    }
}

fn run_command(
    command: Option<Commands>,
    data_dir: &Path,
    human: bool,
) -> Result<(), sprintly::Error> {
    match command {
        Some(Commands::Goal { command }) => match command {
            GoalCommands::Create {
                name,
                description,
                category,
                urgency,
                deadline,
                steps,
                tags,
            } => {
                let draft = goal::GoalDraft {
                    name,
                    description,
                    category,
                    urgency,
                    deadline,
                    steps,
                    tags,
                };
                output(&goal::create(data_dir, draft)?, human);
            }
            GoalCommands::List { category, tag } => {
                output(&goal::list(data_dir, category, tag)?, human);
            }
            GoalCommands::Show { id } => {
                output(&goal::show(data_dir, &id)?, human);
            }
            GoalCommands::Update {
                id,
                name,
                description,
                category,
                urgency,
                deadline,
                progress,
                add_step,
                add_tag,
                remove_tag,
            } => {
                let patch = goal::GoalPatch {
                    name,
                    description,
                    category,
                    urgency,
                    deadline,
                    progress,
                    add_steps: add_step,
                    add_tags: add_tag,
                    remove_tags: remove_tag,
                };
                output(&goal::update(data_dir, &id, patch)?, human);
            }
            GoalCommands::Delete { id } => {
                output(&goal::delete(data_dir, &id)?, human);
            }
            GoalCommands::Select { id, none } => {
                if id.is_none() && !none {
                    return Err(sprintly::Error::InvalidInput(
                        "pass a goal id to select, or --none to clear".to_string(),
                    ));
                }
                output(&goal::select(data_dir, id)?, human);
            }
        },

        Some(Commands::Task { command }) => match command {
            TaskCommands::Create {
                title,
                goal,
                description,
            } => {
                output(&task::create(data_dir, title, goal, description)?, human);
            }
            TaskCommands::List { status, goal } => {
                output(&task::list(data_dir, status, goal)?, human);
            }
            TaskCommands::Show { id } => {
                output(&task::show(data_dir, &id)?, human);
            }
            TaskCommands::Update {
                id,
                title,
                description,
                goal,
            } => {
                output(&task::update(data_dir, &id, title, description, goal)?, human);
            }
            TaskCommands::Move { id, status } => {
                output(&task::move_task(data_dir, &id, &status)?, human);
            }
            TaskCommands::Delete { id } => {
                output(&task::delete(data_dir, &id)?, human);
            }
        },

        Some(Commands::Sprint { command }) => match command {
            SprintCommands::Start { name, days, goals } => {
                output(&sprint::start(data_dir, name, days, goals)?, human);
            }
            SprintCommands::End { id } => {
                output(&sprint::end(data_dir, &id)?, human);
            }
            SprintCommands::List => {
                output(&sprint::list(data_dir)?, human);
            }
        },

        Some(Commands::Pomodoro { command }) => match command {
            PomodoroCommands::Start { is_break } => {
                output(&pomodoro::start(data_dir, is_break)?, human);
            }
            PomodoroCommands::Stop => {
                output(&pomodoro::stop(data_dir)?, human);
            }
            PomodoroCommands::Tick { count } => {
                output(&pomodoro::tick(data_dir, count)?, human);
            }
            PomodoroCommands::Status => {
                output(&pomodoro::status(data_dir)?, human);
            }
        },

        Some(Commands::Points { command }) => match command {
            PointsCommands::Add { amount } => {
                output(&progress::points_add(data_dir, amount)?, human);
            }
        },

        Some(Commands::Achievement { command }) => match command {
            AchievementCommands::List => {
                output(&progress::achievement_list(data_dir)?, human);
            }
            AchievementCommands::Unlock { id } => {
                output(&progress::achievement_unlock(data_dir, &id)?, human);
            }
        },

        Some(Commands::Settings { command }) => match command {
            SettingsCommands::Show => {
                output(&settings::show(data_dir)?, human);
            }
            SettingsCommands::Set {
                theme,
                sound,
                auto_start_breaks,
                show_completed,
                auto_progress,
            } => {
                let update = settings::SettingsUpdate {
                    theme,
                    sound,
                    auto_start_breaks,
                    show_completed,
                    auto_progress,
                };
                output(&settings::set(data_dir, update)?, human);
            }
        },

        Some(Commands::Import { file, format }) => {
            output(&transfer::import(data_dir, &file, format)?, human);
        }

        Some(Commands::Export { file }) => {
            output(&transfer::export(data_dir, &file)?, human);
        }

        Some(Commands::Restore { file }) => {
            output(&transfer::restore(data_dir, &file)?, human);
        }

        Some(Commands::System { command }) => match command {
            SystemCommands::Init => {
                output(&commands::system_init(data_dir)?, human);
            }
            SystemCommands::Clear { force } => {
                output(&commands::system_clear(data_dir, force)?, human);
            }
            SystemCommands::Version => {
                output(&commands::system_version(), human);
            }
        },

        None => {
            // Default: show status summary
            match commands::status(data_dir) {
                Ok(summary) => output(&summary, human),
                Err(sprintly::Error::NotInitialized) => {
                    if human {
                        println!("Sprintly - Not initialized.");
                        println!(
                            "Run `spry system init` to initialize, then `spry goal create \"Name\"` to add a goal."
                        );
                    } else {
                        println!(r#"{{"initialized": false}}"#);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(())
}

/// Audit-log name of the invoked command.
fn command_name(command: &Option<Commands>) -> String {
    let name = match command {
        None => "status",
        Some(Commands::Goal { command }) => match command {
            GoalCommands::Create { .. } => "goal create",
            GoalCommands::List { .. } => "goal list",
            GoalCommands::Show { .. } => "goal show",
            GoalCommands::Update { .. } => "goal update",
            GoalCommands::Delete { .. } => "goal delete",
            GoalCommands::Select { .. } => "goal select",
        },
        Some(Commands::Task { command }) => match command {
            TaskCommands::Create { .. } => "task create",
            TaskCommands::List { .. } => "task list",
            TaskCommands::Show { .. } => "task show",
            TaskCommands::Update { .. } => "task update",
            TaskCommands::Move { .. } => "task move",
            TaskCommands::Delete { .. } => "task delete",
        },
        Some(Commands::Sprint { command }) => match command {
            SprintCommands::Start { .. } => "sprint start",
            SprintCommands::End { .. } => "sprint end",
            SprintCommands::List => "sprint list",
        },
        Some(Commands::Pomodoro { command }) => match command {
            PomodoroCommands::Start { .. } => "pomodoro start",
            PomodoroCommands::Stop => "pomodoro stop",
            PomodoroCommands::Tick { .. } => "pomodoro tick",
            PomodoroCommands::Status => "pomodoro status",
        },
        Some(Commands::Points { command }) => match command {
            PointsCommands::Add { .. } => "points add",
        },
        Some(Commands::Achievement { command }) => match command {
            AchievementCommands::List => "achievement list",
            AchievementCommands::Unlock { .. } => "achievement unlock",
        },
        Some(Commands::Settings { command }) => match command {
            SettingsCommands::Show => "settings show",
            SettingsCommands::Set { .. } => "settings set",
        },
        Some(Commands::Import { .. }) => "import",
        Some(Commands::Export { .. }) => "export",
        Some(Commands::Restore { .. }) => "restore",
        Some(Commands::System { command }) => match command {
            SystemCommands::Init => "system init",
            SystemCommands::Clear { .. } => "system clear",
            SystemCommands::Version => "system version",
        },
    };
    name.to_string()
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
