//! Daywise command-line entry point.
//!
//! Stands in for the web layer of a task manager: resolves the acting user
//! and dispatches each subcommand to the engine, printing either plain text
//! or JSON projections.

use anyhow::Result;
use clap::Parser;
use daywise::cli::{CategoryCommand, Cli, Command, SubtaskCommand};
use daywise::db::Database;
use daywise::db::dashboard::Dashboard;
use daywise::error::{CommandError, ErrorCode};
use daywise::types::{SubtaskView, TaskView, User};
use serde_json::json;
use std::fs::OpenOptions;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let db = Database::open(&cli.database)?;

    match run(&db, &cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            let err = CommandError::from(e);
            eprintln!("error: {}", err.message);
            std::process::exit(1);
        }
    }
}

/// Initialize logging based on the --log option.
fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new().create(true).append(true).open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

/// Resolve the acting user. Identity itself is external to the core; the CLI
/// simply maps a username to an account id.
fn resolve_user(db: &Database, username: &str) -> Result<User> {
    db.find_user_by_username(username)?.ok_or_else(|| {
        CommandError::new(
            ErrorCode::UserNotFound,
            format!("No user named '{}'; run `daywise register` first", username),
        )
        .into()
    })
}

fn run(db: &Database, cli: &Cli) -> Result<()> {
    if let Command::Register { empty } = &cli.command {
        let user = db.create_user(&cli.user, None, !*empty)?;
        println!("Created user '{}' (id {})", user.username, user.id);
        return Ok(());
    }

    let user = resolve_user(db, &cli.user)?;

    match &cli.command {
        Command::Register { .. } => unreachable!("handled above"),

        Command::List { category, json } => {
            let dashboard = db.dashboard(user.id, *category)?;
            if *json {
                print_dashboard_json(&dashboard)?;
            } else {
                print_dashboard(&dashboard);
            }
        }

        Command::Add {
            description,
            minutes,
            priority,
            time_block,
            category,
        } => {
            let task =
                db.create_task(user.id, description, *minutes, *priority, *time_block, *category)?;
            println!("Added task {} at position {:?}", task.id, task.order_index);
        }

        Command::Edit {
            id,
            description,
            minutes,
            priority,
            time_block,
            category,
        } => {
            let task = db.edit_task(
                user.id,
                *id,
                description,
                *minutes,
                *priority,
                *time_block,
                *category,
            )?;
            println!("Updated task {}", task.id);
        }

        Command::Toggle { id } => {
            let task = db.toggle_task(user.id, *id)?;
            let state = if task.completed { "complete" } else { "incomplete" };
            println!("Task {} is now {}", task.id, state);
        }

        Command::Move { id, direction } => {
            if db.move_task(user.id, *id, (*direction).into())? {
                println!("Moved task {}", id);
            } else {
                println!("Task {} is already at the edge of its cohort", id);
            }
        }

        Command::Delete { id } => {
            db.delete_task(user.id, *id)?;
            println!("Deleted task {}", id);
        }

        Command::Reset => {
            db.reset_all_tasks(user.id)?;
            println!("All tasks marked incomplete");
        }

        Command::DarkMode => {
            let dark = db.toggle_dark_mode(user.id)?;
            println!("Dark mode {}", if dark { "on" } else { "off" });
        }

        Command::Subtask(sub) => run_subtask(db, user.id, sub)?,
        Command::Category(cat) => run_category(db, user.id, cat)?,
    }

    Ok(())
}

fn run_subtask(db: &Database, user_id: i64, command: &SubtaskCommand) -> Result<()> {
    match command {
        SubtaskCommand::Add {
            task_id,
            description,
        } => {
            let subtask = db.add_subtask(user_id, *task_id, description)?;
            println!(
                "Added subtask {} to task {} at position {:?}",
                subtask.id, task_id, subtask.order_index
            );
        }
        SubtaskCommand::List { task_id } => {
            let subtasks = db.subtasks_for_task(user_id, *task_id)?;
            for s in &subtasks {
                let mark = if s.completed { "x" } else { " " };
                println!("[{}] {:>4}  {}", mark, s.id, s.description);
            }
        }
        SubtaskCommand::Edit { id, description } => {
            let subtask = db.edit_subtask(user_id, *id, description)?;
            println!("Updated subtask {}", subtask.id);
        }
        SubtaskCommand::Toggle { id } => {
            let subtask = db.toggle_subtask(user_id, *id)?;
            let state = if subtask.completed { "complete" } else { "incomplete" };
            println!("Subtask {} is now {}", subtask.id, state);
        }
        SubtaskCommand::Move { id, direction } => {
            if db.move_subtask(user_id, *id, (*direction).into())? {
                println!("Moved subtask {}", id);
            } else {
                println!("Subtask {} is already at the edge of its cohort", id);
            }
        }
        SubtaskCommand::Delete { id } => {
            db.delete_subtask(user_id, *id)?;
            println!("Deleted subtask {}", id);
        }
    }
    Ok(())
}

fn run_category(db: &Database, user_id: i64, command: &CategoryCommand) -> Result<()> {
    match command {
        CategoryCommand::Add { name, color } => {
            let category = db.create_category(user_id, name, color.as_deref())?;
            println!("Added category {} '{}'", category.id, category.name);
        }
        CategoryCommand::List => {
            let categories = db.list_categories(user_id)?;
            for c in &categories {
                println!("{:>4}  {} ({})", c.id, c.name, c.color);
            }
        }
        CategoryCommand::Edit { id, name, color } => {
            let category = db.edit_category(user_id, *id, name, color.as_deref())?;
            println!("Updated category {}", category.id);
        }
        CategoryCommand::Delete { id } => {
            db.delete_category(user_id, *id)?;
            println!("Deleted category {} (its tasks were kept)", id);
        }
    }
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard) {
    for detail in &dashboard.tasks {
        let t = &detail.task;
        let mark = if t.completed { "x" } else { " " };
        let category = t
            .category_id
            .map(|id| format!("  #cat:{}", id))
            .unwrap_or_default();
        println!(
            "[{}] {:>4}  {} ({}m, {}, {}){}",
            mark,
            t.id,
            t.description,
            t.estimated_minutes,
            t.priority.as_str(),
            t.time_block.as_str(),
            category
        );
        for s in &detail.subtasks {
            let mark = if s.completed { "x" } else { " " };
            println!("      [{}] {:>4}  {}", mark, s.id, s.description);
        }
    }
    println!(
        "{}/{} done ({}%), {} in progress",
        dashboard.completed_tasks,
        dashboard.total_tasks,
        dashboard.percent_complete,
        dashboard.in_progress_tasks
    );
}

fn print_dashboard_json(dashboard: &Dashboard) -> Result<()> {
    let tasks: Vec<_> = dashboard
        .tasks
        .iter()
        .map(|detail| {
            json!({
                "task": TaskView::from(&detail.task),
                "subtasks": detail
                    .subtasks
                    .iter()
                    .map(SubtaskView::from)
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    let payload = json!({
        "tasks": tasks,
        "totalTasks": dashboard.total_tasks,
        "completedTasks": dashboard.completed_tasks,
        "inProgressTasks": dashboard.in_progress_tasks,
        "percentage": dashboard.percent_complete,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
