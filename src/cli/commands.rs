use clap::{Parser, Subcommand};
use chrono::{Local, NaiveDate};
use anyhow::{Context, Result};
use crate::calendar;
use crate::config::Config;
use crate::db::DbConnection;
use crate::recurrence::{summary, RawRecurrenceRule, RecurrenceRule};
use crate::repo::{EventRepo, ProjectRepo, TaskRepo};
use crate::cli::error::{user_error, validate_id, validate_non_empty, validate_project_name};
use crate::cli::output::{
    format_calendar_table, format_event_list_table, format_recurrence, format_task_list_table, project_names,
};
use crate::cli::parser::{join_description, RecurrenceArgs};
use crate::utils::{offset_date, parse_date_expr, parse_datetime_expr};

#[derive(Parser)]
#[command(name = "sitecal")]
#[command(about = "Site Calendar - construction project tasks and events with recurring schedules")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project management commands
    Projects {
        #[command(subcommand)]
        subcommand: ProjectCommands,
    },
    /// Add a new task
    Add {
        /// Project name
        #[arg(long)]
        project: Option<String>,
        /// Due date (YYYY-MM-DD, today, tomorrow, +3d)
        #[arg(long)]
        due: Option<String>,
        #[command(flatten)]
        recurrence: RecurrenceArgs,
        /// Task description
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
    /// List tasks
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Show due dates relative to today
        #[arg(long)]
        relative: bool,
    },
    /// Mark a task completed; recurring tasks spawn their next instance
    Done {
        /// Task ID
        id: String,
    },
    /// Calendar event commands
    Events {
        #[command(subcommand)]
        subcommand: EventCommands,
    },
    /// Show events and dated tasks in a date window
    Calendar {
        /// First day shown (default: calendar.days_before days ago)
        #[arg(long)]
        from: Option<String>,
        /// Last day shown (default: calendar.days_after days ahead)
        #[arg(long)]
        to: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Recurrence rule tools
    Recur {
        #[command(subcommand)]
        subcommand: RecurCommands,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a new project
    Add {
        /// Project name
        name: String,
    },
    /// List projects
    List {
        /// Include archived projects
        #[arg(long)]
        archived: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum EventCommands {
    /// Add a new event
    Add {
        /// Start (RFC 3339, "YYYY-MM-DD HH:MM" local, or a date)
        #[arg(long)]
        start: String,
        /// End, same formats as --start
        #[arg(long)]
        end: String,
        /// Where it happens
        #[arg(long)]
        location: Option<String>,
        /// Project name
        #[arg(long)]
        project: Option<String>,
        #[command(flatten)]
        recurrence: RecurrenceArgs,
        /// Event title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// List events
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Delete an event and its whole series
    Delete {
        /// Event ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum RecurCommands {
    /// Validate a recurrence rule given as JSON and describe it
    Check {
        /// Rule JSON, e.g. '{"pattern":"weekly","daysOfWeek":[1,3],"endType":"never"}'
        rule: String,
    },
}

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let config = Config::load().context("Failed to load configuration")?;
    handle_command(cli, &config)
}

fn handle_command(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Projects { subcommand } => handle_projects(subcommand, config),
        Commands::Add { project, due, recurrence, description } => {
            handle_task_add(description, project, due, recurrence, config)
        }
        Commands::List { json, relative } => handle_task_list(json, relative, config),
        Commands::Done { id } => handle_task_done(id, config),
        Commands::Events { subcommand } => handle_events(subcommand, config),
        Commands::Calendar { from, to, json } => handle_calendar(from, to, json, config),
        Commands::Recur { subcommand } => handle_recur(subcommand),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn connect(config: &Config) -> Result<rusqlite::Connection> {
    DbConnection::connect(config).context("Failed to connect to database")
}

fn recurrence_rule(args: &RecurrenceArgs) -> Option<RecurrenceRule> {
    match args.to_rule() {
        Ok(rule) => rule,
        Err(e) => user_error(&e),
    }
}

fn handle_projects(cmd: ProjectCommands, config: &Config) -> Result<()> {
    let conn = connect(config)?;

    match cmd {
        ProjectCommands::Add { name } => {
            if let Err(e) = validate_project_name(&name) {
                user_error(&e);
            }
            let project = ProjectRepo::create(&conn, &name)?;
            println!("Created project '{}' (id: {})", project.name, project.id.unwrap_or_default());
            Ok(())
        }
        ProjectCommands::List { archived, json } => {
            let projects = ProjectRepo::list(&conn, archived)
                .context("Failed to list projects")?;

            if json {
                let json_projects: Vec<serde_json::Value> = projects.iter().map(|project| {
                    serde_json::json!({
                        "id": project.id,
                        "name": project.name,
                        "is_archived": project.is_archived,
                        "created_ts": project.created_ts,
                        "modified_ts": project.modified_ts,
                    })
                }).collect();
                println!("{}", serde_json::to_string_pretty(&json_projects)?);
            } else if projects.is_empty() {
                println!("No projects found.");
            } else {
                println!("{:<6} {:<40} {:<10}", "ID", "Name", "Status");
                println!("{}", "-".repeat(56));
                for project in projects {
                    let status = if project.is_archived { "[archived]" } else { "[active]" };
                    println!("{:<6} {:<40} {:<10}",
                        project.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
                        project.name,
                        status);
                }
            }
            Ok(())
        }
    }
}

fn handle_task_add(
    words: Vec<String>,
    project: Option<String>,
    due: Option<String>,
    recurrence: RecurrenceArgs,
    config: &Config,
) -> Result<()> {
    let description = join_description(&words);
    if let Err(e) = validate_non_empty(&description, "Task description") {
        user_error(&e);
    }

    let due_date = match due.as_deref().map(parse_date_expr).transpose() {
        Ok(d) => d,
        Err(e) => user_error(&e.to_string()),
    };
    let rule = recurrence_rule(&recurrence);

    let conn = connect(config)?;
    let project_id = project.as_deref().map(|name| ProjectRepo::resolve_id(&conn, name)).transpose()?;

    let task = TaskRepo::create_full(&conn, &description, project_id, due_date, rule.as_ref())?;
    let task_id = task.id.unwrap_or_default();
    match &rule {
        Some(rule) => println!("Created task {}: {} ({})", task_id, task.description, summary(rule)),
        None => println!("Created task {}: {}", task_id, task.description),
    }
    Ok(())
}

fn handle_task_list(json: bool, relative: bool, config: &Config) -> Result<()> {
    let conn = connect(config)?;
    let tasks = TaskRepo::list_all(&conn).context("Failed to list tasks")?;

    if json {
        let json_tasks: Vec<serde_json::Value> = tasks.iter().map(|task| {
            let recurrence = task.recurrence.as_deref()
                .and_then(|r| serde_json::from_str::<serde_json::Value>(r).ok());
            serde_json::json!({
                "id": task.id,
                "uuid": task.uuid,
                "description": task.description,
                "status": task.status,
                "project_id": task.project_id,
                "due_date": task.due_date,
                "recurrence": recurrence,
                "parent_task_id": task.parent_task_id,
                "is_recurring_instance": task.is_recurring_instance,
                "created_ts": task.created_ts,
                "modified_ts": task.modified_ts,
            })
        }).collect();
        println!("{}", serde_json::to_string_pretty(&json_tasks)?);
    } else {
        let names = project_names(&ProjectRepo::list(&conn, true)?);
        println!("{}", format_task_list_table(&tasks, &names, today(), relative));
    }
    Ok(())
}

fn handle_task_done(id: String, config: &Config) -> Result<()> {
    let task_id = match validate_id(&id, "task") {
        Ok(id) => id,
        Err(e) => user_error(&e),
    };

    let conn = connect(config)?;
    let spawned = TaskRepo::complete(&conn, task_id, today())?;
    println!("Completed task {}", task_id);

    if let Some(instance) = spawned {
        let due = instance.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        println!(
            "Created task {}: {} (due {}, {})",
            instance.id.unwrap_or_default(),
            instance.description,
            due,
            format_recurrence(instance.recurrence.as_deref())
        );
    }
    Ok(())
}

fn handle_events(cmd: EventCommands, config: &Config) -> Result<()> {
    match cmd {
        EventCommands::Add { start, end, location, project, recurrence, title } => {
            let title = join_description(&title);
            if let Err(e) = validate_non_empty(&title, "Event title") {
                user_error(&e);
            }
            let start_at = parse_datetime_expr(&start).unwrap_or_else(|e| user_error(&e.to_string()));
            let end_at = parse_datetime_expr(&end).unwrap_or_else(|e| user_error(&e.to_string()));
            let rule = recurrence_rule(&recurrence);

            let conn = connect(config)?;
            let project_id = project.as_deref().map(|name| ProjectRepo::resolve_id(&conn, name)).transpose()?;
            let event = EventRepo::create_full(&conn, &title, start_at, end_at, location, project_id, rule.as_ref())?;

            let event_id = event.id.unwrap_or_default();
            match &rule {
                Some(rule) => println!("Created event {}: {} ({})", event_id, event.title, summary(rule)),
                None => println!("Created event {}: {}", event_id, event.title),
            }
            Ok(())
        }
        EventCommands::List { json } => {
            let conn = connect(config)?;
            let events = EventRepo::list_all(&conn).context("Failed to list events")?;

            if json {
                let json_events: Vec<serde_json::Value> = events.iter().map(|event| {
                    let recurrence = event.recurrence.as_deref()
                        .and_then(|r| serde_json::from_str::<serde_json::Value>(r).ok());
                    serde_json::json!({
                        "id": event.id,
                        "uuid": event.uuid,
                        "title": event.title,
                        "location": event.location,
                        "project_id": event.project_id,
                        "start_at": event.start_at.to_rfc3339(),
                        "end_at": event.end_at.to_rfc3339(),
                        "recurrence": recurrence,
                    })
                }).collect();
                println!("{}", serde_json::to_string_pretty(&json_events)?);
            } else {
                let names = project_names(&ProjectRepo::list(&conn, true)?);
                println!("{}", format_event_list_table(&events, &names));
            }
            Ok(())
        }
        EventCommands::Delete { id } => {
            let event_id = match validate_id(&id, "event") {
                Ok(id) => id,
                Err(e) => user_error(&e),
            };
            let conn = connect(config)?;
            EventRepo::delete(&conn, event_id)?;
            println!("Deleted event {}", event_id);
            Ok(())
        }
    }
}

fn handle_calendar(from: Option<String>, to: Option<String>, json: bool, config: &Config) -> Result<()> {
    let today = today();
    let from_date = match from.as_deref() {
        Some(expr) => parse_date_expr(expr).unwrap_or_else(|e| user_error(&e.to_string())),
        None => offset_date(today, -config.days_before).unwrap_or_else(|| {
            user_error(&format!("calendar.days_before ({}) is out of range", config.days_before))
        }),
    };
    let to_date = match to.as_deref() {
        Some(expr) => parse_date_expr(expr).unwrap_or_else(|e| user_error(&e.to_string())),
        None => offset_date(today, config.days_after).unwrap_or_else(|| {
            user_error(&format!("calendar.days_after ({}) is out of range", config.days_after))
        }),
    };
    if to_date < from_date {
        user_error(&format!("--to ({}) is before --from ({})", to_date, from_date));
    }

    let conn = connect(config)?;
    let entries = calendar::entries(&conn, from_date, to_date, config.max_iterations)
        .context("Failed to build calendar")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("{}", format_calendar_table(&entries));
    }
    Ok(())
}

fn handle_recur(cmd: RecurCommands) -> Result<()> {
    match cmd {
        RecurCommands::Check { rule } => {
            let parsed = RawRecurrenceRule::from_json(&rule).and_then(RawRecurrenceRule::into_rule);
            match parsed {
                Ok(rule) => {
                    println!("Valid: {}", summary(&rule));
                    Ok(())
                }
                Err(e) => user_error(&e.to_string()),
            }
        }
    }
}
