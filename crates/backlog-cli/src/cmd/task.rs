//! `bl task` — tasks of the selected story.
//!
//! Moving a task to `done` stamps its end time; the stamp is never set from
//! the command line.

use backlog_core::{EntityKind, ErrorCode, FileStore, Task, TaskDraft, Tracker};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::Path;

use crate::cmd::{
    marker, not_found, open_tracker, parse_estimate, parse_priority, parse_status, parse_time,
};
use crate::output::{
    CliError, OutputMode, fail, pretty_kv, pretty_section, render_mode, render_success,
};

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task in the selected story.
    Create(CreateArgs),
    /// List the tasks of the selected story.
    List(ListArgs),
    /// Change a task. `--status done` records the end time.
    Update(UpdateArgs),
    /// Delete a task.
    Delete(IdArg),
    /// Make a task the current one.
    Select(IdArg),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// low | medium | high
    #[arg(long, default_value = "medium")]
    pub priority: String,

    /// todo | doing | done
    #[arg(long, default_value = "todo")]
    pub status: String,

    /// Estimated effort in hours.
    #[arg(long, default_value_t = 0.0, value_parser = parse_estimate)]
    pub est_time: f64,

    /// Start time (RFC 3339).
    #[arg(long)]
    pub start: Option<String>,

    /// Assignee user id. Defaults to the current user.
    #[arg(long)]
    pub assignee: Option<String>,

    /// Select the new task after creating it.
    #[arg(long)]
    pub select: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// List tasks of every story instead of the selected one.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Task id.
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub priority: Option<String>,

    #[arg(long)]
    pub status: Option<String>,

    /// Estimated effort in hours.
    #[arg(long, value_parser = parse_estimate)]
    pub est_time: Option<f64>,

    /// Start time (RFC 3339).
    #[arg(long, conflicts_with = "clear_start")]
    pub start: Option<String>,

    /// Remove the start time.
    #[arg(long)]
    pub clear_start: bool,

    #[arg(long)]
    pub assignee: Option<String>,
}

#[derive(Args, Debug)]
pub struct IdArg {
    /// Task id.
    pub id: String,
}

pub fn run_task(
    command: &TaskCommand,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let tracker = open_tracker(project_root, user_flag, output)?;

    match command {
        TaskCommand::Create(args) => run_create(&tracker, args, output),
        TaskCommand::List(args) => {
            let selection = tracker.selection();
            let tasks = if args.all {
                tracker.all_tasks()
            } else {
                tracker.tasks(&selection)
            };
            let heading = match (&selection.story_id, args.all) {
                (_, true) => "All tasks".to_string(),
                (Some(id), false) => format!("Tasks of {}", tracker.story_name(id)),
                (None, false) => "Tasks (no story selected)".to_string(),
            };
            render_mode(
                output,
                &tasks,
                |tasks, w| {
                    for t in tasks {
                        writeln!(
                            w,
                            "{}\t{}\t{}\t{}\t{}\t{}",
                            t.id, t.priority, t.status, t.est_time, t.assignee_id, t.name
                        )?;
                    }
                    Ok(())
                },
                |tasks, w| {
                    pretty_section(w, &format!("{heading} ({})", tasks.len()))?;
                    for t in tasks {
                        let mark = marker(selection.task_id.as_deref(), &t.id);
                        writeln!(
                            w,
                            "{mark} {:<16} {:<6} {:<5} {:>6}h  {:<20} {}",
                            t.id,
                            t.priority,
                            t.status,
                            t.est_time,
                            tracker.user_name(&t.assignee_id),
                            t.name
                        )?;
                    }
                    Ok(())
                },
            )
        }
        TaskCommand::Update(args) => run_update(&tracker, args, output),
        TaskCommand::Delete(IdArg { id }) => {
            let deleted = tracker
                .delete_task(id)
                .map_err(|e| fail(output, (&e).into()))?;
            if !deleted {
                return Err(fail(output, not_found(EntityKind::Task, id)));
            }
            render_success(output, &format!("deleted task {id}"))
        }
        TaskCommand::Select(IdArg { id }) => {
            if tracker.task(id).is_none() {
                return Err(fail(output, not_found(EntityKind::Task, id)));
            }
            let selection = tracker
                .select_task(id)
                .map_err(|e| fail(output, (&e).into()))?;
            let name = tracker.task_name(id);
            render_mode(
                output,
                &selection,
                |_, w| writeln!(w, "{id}"),
                |_, w| writeln!(w, "✓ selected task {id} ({name})"),
            )
        }
    }
}

/// Resolve `--assignee`, falling back to the current user.
fn resolve_assignee(
    tracker: &Tracker<FileStore>,
    requested: Option<&str>,
) -> Result<String, CliError> {
    match requested {
        Some(id) if tracker.directory().find_by_id(id).is_some() => Ok(id.to_string()),
        Some(id) => Err(CliError {
            suggestion: Some("Run `bl user list` to see known user ids.".to_string()),
            ..CliError::with_code(format!("unknown user '{id}'"), ErrorCode::EntityNotFound)
        }),
        None => tracker.current_user().map(|u| u.id).ok_or_else(|| {
            let code = ErrorCode::NoCurrentUser;
            CliError::with_code("no assignee given and no user is signed in", code)
        }),
    }
}

fn run_create(
    tracker: &Tracker<FileStore>,
    args: &CreateArgs,
    output: OutputMode,
) -> anyhow::Result<()> {
    let priority = parse_priority(&args.priority).map_err(|e| fail(output, e))?;
    let status = parse_status(&args.status).map_err(|e| fail(output, e))?;
    let start_time = args
        .start
        .as_deref()
        .map(parse_time)
        .transpose()
        .map_err(|e| fail(output, e))?;
    let assignee_id =
        resolve_assignee(tracker, args.assignee.as_deref()).map_err(|e| fail(output, e))?;

    let task = tracker
        .create_task(
            &tracker.selection(),
            TaskDraft {
                name: args.name.clone(),
                description: args.description.clone(),
                priority,
                status,
                est_time: args.est_time,
                start_time,
                assignee_id,
            },
        )
        .map_err(|e| fail(output, (&e).into()))?;
    if args.select {
        tracker
            .select_task(&task.id)
            .map_err(|e| fail(output, (&e).into()))?;
    }
    render_task(tracker, output, &task)
}

fn run_update(
    tracker: &Tracker<FileStore>,
    args: &UpdateArgs,
    output: OutputMode,
) -> anyhow::Result<()> {
    let Some(mut changes) = tracker.task(&args.id).map(|t| t.changes()) else {
        return Err(fail(output, not_found(EntityKind::Task, &args.id)));
    };
    if let Some(name) = &args.name {
        changes.name.clone_from(name);
    }
    if let Some(description) = &args.description {
        changes.description.clone_from(description);
    }
    if let Some(raw) = &args.priority {
        changes.priority = parse_priority(raw).map_err(|e| fail(output, e))?;
    }
    if let Some(raw) = &args.status {
        changes.status = parse_status(raw).map_err(|e| fail(output, e))?;
    }
    if let Some(est_time) = args.est_time {
        changes.est_time = est_time;
    }
    if let Some(raw) = &args.start {
        changes.start_time = Some(parse_time(raw).map_err(|e| fail(output, e))?);
    }
    if args.clear_start {
        changes.start_time = None;
    }
    if let Some(raw) = &args.assignee {
        changes.assignee_id =
            resolve_assignee(tracker, Some(raw)).map_err(|e| fail(output, e))?;
    }

    let updated = tracker
        .update_task(&args.id, changes)
        .map_err(|e| fail(output, (&e).into()))?;
    match tracker.task(&args.id).filter(|_| updated) {
        Some(task) => render_task(tracker, output, &task),
        None => Err(fail(output, not_found(EntityKind::Task, &args.id))),
    }
}

fn render_task(
    tracker: &Tracker<FileStore>,
    output: OutputMode,
    task: &Task,
) -> anyhow::Result<()> {
    let story = tracker.story_name(&task.story_id);
    let assignee = tracker.user_name(&task.assignee_id);
    let stamp = |t: Option<DateTime<Utc>>| t.map_or_else(|| "-".to_string(), |t| t.to_rfc3339());
    render_mode(
        output,
        task,
        |t, w| {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}",
                t.id, t.story_id, t.priority, t.status, t.name
            )
        },
        |t, w| {
            pretty_section(w, &format!("Task {}", t.id))?;
            pretty_kv(w, "Name", &t.name)?;
            pretty_kv(w, "Story", &story)?;
            pretty_kv(w, "Priority", t.priority.to_string())?;
            pretty_kv(w, "Status", t.status.to_string())?;
            pretty_kv(w, "Estimate", format!("{}h", t.est_time))?;
            pretty_kv(w, "Assignee", &assignee)?;
            pretty_kv(w, "Started", stamp(t.start_time))?;
            pretty_kv(w, "Finished", stamp(t.end_time))?;
            pretty_kv(w, "Description", &t.description)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(subcommand)]
        command: TaskCommand,
    }

    #[test]
    fn create_parses_estimate_and_assignee() {
        let w = Wrapper::parse_from([
            "test", "create", "--name", "Wire form", "--est-time", "2.5", "--assignee", "3",
        ]);
        let TaskCommand::Create(args) = w.command else {
            panic!("expected create");
        };
        assert!((args.est_time - 2.5).abs() < f64::EPSILON);
        assert_eq!(args.assignee.as_deref(), Some("3"));
        assert!(args.start.is_none());
    }

    #[test]
    fn estimate_defaults_to_zero() {
        let w = Wrapper::parse_from(["test", "create", "--name", "x"]);
        let TaskCommand::Create(args) = w.command else {
            panic!("expected create");
        };
        assert!(args.est_time.abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_or_negative_estimates_fail_to_parse() {
        for bad in ["--est-time=NaN", "--est-time=inf", "--est-time=-2"] {
            assert!(Wrapper::try_parse_from(["test", "create", "--name", "x", bad]).is_err());
            assert!(Wrapper::try_parse_from(["test", "update", "tsk-1", bad]).is_err());
        }
    }

    #[test]
    fn start_and_clear_start_conflict() {
        let result = Wrapper::try_parse_from([
            "test",
            "update",
            "tsk-1",
            "--start",
            "2024-05-01T09:00:00Z",
            "--clear-start",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn update_with_status_only() {
        let w = Wrapper::parse_from(["test", "update", "tsk-1", "--status", "done"]);
        let TaskCommand::Update(args) = w.command else {
            panic!("expected update");
        };
        assert_eq!(args.status.as_deref(), Some("done"));
        assert!(args.est_time.is_none());
        assert!(!args.clear_start);
    }
}
