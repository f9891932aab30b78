//! `bl story` — stories of the selected project.

use backlog_core::{EntityKind, FileStore, Story, StoryDraft, Tracker};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::Path;

use crate::cmd::{marker, not_found, open_tracker, parse_priority, parse_status};
use crate::output::{OutputMode, fail, pretty_kv, pretty_section, render_mode, render_success};

#[derive(Subcommand, Debug)]
pub enum StoryCommand {
    /// Create a story in the selected project, owned by the current user.
    Create(CreateArgs),
    /// List the stories of the selected project.
    List(ListArgs),
    /// Change a story's name, description, priority or status.
    Update(UpdateArgs),
    /// Delete a story. Its tasks are kept.
    Delete(IdArg),
    /// Make a story the current one.
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

    /// Select the new story after creating it.
    #[arg(long)]
    pub select: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// List stories of every project instead of the selected one.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Story id.
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub priority: Option<String>,

    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args, Debug)]
pub struct IdArg {
    /// Story id.
    pub id: String,
}

pub fn run_story(
    command: &StoryCommand,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let tracker = open_tracker(project_root, user_flag, output)?;

    match command {
        StoryCommand::Create(args) => run_create(&tracker, args, output),
        StoryCommand::List(args) => {
            let selection = tracker.selection();
            let stories = if args.all {
                tracker.all_stories()
            } else {
                tracker.stories(&selection)
            };
            let heading = match (&selection.project_id, args.all) {
                (_, true) => "All stories".to_string(),
                (Some(id), false) => format!("Stories of {}", tracker.project_name(id)),
                (None, false) => "Stories (no project selected)".to_string(),
            };
            render_mode(
                output,
                &stories,
                |stories, w| {
                    for s in stories {
                        writeln!(w, "{}\t{}\t{}\t{}", s.id, s.priority, s.status, s.name)?;
                    }
                    Ok(())
                },
                |stories, w| {
                    pretty_section(w, &format!("{heading} ({})", stories.len()))?;
                    for s in stories {
                        let mark = marker(selection.story_id.as_deref(), &s.id);
                        writeln!(
                            w,
                            "{mark} {:<16} {:<6} {:<5} {}",
                            s.id, s.priority, s.status, s.name
                        )?;
                    }
                    Ok(())
                },
            )
        }
        StoryCommand::Update(args) => run_update(&tracker, args, output),
        StoryCommand::Delete(IdArg { id }) => {
            let deleted = tracker
                .delete_story(id)
                .map_err(|e| fail(output, (&e).into()))?;
            if !deleted {
                return Err(fail(output, not_found(EntityKind::Story, id)));
            }
            render_success(output, &format!("deleted story {id}"))
        }
        StoryCommand::Select(IdArg { id }) => {
            if tracker.story(id).is_none() {
                return Err(fail(output, not_found(EntityKind::Story, id)));
            }
            let selection = tracker
                .select_story(id)
                .map_err(|e| fail(output, (&e).into()))?;
            let name = tracker.story_name(id);
            render_mode(
                output,
                &selection,
                |_, w| writeln!(w, "{id}"),
                |_, w| writeln!(w, "✓ selected story {id} ({name})"),
            )
        }
    }
}

fn run_create(
    tracker: &Tracker<FileStore>,
    args: &CreateArgs,
    output: OutputMode,
) -> anyhow::Result<()> {
    let priority = parse_priority(&args.priority).map_err(|e| fail(output, e))?;
    let status = parse_status(&args.status).map_err(|e| fail(output, e))?;

    let story = tracker
        .create_story(
            &tracker.selection(),
            StoryDraft {
                name: args.name.clone(),
                description: args.description.clone(),
                priority,
                status,
            },
        )
        .map_err(|e| fail(output, (&e).into()))?;
    if args.select {
        tracker
            .select_story(&story.id)
            .map_err(|e| fail(output, (&e).into()))?;
    }
    render_story(tracker, output, &story)
}

fn run_update(
    tracker: &Tracker<FileStore>,
    args: &UpdateArgs,
    output: OutputMode,
) -> anyhow::Result<()> {
    let Some(mut changes) = tracker.story(&args.id).map(|s| s.changes()) else {
        return Err(fail(output, not_found(EntityKind::Story, &args.id)));
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

    let updated = tracker
        .update_story(&args.id, changes)
        .map_err(|e| fail(output, (&e).into()))?;
    match tracker.story(&args.id).filter(|_| updated) {
        Some(story) => render_story(tracker, output, &story),
        None => Err(fail(output, not_found(EntityKind::Story, &args.id))),
    }
}

fn render_story(
    tracker: &Tracker<FileStore>,
    output: OutputMode,
    story: &Story,
) -> anyhow::Result<()> {
    let project = tracker.project_name(&story.project_id);
    let owner = tracker.user_name(&story.owner_id);
    render_mode(
        output,
        story,
        |s, w| {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}",
                s.id, s.project_id, s.priority, s.status, s.name
            )
        },
        |s, w| {
            pretty_section(w, &format!("Story {}", s.id))?;
            pretty_kv(w, "Name", &s.name)?;
            pretty_kv(w, "Project", &project)?;
            pretty_kv(w, "Priority", s.priority.to_string())?;
            pretty_kv(w, "Status", s.status.to_string())?;
            pretty_kv(w, "Owner", &owner)?;
            pretty_kv(w, "Created", s.date.to_rfc3339())?;
            pretty_kv(w, "Description", &s.description)
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
        command: StoryCommand,
    }

    #[test]
    fn create_defaults_priority_and_status() {
        let w = Wrapper::parse_from(["test", "create", "--name", "Login flow"]);
        let StoryCommand::Create(args) = w.command else {
            panic!("expected create");
        };
        assert_eq!(args.priority, "medium");
        assert_eq!(args.status, "todo");
        assert_eq!(args.description, "");
    }

    #[test]
    fn list_all_flag() {
        let w = Wrapper::parse_from(["test", "list", "--all"]);
        let StoryCommand::List(args) = w.command else {
            panic!("expected list");
        };
        assert!(args.all);
    }

    #[test]
    fn update_takes_status_only() {
        let w = Wrapper::parse_from(["test", "update", "sty-1", "--status", "done"]);
        let StoryCommand::Update(args) = w.command else {
            panic!("expected update");
        };
        assert_eq!(args.status.as_deref(), Some("done"));
        assert!(args.name.is_none() && args.priority.is_none());
    }

    #[test]
    fn select_requires_id() {
        assert!(Wrapper::try_parse_from(["test", "select"]).is_err());
    }
}
