//! `bl status` — the current selection and user at a glance.

use backlog_core::{Selection, User};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::cmd::open_tracker;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Debug, Serialize)]
struct StatusReport {
    selection: Selection,
    project_name: Option<String>,
    story_name: Option<String>,
    task_name: Option<String>,
    user: Option<User>,
    stories: usize,
    tasks: usize,
}

pub fn run_status(
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let tracker = open_tracker(project_root, user_flag, output)?;
    let selection = tracker.selection();

    let report = StatusReport {
        project_name: selection.project_id.as_deref().map(|id| tracker.project_name(id)),
        story_name: selection.story_id.as_deref().map(|id| tracker.story_name(id)),
        task_name: selection.task_id.as_deref().map(|id| tracker.task_name(id)),
        user: tracker.current_user(),
        stories: tracker.stories(&selection).len(),
        tasks: tracker.tasks(&selection).len(),
        selection,
    };

    render_mode(
        output,
        &report,
        |r, w| {
            let or_dash = |v: Option<&str>| v.unwrap_or("-").to_string();
            writeln!(w, "project\t{}", or_dash(r.selection.project_id.as_deref()))?;
            writeln!(w, "story\t{}", or_dash(r.selection.story_id.as_deref()))?;
            writeln!(w, "task\t{}", or_dash(r.selection.task_id.as_deref()))?;
            writeln!(w, "user\t{}", or_dash(r.user.as_ref().map(|u| u.id.as_str())))
        },
        |r, w| {
            let show = |id: Option<&str>, name: Option<&str>| match (id, name) {
                (Some(id), Some(name)) => format!("{name} ({id})"),
                _ => "(none)".to_string(),
            };
            let sel = &r.selection;
            pretty_section(w, "Status")?;
            pretty_kv(w, "Project", show(sel.project_id.as_deref(), r.project_name.as_deref()))?;
            pretty_kv(w, "Story", show(sel.story_id.as_deref(), r.story_name.as_deref()))?;
            pretty_kv(w, "Task", show(sel.task_id.as_deref(), r.task_name.as_deref()))?;
            pretty_kv(
                w,
                "User",
                r.user.as_ref().map_or_else(|| "(none)".to_string(), User::display_name),
            )?;
            pretty_kv(w, "Stories", r.stories.to_string())?;
            pretty_kv(w, "Tasks", r.tasks.to_string())
        },
    )
}
