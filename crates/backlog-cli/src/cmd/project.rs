//! `bl project` — create, list, update, delete and select projects.

use backlog_core::{EntityKind, Project, ProjectDraft};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::Path;

use crate::cmd::{marker, not_found, open_tracker};
use crate::output::{OutputMode, fail, pretty_kv, pretty_section, render_mode, render_success};

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Create a project.
    Create(CreateArgs),
    /// List all projects.
    List,
    /// Change a project's name or description.
    Update(UpdateArgs),
    /// Delete a project. Its stories are kept.
    Delete(IdArg),
    /// Make a project the current one.
    Select(IdArg),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project name.
    #[arg(long)]
    pub name: String,

    /// Free-form description.
    #[arg(long, default_value = "")]
    pub desc: String,

    /// Select the new project after creating it.
    #[arg(long)]
    pub select: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Project id.
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub desc: Option<String>,
}

#[derive(Args, Debug)]
pub struct IdArg {
    /// Project id.
    pub id: String,
}

pub fn run_project(
    command: &ProjectCommand,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let tracker = open_tracker(project_root, user_flag, output)?;

    match command {
        ProjectCommand::Create(args) => {
            let project = tracker
                .create_project(ProjectDraft {
                    name: args.name.clone(),
                    desc: args.desc.clone(),
                })
                .map_err(|e| fail(output, (&e).into()))?;
            if args.select {
                tracker
                    .select_project(&project.id)
                    .map_err(|e| fail(output, (&e).into()))?;
            }
            render_project(output, &project)
        }
        ProjectCommand::List => {
            let projects = tracker.projects();
            let selected = tracker.repository().current_project_id();
            render_mode(
                output,
                &projects,
                |projects, w| {
                    for p in projects {
                        writeln!(w, "{}\t{}\t{}", p.id, p.name, p.desc)?;
                    }
                    Ok(())
                },
                |projects, w| {
                    pretty_section(w, &format!("Projects ({})", projects.len()))?;
                    for p in projects {
                        let mark = marker(selected.as_deref(), &p.id);
                        writeln!(w, "{mark} {:<16} {}", p.id, p.name)?;
                    }
                    Ok(())
                },
            )
        }
        ProjectCommand::Update(args) => {
            let Some(mut changes) = tracker.project(&args.id).map(|p| p.changes()) else {
                return Err(fail(output, not_found(EntityKind::Project, &args.id)));
            };
            if let Some(name) = &args.name {
                changes.name.clone_from(name);
            }
            if let Some(desc) = &args.desc {
                changes.desc.clone_from(desc);
            }
            let updated = tracker
                .update_project(&args.id, changes)
                .map_err(|e| fail(output, (&e).into()))?;
            match tracker.project(&args.id).filter(|_| updated) {
                Some(project) => render_project(output, &project),
                None => Err(fail(output, not_found(EntityKind::Project, &args.id))),
            }
        }
        ProjectCommand::Delete(IdArg { id }) => {
            let deleted = tracker
                .delete_project(id)
                .map_err(|e| fail(output, (&e).into()))?;
            if !deleted {
                return Err(fail(output, not_found(EntityKind::Project, id)));
            }
            render_success(output, &format!("deleted project {id}"))
        }
        ProjectCommand::Select(IdArg { id }) => {
            if tracker.project(id).is_none() {
                return Err(fail(output, not_found(EntityKind::Project, id)));
            }
            let selection = tracker
                .select_project(id)
                .map_err(|e| fail(output, (&e).into()))?;
            let name = tracker.project_name(id);
            render_mode(
                output,
                &selection,
                |_, w| writeln!(w, "{id}"),
                |_, w| writeln!(w, "✓ selected project {id} ({name})"),
            )
        }
    }
}

fn render_project(output: OutputMode, project: &Project) -> anyhow::Result<()> {
    render_mode(
        output,
        project,
        |p, w| writeln!(w, "{}\t{}\t{}", p.id, p.name, p.desc),
        |p, w| {
            pretty_section(w, &format!("Project {}", p.id))?;
            pretty_kv(w, "Name", &p.name)?;
            pretty_kv(w, "Description", &p.desc)
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
        command: ProjectCommand,
    }

    #[test]
    fn create_parses_name_desc_and_select() {
        let w = Wrapper::parse_from([
            "test", "create", "--name", "Website", "--desc", "Redesign", "--select",
        ]);
        let ProjectCommand::Create(args) = w.command else {
            panic!("expected create");
        };
        assert_eq!(args.name, "Website");
        assert_eq!(args.desc, "Redesign");
        assert!(args.select);
    }

    #[test]
    fn desc_defaults_to_empty() {
        let w = Wrapper::parse_from(["test", "create", "--name", "Website"]);
        let ProjectCommand::Create(args) = w.command else {
            panic!("expected create");
        };
        assert_eq!(args.desc, "");
        assert!(!args.select);
    }

    #[test]
    fn update_fields_are_optional() {
        let w = Wrapper::parse_from(["test", "update", "prj-1", "--desc", "new"]);
        let ProjectCommand::Update(args) = w.command else {
            panic!("expected update");
        };
        assert_eq!(args.id, "prj-1");
        assert_eq!(args.name, None);
        assert_eq!(args.desc.as_deref(), Some("new"));
    }

    #[test]
    fn create_requires_name() {
        assert!(Wrapper::try_parse_from(["test", "create"]).is_err());
    }
}
