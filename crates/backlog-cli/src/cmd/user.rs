use backlog_core::{ErrorCode, User};
use clap::Subcommand;
use std::io::Write;
use std::path::Path;

use crate::cmd::{marker, open_tracker};
use crate::output::{CliError, OutputMode, fail, pretty_kv, pretty_section, render_mode};

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// List the users in the directory.
    List,
    /// Sign in as a directory user. Persists until the next login.
    Login {
        /// User id.
        id: String,
    },
    /// Show the current user.
    Whoami,
}

pub fn run_user(
    command: &UserCommand,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let tracker = open_tracker(project_root, user_flag, output)?;

    match command {
        UserCommand::List => {
            let current = tracker.current_user().map(|u| u.id);
            render_mode(
                output,
                tracker.directory().all(),
                |users, w| {
                    for u in users {
                        writeln!(w, "{}\t{}\t{}\t{}", u.id, u.first_name, u.surname, u.role)?;
                    }
                    Ok(())
                },
                |users, w| {
                    pretty_section(w, &format!("Users ({})", users.len()))?;
                    for u in users {
                        let mark = marker(current.as_deref(), &u.id);
                        writeln!(w, "{mark} {:<4} {:<28} {}", u.id, u.display_name(), u.role)?;
                    }
                    Ok(())
                },
            )
        }
        UserCommand::Login { id } => {
            let user = tracker.login(id).map_err(|e| fail(output, (&e).into()))?;
            render_user(output, &user)
        }
        UserCommand::Whoami => match tracker.current_user() {
            Some(user) => render_user(output, &user),
            None => {
                let code = ErrorCode::NoCurrentUser;
                Err(fail(output, CliError::with_code(code.message(), code)))
            }
        },
    }
}

fn render_user(output: OutputMode, user: &User) -> anyhow::Result<()> {
    render_mode(
        output,
        user,
        |u, w| writeln!(w, "{}\t{}", u.id, u.display_name()),
        |u, w| {
            pretty_section(w, &format!("User {}", u.id))?;
            pretty_kv(w, "Name", u.display_name())?;
            pretty_kv(w, "Role", u.role.to_string())
        },
    )
}
