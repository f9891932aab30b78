#![forbid(unsafe_code)]

mod cmd;
mod context;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "bl: projects, stories and tasks in a local backlog",
    long_about = None
)]
struct Cli {
    /// Log debug detail to stderr (ignored when BACKLOG_LOG is set).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format. Defaults to pretty on a terminal and text when piped.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Act as this user id for one command (skips the stored login).
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }

    fn user_flag(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a backlog",
        long_about = "Create .backlog/ with a config template and an empty store, and sign in the default user.",
        after_help = "EXAMPLES:\n    # Initialize in the current directory\n    bl init\n\n    # Rewrite the config, keeping stored data\n    bl init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        subcommand,
        next_help_heading = "Records",
        about = "Manage projects",
        long_about = "Create, list, update, delete and select projects.",
        after_help = "EXAMPLES:\n    # Create a project and make it current\n    bl project create --name Website --desc Redesign --select\n\n    # List projects as JSON\n    bl project list --json"
    )]
    Project(cmd::project::ProjectCommand),

    #[command(
        subcommand,
        next_help_heading = "Records",
        about = "Manage stories of the selected project",
        long_about = "Create, list, update, delete and select stories. Listing and creating work on the selected project.",
        after_help = "EXAMPLES:\n    # Create a story in the selected project\n    bl story create --name \"Login flow\" --priority high\n\n    # Mark it done\n    bl story update sty-abc --status done"
    )]
    Story(cmd::story::StoryCommand),

    #[command(
        subcommand,
        next_help_heading = "Records",
        about = "Manage tasks of the selected story",
        long_about = "Create, list, update, delete and select tasks. Listing and creating work on the selected story.",
        after_help = "EXAMPLES:\n    # Create a task assigned to user 3\n    bl task create --name \"Wire form\" --est-time 2.5 --assignee 3\n\n    # Finish it (records the end time)\n    bl task update tsk-abc --status done"
    )]
    Task(cmd::task::TaskCommand),

    #[command(
        subcommand,
        next_help_heading = "Users",
        about = "List users, sign in, show the current user",
        after_help = "EXAMPLES:\n    # Sign in as user 2\n    bl user login 2\n\n    # Who am I?\n    bl user whoami"
    )]
    User(cmd::user::UserCommand),

    #[command(
        next_help_heading = "Read",
        about = "Show the current selection",
        long_about = "Show the selected project, story and task, the current user, and how many children are in scope.",
        after_help = "EXAMPLES:\n    bl status\n    bl status --json"
    )]
    Status,
}

/// Filter used when `BACKLOG_LOG` is unset.
const fn default_filter(verbose: bool, debug_env: bool) -> &'static str {
    if verbose || debug_env {
        "backlog_core=debug,backlog_cli=debug,info"
    } else {
        "backlog_core=info,backlog_cli=info,warn"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("BACKLOG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(default_filter(verbose, env::var_os("DEBUG").is_some()))
    });

    let format = env::var("BACKLOG_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(command = ?cli.command, "starting");

    let project_root = std::env::current_dir()?;
    let output = cli.output_mode();
    let user = cli.user_flag();

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, &project_root),
        Commands::Project(command) => {
            cmd::project::run_project(command, user, output, &project_root)
        }
        Commands::Story(command) => cmd::story::run_story(command, user, output, &project_root),
        Commands::Task(command) => cmd::task::run_task(command, user, output, &project_root),
        Commands::User(command) => cmd::user::run_user(command, user, output, &project_root),
        Commands::Status => cmd::status::run_status(user, output, &project_root),
    }
}
