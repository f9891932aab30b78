use anyhow::{Context as _, Result};
use backlog_core::config::{self, BACKLOG_DIR};
use backlog_core::{FileStore, Tracker};
use clap::Args;
use std::path::Path;

use crate::output::OutputMode;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force re-initialization even if `.backlog/` already exists.
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TOML: &str = "[store]\n\
    dir = \".backlog/store\"\n\
    \n\
    [users]\n\
    default_user = \"1\"\n";

const GITIGNORE: &str = "store/\n";

/// Execute `bl init`. Creates the project skeleton:
///
/// ```text
/// .backlog/
///   config.toml   (default project config template)
///   .gitignore    (store/)
///   store/        (one file per key)
/// ```
///
/// The configured `default_user` is signed in so stories can be created
/// straight away. Re-running with `--force` rewrites the config but keeps
/// stored data.
///
/// # Errors
///
/// Returns an error if `.backlog/` already exists and `--force` is not set,
/// or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let backlog_dir = project_root.join(BACKLOG_DIR);

    if backlog_dir.exists() && !args.force {
        anyhow::bail!(".backlog/ already exists. Use `bl init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&backlog_dir)
        .with_context(|| format!("Failed to create {}", backlog_dir.display()))?;

    let config_path = config::config_path(project_root);
    std::fs::write(&config_path, CONFIG_TOML)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = backlog_dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    let cfg = config::load_project_config(project_root)?;
    let store_dir = cfg.store_dir(project_root);
    std::fs::create_dir_all(&store_dir)
        .with_context(|| format!("Failed to create store: {}", store_dir.display()))?;

    let tracker =
        Tracker::new(FileStore::new(store_dir.clone())).with_directory(cfg.users.user_directory());
    let signed_in = match cfg.users.default_user.as_deref() {
        Some(id) if tracker.repository().current_user().is_none() => Some(tracker.login(id)?),
        _ => None,
    };
    tracing::info!(root = %project_root.display(), "initialized backlog");

    if output.is_json() {
        let report = serde_json::json!({
            "ok": true,
            "config": config_path,
            "store": store_dir,
            "user": signed_in,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("✓ Initialized .backlog/ project structure.");
    println!();
    println!("  Config: .backlog/config.toml");
    println!("  Store:  {}", store_dir.display());
    if let Some(user) = signed_in {
        println!("  User:   {} ({})", user.display_name(), user.id);
    }
    println!();
    println!("Next steps:");
    println!("  bl project create --name \"My project\" --select");
    println!("  bl story create --name \"First story\"");

    Ok(())
}
