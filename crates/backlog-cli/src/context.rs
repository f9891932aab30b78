//! Opening the tracker for a command: config, store location, and who the
//! current user is.
//!
//! User resolution chain: `--user` flag > `BACKLOG_USER` env > the user
//! stored by `bl user login` > `[users] default_user` from config.

use std::env;
use std::path::Path;

use backlog_core::config;
use backlog_core::{
    ErrorCode, FileStore, FirstOf, FixedUser, Repository, Tracker, User, UserDirectory,
    UserProvider,
};

use crate::output::CliError;

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Look up an explicitly requested user (flag, then env) in the directory.
fn explicit_user_with(
    flag: Option<&str>,
    env: &dyn EnvReader,
    directory: &UserDirectory,
) -> Result<Option<User>, CliError> {
    let requested = flag
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or_else(|| env.get("BACKLOG_USER"));

    let Some(id) = requested else {
        return Ok(None);
    };
    directory.find_by_id(id.trim()).cloned().map(Some).ok_or_else(|| CliError {
        suggestion: Some("Run `bl user list` to see known user ids.".to_string()),
        ..CliError::with_code(format!("unknown user '{id}'"), ErrorCode::EntityNotFound)
    })
}

/// Load config and open the tracker rooted at `project_root`.
pub fn open(project_root: &Path, user_flag: Option<&str>) -> Result<Tracker<FileStore>, CliError> {
    if !config::is_initialized(project_root) {
        let code = ErrorCode::NotInitialized;
        return Err(CliError::with_code(code.message(), code));
    }

    let config = config::load_project_config(project_root)
        .map_err(|e| CliError::with_code(format!("{e:#}"), ErrorCode::ConfigParseError))?;

    let store = FileStore::new(config.store_dir(project_root));
    let directory = config.users.user_directory();
    tracing::debug!(store = %store.dir().display(), "opening store");

    let explicit = explicit_user_with(user_flag, &RealEnv, &directory)?;
    let fallback = config
        .users
        .default_user
        .as_deref()
        .and_then(|id| directory.find_by_id(id))
        .cloned();
    let chain: Vec<Box<dyn UserProvider>> = vec![
        Box::new(FixedUser(explicit)),
        Box::new(Repository::new(store.clone())),
        Box::new(FixedUser(fallback)),
    ];

    Ok(Tracker::new(store)
        .with_directory(directory)
        .with_user_provider(FirstOf(chain)))
}
