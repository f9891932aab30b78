//! Project / story / task operations over a [`Repository`].
//!
//! Every operation re-reads the whole collection it touches, edits an
//! in-memory copy, and writes the whole collection back. Nothing is cached
//! between calls. Scoping is explicit: story and task listings and child
//! creation take the caller's [`Selection`] rather than reading ambient
//! state, and [`Tracker::selection`] loads the persisted markers when the
//! caller wants them.
//!
//! Failures never panic. Plain reads fall back to empty results. Mutations
//! read through the checked repository getters, so a collection that cannot
//! be read or parsed is never written over; they return a [`ServiceError`]
//! (already logged) or `Ok(false)` when the target id is unknown.

mod project;
mod story;
mod task;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ErrorCode;
use crate::id;
use crate::model::{EntityKind, Record};
use crate::repo::Repository;
use crate::store::{KeyValueStore, StoreError};
use crate::user::{UNKNOWN_NAME, User, UserDirectory, UserProvider};

/// Errors returned by [`Tracker`] mutations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("no {0} is selected")]
    NoSelection(EntityKind),

    #[error("selected {kind} '{id}' does not exist")]
    ParentNotFound { kind: EntityKind, id: String },

    #[error("no user is signed in")]
    NoCurrentUser,

    #[error("unknown user '{0}'")]
    UnknownUser(String),

    #[error("estimate must be a non-negative number of hours, got {0}")]
    InvalidEstimate(f64),
}

impl ServiceError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Storage(e) => e.code(),
            Self::NoSelection(_) => ErrorCode::NoSelection,
            Self::ParentNotFound { .. } => ErrorCode::ParentNotFound,
            Self::NoCurrentUser => ErrorCode::NoCurrentUser,
            Self::UnknownUser(_) => ErrorCode::EntityNotFound,
            Self::InvalidEstimate(_) => ErrorCode::InvalidEstimate,
        }
    }
}

type Loader<S, R> = fn(&Repository<S>) -> Result<Vec<R>, StoreError>;
type Saver<S, R> = fn(&Repository<S>, &[R]) -> Result<(), StoreError>;

fn log_failure(op: &'static str, err: &ServiceError) {
    tracing::error!(op, code = %err.code(), "{err}");
}

/// Which project, story and task are active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub project_id: Option<String>,
    pub story_id: Option<String>,
    pub task_id: Option<String>,
}

impl Selection {
    #[must_use]
    pub fn with_project(mut self, id: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_story(mut self, id: impl Into<String>) -> Self {
        self.story_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_task(mut self, id: impl Into<String>) -> Self {
        self.task_id = Some(id.into());
        self
    }
}

/// The domain service.
pub struct Tracker<S> {
    repo: Repository<S>,
    directory: UserDirectory,
    /// When unset, the user stored in the repository is current.
    users: Option<Box<dyn UserProvider>>,
    clock: fn() -> DateTime<Utc>,
}

impl<S: KeyValueStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            repo: Repository::new(store),
            directory: UserDirectory::default(),
            users: None,
            clock: Utc::now,
        }
    }

    #[must_use]
    pub fn with_directory(mut self, directory: UserDirectory) -> Self {
        self.directory = directory;
        self
    }

    #[must_use]
    pub fn with_user_provider(mut self, provider: impl UserProvider + 'static) -> Self {
        self.users = Some(Box::new(provider));
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub const fn repository(&self) -> &Repository<S> {
        &self.repo
    }

    pub const fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Load the persisted selection markers.
    pub fn selection(&self) -> Selection {
        Selection {
            project_id: self.repo.current_project_id(),
            story_id: self.repo.current_story_id(),
            task_id: self.repo.current_task_id(),
        }
    }

    /// Make `id` the active project. Other markers are left as they are.
    pub fn select_project(&self, id: &str) -> Result<Selection, ServiceError> {
        self.repo
            .set_current_project(id)
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("select project", e))?;
        tracing::debug!(id, "selected project");
        Ok(self.selection().with_project(id))
    }

    pub fn select_story(&self, id: &str) -> Result<Selection, ServiceError> {
        self.repo
            .set_current_story(id)
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("select story", e))?;
        tracing::debug!(id, "selected story");
        Ok(self.selection().with_story(id))
    }

    pub fn select_task(&self, id: &str) -> Result<Selection, ServiceError> {
        self.repo
            .set_current_task(id)
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("select task", e))?;
        tracing::debug!(id, "selected task");
        Ok(self.selection().with_task(id))
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub fn current_user(&self) -> Option<User> {
        match &self.users {
            Some(provider) => provider.current_user(),
            None => self.repo.current_user(),
        }
    }

    /// Persist the directory user `user_id` as the signed-in user.
    pub fn login(&self, user_id: &str) -> Result<User, ServiceError> {
        let result = match self.directory.find_by_id(user_id) {
            Some(user) => self
                .repo
                .set_current_user(user)
                .map(|()| user.clone())
                .map_err(ServiceError::from),
            None => Err(ServiceError::UnknownUser(user_id.to_string())),
        };
        result.inspect_err(|e| log_failure("login", e))
    }

    /// "First Surname" for a directory user, or `"Unknown"`.
    pub fn user_name(&self, user_id: &str) -> String {
        self.directory.display_name(user_id)
    }

    // -----------------------------------------------------------------------
    // Shared collection plumbing
    // -----------------------------------------------------------------------

    fn fresh_id<R: Record>(existing: &[R]) -> String {
        id::generate(R::KIND, |candidate| {
            existing.iter().any(|record| record.id() == candidate)
        })
    }

    /// Apply `edit` to the first record with `id` and write the collection
    /// back. `Ok(false)` with no write when `id` is absent.
    fn update_record<R: Record>(
        &self,
        id: &str,
        load: Loader<S, R>,
        save: Saver<S, R>,
        edit: impl FnOnce(&mut R),
    ) -> Result<bool, ServiceError> {
        let mut records = load(&self.repo)?;
        let Some(record) = records.iter_mut().find(|record| record.id() == id) else {
            tracing::debug!(kind = %R::KIND, id, "update target not found");
            return Ok(false);
        };
        edit(record);
        save(&self.repo, &records)?;
        tracing::debug!(kind = %R::KIND, id, "updated record");
        Ok(true)
    }

    /// Remove the first record with `id`. Children are not touched.
    fn delete_record<R: Record>(
        &self,
        id: &str,
        load: Loader<S, R>,
        save: Saver<S, R>,
    ) -> Result<bool, ServiceError> {
        let mut records = load(&self.repo)?;
        let before = records.len();
        if let Some(pos) = records.iter().position(|record| record.id() == id) {
            records.remove(pos);
        }
        if records.len() == before {
            tracing::debug!(kind = %R::KIND, id, "delete target not found");
            return Ok(false);
        }
        save(&self.repo, &records)?;
        tracing::debug!(kind = %R::KIND, id, "deleted record");
        Ok(true)
    }
}

fn name_of<R: Record>(records: &[R], id: &str) -> String {
    records
        .iter()
        .find(|record| record.id() == id)
        .map_or_else(|| UNKNOWN_NAME.to_string(), |record| record.name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::user::{FixedUser, Role};

    #[test]
    fn selection_starts_empty() {
        let store = MemoryStore::new();
        let tracker = Tracker::new(&store);
        assert_eq!(tracker.selection(), Selection::default());
    }

    #[test]
    fn selecting_persists_markers_independently() {
        let store = MemoryStore::new();
        let tracker = Tracker::new(&store);
        tracker.select_story("sty-1").unwrap();
        let sel = tracker.select_project("prj-1").unwrap();
        assert_eq!(sel.project_id.as_deref(), Some("prj-1"));
        assert_eq!(sel.story_id.as_deref(), Some("sty-1"));

        let reopened = Tracker::new(&store);
        assert_eq!(reopened.selection(), sel);
    }

    #[test]
    fn select_task_is_recorded() {
        let store = MemoryStore::new();
        let tracker = Tracker::new(&store);
        let sel = tracker.select_task("tsk-7").unwrap();
        assert_eq!(sel.task_id.as_deref(), Some("tsk-7"));
        assert_eq!(tracker.selection().task_id.as_deref(), Some("tsk-7"));
    }

    #[test]
    fn login_stores_directory_user() {
        let store = MemoryStore::new();
        let tracker = Tracker::new(&store);
        assert_eq!(tracker.current_user(), None);

        let user = tracker.login("3").unwrap();
        assert_eq!(user.role, Role::Dev);
        assert_eq!(tracker.current_user(), Some(user));
    }

    #[test]
    fn login_rejects_unknown_user() {
        let tracker = Tracker::new(MemoryStore::new());
        let err = tracker.login("99").unwrap_err();
        assert!(matches!(err, ServiceError::UnknownUser(ref id) if id == "99"));
        assert_eq!(err.code(), ErrorCode::EntityNotFound);
        assert_eq!(tracker.current_user(), None);
    }

    #[test]
    fn explicit_provider_overrides_stored_user() {
        let store = MemoryStore::new();
        let ada = User::new("7", "Ada", "Lovelace", Role::Admin);
        let tracker = Tracker::new(&store).with_user_provider(FixedUser(Some(ada.clone())));
        tracker.login("1").unwrap();
        assert_eq!(tracker.current_user(), Some(ada));
    }

    #[test]
    fn user_name_uses_directory() {
        let tracker = Tracker::new(MemoryStore::new());
        assert_eq!(tracker.user_name("1"), "Maksymilian Dąbrowski");
        assert_eq!(tracker.user_name("nope"), UNKNOWN_NAME);

        let custom = Tracker::new(MemoryStore::new()).with_directory(UserDirectory::new(vec![
            User::new("x", "Grace", "Hopper", Role::Dev),
        ]));
        assert_eq!(custom.user_name("x"), "Grace Hopper");
        assert_eq!(custom.user_name("1"), UNKNOWN_NAME);
    }

    #[test]
    fn error_codes_map_through() {
        assert_eq!(
            ServiceError::NoSelection(EntityKind::Story).code(),
            ErrorCode::NoSelection
        );
        assert_eq!(
            ServiceError::NoSelection(EntityKind::Project).to_string(),
            "no project is selected"
        );
        let err = ServiceError::ParentNotFound {
            kind: EntityKind::Project,
            id: "prj-x".into(),
        };
        assert_eq!(err.to_string(), "selected project 'prj-x' does not exist");
        assert_eq!(err.code(), ErrorCode::ParentNotFound);
        assert_eq!(ServiceError::InvalidEstimate(-1.0).code().code(), "E2006");
    }
}
