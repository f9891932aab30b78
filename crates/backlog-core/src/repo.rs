//! Typed persistence adapter over a [`KeyValueStore`].
//!
//! Each collection is one JSON array under its own key; each selection
//! marker is a bare id string under its own key. The plain getters never
//! fail: a missing key is an empty collection / no selection, and a value
//! that cannot be read or parsed is logged and treated the same way. The
//! `try_*` getters report those failures instead; anything that writes a
//! collection back reads it through them. Writes replace the whole key and
//! report failures to the caller.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::{Project, Story, Task};
use crate::store::{KeyValueStore, StoreError};
use crate::user::{User, UserProvider};

/// Fixed storage keys.
pub mod keys {
    pub const PROJECTS: &str = "projects";
    pub const CURRENT_PROJECT: &str = "currentProject";
    pub const STORIES: &str = "stories";
    pub const CURRENT_STORY: &str = "currentStory";
    pub const TASKS: &str = "tasks";
    pub const CURRENT_TASK: &str = "currentTask";
    pub const CURRENT_USER: &str = "currentUser";

    pub const ALL: [&str; 7] = [
        PROJECTS,
        CURRENT_PROJECT,
        STORIES,
        CURRENT_STORY,
        TASKS,
        CURRENT_TASK,
        CURRENT_USER,
    ];
}

#[derive(Debug, Clone)]
pub struct Repository<S> {
    store: S,
}

impl<S: KeyValueStore> Repository<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn projects(&self) -> Vec<Project> {
        self.load_collection(keys::PROJECTS)
    }

    pub fn try_projects(&self) -> Result<Vec<Project>, StoreError> {
        self.read_collection(keys::PROJECTS)
    }

    pub fn set_projects(&self, projects: &[Project]) -> Result<(), StoreError> {
        self.store_collection(keys::PROJECTS, projects)
    }

    pub fn stories(&self) -> Vec<Story> {
        self.load_collection(keys::STORIES)
    }

    pub fn try_stories(&self) -> Result<Vec<Story>, StoreError> {
        self.read_collection(keys::STORIES)
    }

    pub fn set_stories(&self, stories: &[Story]) -> Result<(), StoreError> {
        self.store_collection(keys::STORIES, stories)
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.load_collection(keys::TASKS)
    }

    pub fn try_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.read_collection(keys::TASKS)
    }

    pub fn set_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        self.store_collection(keys::TASKS, tasks)
    }

    pub fn current_project_id(&self) -> Option<String> {
        self.load_marker(keys::CURRENT_PROJECT)
    }

    pub fn set_current_project(&self, id: &str) -> Result<(), StoreError> {
        self.store.set(keys::CURRENT_PROJECT, id)
    }

    pub fn current_story_id(&self) -> Option<String> {
        self.load_marker(keys::CURRENT_STORY)
    }

    pub fn set_current_story(&self, id: &str) -> Result<(), StoreError> {
        self.store.set(keys::CURRENT_STORY, id)
    }

    pub fn current_task_id(&self) -> Option<String> {
        self.load_marker(keys::CURRENT_TASK)
    }

    pub fn set_current_task(&self, id: &str) -> Result<(), StoreError> {
        self.store.set(keys::CURRENT_TASK, id)
    }

    /// The signed-in user record, if one was stored and still parses.
    pub fn current_user(&self) -> Option<User> {
        let raw = self.load_raw(keys::CURRENT_USER)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(key = keys::CURRENT_USER, "ignoring unparsable value: {e}");
                None
            }
        }
    }

    pub fn set_current_user(&self, user: &User) -> Result<(), StoreError> {
        let json = serde_json::to_string(user).map_err(|source| StoreError::Encode {
            key: keys::CURRENT_USER.to_string(),
            source,
        })?;
        self.store.set(keys::CURRENT_USER, &json)
    }

    fn load_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, "store read failed, treating as empty: {e}");
                None
            }
        }
    }

    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.read_collection(key).unwrap_or_else(|e| {
            tracing::warn!(key, "treating stored collection as empty: {e}");
            Vec::new()
        })
    }

    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })
    }

    fn store_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string(items).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, &json)
    }

    fn load_marker(&self, key: &str) -> Option<String> {
        self.load_raw(key)
            .map(|raw| raw.trim().to_string())
            .filter(|id| !id.is_empty())
    }
}

impl<S: KeyValueStore> UserProvider for Repository<S> {
    fn current_user(&self) -> Option<User> {
        Self::current_user(self)
    }
}
