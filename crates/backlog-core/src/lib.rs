//! backlog-core library.
//!
//! Projects contain stories, stories contain tasks. Every collection lives
//! under one key of a [`store::KeyValueStore`]; the [`repo::Repository`]
//! adapter reads and writes whole collections, and the [`service::Tracker`]
//! implements create/read/update/delete on top of it, scoped by the current
//! [`service::Selection`].
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums in the library, `anyhow::Result` for
//!   configuration loading.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod id;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod user;

pub use error::ErrorCode;
pub use model::{
    EntityKind, ParseEnumError, Priority, Project, ProjectChanges, ProjectDraft, Status, Story,
    StoryChanges, StoryDraft, Task, TaskChanges, TaskDraft, valid_estimate,
};
pub use repo::Repository;
pub use service::{Selection, ServiceError, Tracker};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use user::{FirstOf, FixedUser, Role, User, UserDirectory, UserProvider};
