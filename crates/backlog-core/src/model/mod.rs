//! Stored record shapes and their creation/update inputs.
//!
//! Records serialize with camelCase field names and RFC 3339 timestamps so
//! a stored collection is a plain JSON array of objects.

mod item;
mod project;
mod story;
mod task;

pub use item::{EntityKind, ParseEnumError, Priority, Status};
pub use project::{Project, ProjectChanges, ProjectDraft};
pub use story::{Story, StoryChanges, StoryDraft};
pub use task::{Task, TaskChanges, TaskDraft, valid_estimate};

pub(crate) use item::normalize;

/// Common view over the three record kinds used by the service's generic
/// lookup and delete paths.
pub trait Record {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Display name shown in lists and headers.
    fn name(&self) -> &str;
}
