use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityKind, Priority, Record, Status};

/// A unit of user-facing work inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub project_id: String,
    /// Creation time.
    pub date: DateTime<Utc>,
    pub owner_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoryDraft {
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
}

/// Replacement values for every mutable story field. Owning project,
/// creation date and owner are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoryChanges {
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
}

impl Story {
    pub(crate) fn from_draft(
        id: String,
        project_id: String,
        owner_id: String,
        date: DateTime<Utc>,
        draft: StoryDraft,
    ) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            priority: draft.priority,
            status: draft.status,
            project_id,
            date,
            owner_id,
        }
    }

    pub(crate) fn apply(&mut self, changes: StoryChanges) {
        self.name = changes.name;
        self.description = changes.description;
        self.priority = changes.priority;
        self.status = changes.status;
    }

    #[must_use]
    pub fn changes(&self) -> StoryChanges {
        StoryChanges {
            name: self.name.clone(),
            description: self.description.clone(),
            priority: self.priority,
            status: self.status,
        }
    }
}

impl Record for Story {
    const KIND: EntityKind = EntityKind::Story;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
