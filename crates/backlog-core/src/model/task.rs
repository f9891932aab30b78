use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::{EntityKind, Priority, Record, Status};

/// A concrete piece of work inside a story, assigned to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub story_id: String,
    /// Estimated effort in hours. Always finite and non-negative.
    #[serde(serialize_with = "finite_hours")]
    pub est_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Set by the tracker when the task moves to `Done`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(alias = "mockUserId")]
    pub assignee_id: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub est_time: f64,
    pub start_time: Option<DateTime<Utc>>,
    pub assignee_id: String,
}

/// Replacement values for every caller-owned task field. `end_time` is
/// not here: only a transition to `Done` writes it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskChanges {
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub est_time: f64,
    pub start_time: Option<DateTime<Utc>>,
    pub assignee_id: String,
}

/// Whether `hours` can be stored as a task estimate.
#[must_use]
pub fn valid_estimate(hours: f64) -> bool {
    hours.is_finite() && hours >= 0.0
}

// JSON has no NaN or infinity; serde_json would quietly write `null`.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn finite_hours<S: Serializer>(hours: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if hours.is_finite() {
        serializer.serialize_f64(*hours)
    } else {
        Err(serde::ser::Error::custom(format!(
            "estimate {hours} has no JSON representation"
        )))
    }
}

impl Task {
    pub(crate) fn from_draft(id: String, story_id: String, draft: TaskDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            priority: draft.priority,
            status: draft.status,
            story_id,
            est_time: draft.est_time,
            start_time: draft.start_time,
            end_time: None,
            assignee_id: draft.assignee_id,
        }
    }

    /// Replace the mutable fields. Stamps `end_time` with `now` when the
    /// task becomes `Done`; a task that is already done keeps its stamp.
    pub(crate) fn apply(&mut self, changes: TaskChanges, now: DateTime<Utc>) {
        let completing =
            changes.status.is_done() && (!self.status.is_done() || self.end_time.is_none());

        self.name = changes.name;
        self.description = changes.description;
        self.priority = changes.priority;
        self.status = changes.status;
        self.est_time = changes.est_time;
        self.start_time = changes.start_time;
        self.assignee_id = changes.assignee_id;

        if completing {
            self.end_time = Some(now);
        }
    }

    #[must_use]
    pub fn changes(&self) -> TaskChanges {
        TaskChanges {
            name: self.name.clone(),
            description: self.description.clone(),
            priority: self.priority,
            status: self.status,
            est_time: self.est_time,
            start_time: self.start_time,
            assignee_id: self.assignee_id.clone(),
        }
    }
}

impl Record for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
