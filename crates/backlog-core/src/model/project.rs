use serde::{Deserialize, Serialize};

use super::{EntityKind, Record};

/// Root record: a named body of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub desc: String,
}

/// Caller input for [`crate::Tracker::create_project`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectDraft {
    pub name: String,
    pub desc: String,
}

/// Replacement values for every mutable project field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectChanges {
    pub name: String,
    pub desc: String,
}

impl Project {
    pub(crate) fn from_draft(id: String, draft: ProjectDraft) -> Self {
        Self {
            id,
            name: draft.name,
            desc: draft.desc,
        }
    }

    pub(crate) fn apply(&mut self, changes: ProjectChanges) {
        self.name = changes.name;
        self.desc = changes.desc;
    }

    /// Current values as a change set, for callers that edit a few fields.
    #[must_use]
    pub fn changes(&self) -> ProjectChanges {
        ProjectChanges {
            name: self.name.clone(),
            desc: self.desc.clone(),
        }
    }
}

impl Record for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_shape_is_flat() {
        let project = Project {
            id: "prj-1".into(),
            name: "Website".into(),
            desc: "Redesign".into(),
        };
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "prj-1", "name": "Website", "desc": "Redesign"})
        );
    }

    #[test]
    fn apply_keeps_id() {
        let mut project = Project::from_draft(
            "prj-1".into(),
            ProjectDraft {
                name: "a".into(),
                desc: "b".into(),
            },
        );
        project.apply(ProjectChanges {
            name: "c".into(),
            desc: "d".into(),
        });
        assert_eq!(project.id, "prj-1");
        assert_eq!(project.name, "c");
        assert_eq!(project.desc, "d");
    }
}
