use super::{Selection, ServiceError, Tracker, log_failure, name_of};
use crate::model::{EntityKind, Story, StoryChanges, StoryDraft};
use crate::repo::Repository;
use crate::store::KeyValueStore;

impl<S: KeyValueStore> Tracker<S> {
    /// Create a story under the selected project, owned by the current user
    /// and dated now.
    pub fn create_story(
        &self,
        selection: &Selection,
        draft: StoryDraft,
    ) -> Result<Story, ServiceError> {
        self.try_create_story(selection, draft)
            .inspect_err(|e| log_failure("create story", e))
    }

    fn try_create_story(
        &self,
        selection: &Selection,
        draft: StoryDraft,
    ) -> Result<Story, ServiceError> {
        let project_id = selection
            .project_id
            .as_deref()
            .ok_or(ServiceError::NoSelection(EntityKind::Project))?;
        if !self.repo.try_projects()?.iter().any(|p| p.id == project_id) {
            return Err(ServiceError::ParentNotFound {
                kind: EntityKind::Project,
                id: project_id.to_string(),
            });
        }
        let owner = self.current_user().ok_or(ServiceError::NoCurrentUser)?;

        let mut stories = self.repo.try_stories()?;
        let story = Story::from_draft(
            Self::fresh_id(&stories),
            project_id.to_string(),
            owner.id,
            self.now(),
            draft,
        );
        stories.push(story.clone());
        self.repo.set_stories(&stories)?;
        tracing::debug!(id = %story.id, project_id, "created story");
        Ok(story)
    }

    /// Stories of the selected project, in storage order. Empty when no
    /// project is selected.
    pub fn stories(&self, selection: &Selection) -> Vec<Story> {
        let Some(project_id) = selection.project_id.as_deref() else {
            return Vec::new();
        };
        self.repo
            .stories()
            .into_iter()
            .filter(|story| story.project_id == project_id)
            .collect()
    }

    /// Every stored story regardless of selection, orphans included.
    pub fn all_stories(&self) -> Vec<Story> {
        self.repo.stories()
    }

    pub fn story(&self, id: &str) -> Option<Story> {
        self.repo.stories().into_iter().find(|s| s.id == id)
    }

    pub fn update_story(&self, id: &str, changes: StoryChanges) -> Result<bool, ServiceError> {
        self.update_record(
            id,
            Repository::try_stories,
            Repository::set_stories,
            |story: &mut Story| story.apply(changes),
        )
        .inspect_err(|e| log_failure("update story", e))
    }

    /// Remove a story. Its tasks are left in storage.
    pub fn delete_story(&self, id: &str) -> Result<bool, ServiceError> {
        self.delete_record(id, Repository::try_stories, Repository::set_stories)
            .inspect_err(|e| log_failure("delete story", e))
    }

    pub fn story_name(&self, id: &str) -> String {
        name_of(&self.repo.stories(), id)
    }
}
