use super::{Selection, ServiceError, Tracker, log_failure, name_of};
use crate::model::{EntityKind, Task, TaskChanges, TaskDraft, valid_estimate};
use crate::repo::Repository;
use crate::store::KeyValueStore;

impl<S: KeyValueStore> Tracker<S> {
    /// Create a task under the selected story.
    pub fn create_task(&self, selection: &Selection, draft: TaskDraft) -> Result<Task, ServiceError> {
        self.try_create_task(selection, draft)
            .inspect_err(|e| log_failure("create task", e))
    }

    fn try_create_task(&self, selection: &Selection, draft: TaskDraft) -> Result<Task, ServiceError> {
        check_estimate(draft.est_time)?;
        let story_id = selection
            .story_id
            .as_deref()
            .ok_or(ServiceError::NoSelection(EntityKind::Story))?;
        if !self.repo.try_stories()?.iter().any(|s| s.id == story_id) {
            return Err(ServiceError::ParentNotFound {
                kind: EntityKind::Story,
                id: story_id.to_string(),
            });
        }

        let mut tasks = self.repo.try_tasks()?;
        let task = Task::from_draft(Self::fresh_id(&tasks), story_id.to_string(), draft);
        tasks.push(task.clone());
        self.repo.set_tasks(&tasks)?;
        tracing::debug!(id = %task.id, story_id, "created task");
        Ok(task)
    }

    /// Tasks of the selected story, in storage order.
    pub fn tasks(&self, selection: &Selection) -> Vec<Task> {
        let Some(story_id) = selection.story_id.as_deref() else {
            return Vec::new();
        };
        self.repo
            .tasks()
            .into_iter()
            .filter(|task| task.story_id == story_id)
            .collect()
    }

    pub fn all_tasks(&self) -> Vec<Task> {
        self.repo.tasks()
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        self.repo.tasks().into_iter().find(|t| t.id == id)
    }

    /// Replace a task's mutable fields. A move to `Done` also stamps
    /// `end_time` with the tracker clock.
    pub fn update_task(&self, id: &str, changes: TaskChanges) -> Result<bool, ServiceError> {
        let now = self.now();
        check_estimate(changes.est_time)
            .and_then(|()| {
                self.update_record(
                    id,
                    Repository::try_tasks,
                    Repository::set_tasks,
                    |task: &mut Task| task.apply(changes, now),
                )
            })
            .inspect_err(|e| log_failure("update task", e))
    }

    pub fn delete_task(&self, id: &str) -> Result<bool, ServiceError> {
        self.delete_record(id, Repository::try_tasks, Repository::set_tasks)
            .inspect_err(|e| log_failure("delete task", e))
    }

    pub fn task_name(&self, id: &str) -> String {
        name_of(&self.repo.tasks(), id)
    }
}

fn check_estimate(hours: f64) -> Result<(), ServiceError> {
    if valid_estimate(hours) {
        Ok(())
    } else {
        Err(ServiceError::InvalidEstimate(hours))
    }
}
