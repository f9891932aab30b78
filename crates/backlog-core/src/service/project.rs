use super::{ServiceError, Tracker, log_failure, name_of};
use crate::model::{Project, ProjectChanges, ProjectDraft};
use crate::repo::Repository;
use crate::store::KeyValueStore;

impl<S: KeyValueStore> Tracker<S> {
    /// Create a project with a fresh id and append it to the collection.
    pub fn create_project(&self, draft: ProjectDraft) -> Result<Project, ServiceError> {
        self.try_create_project(draft)
            .inspect_err(|e| log_failure("create project", e))
    }

    fn try_create_project(&self, draft: ProjectDraft) -> Result<Project, ServiceError> {
        let mut projects = self.repo.try_projects()?;
        let project = Project::from_draft(Self::fresh_id(&projects), draft);
        projects.push(project.clone());
        self.repo.set_projects(&projects)?;
        tracing::debug!(id = %project.id, "created project");
        Ok(project)
    }

    /// Every stored project. Projects are never scoped.
    pub fn projects(&self) -> Vec<Project> {
        self.repo.projects()
    }

    pub fn project(&self, id: &str) -> Option<Project> {
        self.repo.projects().into_iter().find(|p| p.id == id)
    }

    pub fn update_project(&self, id: &str, changes: ProjectChanges) -> Result<bool, ServiceError> {
        self.update_record(
            id,
            Repository::try_projects,
            Repository::set_projects,
            |project: &mut Project| project.apply(changes),
        )
        .inspect_err(|e| log_failure("update project", e))
    }

    /// Remove a project. Its stories stay in storage, unreachable through
    /// scoped reads until the id is selected again.
    pub fn delete_project(&self, id: &str) -> Result<bool, ServiceError> {
        self.delete_record(id, Repository::try_projects, Repository::set_projects)
            .inspect_err(|e| log_failure("delete project", e))
    }

    pub fn project_name(&self, id: &str) -> String {
        name_of(&self.repo.projects(), id)
    }
}
