//! Organisation ports over the in-memory store.

use crate::organisation::{
    domain::{Project, ProjectId, Tag, TagId, TaskType, TaskTypeId, Team, TeamId},
    ports::{
        CatalogRepository, OrganisationRepositoryError, OrganisationRepositoryResult,
        ProjectRepository, TeamRepository,
    },
};
use crate::persistence::InMemoryStore;
use crate::persistence::memory::Tables;
use crate::worker::domain::WorkerId;
use async_trait::async_trait;

fn contains_ignoring_case(haystack: &str, needle: Option<&str>) -> bool {
    needle
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .is_none_or(|value| haystack.to_lowercase().contains(&value.to_lowercase()))
}

fn check_team_references(tables: &Tables, team: &Team) -> OrganisationRepositoryResult<()> {
    if let Some(project) = team.project() {
        if !tables.projects.contains_key(&project) {
            return Err(OrganisationRepositoryError::ProjectNotFound(project));
        }
    }
    if let Some(missing) = team
        .members()
        .iter()
        .find(|member| !tables.workers.contains_key(member))
    {
        return Err(OrganisationRepositoryError::UnknownWorker(*missing));
    }
    Ok(())
}

fn sorted_teams<'a>(teams: impl Iterator<Item = &'a Team>) -> Vec<Team> {
    let mut teams: Vec<Team> = teams.cloned().collect();
    teams.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
    teams
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn store_project(&self, project: &Project) -> OrganisationRepositoryResult<()> {
        self.write()?.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> OrganisationRepositoryResult<()> {
        let mut tables = self.write()?;
        let slot = tables
            .projects
            .get_mut(&project.id())
            .ok_or(OrganisationRepositoryError::ProjectNotFound(project.id()))?;
        *slot = project.clone();
        Ok(())
    }

    async fn delete_project(&self, id: ProjectId) -> OrganisationRepositoryResult<()> {
        let mut tables = self.write()?;
        if tables.projects.remove(&id).is_none() {
            return Err(OrganisationRepositoryError::ProjectNotFound(id));
        }
        for team in tables.teams.values_mut().filter(|team| team.project() == Some(id)) {
            team.set_project(None);
        }
        for task in tables.tasks.values_mut().filter(|task| task.project() == Some(id)) {
            task.detach_project();
        }
        Ok(())
    }

    async fn find_project(&self, id: ProjectId) -> OrganisationRepositoryResult<Option<Project>> {
        Ok(self.read()?.projects.get(&id).cloned())
    }

    async fn list_projects(
        &self,
        search: Option<&str>,
    ) -> OrganisationRepositoryResult<Vec<Project>> {
        let tables = self.read()?;
        let mut projects: Vec<Project> = tables
            .projects
            .values()
            .filter(|project| {
                contains_ignoring_case(project.name().as_str(), search)
                    || contains_ignoring_case(project.description(), search)
            })
            .cloned()
            .collect();
        projects.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
        Ok(projects)
    }

    async fn newest_projects(&self, limit: usize) -> OrganisationRepositoryResult<Vec<Project>> {
        let mut projects = self.list_projects(None).await?;
        projects.truncate(limit);
        Ok(projects)
    }
}

#[async_trait]
impl TeamRepository for InMemoryStore {
    async fn store_team(&self, team: &Team) -> OrganisationRepositoryResult<()> {
        let mut tables = self.write()?;
        check_team_references(&tables, team)?;
        tables.teams.insert(team.id(), team.clone());
        Ok(())
    }

    async fn update_team(&self, team: &Team) -> OrganisationRepositoryResult<()> {
        let mut tables = self.write()?;
        if !tables.teams.contains_key(&team.id()) {
            return Err(OrganisationRepositoryError::TeamNotFound(team.id()));
        }
        check_team_references(&tables, team)?;
        tables.teams.insert(team.id(), team.clone());
        Ok(())
    }

    async fn delete_team(&self, id: TeamId) -> OrganisationRepositoryResult<()> {
        self.write()?
            .teams
            .remove(&id)
            .map(|_| ())
            .ok_or(OrganisationRepositoryError::TeamNotFound(id))
    }

    async fn find_team(&self, id: TeamId) -> OrganisationRepositoryResult<Option<Team>> {
        Ok(self.read()?.teams.get(&id).cloned())
    }

    async fn list_teams(&self, search: Option<&str>) -> OrganisationRepositoryResult<Vec<Team>> {
        let tables = self.read()?;
        Ok(sorted_teams(
            tables
                .teams
                .values()
                .filter(|team| contains_ignoring_case(team.name().as_str(), search)),
        ))
    }

    async fn list_project_teams(
        &self,
        project: ProjectId,
    ) -> OrganisationRepositoryResult<Vec<Team>> {
        let tables = self.read()?;
        Ok(sorted_teams(
            tables
                .teams
                .values()
                .filter(|team| team.project() == Some(project)),
        ))
    }

    async fn list_member_teams(&self, worker: WorkerId) -> OrganisationRepositoryResult<Vec<Team>> {
        let tables = self.read()?;
        Ok(sorted_teams(
            tables.teams.values().filter(|team| team.has_member(worker)),
        ))
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn store_tag(&self, tag: &Tag) -> OrganisationRepositoryResult<()> {
        let mut tables = self.write()?;
        if tables.tags.values().any(|other| other.name() == tag.name()) {
            return Err(OrganisationRepositoryError::DuplicateTag(
                tag.name().as_str().to_owned(),
            ));
        }
        tables.tags.insert(tag.id(), tag.clone());
        Ok(())
    }

    async fn update_tag(&self, tag: &Tag) -> OrganisationRepositoryResult<()> {
        let mut tables = self.write()?;
        if !tables.tags.contains_key(&tag.id()) {
            return Err(OrganisationRepositoryError::TagNotFound(tag.id()));
        }
        if tables
            .tags
            .values()
            .any(|other| other.id() != tag.id() && other.name() == tag.name())
        {
            return Err(OrganisationRepositoryError::DuplicateTag(
                tag.name().as_str().to_owned(),
            ));
        }
        tables.tags.insert(tag.id(), tag.clone());
        Ok(())
    }

    async fn delete_tag(&self, id: TagId) -> OrganisationRepositoryResult<()> {
        let mut tables = self.write()?;
        if tables.tags.remove(&id).is_none() {
            return Err(OrganisationRepositoryError::TagNotFound(id));
        }
        for task in tables.tasks.values_mut() {
            task.remove_tag(id);
        }
        Ok(())
    }

    async fn find_tag(&self, id: TagId) -> OrganisationRepositoryResult<Option<Tag>> {
        Ok(self.read()?.tags.get(&id).cloned())
    }

    async fn list_tags(&self, search: Option<&str>) -> OrganisationRepositoryResult<Vec<Tag>> {
        let tables = self.read()?;
        let mut tags: Vec<Tag> = tables
            .tags
            .values()
            .filter(|tag| contains_ignoring_case(tag.name().as_str(), search))
            .cloned()
            .collect();
        tags.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(tags)
    }

    async fn store_task_type(&self, task_type: &TaskType) -> OrganisationRepositoryResult<()> {
        let mut tables = self.write()?;
        if tables
            .task_types
            .values()
            .any(|other| other.name() == task_type.name())
        {
            return Err(OrganisationRepositoryError::DuplicateTaskType(
                task_type.name().as_str().to_owned(),
            ));
        }
        tables.task_types.insert(task_type.id(), task_type.clone());
        Ok(())
    }

    async fn update_task_type(&self, task_type: &TaskType) -> OrganisationRepositoryResult<()> {
        let mut tables = self.write()?;
        if !tables.task_types.contains_key(&task_type.id()) {
            return Err(OrganisationRepositoryError::TaskTypeNotFound(task_type.id()));
        }
        if tables
            .task_types
            .values()
            .any(|other| other.id() != task_type.id() && other.name() == task_type.name())
        {
            return Err(OrganisationRepositoryError::DuplicateTaskType(
                task_type.name().as_str().to_owned(),
            ));
        }
        tables.task_types.insert(task_type.id(), task_type.clone());
        Ok(())
    }

    async fn delete_task_type(&self, id: TaskTypeId) -> OrganisationRepositoryResult<()> {
        let mut tables = self.write()?;
        if tables.task_types.remove(&id).is_none() {
            return Err(OrganisationRepositoryError::TaskTypeNotFound(id));
        }
        for task in tables
            .tasks
            .values_mut()
            .filter(|task| task.task_type() == Some(id))
        {
            task.detach_task_type();
        }
        Ok(())
    }

    async fn find_task_type(
        &self,
        id: TaskTypeId,
    ) -> OrganisationRepositoryResult<Option<TaskType>> {
        Ok(self.read()?.task_types.get(&id).cloned())
    }

    async fn list_task_types(&self) -> OrganisationRepositoryResult<Vec<TaskType>> {
        let tables = self.read()?;
        let mut task_types: Vec<TaskType> = tables.task_types.values().cloned().collect();
        task_types.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(task_types)
    }
}
