//! Organisation ports over `PostgreSQL`.

use crate::organisation::{
    domain::{
        CatalogName, PersistedTeamData, Project, ProjectId, ProjectName, Tag, TagId, TaskType,
        TaskTypeId, Team, TeamId, TeamName,
    },
    ports::{
        CatalogRepository, OrganisationRepositoryError, OrganisationRepositoryResult,
        ProjectRepository, TeamRepository,
    },
};
use crate::persistence::StoreFailure;
use crate::persistence::postgres::models::{ProjectRow, TagRow, TaskTypeRow, TeamMemberRow, TeamRow};
use crate::persistence::postgres::schema::{projects, tags, task_types, team_members, teams, workers};
use crate::persistence::postgres::{PostgresStore, escape_like, in_transaction, query_failed};
use crate::worker::domain::WorkerId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

type Result<T> = OrganisationRepositoryResult<T>;

fn failed(err: DieselError) -> OrganisationRepositoryError {
    query_failed(err)
}

#[async_trait]
impl ProjectRepository for PostgresStore {
    async fn store_project(&self, project: &Project) -> Result<()> {
        let row = project_row(project);
        self.run_blocking(move |connection| {
            diesel::insert_into(projects::table)
                .values(&row)
                .execute(connection)
                .map_err(failed)?;
            Ok(())
        })
        .await
    }

    async fn update_project(&self, project: &Project) -> Result<()> {
        let row = project_row(project);
        let id = project.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(projects::table.find(row.id))
                .set(&row)
                .execute(connection)
                .map_err(failed)?;
            if updated == 0 {
                return Err(OrganisationRepositoryError::ProjectNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_project(&self, id: ProjectId) -> Result<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(projects::table.find(id.into_inner()))
                .execute(connection)
                .map_err(failed)?;
            if deleted == 0 {
                return Err(OrganisationRepositoryError::ProjectNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_project(&self, id: ProjectId) -> Result<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .find(id.into_inner())
                .select(ProjectRow::as_select())
                .first(connection)
                .optional()
                .map_err(failed)?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn list_projects(&self, search: Option<&str>) -> Result<Vec<Project>> {
        let pattern = search_pattern(search);
        self.run_blocking(move |connection| {
            let mut statement = projects::table
                .select(ProjectRow::as_select())
                .order(projects::created_at.desc())
                .into_boxed();
            if let Some(pattern) = pattern {
                statement = statement.filter(
                    projects::name
                        .ilike(pattern.clone())
                        .or(projects::description.ilike(pattern)),
                );
            }
            statement
                .load(connection)
                .map_err(failed)?
                .into_iter()
                .map(row_to_project)
                .collect()
        })
        .await
    }

    async fn newest_projects(&self, limit: usize) -> Result<Vec<Project>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.run_blocking(move |connection| {
            projects::table
                .select(ProjectRow::as_select())
                .order((projects::created_at.desc(), projects::id.asc()))
                .limit(limit)
                .load(connection)
                .map_err(failed)?
                .into_iter()
                .map(row_to_project)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl TeamRepository for PostgresStore {
    async fn store_team(&self, team: &Team) -> Result<()> {
        let team = team.clone();
        self.run_blocking(move |connection| {
            in_transaction(connection, |tx| {
                check_team_references(tx, &team)?;
                diesel::insert_into(teams::table)
                    .values(&team_row(&team))
                    .execute(tx)
                    .map_err(failed)?;
                insert_members(tx, &team)
            })
        })
        .await
    }

    async fn update_team(&self, team: &Team) -> Result<()> {
        let team = team.clone();
        self.run_blocking(move |connection| {
            in_transaction(connection, |tx| {
                check_team_references(tx, &team)?;
                let row = team_row(&team);
                let updated = diesel::update(teams::table.find(row.id))
                    .set(&row)
                    .execute(tx)
                    .map_err(failed)?;
                if updated == 0 {
                    return Err(OrganisationRepositoryError::TeamNotFound(team.id()));
                }
                diesel::delete(team_members::table.filter(team_members::team_id.eq(row.id)))
                    .execute(tx)
                    .map_err(failed)?;
                insert_members(tx, &team)
            })
        })
        .await
    }

    async fn delete_team(&self, id: TeamId) -> Result<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(teams::table.find(id.into_inner()))
                .execute(connection)
                .map_err(failed)?;
            if deleted == 0 {
                return Err(OrganisationRepositoryError::TeamNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_team(&self, id: TeamId) -> Result<Option<Team>> {
        self.run_blocking(move |connection| {
            let rows = teams::table
                .find(id.into_inner())
                .select(TeamRow::as_select())
                .load(connection)
                .map_err(failed)?;
            Ok(hydrate_teams(connection, rows)?.into_iter().next())
        })
        .await
    }

    async fn list_teams(&self, search: Option<&str>) -> Result<Vec<Team>> {
        let pattern = search_pattern(search);
        self.run_blocking(move |connection| {
            let mut statement = teams::table
                .select(TeamRow::as_select())
                .order(teams::name.asc())
                .into_boxed();
            if let Some(pattern) = pattern {
                statement = statement.filter(teams::name.ilike(pattern));
            }
            let rows = statement.load(connection).map_err(failed)?;
            hydrate_teams(connection, rows)
        })
        .await
    }

    async fn list_project_teams(&self, project: ProjectId) -> Result<Vec<Team>> {
        self.run_blocking(move |connection| {
            let rows = teams::table
                .filter(teams::project_id.eq(project.into_inner()))
                .order(teams::name.asc())
                .select(TeamRow::as_select())
                .load(connection)
                .map_err(failed)?;
            hydrate_teams(connection, rows)
        })
        .await
    }

    async fn list_member_teams(&self, worker: WorkerId) -> Result<Vec<Team>> {
        self.run_blocking(move |connection| {
            let rows = teams::table
                .inner_join(team_members::table)
                .filter(team_members::worker_id.eq(worker.into_inner()))
                .order(teams::name.asc())
                .select(TeamRow::as_select())
                .load(connection)
                .map_err(failed)?;
            hydrate_teams(connection, rows)
        })
        .await
    }
}

#[async_trait]
impl CatalogRepository for PostgresStore {
    async fn store_tag(&self, tag: &Tag) -> Result<()> {
        let row = TagRow {
            id: tag.id().into_inner(),
            name: tag.name().as_str().to_owned(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(tags::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| duplicate_or(err, OrganisationRepositoryError::DuplicateTag(row.name.clone())))?;
            Ok(())
        })
        .await
    }

    async fn update_tag(&self, tag: &Tag) -> Result<()> {
        let id = tag.id();
        let name = tag.name().as_str().to_owned();
        self.run_blocking(move |connection| {
            let updated = diesel::update(tags::table.find(id.into_inner()))
                .set(tags::name.eq(&name))
                .execute(connection)
                .map_err(|err| duplicate_or(err, OrganisationRepositoryError::DuplicateTag(name.clone())))?;
            if updated == 0 {
                return Err(OrganisationRepositoryError::TagNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_tag(&self, id: TagId) -> Result<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(tags::table.find(id.into_inner()))
                .execute(connection)
                .map_err(failed)?;
            if deleted == 0 {
                return Err(OrganisationRepositoryError::TagNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>> {
        self.run_blocking(move |connection| {
            let row = tags::table
                .find(id.into_inner())
                .select(TagRow::as_select())
                .first(connection)
                .optional()
                .map_err(failed)?;
            row.map(|row| catalog_entry(row.id, &row.name, "tags").map(|(id, name)| Tag::from_persisted(TagId::from_uuid(id), name)))
                .transpose()
        })
        .await
    }

    async fn list_tags(&self, search: Option<&str>) -> Result<Vec<Tag>> {
        let pattern = search_pattern(search);
        self.run_blocking(move |connection| {
            let mut statement = tags::table
                .select(TagRow::as_select())
                .order(tags::name.asc())
                .into_boxed();
            if let Some(pattern) = pattern {
                statement = statement.filter(tags::name.ilike(pattern));
            }
            statement
                .load(connection)
                .map_err(failed)?
                .into_iter()
                .map(|row| {
                    catalog_entry(row.id, &row.name, "tags")
                        .map(|(id, name)| Tag::from_persisted(TagId::from_uuid(id), name))
                })
                .collect()
        })
        .await
    }

    async fn store_task_type(&self, task_type: &TaskType) -> Result<()> {
        let row = TaskTypeRow {
            id: task_type.id().into_inner(),
            name: task_type.name().as_str().to_owned(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(task_types::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| {
                    duplicate_or(err, OrganisationRepositoryError::DuplicateTaskType(row.name.clone()))
                })?;
            Ok(())
        })
        .await
    }

    async fn update_task_type(&self, task_type: &TaskType) -> Result<()> {
        let id = task_type.id();
        let name = task_type.name().as_str().to_owned();
        self.run_blocking(move |connection| {
            let updated = diesel::update(task_types::table.find(id.into_inner()))
                .set(task_types::name.eq(&name))
                .execute(connection)
                .map_err(|err| {
                    duplicate_or(err, OrganisationRepositoryError::DuplicateTaskType(name.clone()))
                })?;
            if updated == 0 {
                return Err(OrganisationRepositoryError::TaskTypeNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_task_type(&self, id: TaskTypeId) -> Result<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(task_types::table.find(id.into_inner()))
                .execute(connection)
                .map_err(failed)?;
            if deleted == 0 {
                return Err(OrganisationRepositoryError::TaskTypeNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_task_type(&self, id: TaskTypeId) -> Result<Option<TaskType>> {
        self.run_blocking(move |connection| {
            let row = task_types::table
                .find(id.into_inner())
                .select(TaskTypeRow::as_select())
                .first(connection)
                .optional()
                .map_err(failed)?;
            row.map(|row| {
                catalog_entry(row.id, &row.name, "task_types")
                    .map(|(id, name)| TaskType::from_persisted(TaskTypeId::from_uuid(id), name))
            })
            .transpose()
        })
        .await
    }

    async fn list_task_types(&self) -> Result<Vec<TaskType>> {
        self.run_blocking(move |connection| {
            task_types::table
                .order(task_types::name.asc())
                .select(TaskTypeRow::as_select())
                .load(connection)
                .map_err(failed)?
                .into_iter()
                .map(|row| {
                    catalog_entry(row.id, &row.name, "task_types")
                        .map(|(id, name)| TaskType::from_persisted(TaskTypeId::from_uuid(id), name))
                })
                .collect()
        })
        .await
    }
}

fn search_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| format!("%{}%", escape_like(value)))
}

fn duplicate_or(err: DieselError, duplicate: OrganisationRepositoryError) -> OrganisationRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => duplicate,
        other => failed(other),
    }
}

fn check_team_references(connection: &mut PgConnection, team: &Team) -> Result<()> {
    if let Some(project) = team.project() {
        let exists: bool = diesel::select(diesel::dsl::exists(
            projects::table.find(project.into_inner()),
        ))
        .get_result(connection)
        .map_err(failed)?;
        if !exists {
            return Err(OrganisationRepositoryError::ProjectNotFound(project));
        }
    }
    let wanted: Vec<Uuid> = team.members().iter().map(|id| id.into_inner()).collect();
    let found: BTreeSet<Uuid> = workers::table
        .filter(workers::id.eq_any(&wanted))
        .select(workers::id)
        .load::<Uuid>(connection)
        .map_err(failed)?
        .into_iter()
        .collect();
    if let Some(missing) = wanted.into_iter().find(|id| !found.contains(id)) {
        return Err(OrganisationRepositoryError::UnknownWorker(WorkerId::from_uuid(missing)));
    }
    Ok(())
}

fn insert_members(connection: &mut PgConnection, team: &Team) -> Result<()> {
    let rows: Vec<TeamMemberRow> = team
        .members()
        .iter()
        .map(|member| TeamMemberRow {
            team_id: team.id().into_inner(),
            worker_id: member.into_inner(),
        })
        .collect();
    if !rows.is_empty() {
        diesel::insert_into(team_members::table)
            .values(&rows)
            .execute(connection)
            .map_err(failed)?;
    }
    Ok(())
}

fn hydrate_teams(connection: &mut PgConnection, rows: Vec<TeamRow>) -> Result<Vec<Team>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut members: HashMap<Uuid, BTreeSet<WorkerId>> = HashMap::new();
    for link in team_members::table
        .filter(team_members::team_id.eq_any(&ids))
        .select(TeamMemberRow::as_select())
        .load(connection)
        .map_err(failed)?
    {
        members
            .entry(link.team_id)
            .or_default()
            .insert(WorkerId::from_uuid(link.worker_id));
    }
    rows.into_iter()
        .map(|row| {
            let name = TeamName::new(&row.name)
                .map_err(|err| OrganisationRepositoryError::from(StoreFailure::corrupt("teams", err)))?;
            Ok(Team::from_persisted(PersistedTeamData {
                id: TeamId::from_uuid(row.id),
                name,
                project: row.project_id.map(ProjectId::from_uuid),
                members: members.remove(&row.id).unwrap_or_default(),
                created_by: row.created_by.map(WorkerId::from_uuid),
                created_at: row.created_at,
            }))
        })
        .collect()
}

fn project_row(project: &Project) -> ProjectRow {
    ProjectRow {
        id: project.id().into_inner(),
        name: project.name().as_str().to_owned(),
        description: project.description().to_owned(),
        created_at: project.created_at(),
    }
}

fn row_to_project(row: ProjectRow) -> Result<Project> {
    let name = ProjectName::new(&row.name)
        .map_err(|err| OrganisationRepositoryError::from(StoreFailure::corrupt("projects", err)))?;
    Ok(Project::from_persisted(
        ProjectId::from_uuid(row.id),
        name,
        row.description,
        row.created_at,
    ))
}

fn team_row(team: &Team) -> TeamRow {
    TeamRow {
        id: team.id().into_inner(),
        name: team.name().as_str().to_owned(),
        project_id: team.project().map(ProjectId::into_inner),
        created_by: team.created_by().map(WorkerId::into_inner),
        created_at: team.created_at(),
    }
}

fn catalog_entry(id: Uuid, name: &str, table: &'static str) -> Result<(Uuid, CatalogName)> {
    let name = CatalogName::new(name)
        .map_err(|err| OrganisationRepositoryError::from(StoreFailure::corrupt(table, err)))?;
    Ok((id, name))
}
