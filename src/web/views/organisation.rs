//! Projects and teams.

use super::{Choice, Named, Names, worker_named};
use crate::organisation::{
    domain::{Project, ProjectDraft, ProjectId, Team, TeamDraft, TeamId},
    services::OrganisationError,
};
use crate::task::domain::TaskFilter;
use crate::web::{
    path::IdPath,
    AppState, CurrentWorker, WebError,
    csrf::CsrfToken,
    forms::{FormErrors, FormFailure, RawForm},
    pagination::{CATALOG_PER_PAGE, Page},
    session::FlashLevel,
};
use crate::worker::domain::WorkerId;
use axum::{
    Extension,
    extract::{Query, State},
    response::Response,
};
use minijinja::context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// `?search=&page=` of the catalogue lists.
#[derive(Debug, Default, Deserialize)]
pub(in crate::web) struct ListQuery {
    #[serde(default)]
    pub(in crate::web) search: String,
    pub(in crate::web) page: Option<String>,
}

impl ListQuery {
    pub(in crate::web) fn needle(&self) -> Option<&str> {
        Some(self.search.trim()).filter(|value| !value.is_empty())
    }

    /// The search term as a query string for pagination links.
    pub(in crate::web) fn carried(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(needle) = self.needle() {
            query.append_pair("search", needle);
        }
        query.finish()
    }
}

#[derive(Debug, Serialize)]
struct ProjectRow {
    id: String,
    name: String,
    summary: String,
    created_at: String,
    teams: usize,
}

#[derive(Debug, Serialize)]
struct TeamRow {
    id: String,
    name: String,
    project: Option<Named>,
    members: usize,
    can_manage: bool,
}

const SUMMARY_CHARS: usize = 80;

/// Cuts `text` to `limit` characters, marking the cut with an ellipsis.
fn summary(text: &str, limit: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

fn name_lookup(projects: &[Project]) -> BTreeMap<ProjectId, String> {
    projects
        .iter()
        .map(|project| (project.id(), project.name().to_string()))
        .collect()
}

fn team_row(team: &Team, projects: &BTreeMap<ProjectId, String>, current: &CurrentWorker) -> TeamRow {
    TeamRow {
        id: team.id().to_string(),
        name: team.name().to_string(),
        project: team
            .project()
            .and_then(|id| projects.get(&id).map(|name| Named::new(id, name.clone()))),
        members: team.members().len(),
        can_manage: team.can_be_managed_by(&current.requester()),
    }
}

pub(in crate::web) async fn project_list(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    Query(query): Query<ListQuery>,
) -> Result<Response, WebError> {
    let projects = state.projects.list(query.needle()).await?;
    let page = Page::of(projects, query.page.as_deref(), CATALOG_PER_PAGE);
    let mut team_counts = Vec::with_capacity(page.items.len());
    for project in &page.items {
        team_counts.push(state.projects.teams(project.id()).await?.len());
    }
    let mut team_counts = team_counts.into_iter();
    let page = page.map(|project| ProjectRow {
        id: project.id().to_string(),
        name: project.name().to_string(),
        summary: summary(project.description(), SUMMARY_CHARS),
        created_at: state.time(project.created_at()),
        teams: team_counts.next().unwrap_or_default(),
    });
    state.render(
        "projects/list.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            page => page,
            search => query.search.trim(),
            carried => query.carried(),
        },
    )
}

async fn project_form(
    state: &AppState,
    csrf: &CsrfToken,
    current: &CurrentWorker,
    project: Option<&Project>,
    values: BTreeMap<&str, &str>,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    let (title, action) = project.map_or_else(
        || ("Create project".to_owned(), "/projects/create/".to_owned()),
        |project| {
            (
                format!("Edit \"{}\"", project.name()),
                format!("/projects/{}/update/", project.id()),
            )
        },
    );
    state.render(
        "projects/form.html",
        context! {
            chrome => state.chrome(current, csrf).await?,
            title => title,
            action => action,
            values => values,
            errors => errors,
        },
    )
}

fn project_draft(form: &RawForm) -> Result<ProjectDraft, OrganisationError> {
    Ok(ProjectDraft::new(form.get("name"), form.get("description"))?)
}

pub(in crate::web) async fn project_create_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
) -> Result<Response, WebError> {
    project_form(&state, &csrf, &current, None, BTreeMap::new(), &FormErrors::default()).await
}

pub(in crate::web) async fn project_create(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    form: RawForm,
) -> Result<Response, WebError> {
    let created = match project_draft(&form) {
        Ok(draft) => state.projects.create(&current.requester(), draft).await,
        Err(err) => Err(err),
    };
    match created {
        Ok(project) => Ok(state.redirect_with(
            &current,
            FlashLevel::Success,
            "Project created successfully!",
            &format!("/projects/{}/", project.id()),
        )),
        Err(err) => {
            let errors = err.into_form_errors()?;
            project_form(&state, &csrf, &current, None, form.values(), &errors).await
        }
    }
}

pub(in crate::web) async fn project_detail(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<ProjectId>,
) -> Result<Response, WebError> {
    let project = state.projects.get(id).await?;
    let tasks = state
        .tasks
        .search(&TaskFilter {
            project: Some(id),
            ..TaskFilter::default()
        })
        .await?;
    let names = Names::for_tasks(&state, &tasks).await?;
    let task_rows: Vec<_> = tasks
        .iter()
        .map(|task| names.task_row(&state, task, &current))
        .collect();

    let lookup = BTreeMap::from([(project.id(), project.name().to_string())]);
    let teams: Vec<TeamRow> = state
        .projects
        .teams(id)
        .await?
        .iter()
        .map(|team| team_row(team, &lookup, &current))
        .collect();
    let available: Vec<Named> = state
        .teams
        .list(None)
        .await?
        .iter()
        .filter(|team| team.project().is_none())
        .map(|team| Named::new(team.id(), team.name().as_str()))
        .collect();

    state.render(
        "projects/detail.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            project => context! {
                id => project.id().to_string(),
                name => project.name().to_string(),
                description => project.description(),
                created_at => state.time(project.created_at()),
            },
            tasks => task_rows,
            teams => teams,
            available_teams => available,
            can_delete => current.worker.is_staff(),
        },
    )
}

pub(in crate::web) async fn project_update_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<ProjectId>,
) -> Result<Response, WebError> {
    let project = state.projects.get(id).await?;
    let values = BTreeMap::from([
        ("name", project.name().as_str()),
        ("description", project.description()),
    ]);
    project_form(&state, &csrf, &current, Some(&project), values, &FormErrors::default()).await
}

pub(in crate::web) async fn project_update(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<ProjectId>,
    form: RawForm,
) -> Result<Response, WebError> {
    let project = state.projects.get(id).await?;
    let updated = match project_draft(&form) {
        Ok(draft) => state.projects.update(&current.requester(), id, draft).await,
        Err(err) => Err(err),
    };
    match updated {
        Ok(_) => Ok(state.redirect_with(
            &current,
            FlashLevel::Success,
            "Project updated successfully!",
            &format!("/projects/{id}/"),
        )),
        Err(err) => {
            let errors = err.into_form_errors()?;
            project_form(&state, &csrf, &current, Some(&project), form.values(), &errors).await
        }
    }
}

pub(in crate::web) async fn project_delete_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<ProjectId>,
) -> Result<Response, WebError> {
    current
        .requester()
        .ensure_staff("delete projects")
        .map_err(|denied| WebError::Forbidden(denied.to_string()))?;
    let project = state.projects.get(id).await?;
    state.render(
        "confirm_delete.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            kind => "project",
            name => project.name().to_string(),
            note => "Its teams and tasks are kept and detached from it.",
            action => format!("/projects/{id}/delete/"),
            cancel => format!("/projects/{id}/"),
        },
    )
}

pub(in crate::web) async fn project_delete(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(id): IdPath<ProjectId>,
) -> Result<Response, WebError> {
    state.projects.delete(&current.requester(), id).await?;
    Ok(state.redirect_with(
        &current,
        FlashLevel::Success,
        "Project deleted successfully!",
        "/projects/",
    ))
}

pub(in crate::web) async fn project_add_team(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(id): IdPath<ProjectId>,
    form: RawForm,
) -> Result<Response, WebError> {
    let detail = format!("/projects/{id}/");
    let mut errors = FormErrors::default();
    let Some(team) = form.optional_id::<TeamId>("team", &mut errors) else {
        return Ok(state.redirect_with(&current, FlashLevel::Error, "Select a team.", &detail));
    };
    let team = state.projects.add_team(&current.requester(), id, team).await?;
    Ok(state.redirect_with(
        &current,
        FlashLevel::Success,
        format!("Team \"{}\" successfully added to project!", team.name()),
        &detail,
    ))
}

#[derive(Debug, Deserialize)]
pub(in crate::web) struct ProjectTeamPath {
    id: ProjectId,
    team_id: TeamId,
}

pub(in crate::web) async fn project_remove_team(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(path): IdPath<ProjectTeamPath>,
) -> Result<Response, WebError> {
    let team = state
        .projects
        .remove_team(&current.requester(), path.id, path.team_id)
        .await?;
    Ok(state.redirect_with(
        &current,
        FlashLevel::Success,
        format!("Team \"{}\" removed from project!", team.name()),
        &format!("/projects/{}/", path.id),
    ))
}

pub(in crate::web) async fn team_list(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    Query(query): Query<ListQuery>,
) -> Result<Response, WebError> {
    let teams = state.teams.list(query.needle()).await?;
    let lookup = name_lookup(&state.projects.list(None).await?);
    let page = Page::of(teams, query.page.as_deref(), CATALOG_PER_PAGE)
        .map(|team| team_row(&team, &lookup, &current));
    let mine: Vec<Named> = state
        .teams
        .member_teams(current.worker.id())
        .await?
        .iter()
        .map(|team| Named::new(team.id(), team.name().as_str()))
        .collect();
    state.render(
        "teams/list.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            page => page,
            search => query.search.trim(),
            carried => query.carried(),
            my_teams => mine,
        },
    )
}

/// Field values of a team form.
#[derive(Debug, Default)]
struct TeamSelection {
    project: Option<ProjectId>,
    members: BTreeSet<WorkerId>,
}

async fn team_form(
    state: &AppState,
    csrf: &CsrfToken,
    current: &CurrentWorker,
    team: Option<&Team>,
    name: &str,
    selection: &TeamSelection,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    let projects: Vec<Choice> = state
        .projects
        .list(None)
        .await?
        .iter()
        .map(|project| {
            let selected = selection.project == Some(project.id());
            Choice::new(project.id(), project.name().as_str(), selected)
        })
        .collect();
    let workers: Vec<Choice> = state
        .workers
        .list_active()
        .await?
        .iter()
        .map(|worker| {
            let selected = selection.members.contains(&worker.id());
            Choice::new(worker.id(), worker.to_string(), selected)
        })
        .collect();
    let (title, action) = team.map_or_else(
        || ("Create team".to_owned(), "/teams/create/".to_owned()),
        |team| {
            (
                format!("Edit \"{}\"", team.name()),
                format!("/teams/{}/update/", team.id()),
            )
        },
    );
    state.render(
        "teams/form.html",
        context! {
            chrome => state.chrome(current, csrf).await?,
            title => title,
            action => action,
            name => name,
            projects => projects,
            workers => workers,
            errors => errors,
        },
    )
}

/// Parses a team form; the selection is returned for redisplay either way.
fn team_submission(form: &RawForm) -> (Result<TeamDraft, FormErrors>, TeamSelection) {
    let mut errors = FormErrors::default();
    let selection = TeamSelection {
        project: form.optional_id("project", &mut errors),
        members: form.ids("members", &mut errors).into_iter().collect(),
    };
    let draft = TeamDraft::new(
        form.get("name"),
        selection.project,
        selection.members.iter().copied(),
    );
    let draft = match draft {
        Ok(draft) if errors.is_empty() => Ok(draft),
        Ok(_) => Err(errors),
        Err(invalid) => {
            if let Some((field, message)) = OrganisationError::from(invalid).field_error() {
                errors.add(field, message);
            }
            Err(errors)
        }
    };
    (draft, selection)
}

pub(in crate::web) async fn team_create_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
) -> Result<Response, WebError> {
    let selection = TeamSelection {
        project: None,
        members: BTreeSet::from([current.worker.id()]),
    };
    team_form(&state, &csrf, &current, None, "", &selection, &FormErrors::default()).await
}

pub(in crate::web) async fn team_create(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    form: RawForm,
) -> Result<Response, WebError> {
    let (draft, selection) = team_submission(&form);
    let errors = match draft {
        Ok(draft) => match state.teams.create(&current.requester(), draft).await {
            Ok(team) => {
                return Ok(state.redirect_with(
                    &current,
                    FlashLevel::Success,
                    "Team created successfully!",
                    &format!("/teams/{}/", team.id()),
                ));
            }
            Err(err) => err.into_form_errors()?,
        },
        Err(errors) => errors,
    };
    team_form(&state, &csrf, &current, None, form.get("name"), &selection, &errors).await
}

pub(in crate::web) async fn team_detail(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TeamId>,
) -> Result<Response, WebError> {
    let team = state.teams.get(id).await?;
    let member_ids: Vec<WorkerId> = team.members().iter().copied().collect();
    let mut members: Vec<Named> = state
        .workers
        .find_many(&member_ids)
        .await?
        .iter()
        .map(worker_named)
        .collect();
    members.sort_by(|left, right| left.name.cmp(&right.name));
    let candidates: Vec<Named> = state
        .workers
        .list_active()
        .await?
        .iter()
        .filter(|worker| !team.has_member(worker.id()))
        .map(worker_named)
        .collect();
    let project = match team.project() {
        Some(project) => {
            let project = state.projects.get(project).await?;
            Some(Named::new(project.id(), project.name().as_str()))
        }
        None => None,
    };
    let created_by = match team.created_by() {
        Some(creator) => state.workers.find(creator).await?.map(|worker| worker.full_name()),
        None => None,
    };

    state.render(
        "teams/detail.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            team => context! {
                id => team.id().to_string(),
                name => team.name().to_string(),
                created_at => state.time(team.created_at()),
                created_by => created_by,
            },
            project => project,
            members => members,
            candidates => candidates,
            can_manage => team.can_be_managed_by(&current.requester()),
        },
    )
}

async fn managed_team(
    state: &AppState,
    current: &CurrentWorker,
    id: TeamId,
) -> Result<Team, WebError> {
    let team = state.teams.get(id).await?;
    if team.can_be_managed_by(&current.requester()) {
        Ok(team)
    } else {
        Err(WebError::Forbidden(
            "Only the creator, a member or staff may change this team.".to_owned(),
        ))
    }
}

pub(in crate::web) async fn team_update_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TeamId>,
) -> Result<Response, WebError> {
    let team = managed_team(&state, &current, id).await?;
    let selection = TeamSelection {
        project: team.project(),
        members: team.members().clone(),
    };
    let name = team.name().to_string();
    team_form(&state, &csrf, &current, Some(&team), &name, &selection, &FormErrors::default())
        .await
}

pub(in crate::web) async fn team_update(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TeamId>,
    form: RawForm,
) -> Result<Response, WebError> {
    let team = managed_team(&state, &current, id).await?;
    let (draft, selection) = team_submission(&form);
    let errors = match draft {
        Ok(draft) => match state.teams.update(&current.requester(), id, draft).await {
            Ok(_) => {
                return Ok(state.redirect_with(
                    &current,
                    FlashLevel::Success,
                    "Team updated successfully!",
                    &format!("/teams/{id}/"),
                ));
            }
            Err(err) => err.into_form_errors()?,
        },
        Err(errors) => errors,
    };
    team_form(&state, &csrf, &current, Some(&team), form.get("name"), &selection, &errors).await
}

pub(in crate::web) async fn team_delete_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TeamId>,
) -> Result<Response, WebError> {
    let team = managed_team(&state, &current, id).await?;
    state.render(
        "confirm_delete.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            kind => "team",
            name => team.name().to_string(),
            action => format!("/teams/{id}/delete/"),
            cancel => format!("/teams/{id}/"),
        },
    )
}

pub(in crate::web) async fn team_delete(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(id): IdPath<TeamId>,
) -> Result<Response, WebError> {
    state.teams.delete(&current.requester(), id).await?;
    Ok(state.redirect_with(
        &current,
        FlashLevel::Success,
        "Team deleted successfully!",
        "/teams/",
    ))
}

pub(in crate::web) async fn team_add_member(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(id): IdPath<TeamId>,
    form: RawForm,
) -> Result<Response, WebError> {
    let detail = format!("/teams/{id}/");
    let mut errors = FormErrors::default();
    let Some(worker_id) = form.optional_id::<WorkerId>("worker", &mut errors) else {
        return Ok(state.redirect_with(&current, FlashLevel::Error, "Select a worker.", &detail));
    };
    let worker = state.workers.get(worker_id).await?;
    state.teams.add_member(&current.requester(), id, worker_id).await?;
    Ok(state.redirect_with(
        &current,
        FlashLevel::Success,
        format!("User \"{}\" added to team!", worker.full_name()),
        &detail,
    ))
}

#[derive(Debug, Deserialize)]
pub(in crate::web) struct TeamMemberPath {
    id: TeamId,
    worker_id: WorkerId,
}

pub(in crate::web) async fn team_remove_member(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(path): IdPath<TeamMemberPath>,
) -> Result<Response, WebError> {
    let worker = state.workers.get(path.worker_id).await?;
    state
        .teams
        .remove_member(&current.requester(), path.id, path.worker_id)
        .await?;
    Ok(state.redirect_with(
        &current,
        FlashLevel::Success,
        format!("User \"{}\" removed from team!", worker.full_name()),
        &format!("/teams/{}/", path.id),
    ))
}

#[cfg(test)]
mod tests {
    use super::{ListQuery, summary};
    use rstest::rstest;

    #[rstest]
    #[case("short", "short")]
    #[case("exactly ten", "exactly te…")]
    #[case("", "")]
    fn summaries_cut_long_descriptions(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(summary(text, 10), expected);
    }

    #[test]
    fn blank_search_is_not_carried() {
        let query = ListQuery {
            search: "   ".to_owned(),
            page: Some("2".to_owned()),
        };
        assert_eq!(query.needle(), None);
        assert_eq!(query.carried(), "");
    }
}
