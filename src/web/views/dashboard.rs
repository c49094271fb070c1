//! Landing page with counters, upcoming deadlines and recent activity.

use super::{Named, Names};
use crate::web::{AppState, CurrentWorker, WebError, csrf::CsrfToken};
use axum::{Extension, extract::State, response::Response};
use minijinja::context;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct PriorityCount {
    priority: &'static str,
    class: String,
    count: usize,
}

pub(in crate::web) async fn index(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
) -> Result<Response, WebError> {
    let stats = state.dashboard.stats(current.worker.id()).await?;
    let mut names = Names::for_tasks(&state, &stats.upcoming).await?;
    names.extend_activity(&state, &stats.recent_activity).await?;

    let upcoming: Vec<_> = stats
        .upcoming
        .iter()
        .map(|task| names.task_row(&state, task, &current))
        .collect();
    let activity: Vec<_> = stats
        .recent_activity
        .iter()
        .map(|row| names.activity_row(&state, row))
        .collect();
    let by_priority: Vec<PriorityCount> = stats
        .open_by_priority
        .iter()
        .map(|&(priority, count)| PriorityCount {
            priority: priority.as_str(),
            class: priority.as_str().to_ascii_lowercase(),
            count,
        })
        .collect();
    let projects: Vec<Named> = stats
        .projects
        .iter()
        .map(|project| Named::new(project.id(), project.name().as_str()))
        .collect();
    let completion = if stats.total == 0 {
        0
    } else {
        stats.completed.saturating_mul(100).div_euclid(stats.total)
    };

    state.render(
        "dashboard.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            total => stats.total,
            completed => stats.completed,
            incomplete => stats.incomplete,
            overdue => stats.overdue,
            my_open => stats.my_open,
            my_completed => stats.my_completed,
            completion => completion,
            upcoming => upcoming,
            by_priority => by_priority,
            activity => activity,
            projects => projects,
        },
    )
}
