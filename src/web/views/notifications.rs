//! Notification list, read-state changes and the polling endpoint.

use super::NotificationRow;
use crate::persistence::PageRequest;
use crate::task::domain::{NotificationFilter, NotificationId};
use crate::web::{
    path::IdPath,
    AppState, CurrentWorker, WebError,
    csrf::CsrfToken,
    error::is_ajax,
    pagination::{NOTIFICATIONS_PER_PAGE, Page},
    session::FlashLevel,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use minijinja::context;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub(in crate::web) struct NotificationListQuery {
    filter: Option<String>,
    page: Option<String>,
}

pub(in crate::web) async fn list(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    Query(query): Query<NotificationListQuery>,
) -> Result<Response, WebError> {
    let filter = NotificationFilter::from_query(query.filter.as_deref());
    let request = PageRequest::parse(query.page.as_deref(), NOTIFICATIONS_PER_PAGE);
    let notifications = state
        .notifications
        .list(current.worker.id(), filter, request)
        .await?;
    let page = Page::from(notifications)
        .map(|notification| NotificationRow::new(&state, &notification));
    state.render(
        "notifications/list.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            page => page,
            filter => filter.as_str(),
        },
    )
}

fn acknowledged(
    state: &AppState,
    current: &CurrentWorker,
    headers: &HeaderMap,
    flash: Option<&str>,
) -> Response {
    if is_ajax(headers) {
        return Json(json!({ "success": true })).into_response();
    }
    if let Some(message) = flash {
        state.sessions.flash(&current.session, FlashLevel::Success, message);
    }
    Redirect::to("/notifications/").into_response()
}

pub(in crate::web) async fn mark_read(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(id): IdPath<NotificationId>,
    headers: HeaderMap,
) -> Response {
    match state.notifications.mark_read(id, &current.requester()).await {
        Ok(_) => acknowledged(&state, &current, &headers, None),
        Err(err) => WebError::from(err).respond(&headers),
    }
}

pub(in crate::web) async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    headers: HeaderMap,
) -> Response {
    match state.notifications.mark_all_read(current.worker.id()).await {
        Ok(_) => acknowledged(
            &state,
            &current,
            &headers,
            Some("All notifications marked as read"),
        ),
        Err(err) => WebError::from(err).respond(&headers),
    }
}

/// Badge count and newest unread notifications for the client poller.
pub(in crate::web) async fn poll(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
) -> Response {
    match state.notifications.poll(current.worker.id()).await {
        Ok(snapshot) => {
            let latest: Vec<NotificationRow> = snapshot
                .latest
                .iter()
                .map(|notification| NotificationRow::new(&state, notification))
                .collect();
            Json(json!({
                "success": true,
                "unread_count": snapshot.unread_count,
                "notifications": latest,
            }))
            .into_response()
        }
        Err(err) => WebError::from(err).into_json(),
    }
}
