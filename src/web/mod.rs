//! Server-rendered HTTP interface.
//!
//! Handlers are thin: they authenticate the request, decode input, call one
//! service and render a template or a JSON body. Authorisation lives in the
//! services; the client script is never trusted.

pub mod cookies;
pub mod csrf;
pub mod error;
pub mod forms;
pub mod hosts;
pub mod identity;
pub mod pagination;
pub mod path;
pub mod session;
pub mod templates;
mod views;

pub use error::{Ajax, WebError};
pub use identity::CurrentWorker;

use crate::config::Settings;
use crate::organisation::services::{CatalogService, ProjectService, TeamService};
use crate::persistence::TrackerStore;
use crate::task::services::{
    CommentService, DashboardService, MutationHooks, NotificationService, TaskService,
};
use crate::worker::services::WorkerDirectoryService;
use axum::{
    Json, Router,
    http::header,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Duration;
use chrono_tz::Tz;
use mockable::DefaultClock;
use serde_json::json;
use session::{SessionKeys, SessionStore};
use std::sync::Arc;
use templates::Templates;
use tower_http::trace::TraceLayer;
use views::{admin, auth, catalog, comments, dashboard, notifications, organisation, tasks, workers};

/// The store type every service is instantiated with.
pub type Store = dyn TrackerStore;

/// Web-facing settings.
#[derive(Clone)]
pub struct WebConfig {
    /// Session signing secret.
    pub secret_key: String,
    /// Development mode.
    pub debug: bool,
    /// Accepted `Host` names.
    pub allowed_hosts: Vec<String>,
    /// Language advertised in pages.
    pub language_code: String,
    /// Display and input zone.
    pub zone: Tz,
    /// Client notification poll interval.
    pub poll_seconds: u64,
    /// Session lifetime.
    pub session_ttl: Duration,
}

impl WebConfig {
    /// Defaults for local development: debug on, Kyiv time, 30 s polling
    /// and two-week sessions.
    #[must_use]
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            debug: true,
            allowed_hosts: Vec::new(),
            language_code: "uk".to_owned(),
            zone: chrono_tz::Europe::Kyiv,
            poll_seconds: 30,
            session_ttl: Duration::hours(336),
        }
    }

    /// Extracts the web settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            secret_key: settings.secret_key.clone(),
            debug: settings.debug,
            allowed_hosts: settings.allowed_hosts(),
            language_code: settings.language_code.clone(),
            zone: settings.time_zone,
            poll_seconds: settings.notification_poll_seconds,
            session_ttl: Duration::hours(settings.session_ttl_hours),
        }
    }
}

impl std::fmt::Debug for WebConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebConfig")
            .field("debug", &self.debug)
            .field("allowed_hosts", &self.allowed_hosts)
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}

/// Shared state behind every handler.
pub struct AppState {
    config: WebConfig,
    clock: Arc<DefaultClock>,
    keys: SessionKeys,
    sessions: SessionStore,
    templates: Templates,
    workers: WorkerDirectoryService<Store, DefaultClock>,
    projects: ProjectService<Store, DefaultClock>,
    teams: TeamService<Store, DefaultClock>,
    catalog: CatalogService<Store>,
    tasks: TaskService<Store, DefaultClock>,
    comments: CommentService<Store, DefaultClock>,
    notifications: NotificationService<Store>,
    dashboard: DashboardService<Store, DefaultClock>,
}

impl AppState {
    /// Wires every service to `store`.
    ///
    /// # Errors
    ///
    /// Fails when a bundled template does not parse.
    pub fn new(
        store: Arc<Store>,
        clock: Arc<DefaultClock>,
        config: WebConfig,
    ) -> Result<Self, minijinja::Error> {
        let hooks = MutationHooks::new(config.zone);
        Ok(Self {
            keys: SessionKeys::new(&config.secret_key),
            sessions: SessionStore::new(config.session_ttl),
            templates: Templates::load()?,
            workers: WorkerDirectoryService::new(Arc::clone(&store), Arc::clone(&clock)),
            projects: ProjectService::new(Arc::clone(&store), Arc::clone(&clock)),
            teams: TeamService::new(Arc::clone(&store), Arc::clone(&clock)),
            catalog: CatalogService::new(Arc::clone(&store)),
            tasks: TaskService::new(Arc::clone(&store), Arc::clone(&clock), hooks),
            comments: CommentService::new(Arc::clone(&store), Arc::clone(&clock), hooks),
            notifications: NotificationService::new(Arc::clone(&store)),
            dashboard: DashboardService::new(store, Arc::clone(&clock)),
            clock,
            config,
        })
    }

    /// Web settings.
    #[must_use]
    pub const fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Account service, also used for start-up bootstrapping.
    #[must_use]
    pub const fn workers(&self) -> &WorkerDirectoryService<Store, DefaultClock> {
        &self.workers
    }

    /// Server-side session table.
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/dashboard/", get(dashboard::index))
        .route("/register/", get(auth::register_page).post(auth::register))
        .route("/login/", get(auth::login_page).post(auth::login))
        .route("/logout/", post(auth::logout))
        .route("/tasks/", get(tasks::list))
        .route("/my-tasks/", get(tasks::mine))
        .route("/tasks/create/", get(tasks::create_page).post(tasks::create))
        .route("/tasks/:id/", get(tasks::detail))
        .route("/tasks/:id/update/", get(tasks::update_page).post(tasks::update))
        .route("/tasks/:id/delete/", get(tasks::delete_page).post(tasks::delete))
        .route("/tasks/:id/toggle/", post(tasks::toggle))
        .route("/tasks/:id/comment/", post(comments::create))
        .route("/tasks/:id/activity/", get(tasks::activity))
        .route("/comments/:id/update/", get(comments::update_page).post(comments::update))
        .route("/comments/:id/delete/", get(comments::delete_page).post(comments::delete))
        .route("/projects/", get(organisation::project_list))
        .route(
            "/projects/create/",
            get(organisation::project_create_page).post(organisation::project_create),
        )
        .route("/projects/:id/", get(organisation::project_detail))
        .route(
            "/projects/:id/update/",
            get(organisation::project_update_page).post(organisation::project_update),
        )
        .route(
            "/projects/:id/delete/",
            get(organisation::project_delete_page).post(organisation::project_delete),
        )
        .route("/projects/:id/add-team/", post(organisation::project_add_team))
        .route(
            "/projects/:id/remove-team/:team_id/",
            post(organisation::project_remove_team),
        )
        .route("/teams/", get(organisation::team_list))
        .route(
            "/teams/create/",
            get(organisation::team_create_page).post(organisation::team_create),
        )
        .route("/teams/:id/", get(organisation::team_detail))
        .route(
            "/teams/:id/update/",
            get(organisation::team_update_page).post(organisation::team_update),
        )
        .route(
            "/teams/:id/delete/",
            get(organisation::team_delete_page).post(organisation::team_delete),
        )
        .route("/teams/:id/add-member/", post(organisation::team_add_member))
        .route(
            "/teams/:id/remove-member/:worker_id/",
            post(organisation::team_remove_member),
        )
        .route("/tags/", get(catalog::tag_list))
        .route("/tags/create/", get(catalog::tag_create_page).post(catalog::tag_create))
        .route("/tags/:id/", get(catalog::tag_detail))
        .route("/tags/:id/update/", get(catalog::tag_update_page).post(catalog::tag_update))
        .route("/tags/:id/delete/", get(catalog::tag_delete_page).post(catalog::tag_delete))
        .route("/notifications/", get(notifications::list))
        .route("/notifications/:id/read/", post(notifications::mark_read))
        .route("/notifications/read-all/", post(notifications::mark_all_read))
        .route("/notifications/poll/", get(notifications::poll))
        .route("/positions/", get(workers::position_list))
        .route(
            "/positions/create/",
            get(workers::position_create_page).post(workers::position_create),
        )
        .route(
            "/positions/:id/update/",
            get(workers::position_update_page).post(workers::position_update),
        )
        .route(
            "/positions/:id/delete/",
            get(workers::position_delete_page).post(workers::position_delete),
        )
        .route("/workers/", get(workers::worker_list))
        .route(
            "/workers/:id/update/",
            get(workers::worker_update_page).post(workers::worker_update),
        )
        .route("/workers/:id/deactivate/", post(workers::worker_deactivate))
        .route("/workers/:id/activate/", post(workers::worker_activate))
        .route("/admin/notifications/", get(admin::notifications))
        .route("/admin/notifications/bulk/", post(admin::notifications_bulk))
        .route("/admin/activity/", get(admin::activity))
        .route(
            "/admin/task-types/",
            get(admin::task_types).post(admin::task_type_create),
        )
        .route(
            "/admin/task-types/:id/update/",
            get(admin::task_type_update_page).post(admin::task_type_update),
        )
        .route(
            "/admin/task-types/:id/delete/",
            get(admin::task_type_delete_page).post(admin::task_type_delete),
        )
        .route("/static/app.js", get(script))
        .route("/static/app.css", get(stylesheet))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(Arc::clone(&state), csrf::protect))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), hosts::check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[expect(clippy::unused_async, reason = "axum handlers must be async")]
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

#[expect(clippy::unused_async, reason = "axum handlers must be async")]
async fn not_found() -> WebError {
    WebError::NotFound
}

#[expect(clippy::unused_async, reason = "axum handlers must be async")]
async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        include_str!("../../static/app.js"),
    )
}

#[expect(clippy::unused_async, reason = "axum handlers must be async")]
async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        include_str!("../../static/app.css"),
    )
}
