//! Embedded cluster wiring shared by the `PostgreSQL` tests.

use std::sync::Arc;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use teamboard::persistence::{PostgresStore, connect};
use teamboard::task::services::{CommentService, MutationHooks, NotificationService, TaskService};
use teamboard::worker::{
    domain::{PasswordHash, Requester, Username, Worker, WorkerProfile},
    ports::WorkerRepository,
};
use tokio::runtime::Runtime;

/// Tracker schema applied to the template database.
const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-19-000000_create_tracker_schema/up.sql");

/// Template database name for the pre-migrated schema.
const TEMPLATE_DB: &str = "teamboard_test_template";

/// Creates a tokio runtime for async operations in tests.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with the schema applied.
fn ensure_template(cluster: &TestCluster) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_SCHEMA_SQL)
                .map_err(|e| eyre::eyre!("schema setup failed: {e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    Ok(())
}

/// Guard that drops the test database even if the test panics.
pub struct CleanupGuard {
    cluster: &'static TestCluster,
    db_name: String,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}

/// Every task-side service over one `PostgreSQL` store.
pub struct Services {
    pub store: Arc<PostgresStore>,
    pub tasks: TaskService<PostgresStore, DefaultClock>,
    pub comments: CommentService<PostgresStore, DefaultClock>,
    pub notifications: NotificationService<PostgresStore>,
}

/// Clones the template into a fresh database and wires the services to it.
///
/// The returned guard must outlive the services.
pub fn setup(cluster: &'static TestCluster, label: &str) -> (Services, CleanupGuard) {
    ensure_template(cluster).expect("template setup");
    let db_name = format!("test_{label}_{}", uuid::Uuid::new_v4().simple());
    cluster
        .create_database_from_template(db_name.as_str(), TEMPLATE_DB)
        .expect("database from template");
    let guard = CleanupGuard {
        cluster,
        db_name: db_name.clone(),
    };
    let url = cluster.connection().database_url(&db_name);
    // One connection keeps every test deterministic.
    let pool = connect(&url, 1).expect("pool built");
    let store = Arc::new(PostgresStore::new(pool));
    let clock = Arc::new(DefaultClock);
    let hooks = MutationHooks::new(chrono_tz::Europe::Kyiv);
    let services = Services {
        tasks: TaskService::new(Arc::clone(&store), Arc::clone(&clock), hooks),
        comments: CommentService::new(Arc::clone(&store), clock, hooks),
        notifications: NotificationService::new(Arc::clone(&store)),
        store,
    };
    (services, guard)
}

/// Stores an active worker that cannot sign in.
pub async fn seed_worker(store: &PostgresStore, username: &str) -> Worker {
    let worker = Worker::register(
        Username::new(username).expect("valid username"),
        WorkerProfile::new(&format!("{username}@example.com"), username, "Tester", None)
            .expect("valid profile"),
        PasswordHash::from_persisted("unusable"),
        &DefaultClock,
    );
    store.store(&worker).await.expect("worker stored");
    worker
}

/// Staff identity acting as `worker`.
pub const fn staff(worker: &Worker) -> Requester {
    Requester::new(worker.id(), true, false)
}

/// Plain identity acting as `worker`.
pub const fn member(worker: &Worker) -> Requester {
    Requester::new(worker.id(), false, false)
}
