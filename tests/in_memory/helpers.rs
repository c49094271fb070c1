//! Shared wiring for the in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use teamboard::organisation::services::{CatalogService, ProjectService};
use teamboard::persistence::InMemoryStore;
use teamboard::task::services::{CommentService, MutationHooks, NotificationService, TaskService};
use teamboard::worker::{
    domain::{PasswordHash, Requester, Username, Worker, WorkerProfile},
    ports::WorkerRepository,
};

/// Every service over one store.
pub struct Services {
    pub store: Arc<InMemoryStore>,
    pub projects: ProjectService<InMemoryStore, DefaultClock>,
    pub catalog: CatalogService<InMemoryStore>,
    pub tasks: TaskService<InMemoryStore, DefaultClock>,
    pub comments: CommentService<InMemoryStore, DefaultClock>,
    pub notifications: NotificationService<InMemoryStore>,
}

#[fixture]
pub fn services() -> Services {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(DefaultClock);
    let hooks = MutationHooks::new(chrono_tz::Europe::Kyiv);
    Services {
        projects: ProjectService::new(Arc::clone(&store), Arc::clone(&clock)),
        catalog: CatalogService::new(Arc::clone(&store)),
        tasks: TaskService::new(Arc::clone(&store), Arc::clone(&clock), hooks),
        comments: CommentService::new(Arc::clone(&store), clock, hooks),
        notifications: NotificationService::new(Arc::clone(&store)),
        store,
    }
}

/// Stores an active worker that cannot sign in.
pub async fn seed_worker(store: &InMemoryStore, username: &str) -> Worker {
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
