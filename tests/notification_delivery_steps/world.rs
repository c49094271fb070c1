//! Shared world state for notification delivery BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use teamboard::persistence::InMemoryStore;
use teamboard::task::{
    domain::{Task, TaskDraft},
    services::{CommentService, MutationHooks, NotificationService, TaskError, TaskService},
};
use teamboard::worker::{
    domain::{PasswordHash, Requester, Username, Worker, WorkerProfile},
    ports::WorkerRepository,
};

/// Inbox rows a step inspects; scenarios stay well below it.
pub const INBOX_PAGE: usize = 50;

/// Scenario world for notification behaviour tests.
pub struct NotificationWorld {
    pub store: Arc<InMemoryStore>,
    pub tasks: TaskService<InMemoryStore, DefaultClock>,
    pub comments: CommentService<InMemoryStore, DefaultClock>,
    pub notifications: NotificationService<InMemoryStore>,
    pub workers: HashMap<String, Worker>,
    pub last_task: Option<Task>,
    pub last_error: Option<TaskError>,
}

impl NotificationWorld {
    /// Creates a world over an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(DefaultClock);
        let hooks = MutationHooks::new(chrono_tz::Europe::Kyiv);
        Self {
            tasks: TaskService::new(Arc::clone(&store), Arc::clone(&clock), hooks),
            comments: CommentService::new(Arc::clone(&store), clock, hooks),
            notifications: NotificationService::new(Arc::clone(&store)),
            store,
            workers: HashMap::new(),
            last_task: None,
            last_error: None,
        }
    }

    /// Stores an active worker called `username`.
    pub fn add_worker(&mut self, username: &str) -> Result<(), eyre::Report> {
        let worker = Worker::register(
            Username::new(username)?,
            WorkerProfile::new(&format!("{username}@example.com"), username, "Tester", None)?,
            PasswordHash::from_persisted("unusable"),
            &DefaultClock,
        );
        run_async(self.store.store(&worker))?;
        self.workers.insert(username.to_owned(), worker);
        Ok(())
    }

    /// Looks up a seeded worker.
    pub fn worker(&self, username: &str) -> Result<&Worker, eyre::Report> {
        self.workers
            .get(username)
            .ok_or_else(|| eyre::eyre!("unknown worker {username} in scenario"))
    }

    /// Requester acting as a seeded worker.
    pub fn requester(&self, username: &str) -> Result<Requester, eyre::Report> {
        self.worker(username).map(Requester::for_worker)
    }

    /// The task created earlier in the scenario.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.last_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Creates a task owned by `creator` with a comma-separated assignee list.
    pub fn create_task(&mut self, creator: &str, name: &str, assignees: &str) -> Result<(), eyre::Report> {
        let requester = self.requester(creator)?;
        let mut ids = Vec::new();
        for username in assignees.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            ids.push(self.worker(username)?.id());
        }
        let draft = TaskDraft::new(name, "")?.with_assignees(ids);
        let task = run_async(self.tasks.create(&requester, draft))?;
        self.last_task = Some(task);
        Ok(())
    }
}

impl Default for NotificationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> NotificationWorld {
    NotificationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
