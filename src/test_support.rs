//! Fixtures shared by the unit tests of every context.

use crate::persistence::InMemoryStore;
use crate::worker::domain::{PasswordHash, Requester, Username, Worker, WorkerProfile};
use crate::worker::ports::WorkerRepository;
use mockable::DefaultClock;

/// Stores an active worker with an unusable password hash.
pub(crate) async fn seed_worker(store: &InMemoryStore, username: &str) -> Worker {
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

/// Returns a requester with staff rights acting as `worker`.
pub(crate) const fn staff(worker: &Worker) -> Requester {
    Requester::new(worker.id(), true, false)
}
