//! Service orchestration tests for the worker directory.

use std::sync::Arc;

use crate::persistence::InMemoryStore;
use crate::worker::{
    domain::{Requester, WorkerProfile},
    ports::{WorkerQuery, WorkerRepository, WorkerRepositoryError},
    services::{DirectoryError, RegistrationRequest, WorkerDirectoryService},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestService = WorkerDirectoryService<InMemoryStore, DefaultClock>;

#[fixture]
fn store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::new())
}

fn service(store: &Arc<InMemoryStore>) -> TestService {
    WorkerDirectoryService::new(Arc::clone(store), Arc::new(DefaultClock))
}

fn request(username: &str, email: &str) -> RegistrationRequest {
    RegistrationRequest {
        username: username.to_owned(),
        email: email.to_owned(),
        first_name: "Olena".to_owned(),
        last_name: "Koval".to_owned(),
        position: None,
        password1: "Kyiv-2026-pass".to_owned(),
        password2: "Kyiv-2026-pass".to_owned(),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registered_worker_can_authenticate(store: Arc<InMemoryStore>) {
    let directory = service(&store);
    let worker = directory
        .register(request("olena", "olena@example.com"))
        .await
        .expect("registration succeeds");

    assert!(worker.is_active());
    assert!(!worker.is_staff());
    let signed_in = directory
        .authenticate("olena", "Kyiv-2026-pass")
        .await
        .expect("credentials match");
    assert_eq!(signed_in.id(), worker.id());
    assert!(matches!(
        directory.authenticate("olena", "wrong-password").await,
        Err(DirectoryError::InvalidCredentials)
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_email_is_rejected_case_insensitively(store: Arc<InMemoryStore>) {
    let directory = service(&store);
    directory
        .register(request("olena", "olena@example.com"))
        .await
        .expect("first registration succeeds");

    let result = directory
        .register(request("olena2", "OLENA@example.com"))
        .await;

    assert!(matches!(
        result,
        Err(DirectoryError::Repository(WorkerRepositoryError::DuplicateEmail(_)))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivated_worker_cannot_sign_in_but_is_kept(store: Arc<InMemoryStore>) {
    let directory = service(&store);
    let admin = directory
        .ensure_superuser("root", "root@example.com", "Admin-pass-1")
        .await
        .expect("superuser created");
    let worker = directory
        .register(request("taras", "taras@example.com"))
        .await
        .expect("registration succeeds");

    directory
        .set_active(&Requester::for_worker(&admin), worker.id(), false)
        .await
        .expect("superuser may deactivate");

    assert!(matches!(
        directory.authenticate("taras", "Kyiv-2026-pass").await,
        Err(DirectoryError::InvalidCredentials)
    ));
    let kept = store
        .find_by_id(worker.id())
        .await
        .expect("lookup succeeds")
        .expect("worker still stored");
    assert!(!kept.is_active());
    let active = store
        .list(&WorkerQuery::active())
        .await
        .expect("listing succeeds");
    assert!(active.iter().all(|other| other.id() != worker.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn worker_management_requires_superuser(store: Arc<InMemoryStore>) {
    let directory = service(&store);
    let worker = directory
        .register(request("ivan", "ivan@example.com"))
        .await
        .expect("registration succeeds");
    let requester = Requester::for_worker(&worker);
    let profile =
        WorkerProfile::new("ivan@example.com", "Ivan", "Franko", None).expect("valid profile");

    assert!(matches!(
        directory.update_worker(&requester, worker.id(), profile).await,
        Err(DirectoryError::AccessDenied(_))
    ));
    assert!(matches!(
        directory.create_position(&requester, "Developer").await,
        Err(DirectoryError::AccessDenied(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_position_clears_it_from_workers(store: Arc<InMemoryStore>) {
    let directory = service(&store);
    let admin = directory
        .ensure_superuser("root", "root@example.com", "Admin-pass-1")
        .await
        .expect("superuser created");
    let requester = Requester::for_worker(&admin);
    let position = directory
        .create_position(&requester, "QA Engineer")
        .await
        .expect("position created");
    let mut registration = request("mariia", "mariia@example.com");
    registration.position = Some(position.id());
    let worker = directory
        .register(registration)
        .await
        .expect("registration succeeds");

    assert!(matches!(
        directory.create_position(&requester, "QA Engineer").await,
        Err(DirectoryError::Repository(WorkerRepositoryError::DuplicatePosition(_)))
    ));
    directory
        .delete_position(&requester, position.id())
        .await
        .expect("delete succeeds");

    let reloaded = directory.get(worker.id()).await.expect("worker exists");
    assert_eq!(reloaded.position(), None);
}
