//! Service orchestration tests for projects, teams and catalogues.

use std::sync::Arc;

use crate::organisation::{
    domain::{ProjectDraft, TagId, TeamDraft},
    ports::OrganisationRepositoryError,
    services::{CatalogService, OrganisationError, ProjectService, TeamService},
};
use crate::persistence::InMemoryStore;
use crate::test_support::{seed_worker, staff};
use crate::worker::domain::{Requester, WorkerId};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::new())
}

fn projects(store: &Arc<InMemoryStore>) -> ProjectService<InMemoryStore, DefaultClock> {
    ProjectService::new(Arc::clone(store), Arc::new(DefaultClock))
}

fn teams(store: &Arc<InMemoryStore>) -> TeamService<InMemoryStore, DefaultClock> {
    TeamService::new(Arc::clone(store), Arc::new(DefaultClock))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn any_worker_edits_projects_but_only_staff_delete(store: Arc<InMemoryStore>) {
    let worker = seed_worker(&store, "olena").await;
    let requester = Requester::for_worker(&worker);
    let service = projects(&store);
    let project = service
        .create(&requester, ProjectDraft::new("Apollo", "").expect("valid"))
        .await
        .expect("project created");

    let renamed = service
        .update(&requester, project.id(), ProjectDraft::new("Apollo 2", "moon").expect("valid"))
        .await
        .expect("project updated");
    assert_eq!(renamed.name().as_str(), "Apollo 2");

    assert!(matches!(
        service.delete(&requester, project.id()).await,
        Err(OrganisationError::AccessDenied(_))
    ));
    service
        .delete(&staff(&worker), project.id())
        .await
        .expect("staff may delete");
    assert!(matches!(
        service.get(project.id()).await,
        Err(OrganisationError::ProjectNotFound(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_project_detaches_its_teams(store: Arc<InMemoryStore>) {
    let worker = seed_worker(&store, "taras").await;
    let requester = Requester::for_worker(&worker);
    let project = projects(&store)
        .create(&requester, ProjectDraft::new("Atlas", "").expect("valid"))
        .await
        .expect("project created");
    let team = teams(&store)
        .create(
            &requester,
            TeamDraft::new("Core", Some(project.id()), []).expect("valid"),
        )
        .await
        .expect("team created");

    projects(&store)
        .delete(&staff(&worker), project.id())
        .await
        .expect("project deleted");

    let reloaded = teams(&store).get(team.id()).await.expect("team kept");
    assert_eq!(reloaded.project(), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_team_attachment_moves_and_detaches(store: Arc<InMemoryStore>) {
    let worker = seed_worker(&store, "iryna").await;
    let requester = Requester::for_worker(&worker);
    let service = projects(&store);
    let first = service
        .create(&requester, ProjectDraft::new("First", "").expect("valid"))
        .await
        .expect("created");
    let second = service
        .create(&requester, ProjectDraft::new("Second", "").expect("valid"))
        .await
        .expect("created");
    let team = teams(&store)
        .create(&requester, TeamDraft::new("Ops", None, []).expect("valid"))
        .await
        .expect("team created");

    service
        .add_team(&requester, first.id(), team.id())
        .await
        .expect("attached");
    service
        .add_team(&requester, second.id(), team.id())
        .await
        .expect("moved");
    assert!(service.teams(first.id()).await.expect("listed").is_empty());
    assert_eq!(service.teams(second.id()).await.expect("listed").len(), 1);

    let untouched = service
        .remove_team(&requester, first.id(), team.id())
        .await
        .expect("no-op");
    assert_eq!(untouched.project(), Some(second.id()));
    let detached = service
        .remove_team(&requester, second.id(), team.id())
        .await
        .expect("detached");
    assert_eq!(detached.project(), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outsiders_cannot_change_team_membership(store: Arc<InMemoryStore>) {
    let owner = seed_worker(&store, "owner").await;
    let outsider = seed_worker(&store, "outsider").await;
    let newcomer = seed_worker(&store, "newcomer").await;
    let service = teams(&store);
    let team = service
        .create(&Requester::for_worker(&owner), TeamDraft::new("Design", None, []).expect("valid"))
        .await
        .expect("team created");

    assert!(matches!(
        service
            .add_member(&Requester::for_worker(&outsider), team.id(), newcomer.id())
            .await,
        Err(OrganisationError::AccessDenied(_))
    ));

    let updated = service
        .add_member(&Requester::for_worker(&owner), team.id(), newcomer.id())
        .await
        .expect("owner adds member");
    assert!(updated.has_member(newcomer.id()));

    let mine = service.member_teams(newcomer.id()).await.expect("listed");
    assert_eq!(mine.len(), 1);

    // A member may now manage the team too.
    service
        .remove_member(&Requester::for_worker(&newcomer), team.id(), newcomer.id())
        .await
        .expect("member leaves");
    assert!(service.member_teams(newcomer.id()).await.expect("listed").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_members_are_rejected(store: Arc<InMemoryStore>) {
    let owner = seed_worker(&store, "owner").await;
    let ghost = WorkerId::new();

    let result = teams(&store)
        .create(&Requester::for_worker(&owner), TeamDraft::new("Ghosts", None, [ghost]).expect("valid"))
        .await;

    assert!(matches!(
        result,
        Err(OrganisationError::Repository(OrganisationRepositoryError::UnknownWorker(id))) if id == ghost
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn catalogue_rules_follow_privileges(store: Arc<InMemoryStore>) {
    let worker = seed_worker(&store, "mykola").await;
    let requester = Requester::for_worker(&worker);
    let catalog = CatalogService::new(Arc::clone(&store));

    let tag = catalog.create_tag(&requester, "backend").await.expect("tag created");
    assert!(matches!(
        catalog.create_tag(&requester, " backend ").await,
        Err(OrganisationError::Repository(OrganisationRepositoryError::DuplicateTag(_)))
    ));
    assert!(matches!(
        catalog.delete_tag(&requester, tag.id()).await,
        Err(OrganisationError::AccessDenied(_))
    ));
    assert!(matches!(
        catalog.create_task_type(&requester, "Bug").await,
        Err(OrganisationError::AccessDenied(_))
    ));

    let bug = catalog
        .create_task_type(&staff(&worker), "Bug")
        .await
        .expect("staff creates task type");
    catalog
        .delete_task_type(&staff(&worker), bug.id())
        .await
        .expect("staff deletes task type");
    assert!(catalog.list_task_types().await.expect("listed").is_empty());
    assert!(matches!(
        catalog.get_tag(TagId::new()).await,
        Err(OrganisationError::TagNotFound(_))
    ));
}
