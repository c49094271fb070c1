//! Deletion effects that cross bounded contexts.

use super::helpers::{Services, seed_worker, services, staff};
use rstest::rstest;
use teamboard::persistence::PageRequest;
use teamboard::organisation::domain::ProjectDraft;
use teamboard::task::domain::{NotificationFilter, TaskDraft, TaskFilter};
use teamboard::task::ports::{ActivityLogRepository, TaskRepository};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_project_keeps_its_tasks(services: Services) {
    let lead = seed_worker(&services.store, "lead").await;
    let project = services
        .projects
        .create(&staff(&lead), ProjectDraft::new("Apollo", "").expect("valid draft"))
        .await
        .expect("project created");
    let draft = TaskDraft::new("Launch", "")
        .expect("valid draft")
        .with_project(Some(project.id()));
    let task = services
        .tasks
        .create(&staff(&lead), draft)
        .await
        .expect("task created");

    services
        .projects
        .delete(&staff(&lead), project.id())
        .await
        .expect("project deleted");

    let kept = services.tasks.get(task.id()).await.expect("task kept");
    assert_eq!(kept.project(), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_tag_detaches_it_from_tasks(services: Services) {
    let lead = seed_worker(&services.store, "lead").await;
    let tag = services
        .catalog
        .create_tag(&staff(&lead), "backend")
        .await
        .expect("tag created");
    let draft = TaskDraft::new("Index rebuild", "")
        .expect("valid draft")
        .with_tags([tag.id()]);
    let task = services
        .tasks
        .create(&staff(&lead), draft)
        .await
        .expect("task created");

    services
        .catalog
        .delete_tag(&staff(&lead), tag.id())
        .await
        .expect("tag deleted");

    let kept = services.tasks.get(task.id()).await.expect("task kept");
    assert!(kept.tags().is_empty());
    let tagged = services
        .tasks
        .search(&TaskFilter {
            tag: Some(tag.id()),
            ..TaskFilter::default()
        })
        .await
        .expect("search runs");
    assert!(tagged.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_drops_comments_but_keeps_history(services: Services) {
    let lead = seed_worker(&services.store, "lead").await;
    let dev = seed_worker(&services.store, "dev").await;
    let draft = TaskDraft::new("Migrate", "")
        .expect("valid draft")
        .with_assignees([dev.id()]);
    let task = services
        .tasks
        .create(&staff(&lead), draft)
        .await
        .expect("task created");
    services
        .comments
        .add(&staff(&lead), task.id(), "Starting tomorrow")
        .await
        .expect("comment added");

    services
        .tasks
        .delete(&staff(&lead), task.id())
        .await
        .expect("task deleted");

    let comments = services
        .store
        .list_comments(task.id())
        .await
        .expect("comments listed");
    assert!(comments.is_empty());
    let recent = services.store.list_recent(10).await.expect("activity listed");
    assert_eq!(recent.len(), 3);
    assert!(recent.iter().all(|row| row.task().is_none()));
    let inbox = services
        .notifications
        .list(dev.id(), NotificationFilter::All, PageRequest::first(20))
        .await
        .expect("inbox listed");
    assert_eq!(inbox.total, 2);
    assert!(inbox.items.iter().all(|notification| notification.task().is_none()));
}
