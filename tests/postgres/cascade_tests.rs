//! Foreign-key effects of deleting a task.

use super::helpers::{seed_worker, setup, staff, test_runtime};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use teamboard::persistence::PageRequest;
use teamboard::task::domain::{NotificationFilter, TaskDraft};
use teamboard::task::ports::{ActivityLogRepository, TaskRepository};

#[rstest]
fn deleting_a_task_drops_comments_but_keeps_history(shared_test_cluster: &'static TestCluster) {
    let (services, _guard) = setup(shared_test_cluster, "task_cascade");
    let rt = test_runtime();
    let lead = rt.block_on(seed_worker(&services.store, "lead"));
    let dev = rt.block_on(seed_worker(&services.store, "dev"));
    let draft = TaskDraft::new("Migrate", "")
        .expect("valid draft")
        .with_assignees([dev.id()]);
    let task = rt
        .block_on(services.tasks.create(&staff(&lead), draft))
        .expect("task created");
    rt.block_on(services.comments.add(&staff(&lead), task.id(), "Starting tomorrow"))
        .expect("comment added");

    rt.block_on(services.tasks.delete(&staff(&lead), task.id()))
        .expect("task deleted");

    assert!(
        rt.block_on(services.store.find_task(task.id()))
            .expect("lookup")
            .is_none()
    );
    let comments = rt
        .block_on(services.store.list_comments(task.id()))
        .expect("comments listed");
    assert!(comments.is_empty());
    let recent = rt
        .block_on(services.store.list_recent(10))
        .expect("activity listed");
    assert_eq!(recent.len(), 3);
    assert!(recent.iter().all(|row| row.task().is_none()));
    let inbox = rt
        .block_on(
            services
                .notifications
                .list(dev.id(), NotificationFilter::All, PageRequest::first(20)),
        )
        .expect("inbox listed");
    assert_eq!(inbox.total, 2);
    assert!(inbox.items.iter().all(|notification| notification.task().is_none()));
}
