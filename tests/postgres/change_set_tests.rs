//! Change sets commit as one transaction.

use super::helpers::{seed_worker, setup, staff, test_runtime};
use chrono::Utc;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use teamboard::task::{
    domain::{
        ActivityKind, ActivityLog, Notification, NotificationKind, Task, TaskChangeSet, TaskDraft,
        TaskWrite,
    },
    ports::{ActivityLogRepository, TaskRepository, TaskRepositoryError},
};
use teamboard::worker::domain::WorkerId;

#[rstest]
fn rejected_change_sets_leave_no_rows(shared_test_cluster: &'static TestCluster) {
    let (services, _guard) = setup(shared_test_cluster, "rejected_change_set");
    let rt = test_runtime();
    let owner = rt.block_on(seed_worker(&services.store, "owner"));
    let task = Task::create(
        TaskDraft::new("Orphan notice", "").expect("valid draft"),
        owner.id(),
        &DefaultClock,
    )
    .expect("task");
    let ghost = WorkerId::new();
    let now = Utc::now();
    let change_set = TaskChangeSet {
        write: TaskWrite::InsertTask(task.clone()),
        activity: vec![ActivityLog::record(
            Some(task.id()),
            Some(owner.id()),
            ActivityKind::Created,
            "Task \"Orphan notice\" created",
            now,
        )],
        notifications: vec![Notification::unread(
            ghost,
            NotificationKind::TaskAssigned,
            "New Task",
            "nobody",
            Some(task.id()),
            now,
        )],
    };

    let result = rt.block_on(services.store.apply(change_set));

    assert!(matches!(result, Err(TaskRepositoryError::UnknownWorker(id)) if id == ghost));
    let stored = rt
        .block_on(services.store.find_task(task.id()))
        .expect("lookup");
    assert!(stored.is_none());
    let recent = rt
        .block_on(services.store.list_recent(10))
        .expect("activity listed");
    assert!(recent.is_empty());
}

#[rstest]
fn accepted_change_sets_write_every_row(shared_test_cluster: &'static TestCluster) {
    let (services, _guard) = setup(shared_test_cluster, "accepted_change_set");
    let rt = test_runtime();
    let owner = rt.block_on(seed_worker(&services.store, "owner"));
    let dev = rt.block_on(seed_worker(&services.store, "dev"));
    let draft = TaskDraft::new("Ship release", "")
        .expect("valid draft")
        .with_assignees([dev.id()]);

    let task = rt
        .block_on(services.tasks.create(&staff(&owner), draft))
        .expect("task created");

    let stored = rt
        .block_on(services.store.find_task(task.id()))
        .expect("lookup")
        .expect("task stored");
    assert_eq!(stored.assignees(), task.assignees());
    let recent = rt
        .block_on(services.store.list_recent(10))
        .expect("activity listed");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].task(), Some(task.id()));
    let unread = rt
        .block_on(services.notifications.unread_count(dev.id()))
        .expect("count");
    assert_eq!(unread, 1);
}
