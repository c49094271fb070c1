//! Badge counts and the polling snapshot.

use super::helpers::{member, seed_worker, setup, staff, test_runtime};
use chrono::{Duration, Utc};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use teamboard::task::{
    domain::{Notification, NotificationKind, Task, TaskChangeSet, TaskDraft, TaskWrite},
    ports::TaskRepository,
    services::POLL_PREVIEW_LIMIT,
};

#[rstest]
fn polls_count_every_unread_row_but_preview_the_newest(
    shared_test_cluster: &'static TestCluster,
) {
    let (services, _guard) = setup(shared_test_cluster, "notification_poll");
    let rt = test_runtime();
    let lead = rt.block_on(seed_worker(&services.store, "lead"));
    let dev = rt.block_on(seed_worker(&services.store, "dev"));
    let task = Task::create(
        TaskDraft::new("Backlog grooming", "").expect("valid draft"),
        lead.id(),
        &DefaultClock,
    )
    .expect("task");
    let now = Utc::now();
    let mut notifications: Vec<Notification> = (0..7)
        .map(|age| {
            Notification::unread(
                dev.id(),
                NotificationKind::TaskUpdated,
                format!("Notice {age}"),
                "Backlog grooming changed",
                Some(task.id()),
                now - Duration::minutes(age),
            )
        })
        .collect();
    notifications.push(Notification::unread(
        lead.id(),
        NotificationKind::TaskUpdated,
        "Someone else's",
        "not for dev",
        Some(task.id()),
        now,
    ));
    let newest = notifications[0].id();
    rt.block_on(services.store.apply(TaskChangeSet {
        write: TaskWrite::InsertTask(task),
        activity: Vec::new(),
        notifications,
    }))
    .expect("change set applied");

    assert_eq!(
        rt.block_on(services.notifications.unread_count(dev.id()))
            .expect("count"),
        7
    );

    let changed = rt
        .block_on(services.notifications.mark_read(newest, &member(&dev)))
        .expect("marked read");
    assert!(changed);

    let snapshot = rt
        .block_on(services.notifications.poll(dev.id()))
        .expect("poll");
    assert_eq!(snapshot.unread_count, 6);
    assert_eq!(snapshot.latest.len(), POLL_PREVIEW_LIMIT);
    let titles: Vec<&str> = snapshot.latest.iter().map(Notification::title).collect();
    assert_eq!(
        titles,
        ["Notice 1", "Notice 2", "Notice 3", "Notice 4", "Notice 5"]
    );
}

#[rstest]
fn marking_everything_read_clears_the_badge(shared_test_cluster: &'static TestCluster) {
    let (services, _guard) = setup(shared_test_cluster, "notification_clear");
    let rt = test_runtime();
    let lead = rt.block_on(seed_worker(&services.store, "lead"));
    let dev = rt.block_on(seed_worker(&services.store, "dev"));
    for name in ["Triage", "Deploy"] {
        rt.block_on(services.tasks.create(
            &staff(&lead),
            TaskDraft::new(name, "")
                .expect("valid draft")
                .with_assignees([dev.id()]),
        ))
        .expect("task created");
    }

    let cleared = rt
        .block_on(services.notifications.mark_all_read(dev.id()))
        .expect("marked read");

    assert_eq!(cleared, 2);
    let snapshot = rt
        .block_on(services.notifications.poll(dev.id()))
        .expect("poll");
    assert_eq!(snapshot.unread_count, 0);
    assert!(snapshot.latest.is_empty());
}
