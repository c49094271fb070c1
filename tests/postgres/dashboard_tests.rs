//! Dashboard figures computed by SQL aggregates.

use std::sync::Arc;

use super::helpers::{seed_worker, setup, staff, test_runtime};
use chrono::{Duration, Utc};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use teamboard::task::{
    domain::{PersistedTaskData, Priority, Task, TaskChangeSet, TaskDraft, TaskId, TaskWrite},
    ports::TaskRepository,
    services::DashboardService,
};

#[rstest]
fn dashboard_counts_overdue_and_upcoming_work(shared_test_cluster: &'static TestCluster) {
    let (services, _guard) = setup(shared_test_cluster, "dashboard_stats");
    let rt = test_runtime();
    let viewer = rt.block_on(seed_worker(&services.store, "viewer"));
    let now = Utc::now();
    let overdue = Task::from_persisted(PersistedTaskData {
        id: TaskId::new(),
        draft: TaskDraft::new("Late", "")
            .expect("valid draft")
            .with_assignees([viewer.id()])
            .with_deadline(Some(now - Duration::days(2))),
        is_completed: false,
        created_by: Some(viewer.id()),
        created_at: now - Duration::days(10),
        updated_at: now - Duration::days(10),
    });
    rt.block_on(
        services
            .store
            .apply(TaskChangeSet::bare(TaskWrite::InsertTask(overdue))),
    )
    .expect("overdue task stored");
    rt.block_on(services.tasks.create(
        &staff(&viewer),
        TaskDraft::new("Soon", "")
            .expect("valid draft")
            .with_priority(Priority::Urgent)
            .with_deadline(Some(now + Duration::days(3))),
    ))
    .expect("task created");
    rt.block_on(services.tasks.create(
        &staff(&viewer),
        TaskDraft::new("Far off", "")
            .expect("valid draft")
            .with_deadline(Some(now + Duration::days(30))),
    ))
    .expect("task created");
    let done = rt
        .block_on(services.tasks.create(
            &staff(&viewer),
            TaskDraft::new("Done", "")
                .expect("valid draft")
                .with_assignees([viewer.id()]),
        ))
        .expect("task created");
    rt.block_on(services.tasks.toggle_completion(&staff(&viewer), done.id()))
        .expect("completed");

    let stats = rt
        .block_on(
            DashboardService::new(Arc::clone(&services.store), Arc::new(DefaultClock))
                .stats(viewer.id()),
        )
        .expect("stats");

    assert_eq!(stats.total, 4);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.incomplete, 3);
    assert_eq!(stats.overdue, 1);
    assert_eq!(stats.my_open, 1);
    assert_eq!(stats.my_completed, 1);
    assert_eq!(stats.upcoming.len(), 1);
    assert_eq!(stats.upcoming[0].name().as_str(), "Soon");
    assert_eq!(
        stats.open_by_priority,
        vec![(Priority::Urgent, 1), (Priority::Medium, 2)]
    );
}
