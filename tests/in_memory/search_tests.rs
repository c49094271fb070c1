//! Task search combining criteria owned by different contexts.

use super::helpers::{Services, seed_worker, services, staff};
use rstest::rstest;
use teamboard::task::domain::{CompletionStatus, Priority, TaskDraft, TaskFilter};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_set_criterion_must_hold(services: Services) {
    let lead = seed_worker(&services.store, "lead").await;
    let dev = seed_worker(&services.store, "dev").await;
    let tag = services
        .catalog
        .create_tag(&staff(&lead), "ops")
        .await
        .expect("tag created");
    let matching = services
        .tasks
        .create(
            &staff(&lead),
            TaskDraft::new("Rotate certificates", "before Friday")
                .expect("valid draft")
                .with_priority(Priority::Urgent)
                .with_tags([tag.id()])
                .with_assignees([dev.id()]),
        )
        .await
        .expect("task created");
    services
        .tasks
        .create(
            &staff(&lead),
            TaskDraft::new("Rotate keys", "")
                .expect("valid draft")
                .with_priority(Priority::Urgent)
                .with_assignees([dev.id()]),
        )
        .await
        .expect("task created");
    services
        .tasks
        .create(
            &staff(&lead),
            TaskDraft::new("Rotate logs", "")
                .expect("valid draft")
                .with_tags([tag.id()]),
        )
        .await
        .expect("task created");

    let found = services
        .tasks
        .search(&TaskFilter {
            search: Some("ROTATE".to_owned()),
            status: Some(CompletionStatus::Incomplete),
            priority: Some(Priority::Urgent),
            tag: Some(tag.id()),
            assignee: Some(dev.id()),
            ..TaskFilter::default()
        })
        .await
        .expect("search runs");

    let ids: Vec<_> = found.iter().map(|task| task.id()).collect();
    assert_eq!(ids, vec![matching.id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_tasks_leave_the_incomplete_view(services: Services) {
    let lead = seed_worker(&services.store, "lead").await;
    let task = services
        .tasks
        .create(&staff(&lead), TaskDraft::new("Ship", "").expect("valid draft"))
        .await
        .expect("task created");
    services
        .tasks
        .toggle_completion(&staff(&lead), task.id())
        .await
        .expect("task completed");

    let open = services
        .tasks
        .search(&TaskFilter {
            status: Some(CompletionStatus::Incomplete),
            ..TaskFilter::default()
        })
        .await
        .expect("search runs");
    let done = services
        .tasks
        .search(&TaskFilter {
            status: Some(CompletionStatus::Completed),
            ..TaskFilter::default()
        })
        .await
        .expect("search runs");

    assert!(open.is_empty());
    assert_eq!(done.len(), 1);
}
