//! Side effects derived by the mutation hooks, without storage.

use std::collections::HashMap;

use crate::task::domain::{
    ActivityKind, Comment, CommentContent, NotificationKind, Priority, Task, TaskDraft,
    TaskWrite,
};
use crate::task::services::MutationHooks;
use crate::worker::domain::WorkerId;
use chrono::{TimeZone, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn hooks() -> MutationHooks {
    MutationHooks::new(chrono_tz::Europe::Kyiv)
}

fn task_with(creator: WorkerId, assignees: &[WorkerId]) -> Task {
    Task::create(
        TaskDraft::new("Deploy", "")
            .expect("draft")
            .with_assignees(assignees.iter().copied()),
        creator,
        &DefaultClock,
    )
    .expect("task")
}

#[rstest]
fn creation_notifies_every_assignee_once(hooks: MutationHooks) {
    let (a, b) = (WorkerId::new(), WorkerId::new());
    let task = task_with(WorkerId::new(), &[a, b]);

    let change_set = hooks.task_created(task.clone(), task.created_by(), Utc::now());

    assert_eq!(change_set.activity.len(), 1);
    assert_eq!(change_set.activity[0].kind(), ActivityKind::Created);
    assert_eq!(change_set.activity[0].description(), "Task \"Deploy\" created");
    let mut recipients: Vec<WorkerId> = change_set
        .notifications
        .iter()
        .map(|notification| notification.recipient())
        .collect();
    recipients.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(recipients, expected);
    assert!(change_set.notifications.iter().all(|notification| {
        notification.kind() == NotificationKind::TaskAssigned
            && notification.title() == "New Task"
            && notification.message() == "You have been assigned a task: Deploy"
    }));
    assert!(matches!(change_set.write, TaskWrite::InsertTask(_)));
}

#[rstest]
fn unchanged_task_produces_nothing(hooks: MutationHooks) {
    let task = task_with(WorkerId::new(), &[WorkerId::new()]);

    let outcome = hooks.task_updated(&task, task.clone(), None, &HashMap::new(), Utc::now());

    assert!(outcome.is_none());
}

#[rstest]
fn adding_an_assignee_notifies_only_the_newcomer(hooks: MutationHooks) {
    let existing = WorkerId::new();
    let newcomer = WorkerId::new();
    let before = task_with(WorkerId::new(), &[existing]);
    let after = before
        .revised(before.to_draft().with_assignees([existing, newcomer]), &DefaultClock)
        .expect("edited");
    let names = HashMap::from([(newcomer, "Petro Shevchenko".to_owned())]);

    let change_set = hooks
        .task_updated(&before, after, None, &names, Utc::now())
        .expect("changed");

    assert_eq!(change_set.activity.len(), 1);
    assert_eq!(change_set.activity[0].kind(), ActivityKind::Assigned);
    assert_eq!(
        change_set.activity[0].description(),
        "Petro Shevchenko assigned to task"
    );
    assert_eq!(change_set.notifications.len(), 1);
    assert_eq!(change_set.notifications[0].recipient(), newcomer);
    assert_eq!(change_set.notifications[0].kind(), NotificationKind::TaskAssigned);
}

#[rstest]
fn removing_an_assignee_logs_without_notifying(hooks: MutationHooks) {
    let kept = WorkerId::new();
    let dropped = WorkerId::new();
    let before = task_with(WorkerId::new(), &[kept, dropped]);
    let after = before
        .revised(before.to_draft().with_assignees([kept]), &DefaultClock)
        .expect("edited");

    let change_set = hooks
        .task_updated(&before, after, None, &HashMap::new(), Utc::now())
        .expect("changed");

    assert_eq!(change_set.activity[0].kind(), ActivityKind::Unassigned);
    assert!(change_set.notifications.is_empty());
}

#[rstest]
fn completion_notifies_current_assignees(hooks: MutationHooks) {
    let (a, b) = (WorkerId::new(), WorkerId::new());
    let before = task_with(WorkerId::new(), &[a, b]);
    let after = before.with_completion(true, &DefaultClock);

    let change_set = hooks
        .task_updated(&before, after, Some(a), &HashMap::new(), Utc::now())
        .expect("changed");

    assert_eq!(change_set.activity[0].kind(), ActivityKind::Completed);
    assert_eq!(change_set.activity[0].description(), "Task \"Deploy\" completed");
    assert_eq!(change_set.notifications.len(), 2);
    assert!(change_set.notifications.iter().all(|notification| {
        notification.kind() == NotificationKind::TaskCompleted
            && notification.message() == "Task \"Deploy\": marked as completed"
    }));
}

#[rstest]
fn deadline_changes_render_in_the_display_zone(hooks: MutationHooks) {
    let assignee = WorkerId::new();
    let before = task_with(WorkerId::new(), &[assignee]);
    let deadline = Utc.with_ymd_and_hms(2030, 1, 15, 10, 30, 0).single().expect("valid");
    let after = before
        .revised(
            before
                .to_draft()
                .with_deadline(Some(deadline))
                .with_priority(Priority::High),
            &DefaultClock,
        )
        .expect("edited");

    let change_set = hooks
        .task_updated(&before, after, None, &HashMap::new(), Utc::now())
        .expect("changed");

    assert_eq!(change_set.activity[0].kind(), ActivityKind::Updated);
    assert_eq!(change_set.notifications.len(), 1);
    let notice = &change_set.notifications[0];
    assert_eq!(notice.kind(), NotificationKind::TaskUpdated);
    assert_eq!(
        notice.message(),
        "Task \"Deploy\": deadline changed from none to 15.01.2030 12:30; \
         priority changed from Medium to High"
    );
}

#[rstest]
fn description_only_edit_logs_but_does_not_notify(hooks: MutationHooks) {
    let before = task_with(WorkerId::new(), &[WorkerId::new()]);
    let mut draft = before.to_draft();
    draft.description = "More detail".to_owned();
    let after = before.revised(draft, &DefaultClock).expect("edited");

    let change_set = hooks
        .task_updated(&before, after, None, &HashMap::new(), Utc::now())
        .expect("changed");

    assert_eq!(change_set.activity.len(), 1);
    assert_eq!(
        change_set.activity[0].description(),
        "Task \"Deploy\" updated: description changed"
    );
    assert!(change_set.notifications.is_empty());
}

#[rstest]
fn comment_skips_the_author_and_reaches_an_unassigned_creator(hooks: MutationHooks) {
    let creator = WorkerId::new();
    let (author, other) = (WorkerId::new(), WorkerId::new());
    let task = task_with(creator, &[author, other]);
    let comment = Comment::new(
        task.id(),
        author,
        CommentContent::new("Looks good").expect("content"),
        &DefaultClock,
    );

    let change_set = hooks.comment_added(&task, comment, "Anna Bondar", Utc::now());

    assert_eq!(change_set.activity[0].kind(), ActivityKind::Commented);
    assert_eq!(change_set.activity[0].description(), "Anna Bondar added a comment");
    let messages: Vec<(WorkerId, &str)> = change_set
        .notifications
        .iter()
        .map(|notification| (notification.recipient(), notification.message()))
        .collect();
    assert_eq!(messages.len(), 2);
    assert!(messages.contains(&(other, "Anna Bondar commented on task: Deploy")));
    assert!(messages.contains(&(creator, "Anna Bondar commented on your task: Deploy")));
}

#[rstest]
fn deletion_detaches_the_activity_row(hooks: MutationHooks) {
    let task = task_with(WorkerId::new(), &[WorkerId::new()]);

    let change_set = hooks.task_deleted(&task, task.created_by(), Utc::now());

    assert_eq!(change_set.activity[0].task(), None);
    assert_eq!(change_set.activity[0].kind(), ActivityKind::Deleted);
    assert!(change_set.notifications.is_empty());
}
