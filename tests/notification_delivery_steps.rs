//! Behaviour tests for notification delivery and inbox ownership.

#[path = "notification_delivery_steps/mod.rs"]
mod notification_delivery_steps_defs;

use notification_delivery_steps_defs::world::{NotificationWorld, world};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/notification_delivery.feature",
    name = "Assignees hear about a new task"
)]
#[tokio::test(flavor = "multi_thread")]
async fn assignees_hear_about_new_task(world: NotificationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/notification_delivery.feature",
    name = "Completing a task tells its assignees"
)]
#[tokio::test(flavor = "multi_thread")]
async fn completion_tells_assignees(world: NotificationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/notification_delivery.feature",
    name = "Comments reach assignees and the creator but not the author"
)]
#[tokio::test(flavor = "multi_thread")]
async fn comments_skip_their_author(world: NotificationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/notification_delivery.feature",
    name = "Marking everything read empties the badge"
)]
#[tokio::test(flavor = "multi_thread")]
async fn mark_all_read_empties_badge(world: NotificationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/notification_delivery.feature",
    name = "Workers cannot read each other's notifications"
)]
#[tokio::test(flavor = "multi_thread")]
async fn foreign_notifications_stay_unread(world: NotificationWorld) {
    let _ = world;
}
