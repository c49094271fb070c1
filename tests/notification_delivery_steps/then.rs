//! Then steps for notification delivery BDD scenarios.

use super::world::{INBOX_PAGE, NotificationWorld, run_async};
use eyre::WrapErr;
use teamboard::persistence::PageRequest;
use rstest_bdd_macros::then;
use teamboard::task::{domain::NotificationFilter, services::TaskError};

#[then(r#""{worker}" has {count:usize} unread notifications"#)]
fn unread_count(world: &NotificationWorld, worker: String, count: usize) -> Result<(), eyre::Report> {
    let id = world.worker(&worker)?.id();
    let unread = run_async(world.notifications.unread_count(id)).wrap_err("count unread")?;
    if unread != count {
        return Err(eyre::eyre!("{worker} has {unread} unread notifications, expected {count}"));
    }
    Ok(())
}

#[then(r#""{worker}" has {count:usize} "{kind}" notifications"#)]
fn kind_count(
    world: &NotificationWorld,
    worker: String,
    count: usize,
    kind: String,
) -> Result<(), eyre::Report> {
    let id = world.worker(&worker)?.id();
    let inbox = run_async(world.notifications.list(
        id,
        NotificationFilter::All,
        PageRequest::first(INBOX_PAGE),
    ))
        .wrap_err("list notifications")?;
    let matching = inbox
        .items
        .iter()
        .filter(|notification| notification.kind().as_str() == kind)
        .count();
    if matching != count {
        return Err(eyre::eyre!("{worker} has {matching} {kind} notifications, expected {count}"));
    }
    Ok(())
}

#[then("the attempt is refused as not found")]
fn refused(world: &NotificationWorld) -> Result<(), eyre::Report> {
    match world.last_error {
        Some(TaskError::NotificationNotFound(_)) => Ok(()),
        ref other => Err(eyre::eyre!("expected NotificationNotFound, got {other:?}")),
    }
}
