//! When steps for notification delivery BDD scenarios.

use super::world::{INBOX_PAGE, NotificationWorld, run_async};
use eyre::WrapErr;
use teamboard::persistence::PageRequest;
use rstest_bdd_macros::when;
use teamboard::task::domain::NotificationFilter;

#[when(r#""{creator}" creates the task "{name}" assigned to "{assignees}""#)]
fn create_task(
    world: &mut NotificationWorld,
    creator: String,
    name: String,
    assignees: String,
) -> Result<(), eyre::Report> {
    world
        .create_task(&creator, &name, &assignees)
        .wrap_err("create task")
}

#[when(r#""{actor}" toggles completion of the task"#)]
fn toggle_task(world: &mut NotificationWorld, actor: String) -> Result<(), eyre::Report> {
    let requester = world.requester(&actor)?;
    let id = world.task()?.id();
    let task = run_async(world.tasks.toggle_completion(&requester, id)).wrap_err("toggle task")?;
    world.last_task = Some(task);
    Ok(())
}

#[when(r#""{author}" comments "{content}" on the task"#)]
fn comment_on_task(
    world: &mut NotificationWorld,
    author: String,
    content: String,
) -> Result<(), eyre::Report> {
    let requester = world.requester(&author)?;
    let id = world.task()?.id();
    run_async(world.comments.add(&requester, id, &content)).wrap_err("add comment")?;
    Ok(())
}

#[when(r#""{worker}" marks all notifications as read"#)]
fn mark_all_read(world: &mut NotificationWorld, worker: String) -> Result<(), eyre::Report> {
    let id = world.worker(&worker)?.id();
    run_async(world.notifications.mark_all_read(id)).wrap_err("mark all read")?;
    Ok(())
}

#[when(r#""{intruder}" marks the newest notification of "{owner}" as read"#)]
fn mark_foreign_read(
    world: &mut NotificationWorld,
    intruder: String,
    owner: String,
) -> Result<(), eyre::Report> {
    let requester = world.requester(&intruder)?;
    let owner_id = world.worker(&owner)?.id();
    let inbox = run_async(world.notifications.list(
        owner_id,
        NotificationFilter::All,
        PageRequest::first(INBOX_PAGE),
    ))
        .wrap_err("list owner notifications")?;
    let newest = inbox
        .items
        .first()
        .ok_or_else(|| eyre::eyre!("{owner} has no notifications"))?;
    world.last_error = run_async(world.notifications.mark_read(newest.id(), &requester)).err();
    Ok(())
}
