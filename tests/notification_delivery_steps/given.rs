//! Given steps for notification delivery BDD scenarios.

use super::world::NotificationWorld;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"workers "{usernames}""#)]
fn workers(world: &mut NotificationWorld, usernames: String) -> Result<(), eyre::Report> {
    for username in usernames.split(',').map(str::trim) {
        world
            .add_worker(username)
            .wrap_err_with(|| format!("seed worker {username}"))?;
    }
    Ok(())
}

#[given(r#""{creator}" created the task "{name}" assigned to "{assignees}""#)]
fn task_exists(
    world: &mut NotificationWorld,
    creator: String,
    name: String,
    assignees: String,
) -> Result<(), eyre::Report> {
    world
        .create_task(&creator, &name, &assignees)
        .wrap_err("create task in scenario setup")
}
