//! When steps for board transition BDD scenarios.

use rstest_bdd_macros::when;

use super::world::{BoardWorld, run_async, status, task_id};

#[when(r#"task "{task}" is moved to "{target}""#)]
fn move_task(world: &mut BoardWorld, task: String, target: String) -> Result<(), eyre::Report> {
    let start = world
        .engine()?
        .begin_transition(&task_id(&task), status(&target)?)?;
    world.in_flight = start.into_handle();
    Ok(())
}

#[when("the transition settles")]
fn transition_settles(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    let handle = world
        .in_flight
        .take()
        .ok_or_else(|| eyre::eyre!("no transition in flight"))?;
    world.outcome = Some(run_async(handle.settled()));
    Ok(())
}
