//! Then steps for bulk delete BDD scenarios.

use super::world::{BulkDeleteWorld, parse_ids, run_async};
use rstest_bdd_macros::then;
use todo_service::todo::{
    domain::TodoId,
    schemas::DeleteResult,
    services::TodoServiceError,
};

fn deleted_ids(world: &BulkDeleteWorld) -> Result<&[TodoId], eyre::Report> {
    match world.last_delete_result.as_ref() {
        Some(Ok(deleted)) => Ok(deleted),
        Some(Err(err)) => Err(eyre::eyre!("delete failed unexpectedly: {err}")),
        None => Err(eyre::eyre!("missing delete result in scenario world")),
    }
}

#[then(r#"the deleted ids are "{ids}""#)]
fn deleted_ids_are(world: &BulkDeleteWorld, ids: String) -> Result<(), eyre::Report> {
    let expected = parse_ids(&ids)?;
    let actual = deleted_ids(world)?;
    if actual != expected.as_slice() {
        return Err(eyre::eyre!("expected deleted ids {expected:?}, got {actual:?}"));
    }
    Ok(())
}

#[then("the delete count is {count:usize}")]
fn delete_count_is(world: &BulkDeleteWorld, count: usize) -> Result<(), eyre::Report> {
    let result = DeleteResult::new(deleted_ids(world)?.to_vec());
    if result.count() != count {
        return Err(eyre::eyre!("expected count {count}, got {}", result.count()));
    }
    Ok(())
}

#[then("nothing is deleted")]
fn nothing_is_deleted(world: &BulkDeleteWorld) -> Result<(), eyre::Report> {
    let actual = deleted_ids(world)?;
    if !actual.is_empty() {
        return Err(eyre::eyre!("expected no deletions, got {actual:?}"));
    }
    Ok(())
}

#[then("no delete statement was executed")]
fn no_delete_statement(world: &BulkDeleteWorld) -> Result<(), eyre::Report> {
    let executed = world.store.bulk_deletes_executed();
    if executed != 0 {
        return Err(eyre::eyre!("expected no bulk delete, {executed} executed"));
    }
    Ok(())
}

#[then("the delete fails because the store is unavailable")]
fn delete_fails_unavailable(world: &BulkDeleteWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_delete_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing delete result"))?;
    if !matches!(result, Err(TodoServiceError::StoreUnavailable(_))) {
        return Err(eyre::eyre!("expected StoreUnavailable error, got {result:?}"));
    }
    Ok(())
}

#[then("{count:usize} todos remain")]
fn todos_remain(world: &BulkDeleteWorld, count: usize) -> Result<(), eyre::Report> {
    let listed = run_async(world.service.list())
        .map_err(|err| eyre::eyre!("list todos in scenario: {err}"))?;
    if listed.len() != count {
        return Err(eyre::eyre!("expected {count} todos, found {}", listed.len()));
    }
    if world.store.open_sessions() != 0 || world.store.abandoned_sessions() != 0 {
        return Err(eyre::eyre!("a session ended without commit or rollback"));
    }
    Ok(())
}
