//! Given steps for bulk delete BDD scenarios.

use super::world::{BulkDeleteWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use todo_service::todo::{adapters::memory::StoreOperation, domain::TodoText};

#[given("a todo list with {count:usize} todos")]
fn todo_list_with(world: &mut BulkDeleteWorld, count: usize) -> Result<(), eyre::Report> {
    for index in 0..count {
        let text = TodoText::new(format!("scenario todo {index}"))
            .wrap_err("build scenario todo text")?;
        run_async(world.service.create(text)).wrap_err("seed scenario todo")?;
    }
    Ok(())
}

#[given("the store fails during the bulk delete")]
fn store_fails_during_bulk_delete(world: &mut BulkDeleteWorld) {
    world.store.fail_next(StoreOperation::BulkDelete);
}
