//! Service-level create, list and delete tests against `PostgreSQL`.

use super::helpers::{BoxError, prepared_store};
use chrono::Utc;
use todo_service::todo::{
    domain::{TodoId, TodoIdSelection, TodoText},
    schemas::DeleteResult,
};

fn selection(raw: &[i64]) -> Result<TodoIdSelection, BoxError> {
    Ok(TodoIdSelection::new(raw.iter().copied().map(TodoId::new))?)
}

#[tokio::test(flavor = "multi_thread")]
async fn create_assigns_id_and_timestamp() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store()? else {
        return Ok(());
    };
    let service = prepared.service();
    let before = Utc::now() - chrono::TimeDelta::seconds(1);

    let view = service.create(TodoText::new("pay rent")?).await?;

    assert!(view.id.value() > 0);
    assert_eq!(view.text, "pay rent");
    assert!(!view.done);
    assert!(view.created_at >= before);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn list_returns_newest_id_first() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store()? else {
        return Ok(());
    };
    let service = prepared.service();
    let mut created = Vec::new();
    for label in ["first", "second", "third"] {
        created.push(service.create(TodoText::new(label)?).await?.id);
    }

    let listed: Vec<TodoId> = service.list().await?.into_iter().map(|view| view.id).collect();

    created.reverse();
    assert_eq!(listed, created);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_returns_only_existing_deduplicated_ids() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store()? else {
        return Ok(());
    };
    let service = prepared.service();
    let kept = service.create(TodoText::new("keep")?).await?.id;
    let target = service.create(TodoText::new("remove")?).await?.id;

    let deleted = service
        .delete(&selection(&[target.value(), target.value(), 999_999])?)
        .await?;
    let result = DeleteResult::from(deleted);

    assert_eq!(result.deleted(), &[target]);
    assert_eq!(result.count(), 1);
    let remaining: Vec<TodoId> = service.list().await?.into_iter().map(|view| view.id).collect();
    assert_eq!(remaining, vec![kept]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_of_missing_ids_changes_nothing() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store()? else {
        return Ok(());
    };
    let service = prepared.service();
    service.create(TodoText::new("stays")?).await?;

    let deleted = service.delete(&selection(&[404, 405])?).await?;

    assert!(deleted.is_empty());
    assert_eq!(service.list().await?.len(), 1);
    Ok(())
}
