//! Session isolation and rollback tests against `PostgreSQL`.

use super::helpers::{BoxError, prepared_store};
use todo_service::todo::{
    domain::TodoText,
    ports::{TodoSession, TodoStore, TodoStoreError, TransactionState},
};

#[tokio::test(flavor = "multi_thread")]
async fn staged_insert_is_invisible_until_commit() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store()? else {
        return Ok(());
    };
    let mut writer = prepared.store.begin().await?;
    let id = writer.insert(&TodoText::new("pending")?).await?;

    let mut reader = prepared.store.begin().await?;
    assert!(reader.get(id).await?.is_none());
    reader.rollback().await?;

    writer.commit().await?;
    let mut after = prepared.store.begin().await?;
    let fetched = after.get(id).await?;
    after.rollback().await?;

    assert_eq!(fetched.map(|todo| todo.id()), Some(id));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn rolled_back_delete_leaves_records_in_place() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store()? else {
        return Ok(());
    };
    let service = prepared.service();
    let id = service.create(TodoText::new("survivor")?).await?.id;

    let mut session = prepared.store.begin().await?;
    assert_eq!(session.existing_ids(&[id]).await?, vec![id]);
    assert_eq!(session.delete_ids(&[id]).await?, vec![id]);
    session.rollback().await?;

    assert_eq!(session.state(), TransactionState::RolledBack);
    assert_eq!(service.list().await?.len(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn competing_delete_reports_nothing_once_the_row_is_gone() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store()? else {
        return Ok(());
    };
    let id = prepared.service().create(TodoText::new("contested")?).await?.id;

    let mut first = prepared.store.begin().await?;
    let mut second = prepared.store.begin().await?;
    assert_eq!(first.delete_ids(&[id]).await?, vec![id]);

    // The second DELETE waits on the first transaction's row lock.
    let pending = tokio::spawn(async move {
        let removed = second.delete_ids(&[id]).await;
        (second, removed)
    });
    first.commit().await?;
    let (mut second, removed) = pending.await?;
    second.commit().await?;

    assert!(removed?.is_empty());
    assert!(prepared.service().list().await?.is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn dropped_session_never_commits() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store()? else {
        return Ok(());
    };
    {
        let mut abandoned = prepared.store.begin().await?;
        abandoned.insert(&TodoText::new("abandoned")?).await?;
    }

    assert!(prepared.service().list().await?.is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn finished_session_rejects_further_calls() -> Result<(), BoxError> {
    let Some(prepared) = prepared_store()? else {
        return Ok(());
    };
    let mut session = prepared.store.begin().await?;
    session.commit().await?;

    let result = session.scan_desc().await;

    assert!(matches!(
        result,
        Err(TodoStoreError::SessionFinished(TransactionState::Committed))
    ));
    Ok(())
}
