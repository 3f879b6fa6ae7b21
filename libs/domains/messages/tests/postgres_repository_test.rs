//! Integration tests for the Postgres message repository.
//!
//! These use real PostgreSQL via testcontainers to exercise the claim/commit
//! transaction sequencing and the multi-instance disjointness property that
//! unit tests against a fake cannot cover.

use chrono::Utc;
use domain_messages::{MessageRepository, PgMessageRepository};
use sea_orm::{ConnectionTrait, Statement};
use test_utils::TestDatabase;

async fn insert_pending(db: &sea_orm::DatabaseConnection, phone: &str, content: &str) -> i64 {
    let stmt = Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "INSERT INTO messages (phone_number, content) VALUES ($1, $2) RETURNING id",
        [phone.into(), content.into()],
    );

    #[derive(sea_orm::FromQueryResult)]
    struct Row {
        id: i64,
    }

    Row::find_by_statement(stmt)
        .one(db)
        .await
        .expect("insert failed")
        .expect("no row returned")
        .id
}

#[tokio::test]
async fn claim_batch_returns_empty_when_no_pending_rows() {
    let db = TestDatabase::new().await;
    let repo = PgMessageRepository::new(db.connection());

    let (messages, handle) = repo.claim_batch(10).await.unwrap();
    assert!(messages.is_empty());
    repo.rollback(handle).await.unwrap();
}

#[tokio::test]
async fn claim_batch_claims_up_to_limit_in_id_order() {
    let db = TestDatabase::new().await;
    let conn = db.connection();
    let repo = PgMessageRepository::new(conn.clone());

    for i in 0..5 {
        insert_pending(&conn, "+15550000000", &format!("msg-{i}")).await;
    }

    let (messages, handle) = repo.claim_batch(3).await.unwrap();
    assert_eq!(messages.len(), 3);
    assert!(messages.windows(2).all(|w| w[0].id < w[1].id));
    repo.commit(handle).await.unwrap();
}

#[tokio::test]
async fn mark_sent_updates_status_and_external_id_on_commit() {
    let db = TestDatabase::new().await;
    let conn = db.connection();
    let repo = PgMessageRepository::new(conn.clone());

    insert_pending(&conn, "+15550000000", "hello").await;

    let (messages, handle) = repo.claim_batch(10).await.unwrap();
    let message = &messages[0];
    let sent_time = Utc::now();

    repo.mark_sent(&handle, message.id, "ext-123", sent_time)
        .await
        .unwrap();
    repo.commit(handle).await.unwrap();

    let (remaining, handle) = repo.claim_batch(10).await.unwrap();
    assert!(remaining.is_empty(), "sent row must not be re-claimable");
    repo.rollback(handle).await.unwrap();
}

#[tokio::test]
async fn rollback_leaves_rows_claimable_again() {
    let db = TestDatabase::new().await;
    let conn = db.connection();
    let repo = PgMessageRepository::new(conn.clone());

    insert_pending(&conn, "+15550000000", "hello").await;

    let (messages, handle) = repo.claim_batch(10).await.unwrap();
    assert_eq!(messages.len(), 1);
    repo.rollback(handle).await.unwrap();

    let (messages_again, handle) = repo.claim_batch(10).await.unwrap();
    assert_eq!(messages_again.len(), 1, "rolled-back claim must be retryable");
    repo.commit(handle).await.unwrap();
}

/// Two concurrent claimants against an overlapping pool of pending rows must
/// never both receive the same row — `SELECT ... FOR UPDATE SKIP LOCKED`
/// under `REPEATABLE READ` partitions the batch between them.
#[tokio::test]
async fn concurrent_claims_never_overlap() {
    let db = TestDatabase::new().await;
    let conn = db.connection();

    for i in 0..20 {
        insert_pending(&conn, "+15550000000", &format!("msg-{i}")).await;
    }

    let repo_a = PgMessageRepository::new(conn.clone());
    let repo_b = PgMessageRepository::new(conn.clone());

    let (a, b) = tokio::join!(
        tokio::spawn(async move { repo_a.claim_batch(10).await }),
        tokio::spawn(async move { repo_b.claim_batch(10).await }),
    );

    let (messages_a, handle_a) = a.unwrap().unwrap();
    let (messages_b, handle_b) = b.unwrap().unwrap();

    let ids_a: std::collections::HashSet<_> = messages_a.iter().map(|m| m.id).collect();
    let ids_b: std::collections::HashSet<_> = messages_b.iter().map(|m| m.id).collect();
    assert!(
        ids_a.is_disjoint(&ids_b),
        "concurrent claims must not select the same row: {ids_a:?} / {ids_b:?}"
    );

    let repo = PgMessageRepository::new(conn);
    repo.commit(handle_a).await.unwrap();
    repo.commit(handle_b).await.unwrap();
}
