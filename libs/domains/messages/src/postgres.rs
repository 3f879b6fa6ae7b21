use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, IsolationLevel, Statement,
    TransactionTrait,
};

use crate::error::{MessageError, MessageResult};
use crate::model::{Message, MessageStatus};
use crate::repository::{ClaimHandle, MessageRepository};

pub struct PgMessageRepository {
    db: DatabaseConnection,
}

impl PgMessageRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct ClaimedRow {
    id: i64,
    phone_number: String,
    content: String,
    attempt_count: i32,
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn claim_batch(&self, n: u64) -> MessageResult<(Vec<Message>, ClaimHandle)> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::RepeatableRead), None)
            .await
            .map_err(MessageError::from)?;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT id, phone_number, content, attempt_count
            FROM messages
            WHERE status = 'PENDING'
            ORDER BY id ASC
            LIMIT $1
            FOR UPDATE SKIP LOCKED
            "#,
            [(n as i64).into()],
        );

        let rows = match ClaimedRow::find_by_statement(stmt).all(&txn).await {
            Ok(rows) => rows,
            Err(e) => {
                // Transaction is consumed by the failed claim; nothing left to roll back explicitly,
                // it is dropped here and the pool reclaims the connection.
                return Err(MessageError::from(e));
            }
        };

        let messages = rows
            .into_iter()
            .map(|row| Message {
                id: row.id,
                phone_number: row.phone_number,
                content: row.content,
                status: MessageStatus::Pending,
                sent_time: None,
                external_id: None,
                attempt_count: row.attempt_count,
            })
            .collect();

        Ok((messages, ClaimHandle(txn)))
    }

    async fn mark_sent(
        &self,
        handle: &ClaimHandle,
        id: i64,
        external_id: &str,
        sent_time: DateTime<Utc>,
    ) -> MessageResult<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE messages SET status = 'SENT', external_id = $2, sent_time = $3 WHERE id = $1",
            [id.into(), external_id.into(), sent_time.into()],
        );
        handle.0.execute(stmt).await.map_err(MessageError::from)?;
        Ok(())
    }

    async fn mark_failed(&self, handle: &ClaimHandle, id: i64) -> MessageResult<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE messages SET status = 'FAILED' WHERE id = $1",
            [id.into()],
        );
        handle.0.execute(stmt).await.map_err(MessageError::from)?;
        Ok(())
    }

    async fn increment_attempt(&self, handle: &ClaimHandle, id: i64) -> MessageResult<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE messages SET attempt_count = attempt_count + 1 WHERE id = $1",
            [id.into()],
        );
        handle.0.execute(stmt).await.map_err(MessageError::from)?;
        Ok(())
    }

    async fn commit(&self, handle: ClaimHandle) -> MessageResult<()> {
        handle.0.commit().await.map_err(MessageError::from)
    }

    async fn rollback(&self, handle: ClaimHandle) -> MessageResult<()> {
        handle.0.rollback().await.map_err(MessageError::from)
    }
}
