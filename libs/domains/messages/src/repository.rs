use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseTransaction;

use crate::error::MessageResult;
use crate::model::Message;

/// Opaque handle over one open claim transaction. Mutation methods borrow it;
/// `commit`/`rollback` consume it, so the type system forbids reusing a
/// transaction that has already been finalized.
pub struct ClaimHandle(pub(crate) DatabaseTransaction);

// Not mocked with `mockall`: `ClaimHandle` owns a live `DatabaseTransaction` and
// deliberately has no `Clone`/`Debug`/`PartialEq`, which the generated mock
// expectations would need. The Relayer Job's per-message branching is unit
// tested against a hand-written in-memory fake (see `job.rs` tests); the
// claim/commit SQL itself is covered by a `testcontainers`-backed integration
// test.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Opens a `REPEATABLE READ` transaction and selects up to `n` `PENDING`
    /// rows ordered by `id`, skipping rows locked by other claimants.
    async fn claim_batch(&self, n: u64) -> MessageResult<(Vec<Message>, ClaimHandle)>;

    async fn mark_sent(
        &self,
        handle: &ClaimHandle,
        id: i64,
        external_id: &str,
        sent_time: DateTime<Utc>,
    ) -> MessageResult<()>;

    async fn mark_failed(&self, handle: &ClaimHandle, id: i64) -> MessageResult<()>;

    async fn increment_attempt(&self, handle: &ClaimHandle, id: i64) -> MessageResult<()>;

    async fn commit(&self, handle: ClaimHandle) -> MessageResult<()>;

    async fn rollback(&self, handle: ClaimHandle) -> MessageResult<()>;
}
