//! Messages Domain
//!
//! Implements the transactional outbox relayer: a claim-batch / dispatch /
//! record-outcome loop over a `messages` table, a delivery cache consumer,
//! and the read-side pagination used by the Read API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐
//! │ RelayerJob  │──▶│ UpstreamSender│
//! └──────┬──────┘   └──────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← claim/mark (transactional)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Entity    │
//! └─────────────┘
//! ```

pub mod cache;
pub mod classifier;
pub mod entity;
pub mod error;
pub mod job;
pub mod model;
pub mod postgres;
pub mod query;
pub mod repository;
pub mod sender;

pub use cache::{cache_event_channel, run_cache_consumer, CacheEventReceiver, CacheEventSender, MessageCache, RedisMessageCache};
pub use error::{MessageError, MessageResult, SendError, UpstreamCause, UpstreamError};
pub use job::{decide_outcome, should_send, Outcome, RelayerJob};
pub use model::{Message, MessageStatus, SendResponse, SentMessageEvent, SentMessagesResponse};
pub use postgres::PgMessageRepository;
pub use query::QueryService;
pub use repository::{ClaimHandle, MessageRepository};
pub use sender::{HttpUpstreamSender, UpstreamSender};
