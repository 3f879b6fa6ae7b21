use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::model::SentMessageEvent;

/// Capacity of the bounded hand-off between the Relayer Job and the Cache Consumer.
pub const CACHE_CHANNEL_CAPACITY: usize = 10;

pub type CacheEventSender = mpsc::Sender<SentMessageEvent>;
pub type CacheEventReceiver = mpsc::Receiver<SentMessageEvent>;

pub fn cache_event_channel() -> (CacheEventSender, CacheEventReceiver) {
    mpsc::channel(CACHE_CHANNEL_CAPACITY)
}

/// Attempts a non-blocking enqueue; logs and drops the event if the channel is full
/// or the consumer has gone away. Never blocks the caller.
pub fn try_enqueue(sender: &CacheEventSender, event: SentMessageEvent) {
    match sender.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(event)) => {
            warn!(external_id = %event.external_id, "cache channel full, dropping sent event");
        }
        Err(mpsc::error::TrySendError::Closed(event)) => {
            warn!(external_id = %event.external_id, "cache channel closed, dropping sent event");
        }
    }
}

#[async_trait]
pub trait MessageCache: Send + Sync {
    async fn cache_message(
        &self,
        external_id: &str,
        sent_at: chrono::DateTime<chrono::Utc>,
    ) -> redis::RedisResult<()>;
}

/// Writes `message:{external_id} -> RFC3339(sent_at)` with a fixed TTL.
pub struct RedisMessageCache {
    conn: ConnectionManager,
    ttl: Duration,
}

impl RedisMessageCache {
    pub fn new(conn: ConnectionManager, ttl: Duration) -> Self {
        Self { conn, ttl }
    }
}

#[async_trait]
impl MessageCache for RedisMessageCache {
    async fn cache_message(
        &self,
        external_id: &str,
        sent_at: chrono::DateTime<chrono::Utc>,
    ) -> redis::RedisResult<()> {
        let key = format!("message:{external_id}");
        let value = sent_at.to_rfc3339();
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(&key)
            .arg(&value)
            .arg("EX")
            .arg(self.ttl.as_secs())
            .query_async::<()>(&mut conn)
            .await
    }
}

/// Drains the cache event channel until it is closed or `shutdown` fires.
///
/// Cache write failures are logged and do not stop the loop — the channel must
/// never back up behind a flaky cache.
pub async fn run_cache_consumer<C: MessageCache>(
    cache: C,
    mut events: CacheEventReceiver,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    debug!("cache consumer received shutdown signal, draining buffered events");
                    while let Ok(event) = events.try_recv() {
                        if let Err(e) = cache.cache_message(&event.external_id, event.sent_at).await {
                            error!(external_id = %event.external_id, error = %e, "failed to cache sent message during drain");
                        }
                    }
                    return;
                }
            }
            maybe_event = events.recv() => {
                match maybe_event {
                    Some(event) => {
                        if let Err(e) = cache.cache_message(&event.external_id, event.sent_at).await {
                            error!(external_id = %event.external_id, error = %e, "failed to cache sent message");
                        }
                    }
                    None => {
                        debug!("cache event channel closed, cache consumer exiting");
                        return;
                    }
                }
            }
        }
    }
}
