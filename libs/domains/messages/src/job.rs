use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cache::{try_enqueue, CacheEventSender};
use crate::classifier::is_recoverable;
use crate::error::{MessageResult, SendError, UpstreamCause, UpstreamError};
use crate::model::{Message, SendResponse, SentMessageEvent};
use crate::repository::{ClaimHandle, MessageRepository};
use crate::sender::UpstreamSender;

/// Decides, from `attempt_count` alone, whether a claimed row should still be
/// sent or is past its retry budget.
pub fn should_send(attempt_count: i32, max_attempts: i32) -> bool {
    attempt_count < max_attempts
}

/// What a claimed row's mutation should be, given the result of a `Send` call.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Sent {
        external_id: String,
        sent_time: DateTime<Utc>,
    },
    Failed,
    IncrementAttempt,
}

/// Maps a `Send` result to the row mutation it implies. `now` is the time to
/// stamp a successful send with; it is the caller's responsibility to capture
/// it once per call, not derive it from inside this function.
pub fn decide_outcome(result: &Result<SendResponse, SendError>, now: DateTime<Utc>) -> Outcome {
    match result {
        Ok(response) if response.is_accepted() => Outcome::Sent {
            external_id: response.message_id.clone(),
            sent_time: now,
        },
        Ok(_) => Outcome::Failed,
        Err(err) if is_recoverable(Some(err)) => Outcome::IncrementAttempt,
        Err(_) => Outcome::Failed,
    }
}

pub struct RelayerJob<R, S> {
    repository: R,
    sender: S,
    cache_events: CacheEventSender,
    batch_size: u64,
    max_attempts: i32,
    send_timeout: Duration,
}

impl<R, S> RelayerJob<R, S>
where
    R: MessageRepository,
    S: UpstreamSender,
{
    pub fn new(
        repository: R,
        sender: S,
        cache_events: CacheEventSender,
        batch_size: u64,
        max_attempts: i32,
        send_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            sender,
            cache_events,
            batch_size,
            max_attempts,
            send_timeout,
        }
    }

    /// Runs one tick: claim, dispatch, record outcomes, commit. `ctx` is the
    /// scheduler's cancellation token; it is threaded into every `Send` call
    /// so a `Stop` aborts in-flight upstream requests instead of only
    /// waiting out the rest of the batch.
    pub async fn run(&self, ctx: CancellationToken) -> MessageResult<()> {
        let (messages, handle) = self.repository.claim_batch(self.batch_size).await?;

        if messages.is_empty() {
            self.repository.rollback(handle).await?;
            return Ok(());
        }

        self.dispatch_batch(&messages, &handle, &ctx).await;

        self.repository.commit(handle).await
    }

    async fn dispatch_batch(&self, messages: &[Message], handle: &ClaimHandle, ctx: &CancellationToken) {
        for message in messages {
            if let Err(e) = self.dispatch_one(message, handle, ctx).await {
                error!(message_id = message.id, error = %e, "mutation failed for claimed row");
            }
        }
    }

    async fn dispatch_one(
        &self,
        message: &Message,
        handle: &ClaimHandle,
        ctx: &CancellationToken,
    ) -> MessageResult<()> {
        if !should_send(message.attempt_count, self.max_attempts) {
            return self.repository.mark_failed(handle, message.id).await;
        }

        let result = tokio::time::timeout(self.send_timeout, self.sender.send(message, ctx.clone()))
            .await
            .unwrap_or_else(|_| {
                Err(UpstreamError::wrap(UpstreamCause::UnexpectedStatus(0), None).into())
            });

        let now = Utc::now();
        match decide_outcome(&result, now) {
            Outcome::Sent {
                external_id,
                sent_time,
            } => {
                self.repository
                    .mark_sent(handle, message.id, &external_id, sent_time)
                    .await?;
                try_enqueue(
                    &self.cache_events,
                    SentMessageEvent {
                        external_id,
                        sent_at: sent_time,
                    },
                );
                Ok(())
            }
            Outcome::Failed => {
                if let Err(e) = &result {
                    warn!(message_id = message.id, error = %e, "message send failed, marking failed");
                }
                self.repository.mark_failed(handle, message.id).await
            }
            Outcome::IncrementAttempt => {
                info!(message_id = message.id, "recoverable send failure, incrementing attempt");
                self.repository.increment_attempt(handle, message.id).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(id: &str) -> Result<SendResponse, SendError> {
        Ok(SendResponse {
            message_id: id.to_string(),
            message: "Accepted".to_string(),
        })
    }

    fn rejected() -> Result<SendResponse, SendError> {
        Ok(SendResponse {
            message_id: "ignored".to_string(),
            message: "Rejected".to_string(),
        })
    }

    #[test]
    fn ceiling_not_reached_allows_send() {
        assert!(should_send(2, 3));
    }

    #[test]
    fn ceiling_reached_blocks_send() {
        assert!(!should_send(3, 3));
        assert!(!should_send(4, 3));
    }

    #[test]
    fn accepted_response_marks_sent() {
        let now = Utc::now();
        let outcome = decide_outcome(&accepted("ext-1"), now);
        assert_eq!(
            outcome,
            Outcome::Sent {
                external_id: "ext-1".to_string(),
                sent_time: now,
            }
        );
    }

    #[test]
    fn accepted_is_case_insensitive() {
        let now = Utc::now();
        let response = Ok(SendResponse {
            message_id: "ext-2".to_string(),
            message: "ACCEPTED".to_string(),
        });
        assert_eq!(
            decide_outcome(&response, now),
            Outcome::Sent {
                external_id: "ext-2".to_string(),
                sent_time: now,
            }
        );
    }

    #[test]
    fn non_accepted_response_marks_failed() {
        assert_eq!(decide_outcome(&rejected(), Utc::now()), Outcome::Failed);
    }

    #[test]
    fn recoverable_error_increments_attempt() {
        let err = Err(SendError::Other("timeout".to_string()));
        assert_eq!(decide_outcome(&err, Utc::now()), Outcome::IncrementAttempt);
    }

    #[test]
    fn non_recoverable_error_marks_failed() {
        use crate::error::{UpstreamCause, UpstreamError};
        let err = Err(SendError::Upstream(UpstreamError::wrap(
            UpstreamCause::UnexpectedStatus(400),
            Some(400),
        )));
        assert_eq!(decide_outcome(&err, Utc::now()), Outcome::Failed);
    }
}
