use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::{SendError, UpstreamCause, UpstreamError};
use crate::model::{Message, SendResponse};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamSender: Send + Sync {
    /// `ctx` is observed for the duration of the call: if it is cancelled
    /// before the upstream responds, the in-flight request is abandoned and
    /// a no-status upstream error is returned, same as a transport failure.
    async fn send(&self, message: &Message, ctx: CancellationToken) -> Result<SendResponse, SendError>;
}

#[derive(Serialize)]
struct WebhookRequest<'a> {
    to: &'a str,
    content: &'a str,
}

/// Delivers one message to the configured webhook gateway.
pub struct HttpUpstreamSender {
    client: reqwest::Client,
    url: String,
    auth_key: String,
    timeout: Duration,
}

impl HttpUpstreamSender {
    pub fn new(url: impl Into<String>, auth_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            auth_key: auth_key.into(),
            timeout,
        }
    }
}

#[async_trait]
impl UpstreamSender for HttpUpstreamSender {
    async fn send(&self, message: &Message, ctx: CancellationToken) -> Result<SendResponse, SendError> {
        let body = WebhookRequest {
            to: &message.phone_number,
            content: &message.content,
        };

        let mut request = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json");

        if !self.auth_key.is_empty() {
            request = request.header("api-key", &self.auth_key);
        }

        let response = tokio::select! {
            biased;
            () = ctx.cancelled() => {
                return Err(UpstreamError::wrap(UpstreamCause::Cancelled, None).into());
            }
            result = request.json(&body).send() => {
                result.map_err(|e| UpstreamError::wrap(UpstreamCause::Transport(e), None))?
            }
        };

        let status = response.status();
        if status != reqwest::StatusCode::ACCEPTED {
            return Err(UpstreamError::wrap(
                UpstreamCause::UnexpectedStatus(status.as_u16()),
                Some(status.as_u16()),
            )
            .into());
        }

        tokio::select! {
            biased;
            () = ctx.cancelled() => {
                Err(UpstreamError::wrap(UpstreamCause::Cancelled, None).into())
            }
            result = response.json::<SendResponse>() => {
                result.map_err(|e| UpstreamError::wrap(UpstreamCause::Decode(e), Some(status.as_u16())).into())
            }
        }
    }
}
