use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("database error: {0}")]
    Database(String),

    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}

pub type MessageResult<T> = Result<T, MessageError>;

impl From<sea_orm::DbErr> for MessageError {
    fn from(err: sea_orm::DbErr) -> Self {
        MessageError::Database(err.to_string())
    }
}

/// Error returned by the Upstream Sender.
///
/// `status_code` is `None` for transport failures (connection refused, timeout,
/// cancellation) and `Some(code)` for any non-202 HTTP response or a body-decode
/// failure on a 202.
#[derive(Debug, Error)]
#[error("upstream error{}: {source}", status_code.map(|c| format!(" (status {c})")).unwrap_or_default())]
pub struct UpstreamError {
    #[source]
    pub source: UpstreamCause,
    pub status_code: Option<u16>,
    pub recoverable: bool,
}

#[derive(Debug, Error)]
pub enum UpstreamCause {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("failed to decode response body: {0}")]
    Decode(reqwest::Error),
    #[error("send cancelled")]
    Cancelled,
}

impl UpstreamError {
    /// Applies the classifier's status-code rule: 429 or 500..=511 is recoverable.
    pub fn wrap(source: UpstreamCause, status_code: Option<u16>) -> Self {
        let recoverable = status_code.is_some_and(is_status_recoverable);
        Self {
            source,
            status_code,
            recoverable,
        }
    }
}

fn is_status_recoverable(code: u16) -> bool {
    code == 429 || (500..=511).contains(&code)
}

/// Error surface for a single `Send` call: either a classified upstream error
/// or some other (non-upstream) failure, which the classifier treats as
/// conservatively recoverable.
#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("send failed: {0}")]
    Other(String),
}
