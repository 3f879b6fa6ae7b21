use crate::error::SendError;

/// Decides whether a failed `Send` should be retried on the next tick.
///
/// `None` (no error) is not recoverable by definition — there is nothing to retry.
/// An `UpstreamError` carries the recoverability flag fixed at construction time
/// (`status == 429 || 500..=511`), which makes a transport failure (status 0)
/// non-recoverable even though it looks transient. Any other error is treated
/// as recoverable so the relayer never silently gives up on an error shape it
/// doesn't recognize.
pub fn is_recoverable(err: Option<&SendError>) -> bool {
    match err {
        None => false,
        Some(SendError::Upstream(upstream)) => upstream.recoverable,
        Some(SendError::Other(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{UpstreamCause, UpstreamError};

    fn upstream(status: u16) -> SendError {
        SendError::Upstream(UpstreamError::wrap(
            UpstreamCause::UnexpectedStatus(status),
            Some(status),
        ))
    }

    #[test]
    fn none_is_not_recoverable() {
        assert!(!is_recoverable(None));
    }

    #[test]
    fn rate_limited_is_recoverable() {
        assert!(is_recoverable(Some(&upstream(429))));
    }

    #[test]
    fn server_error_range_is_recoverable() {
        for status in [500, 502, 511] {
            assert!(is_recoverable(Some(&upstream(status))), "status {status}");
        }
    }

    #[test]
    fn client_error_is_not_recoverable() {
        assert!(!is_recoverable(Some(&upstream(400))));
    }

    #[test]
    fn no_status_transport_error_is_not_recoverable() {
        // Status 0 (no status at all) falls outside the 429/500-511 window,
        // so a wrapped transport failure is classified non-recoverable even
        // though it reads as transient.
        let err = SendError::Upstream(UpstreamError::wrap(
            UpstreamCause::UnexpectedStatus(0),
            None,
        ));
        assert!(!is_recoverable(Some(&err)));
    }

    #[test]
    fn plain_error_is_recoverable() {
        assert!(is_recoverable(Some(&SendError::Other(
            "boom".to_string()
        ))));
    }
}
