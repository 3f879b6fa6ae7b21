use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::entity::{self, Entity as MessageEntity};
use crate::error::{MessageError, MessageResult};
use crate::model::{Message, MessageStatus, SentMessagesResponse};

pub const DEFAULT_LIMIT: u64 = 42;
pub const MAX_LIMIT: u64 = 50;

/// Validates a raw `limit` query parameter against the Read API's bounds.
pub fn parse_limit(raw: Option<&str>) -> MessageResult<u64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_LIMIT);
    };
    let limit: u64 = raw
        .parse()
        .map_err(|_| MessageError::InvalidLimit(raw.to_string()))?;
    if limit == 0 || limit > MAX_LIMIT {
        return Err(MessageError::InvalidLimit(raw.to_string()));
    }
    Ok(limit)
}

/// Validates a raw `after` query parameter as RFC3339, if present.
pub fn parse_after(raw: Option<&str>) -> MessageResult<Option<DateTime<Utc>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|_| MessageError::InvalidCursor(raw.to_string()))
}

/// `next_cursor` is present iff the page is exactly full, never on a short page.
pub fn synthesize_next_cursor(messages: &[Message], limit: u64) -> Option<DateTime<Utc>> {
    if messages.len() as u64 == limit {
        messages.last().and_then(|m| m.sent_time)
    } else {
        None
    }
}

pub struct QueryService {
    db: DatabaseConnection,
}

impl QueryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_sent_messages(
        &self,
        after: Option<DateTime<Utc>>,
        limit: u64,
    ) -> MessageResult<SentMessagesResponse> {
        let mut query = MessageEntity::find()
            .filter(entity::Column::Status.eq(MessageStatus::Sent))
            .order_by(entity::Column::SentTime, Order::Asc);

        if let Some(after) = after {
            query = query.filter(entity::Column::SentTime.gt(after));
        }

        let rows = query
            .paginate(&self.db, limit)
            .fetch_page(0)
            .await
            .map_err(MessageError::from)?;

        let messages: Vec<Message> = rows.into_iter().map(Into::into).collect();
        let next_cursor = synthesize_next_cursor(&messages, limit);

        Ok(SentMessagesResponse {
            messages,
            next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(sent_time: DateTime<Utc>) -> Message {
        Message {
            id: 1,
            phone_number: "+1".to_string(),
            content: "hi".to_string(),
            status: MessageStatus::Sent,
            sent_time: Some(sent_time),
            external_id: Some("ext-1".to_string()),
            attempt_count: 0,
        }
    }

    #[test]
    fn full_page_synthesizes_cursor() {
        let now = Utc::now();
        let messages = vec![message(now)];
        assert_eq!(synthesize_next_cursor(&messages, 1), Some(now));
    }

    #[test]
    fn short_page_omits_cursor() {
        let now = Utc::now();
        let messages = vec![message(now)];
        assert_eq!(synthesize_next_cursor(&messages, 2), None);
    }

    #[test]
    fn empty_page_omits_cursor() {
        assert_eq!(synthesize_next_cursor(&[], 42), None);
    }

    #[test]
    fn limit_defaults_when_absent() {
        assert_eq!(parse_limit(None).unwrap(), DEFAULT_LIMIT);
    }

    #[test]
    fn limit_rejects_zero_and_over_max() {
        assert!(parse_limit(Some("0")).is_err());
        assert!(parse_limit(Some("51")).is_err());
        assert!(parse_limit(Some("not-a-number")).is_err());
    }

    #[test]
    fn limit_accepts_boundary() {
        assert_eq!(parse_limit(Some("50")).unwrap(), 50);
        assert_eq!(parse_limit(Some("1")).unwrap(), 1);
    }

    #[test]
    fn after_parses_rfc3339() {
        let parsed = parse_after(Some("2026-01-01T00:00:00Z")).unwrap();
        assert!(parsed.is_some());
    }

    #[test]
    fn after_rejects_garbage() {
        assert!(parse_after(Some("not-a-date")).is_err());
    }

    #[test]
    fn after_absent_is_none() {
        assert_eq!(parse_after(None).unwrap(), None);
    }
}
