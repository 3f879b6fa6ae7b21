use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One row of the outbox table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub phone_number: String,
    pub content: String,
    pub status: MessageStatus,
    pub sent_time: Option<DateTime<Utc>>,
    pub external_id: Option<String>,
    pub attempt_count: i32,
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "message_status")]
pub enum MessageStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "SENT")]
    Sent,
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

/// Outcome of a successful `Send` call, as reported by the gateway.
#[derive(Clone, Debug, Deserialize)]
pub struct SendResponse {
    #[serde(rename = "messageId")]
    pub message_id: String,
    pub message: String,
}

impl SendResponse {
    pub fn is_accepted(&self) -> bool {
        self.message.eq_ignore_ascii_case("accepted")
    }
}

/// A sent-event handed off to the cache consumer.
#[derive(Clone, Debug, PartialEq)]
pub struct SentMessageEvent {
    pub external_id: String,
    pub sent_at: DateTime<Utc>,
}

/// Response envelope for the Read API.
#[derive(Clone, Debug, Serialize)]
pub struct SentMessagesResponse {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<DateTime<Utc>>,
}
