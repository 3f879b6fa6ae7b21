use sea_orm::entity::prelude::*;

use crate::model::{Message, MessageStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize, serde::Deserialize)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub phone_number: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub status: MessageStatus,
    pub sent_time: Option<DateTimeWithTimeZone>,
    pub external_id: Option<String>,
    pub attempt_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Message {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            phone_number: model.phone_number,
            content: model.content,
            status: model.status,
            sent_time: model.sent_time.map(Into::into),
            external_id: model.external_id,
            attempt_count: model.attempt_count,
        }
    }
}
