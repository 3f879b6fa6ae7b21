use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(MessageStatus::Enum)
                    .values([MessageStatus::Pending, MessageStatus::Sent, MessageStatus::Failed])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Messages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string(Messages::PhoneNumber))
                    .col(text(Messages::Content))
                    .col(
                        ColumnDef::new(Messages::Status)
                            .enumeration(
                                MessageStatus::Enum,
                                [MessageStatus::Pending, MessageStatus::Sent, MessageStatus::Failed],
                            )
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(timestamp_with_time_zone_null(Messages::SentTime))
                    .col(string_null(Messages::ExternalId))
                    .col(integer(Messages::AttemptCount).default(0))
                    .to_owned(),
            )
            .await?;

        // Supports the claim query: WHERE status = 'PENDING' ORDER BY id ASC.
        manager
            .create_index(
                Index::create()
                    .name("idx_messages_status_id")
                    .table(Messages::Table)
                    .col(Messages::Status)
                    .col(Messages::Id)
                    .to_owned(),
            )
            .await?;

        // Supports the Read API's ascending sent_time pagination.
        manager
            .create_index(
                Index::create()
                    .name("idx_messages_sent_time")
                    .table(Messages::Table)
                    .col(Messages::SentTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(MessageStatus::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Messages {
    Table,
    Id,
    PhoneNumber,
    Content,
    Status,
    SentTime,
    ExternalId,
    AttemptCount,
}

#[derive(DeriveIden)]
enum MessageStatus {
    #[sea_orm(iden = "message_status")]
    Enum,
    #[sea_orm(iden = "PENDING")]
    Pending,
    #[sea_orm(iden = "SENT")]
    Sent,
    #[sea_orm(iden = "FAILED")]
    Failed,
}
