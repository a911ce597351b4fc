use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign keys: entries outlive the posts and accounts they mention.
        manager
            .create_table(
                Table::create()
                    .table(ActivityLog::Table)
                    .if_not_exists()
                    .col(pk_uuid(ActivityLog::Id))
                    .col(string(ActivityLog::Description))
                    .col(uuid(ActivityLog::SubjectId))
                    .col(uuid_null(ActivityLog::CauserId))
                    .col(string_len_null(ActivityLog::CauserKind, 16))
                    .col(string_null(ActivityLog::CauserName))
                    .col(json(ActivityLog::Properties))
                    .col(timestamp_with_time_zone(ActivityLog::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_created_at")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ActivityLog {
    #[sea_orm(iden = "activity_log")]
    Table,
    Id,
    Description,
    SubjectId,
    CauserId,
    CauserKind,
    CauserName,
    Properties,
    CreatedAt,
}
