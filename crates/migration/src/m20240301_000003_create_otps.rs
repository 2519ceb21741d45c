//! Create `otps` table holding verification and password-reset codes.
//!
//! Rows are never deleted; a code is spent by flipping `is_used`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Otps::Table)
                    .if_not_exists()
                    .col(uuid(Otps::Id).primary_key())
                    .col(string_len(Otps::Email, 255))
                    .col(string_len(Otps::Code, 16))
                    .col(string_len(Otps::Kind, 32))
                    .col(string_len(Otps::Role, 16))
                    .col(boolean(Otps::IsUsed).default(false))
                    .col(timestamp_with_time_zone(Otps::ExpiresAt))
                    .col(timestamp_with_time_zone(Otps::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Otps::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Otps {
    Table,
    Id,
    Email,
    Code,
    #[sea_orm(iden = "type")]
    Kind,
    Role,
    IsUsed,
    ExpiresAt,
    CreatedAt,
}
