//! Create `users` table.
//!
//! Drivers registered for parking access; `status` is moved to `approved`
//! by an administrator outside this service.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(uuid(Users::Id).primary_key())
                    .col(string_len(Users::Name, 128))
                    .col(string_len(Users::Email, 255).unique_key())
                    .col(string_len(Users::Password, 255))
                    .col(string_len(Users::PlateNumber, 32))
                    .col(time(Users::PreferredEntryTime))
                    .col(time(Users::PreferredExitTime))
                    .col(string_len(Users::Status, 32).default("pending"))
                    .col(boolean(Users::IsEmailVerified).default(false))
                    .col(string_len(Users::Role, 16).default("user"))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Password,
    PlateNumber,
    PreferredEntryTime,
    PreferredExitTime,
    Status,
    IsEmailVerified,
    Role,
    CreatedAt,
    UpdatedAt,
}
