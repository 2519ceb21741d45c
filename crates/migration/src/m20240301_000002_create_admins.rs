//! Create `admins` table. Email uniqueness is independent from `users`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Admins::Table)
                    .if_not_exists()
                    .col(uuid(Admins::Id).primary_key())
                    .col(string_len(Admins::Name, 128))
                    .col(string_len(Admins::Email, 255).unique_key())
                    .col(string_len(Admins::Password, 255))
                    .col(string_len(Admins::Role, 16).default("admin"))
                    .col(boolean(Admins::IsEmailVerified).default(false))
                    .col(timestamp_with_time_zone(Admins::CreatedAt))
                    .col(timestamp_with_time_zone(Admins::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Admins::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Admins { Table, Id, Name, Email, Password, Role, IsEmailVerified, CreatedAt, UpdatedAt }
