use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Otps: code lookup by (email, type, role), newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_otps_lookup")
                    .table(Otps::Table)
                    .col(Otps::Email)
                    .col(Otps::Kind)
                    .col(Otps::Role)
                    .col(Otps::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Users: admins list pending registrations by status
        manager
            .create_index(
                Index::create()
                    .name("idx_users_status")
                    .table(Users::Table)
                    .col(Users::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_otps_lookup").table(Otps::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_users_status").table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Otps {
    Table,
    Email,
    #[sea_orm(iden = "type")]
    Kind,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users { Table, Status }
