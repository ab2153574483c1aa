//! Create admin_pin table migration

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdminPin::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminPin::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminPin::PinHash).string_len(255).null())
                    .col(
                        ColumnDef::new(AdminPin::IsSet)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AdminPin::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminPin::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AdminPin {
    Table,
    Id,
    PinHash,
    IsSet,
    UpdatedAt,
}
