//! Create `property` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Property::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Property::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Property::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Property::Description).text().not_null())
                    .col(
                        ColumnDef::new(Property::Location)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Property::Price).double().not_null())
                    .col(ColumnDef::new(Property::Latitude).double())
                    .col(ColumnDef::new(Property::Longitude).double())
                    .col(
                        ColumnDef::new(Property::OwnerId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Property::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Property::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_property_owner")
                            .from(Property::Table, Property::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: owner_id (for dashboard listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_property_owner_id")
                    .table(Property::Table)
                    .col(Property::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Index: price (for range filters)
        manager
            .create_index(
                Index::create()
                    .name("idx_property_price")
                    .table(Property::Table)
                    .col(Property::Price)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Property::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Property {
    Table,
    Id,
    Title,
    Description,
    Location,
    Price,
    Latitude,
    Longitude,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
