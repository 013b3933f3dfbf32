//! Create `photo` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Photo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Photo::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Photo::Filename).string_len(512).not_null())
                    .col(
                        ColumnDef::new(Photo::OriginalName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Photo::ContentType)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Photo::Size).big_integer().not_null())
                    .col(
                        ColumnDef::new(Photo::PropertyId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Photo::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photo_property")
                            .from(Photo::Table, Photo::PropertyId)
                            .to(Property::Table, Property::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: property_id (for eager photo loading)
        manager
            .create_index(
                Index::create()
                    .name("idx_photo_property_id")
                    .table(Photo::Table)
                    .col(Photo::PropertyId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Photo::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Photo {
    Table,
    Id,
    Filename,
    OriginalName,
    ContentType,
    Size,
    PropertyId,
    CreatedAt,
}

#[derive(Iden)]
enum Property {
    Table,
    Id,
}
