use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ItemSearches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemSearches::Item)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ItemSearches::Count)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ItemSearches::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LocationSearches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LocationSearches::LatTenths)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LocationSearches::LngTenths)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LocationSearches::Count)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LocationSearches::UpdatedAt)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(LocationSearches::LatTenths)
                            .col(LocationSearches::LngTenths),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_searches_count")
                    .table(ItemSearches::Table)
                    .col(ItemSearches::Count)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LocationSearches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ItemSearches::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ItemSearches {
    Table,
    Item,
    Count,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LocationSearches {
    Table,
    LatTenths,
    LngTenths,
    Count,
    UpdatedAt,
}
