use sea_orm_migration::prelude::*;

use super::schema::{Containers, id_column};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Containers::Table)
                    .if_not_exists()
                    .col(id_column(Containers::Id))
                    .col(ColumnDef::new(Containers::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Containers::SortOrder).integer().not_null())
                    .col(
                        ColumnDef::new(Containers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Containers::IsSystem)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Containers::CreatedAt)
                            .custom(Alias::new("DATETIME"))
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Containers::UpdatedAt)
                            .custom(Alias::new("DATETIME"))
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_containers_sort_order", Containers::SortOrder),
            ("idx_containers_is_active", Containers::IsActive),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Containers::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}
