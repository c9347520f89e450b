use sea_orm_migration::prelude::*;
use tracing::info;

use super::schema::Dolls;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_column("dolls", "deleted_at").await? {
            info!("adding dolls.deleted_at");
            manager
                .alter_table(
                    Table::alter()
                        .table(Dolls::Table)
                        .add_column(ColumnDef::new(Dolls::DeletedAt).custom(Alias::new("DATETIME")).null())
                        .to_owned(),
                )
                .await?;
        }
        if !manager.has_column("dolls", "deleted_by").await? {
            info!("adding dolls.deleted_by");
            manager
                .alter_table(
                    Table::alter()
                        .table(Dolls::Table)
                        .add_column(ColumnDef::new(Dolls::DeletedBy).string_len(255).null())
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_dolls_deleted_at")
                    .table(Dolls::Table)
                    .col(Dolls::DeletedAt)
                    .to_owned(),
            )
            .await
    }
}
