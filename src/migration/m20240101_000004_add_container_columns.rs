use sea_orm_migration::prelude::*;
use tracing::info;

use super::schema::Dolls;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite cannot add a foreign key through ALTER TABLE. The rebuild in
        // the next step adds it.
        if !manager.has_column("dolls", "container_id").await? {
            info!("adding dolls.container_id");
            manager
                .alter_table(
                    Table::alter()
                        .table(Dolls::Table)
                        .add_column(ColumnDef::new(Dolls::ContainerId).integer().null())
                        .to_owned(),
                )
                .await?;
        }
        if !manager.has_column("dolls", "purchase_url").await? {
            info!("adding dolls.purchase_url");
            manager
                .alter_table(
                    Table::alter()
                        .table(Dolls::Table)
                        .add_column(ColumnDef::new(Dolls::PurchaseUrl).text().null())
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_dolls_container_id")
                    .table(Dolls::Table)
                    .col(Dolls::ContainerId)
                    .to_owned(),
            )
            .await
    }
}
