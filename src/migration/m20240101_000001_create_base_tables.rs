//! Dolls, events and photos as they existed before containers.

use sea_orm_migration::prelude::*;
use tracing::info;

use super::schema::{Dolls, Events, Photos, create_doll_indexes, datetime_column, dolls_table, id_column};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_table("dolls").await? {
            info!("creating dolls table");
            manager.create_table(dolls_table(Dolls::Table)).await?;
            create_doll_indexes(manager).await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(id_column(Events::Id))
                    .col(ColumnDef::new(Events::DollId).integer().not_null())
                    .col(ColumnDef::new(Events::EventType).string_len(50).not_null())
                    .col(ColumnDef::new(Events::Payload).text().null())
                    .col(datetime_column(Events::CreatedAt))
                    .col(ColumnDef::new(Events::CreatedBy).string_len(255).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Events::Table, Events::DollId)
                            .to(Dolls::Table, Dolls::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Photos::Table)
                    .if_not_exists()
                    .col(id_column(Photos::Id))
                    .col(ColumnDef::new(Photos::DollId).integer().not_null())
                    .col(ColumnDef::new(Photos::Path).string_len(500).not_null())
                    .col(
                        ColumnDef::new(Photos::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(datetime_column(Photos::CreatedAt))
                    .col(ColumnDef::new(Photos::CreatedBy).string_len(255).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Photos::Table, Photos::DollId)
                            .to(Dolls::Table, Dolls::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, table, column) in [
            ("idx_events_doll_id", Events::Table, Events::DollId),
            ("idx_events_event_type", Events::Table, Events::EventType),
            ("idx_events_created_at", Events::Table, Events::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }
        for (name, column) in [
            ("idx_photos_doll_id", Photos::DollId),
            ("idx_photos_is_primary", Photos::IsPrimary),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Photos::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}
