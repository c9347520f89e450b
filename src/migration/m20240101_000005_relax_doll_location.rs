//! Rebuilds `dolls` when `location` is still NOT NULL or the container
//! foreign key is missing. SQLite has no ALTER COLUMN, so the table is copied
//! into the current shape and swapped in place.

use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;
use tracing::info;

use super::schema::{
    DOLL_COLUMNS, Dolls, column_is_required, create_doll_indexes, dolls_table, sql, table_columns,
};

const REBUILD_TABLE: &str = "dolls_new";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        let location_required = column_is_required(conn, "dolls", "location").await?;
        let has_container_fk = has_container_foreign_key(conn).await?;
        if !location_required && has_container_fk {
            return Ok(());
        }

        let existing = table_columns(conn, "dolls").await?;
        let unknown: Vec<&String> = existing
            .iter()
            .filter(|column| !DOLL_COLUMNS.contains(&column.as_str()))
            .collect();
        if !unknown.is_empty() {
            return Err(DbErr::Migration(format!(
                "refusing to rebuild dolls: unexpected columns {unknown:?}"
            )));
        }

        info!(location_required, has_container_fk, "rebuilding dolls table");
        manager
            .drop_table(Table::drop().table(Alias::new(REBUILD_TABLE)).if_exists().to_owned())
            .await?;
        manager
            .create_table(dolls_table(Alias::new(REBUILD_TABLE)))
            .await?;

        let shared = DOLL_COLUMNS
            .iter()
            .filter(|column| existing.iter().any(|name| name == *column))
            .map(|column| format!("\"{column}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let copied = conn
            .execute_unprepared(&format!(
                "INSERT INTO \"{REBUILD_TABLE}\" ({shared}) SELECT {shared} FROM \"dolls\""
            ))
            .await?
            .rows_affected();

        manager
            .drop_table(Table::drop().table(Dolls::Table).to_owned())
            .await?;
        manager
            .rename_table(
                Table::rename()
                    .table(Alias::new(REBUILD_TABLE), Dolls::Table)
                    .to_owned(),
            )
            .await?;
        create_doll_indexes(manager).await?;

        info!(copied, "dolls table rebuilt");
        Ok(())
    }
}

async fn has_container_foreign_key<C: ConnectionTrait>(conn: &C) -> Result<bool, DbErr> {
    let row = conn
        .query_one_raw(sql(
            "SELECT COUNT(*) AS fk_count FROM pragma_foreign_key_list('dolls') \
             WHERE \"table\" = 'containers' AND \"from\" = 'container_id'",
            vec![],
        ))
        .await?;
    match row {
        Some(row) => Ok(row.try_get::<i64>("", "fk_count")? > 0),
        None => Ok(false),
    }
}
