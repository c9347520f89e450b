//! Table identifiers and shared DDL for the migration steps.
//!
//! Column types follow the pre-container datastore (VARCHAR/DATETIME/BOOLEAN)
//! so rebuilt and freshly created tables are indistinguishable.

use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement};
use sea_orm_migration::prelude::*;

#[derive(DeriveIden, Clone, Copy)]
pub enum Dolls {
    Table,
    Id,
    Name,
    ContainerId,
    PurchaseUrl,
    Location,
    BagNumber,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    DeletedBy,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum Containers {
    Table,
    Id,
    Name,
    SortOrder,
    IsActive,
    IsSystem,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum Events {
    Table,
    Id,
    DollId,
    EventType,
    Payload,
    CreatedAt,
    CreatedBy,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum Photos {
    Table,
    Id,
    DollId,
    Path,
    IsPrimary,
    CreatedAt,
    CreatedBy,
}

/// Every column of the current `dolls` shape, in table order.
pub const DOLL_COLUMNS: [&str; 10] = [
    "id",
    "name",
    "container_id",
    "purchase_url",
    "location",
    "bag_number",
    "created_at",
    "updated_at",
    "deleted_at",
    "deleted_by",
];

pub fn id_column<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

pub fn datetime_column<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .custom(Alias::new("DATETIME"))
        .not_null()
        .to_owned()
}

/// Current `dolls` definition under `table`, used both for fresh databases and
/// for the rebuild that relaxes `location`.
pub fn dolls_table<T: IntoIden + Clone>(table: T) -> TableCreateStatement {
    Table::create()
        .table(table.clone())
        .col(id_column(Dolls::Id))
        .col(ColumnDef::new(Dolls::Name).string_len(255).not_null())
        .col(ColumnDef::new(Dolls::ContainerId).integer().null())
        .col(ColumnDef::new(Dolls::PurchaseUrl).text().null())
        .col(ColumnDef::new(Dolls::Location).string_len(10).null())
        .col(ColumnDef::new(Dolls::BagNumber).integer().null())
        .col(datetime_column(Dolls::CreatedAt))
        .col(datetime_column(Dolls::UpdatedAt))
        .col(ColumnDef::new(Dolls::DeletedAt).custom(Alias::new("DATETIME")).null())
        .col(ColumnDef::new(Dolls::DeletedBy).string_len(255).null())
        .foreign_key(
            ForeignKey::create()
                .from(table, Dolls::ContainerId)
                .to(Containers::Table, Containers::Id),
        )
        .to_owned()
}

pub async fn create_doll_indexes(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    for (name, column) in [
        ("idx_dolls_name", Dolls::Name),
        ("idx_dolls_container_id", Dolls::ContainerId),
        ("idx_dolls_location", Dolls::Location),
        ("idx_dolls_bag_number", Dolls::BagNumber),
        ("idx_dolls_deleted_at", Dolls::DeletedAt),
    ] {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(name)
                    .table(Dolls::Table)
                    .col(column)
                    .to_owned(),
            )
            .await?;
    }
    Ok(())
}

pub fn sql(sql: &str, values: Vec<sea_orm::Value>) -> Statement {
    Statement::from_sql_and_values(DbBackend::Sqlite, sql, values)
}

pub async fn table_columns<C: ConnectionTrait>(conn: &C, table: &str) -> Result<Vec<String>, DbErr> {
    let rows = conn
        .query_all_raw(sql(
            "SELECT name FROM pragma_table_info(?) ORDER BY cid",
            vec![table.into()],
        ))
        .await?;
    rows.iter().map(|row| row.try_get::<String>("", "name")).collect()
}

pub async fn column_is_required<C: ConnectionTrait>(
    conn: &C,
    table: &str,
    column: &str,
) -> Result<bool, DbErr> {
    let row = conn
        .query_one_raw(sql(
            "SELECT \"notnull\" AS required FROM pragma_table_info(?) WHERE name = ?",
            vec![table.into(), column.into()],
        ))
        .await?;
    match row {
        Some(row) => Ok(row.try_get::<i64>("", "required")? != 0),
        None => Ok(false),
    }
}

/// Id of the first container with `name`, preferring active ones.
pub async fn container_id_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    system_only: bool,
) -> Result<Option<i64>, DbErr> {
    let query = if system_only {
        "SELECT id FROM containers WHERE name = ? AND is_system = 1 \
         ORDER BY is_active DESC, id LIMIT 1"
    } else {
        "SELECT id FROM containers WHERE name = ? ORDER BY is_active DESC, id LIMIT 1"
    };
    let row = conn.query_one_raw(sql(query, vec![name.into()])).await?;
    row.map(|row| row.try_get::<i64>("", "id")).transpose()
}
