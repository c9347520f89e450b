//! Versioned schema and data migrations.
//!
//! Every step also inspects the live schema before acting, so a database
//! upgraded by earlier tooling passes through without changes. All steps
//! run in one transaction with foreign keys disabled.

mod m20240101_000001_create_base_tables;
mod m20240101_000002_add_soft_delete;
mod m20240101_000003_create_containers;
mod m20240101_000004_add_container_columns;
mod m20240101_000005_relax_doll_location;
mod m20240101_000006_seed_containers;
mod m20240101_000007_backfill_doll_containers;
pub mod schema;

use anyhow::Context;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, TransactionTrait};
use sea_orm_migration::prelude::*;
use tracing::{info, warn};

use crate::{config::DatabaseConfig, db::connection};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_base_tables::Migration),
            Box::new(m20240101_000002_add_soft_delete::Migration),
            Box::new(m20240101_000003_create_containers::Migration),
            Box::new(m20240101_000004_add_container_columns::Migration),
            Box::new(m20240101_000005_relax_doll_location::Migration),
            Box::new(m20240101_000006_seed_containers::Migration),
            Box::new(m20240101_000007_backfill_doll_containers::Migration),
        ]
    }
}

/// Opens a dedicated connection, brings the schema up to date and closes it.
pub async fn migrate(cfg: &DatabaseConfig) -> anyhow::Result<()> {
    let db = connection::connect_single(cfg).await?;
    run_migrations(&db)
        .await
        .context("database migration failed")?;
    db.close().await?;
    Ok(())
}

/// Applies pending migrations on `db`, which must be a single-connection pool.
/// Either every pending step commits or none does.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    if db.get_database_backend() != DbBackend::Sqlite {
        return Err(DbErr::Migration("only SQLite databases are supported".to_owned()));
    }

    db.execute_unprepared("PRAGMA foreign_keys = OFF").await?;
    let outcome = apply_in_transaction(db).await;
    db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
    outcome
}

async fn apply_in_transaction(db: &DatabaseConnection) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    let pending = Migrator::get_pending_migrations(&txn).await?.len();
    if pending == 0 {
        info!("database schema is up to date");
        return txn.commit().await;
    }

    info!(pending, "applying database migrations");
    Migrator::up(&txn, None).await?;
    report_foreign_key_violations(&txn).await?;
    txn.commit().await?;
    info!("database migrations applied");
    Ok(())
}

async fn report_foreign_key_violations<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    let rows = conn
        .query_all_raw(schema::sql("PRAGMA foreign_key_check", vec![]))
        .await?;
    for row in &rows {
        let table = row.try_get::<String>("", "table")?;
        let rowid = row.try_get::<Option<i64>>("", "rowid")?;
        let parent = row.try_get::<String>("", "parent")?;
        warn!(table, ?rowid, parent, "foreign key violation after migration");
    }
    Ok(())
}
